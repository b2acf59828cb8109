use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::Value;

use crate::{config::SpotifyConfig, error::SearchError, types::ClientToken, utils};

/// Requests an app token with the client credentials flow.
///
/// Search needs no user context, so the app authenticates with its own
/// client id and secret sent as HTTP Basic credentials.
///
/// # Returns
///
/// - `Ok(ClientToken)` - access token with its lifetime and the time it was
///   obtained
/// - `Err(SearchError)` - network failure or a non-success response from the
///   token endpoint
///
/// # Example
///
/// ```
/// let token = request_client_token(&client, &config).await?;
/// println!("Token valid for {} seconds", token.expires_in);
/// ```
pub async fn request_client_token(
    client: &Client,
    config: &SpotifyConfig,
) -> Result<ClientToken, SearchError> {
    let credentials = STANDARD.encode(format!("{}:{}", config.client_id, config.client_secret));

    let res = client
        .post(&config.token_url)
        .header("Authorization", format!("Basic {credentials}"))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(SearchError::provider(
            "spotify",
            format!("token request failed: {status} - {body}"),
        ));
    }

    let json: Value = res.json().await?;
    let access_token = json["access_token"]
        .as_str()
        .ok_or_else(|| SearchError::provider("spotify", "token response without access_token"))?
        .to_string();

    tracing::info!("obtained spotify access token");

    Ok(ClientToken {
        access_token,
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: utils::now(),
    })
}
