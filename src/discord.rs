//! Discord OAuth2 client used by the dashboard login.
//!
//! Only the `identify guilds` scopes are requested: the bot needs to know
//! who the user is and which guilds they belong to, nothing more.

use reqwest::{Client, Url};

use crate::{
    config::DiscordConfig,
    error::AuthError,
    types::{DiscordGuild, DiscordToken, DiscordUser},
};

const SCOPE: &str = "identify guilds";

pub struct DiscordClient {
    config: DiscordConfig,
    client: Client,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Builds the URL the browser is sent to for consent.
    pub fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;

        Ok(url.to_string())
    }

    /// Trades the authorization code from the callback for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<DiscordToken, AuthError> {
        let token = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<DiscordToken>()
            .await?;

        Ok(token)
    }

    pub async fn user(&self, access_token: &str) -> Result<DiscordUser, AuthError> {
        let user = self
            .client
            .get(format!("{}/users/@me", self.config.api_url))
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<DiscordUser>()
            .await?;

        Ok(user)
    }

    pub async fn guilds(&self, access_token: &str) -> Result<Vec<DiscordGuild>, AuthError> {
        let guilds = self
            .client
            .get(format!("{}/users/@me/guilds", self.config.api_url))
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<DiscordGuild>>()
            .await?;

        Ok(guilds)
    }
}
