//! # Spotify Integration Module
//!
//! Track search against the Spotify Web API.
//!
//! ## Overview
//!
//! Spotify is an optional search provider: it is only built when
//! `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` are configured. Results
//! carry Spotify metadata but no playable location, since Spotify audio
//! cannot be streamed to a voice session. Before such a track is queued the
//! search service resolves it to a YouTube equivalent.
//!
//! ## Architecture
//!
//! ```text
//! SearchService
//!      ↓
//! SpotifyProvider (token cache, retry on 401)
//!     ├── auth   - client credentials token request
//!     └── search - /search?type=track and record conversion
//!      ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Token Handling
//!
//! The app token is cached in a [`TokenManager`] and reused until 60
//! seconds before it expires. A 401 from the search endpoint forces one
//! refresh and one retry; a second 401 is reported as a provider error.

pub mod auth;
pub mod search;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::SpotifyConfig,
    error::SearchError,
    management::TokenManager,
    search::SearchProvider,
    types::{Track, TrackSource},
};

pub struct SpotifyProvider {
    config: SpotifyConfig,
    client: Client,
    tokens: Mutex<Option<TokenManager>>,
}

impl SpotifyProvider {
    pub fn new(config: SpotifyConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            tokens: Mutex::new(None),
        }
    }

    async fn token(&self, force_refresh: bool) -> Result<String, SearchError> {
        let mut tokens = self.tokens.lock().await;

        if !force_refresh {
            if let Some(token) = tokens.as_ref().and_then(|t| t.valid_token()) {
                return Ok(token.to_string());
            }
        }

        let token = auth::request_client_token(&self.client, &self.config).await?;
        let access_token = token.access_token.clone();
        *tokens = Some(TokenManager::new(token));
        Ok(access_token)
    }
}

#[async_trait]
impl SearchProvider for SpotifyProvider {
    fn source(&self) -> TrackSource {
        TrackSource::Spotify
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, SearchError> {
        let mut force_refresh = false;

        for _ in 0..2 {
            let token = self.token(force_refresh).await?;
            match search::search_tracks(&self.client, &self.config.api_url, &token, query, limit)
                .await?
            {
                search::SearchOutcome::Found(tracks) => return Ok(tracks),
                search::SearchOutcome::Unauthorized => {
                    tracing::warn!("spotify token rejected, refreshing");
                    force_refresh = true;
                }
            }
        }

        Err(SearchError::provider("spotify", "token rejected after refresh"))
    }
}
