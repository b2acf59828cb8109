//! # API Module
//!
//! HTTP endpoints of the Psychosonus dashboard.
//!
//! ## Overview
//!
//! The dashboard drives the same sessions as the chat commands: every
//! handler resolves the target guild in the [`SessionRegistry`] and calls
//! the session's queue or playback controller. Handlers receive the shared
//! [`AppState`] through an axum `Extension` layer.
//!
//! ## Endpoints
//!
//! ### Monitoring
//!
//! - [`health`] - status and version
//! - [`index`] - plain HTML landing page
//!
//! ### Authentication
//!
//! - [`login`], [`callback`], [`logout`], [`me`] - Discord OAuth2 login and
//!   the signed session cookie
//!
//! ### Sessions, queue and playback
//!
//! - [`list_sessions`], [`join_session`], [`leave_session`], [`session_status`]
//! - [`get_queue`], [`add_to_queue`], [`remove_from_queue`], [`clear_queue`],
//!   [`shuffle_queue`]
//! - [`control`] - `play`, `pause`, `resume`, `skip`, `previous`, `stop`
//! - [`search`] - aggregated Spotify/YouTube search
//!
//! ## Responses
//!
//! Successful calls return JSON with `"success": true`. Failures go through
//! [`ApiError`], which renders `{"success": false, "error": "..."}` with a
//! matching status code.
//!
//! ## Access
//!
//! See [`access`] for the rules applied when Discord login is configured.

pub mod access;
mod auth;
mod control;
mod error;
mod health;
mod queue;
mod search;
mod sessions;

pub use auth::{callback, login, logout, me};
pub use control::control;
pub use error::ApiError;
pub use health::{health, index};
pub use queue::{add_to_queue, clear_queue, get_queue, remove_from_queue, shuffle_queue};
pub use search::search;
pub use sessions::{join_session, leave_session, list_sessions, session_status};

use std::sync::Arc;

use crate::{
    config::Config,
    discord::DiscordClient,
    management::{Session, SessionRegistry},
    search::SearchService,
    types::GuildId,
};

/// Everything the handlers share.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<SessionRegistry>,
    pub search: Arc<SearchService>,
    pub discord: Option<DiscordClient>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Arc<SessionRegistry>,
        search: Arc<SearchService>,
    ) -> Self {
        let discord = config.discord.clone().map(DiscordClient::new);
        Self {
            config,
            registry,
            search,
            discord,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.discord.is_some()
    }

    /// The joined session for `guild`.
    pub fn session(&self, guild: &GuildId) -> Result<Arc<Session>, ApiError> {
        self.registry
            .get(guild)
            .ok_or_else(|| ApiError::NotFound(format!("no active session for guild {guild}")))
    }
}
