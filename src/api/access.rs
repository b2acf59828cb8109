//! Who may call what.
//!
//! With Discord credentials configured, mutations need a session cookie for
//! a member of the target guild and reads follow `READ_ACCESS`. Without
//! them every request is allowed.

use axum::http::{HeaderMap, header::COOKIE};

use crate::{
    api::{ApiError, AppState},
    config::ReadAccess,
    error::AuthError,
    types::{GuildId, SessionClaims},
    utils,
};

pub const SESSION_COOKIE: &str = "psychosonus_session";
pub const STATE_COOKIE: &str = "psychosonus_oauth_state";

pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|header| utils::cookie_value(header, name))
        .map(str::to_string)
}

/// Decodes the session cookie, if there is one.
pub fn session(state: &AppState, headers: &HeaderMap) -> Result<Option<SessionClaims>, AuthError> {
    match cookie(headers, SESSION_COOKIE) {
        Some(token) => utils::verify_session(&token, &state.config.session_secret).map(Some),
        None => Ok(None),
    }
}

/// Any logged-in user.
pub fn require_login(state: &AppState, headers: &HeaderMap) -> Result<Option<SessionClaims>, ApiError> {
    if !state.auth_enabled() {
        return Ok(None);
    }
    session(state, headers)?
        .map(Some)
        .ok_or(ApiError::Auth(AuthError::MissingSession))
}

/// A logged-in member of `guild`.
pub fn require_member(state: &AppState, headers: &HeaderMap, guild: &GuildId) -> Result<(), ApiError> {
    let Some(claims) = require_login(state, headers)? else {
        return Ok(());
    };

    if claims.is_member_of(guild) {
        Ok(())
    } else {
        tracing::info!(user = %claims.username, guild = %guild, "rejected non-member");
        Err(AuthError::Forbidden(guild.to_string()).into())
    }
}

pub fn require_read(state: &AppState, headers: &HeaderMap, guild: &GuildId) -> Result<(), ApiError> {
    match state.config.read_access {
        ReadAccess::Public => Ok(()),
        ReadAccess::Members => require_member(state, headers, guild),
    }
}

/// Reads that are not tied to one guild, like search.
pub fn require_general_read(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    match state.config.read_access {
        ReadAccess::Public => Ok(()),
        ReadAccess::Members => require_login(state, headers).map(|_| ()),
    }
}
