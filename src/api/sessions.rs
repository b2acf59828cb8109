use std::sync::Arc;

use axum::{Extension, Json, extract::Path, http::HeaderMap};
use serde_json::{Value, json};

use crate::{
    api::{ApiError, AppState, access},
    config::ReadAccess,
    management::SessionStatus,
    types::GuildId,
};

/// Every active session the caller may see.
pub async fn list_sessions(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let viewer = match state.config.read_access {
        ReadAccess::Public => None,
        ReadAccess::Members => access::require_login(&state, &headers)?,
    };

    let sessions: Vec<SessionStatus> = state
        .registry
        .list()
        .iter()
        .filter(|guild| viewer.as_ref().is_none_or(|claims| claims.is_member_of(guild)))
        .filter_map(|guild| state.registry.get(guild))
        .map(|session| session.status())
        .collect();

    Ok(Json(json!({ "success": true, "sessions": sessions })))
}

pub async fn join_session(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    access::require_member(&state, &headers, &guild)?;

    let session = state.registry.join(&guild);
    Ok(Json(json!({ "success": true, "session": session.status() })))
}

pub async fn leave_session(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    access::require_member(&state, &headers, &guild)?;

    if !state.registry.leave(&guild).await {
        return Err(ApiError::NotFound(format!(
            "no active session for guild {guild}"
        )));
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn session_status(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    access::require_read(&state, &headers, &guild)?;

    let session = state.session(&guild)?;
    Ok(Json(json!({ "success": true, "session": session.status() })))
}
