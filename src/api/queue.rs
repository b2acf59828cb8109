use std::sync::Arc;

use axum::{Extension, Json, extract::Path, http::HeaderMap};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    api::{ApiError, AppState, access},
    types::{GuildId, Track},
};

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub song: Option<Track>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub index: Option<usize>,
}

pub async fn get_queue(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    access::require_read(&state, &headers, &guild)?;

    let queue = state.session(&guild)?.queue().clone();
    let view = queue.view()?;
    let entries = queue.snapshot()?;

    Ok(Json(json!({
        "success": true,
        "current_track": view.current_track,
        "upcoming": view.upcoming,
        "history": view.history_len,
        "entries": entries,
        "max_size": queue.max_size(),
    })))
}

/// Resolves the song to a playable source, queues it and starts playback
/// if the session is idle.
pub async fn add_to_queue(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<AddRequest>,
) -> Result<Json<Value>, ApiError> {
    access::require_member(&state, &headers, &guild)?;

    let session = state.session(&guild)?;
    let mut song = body
        .song
        .ok_or_else(|| ApiError::BadRequest("No song data".to_string()))?;
    // Playable sources are resolved server side only.
    song.playable_uri = None;

    tracing::info!(
        guild = %guild,
        title = %song.title,
        artist = %song.artist,
        source = song.source.as_str(),
        "adding song to queue"
    );

    let track = state.search.resolve(song).await?;
    let added = session.queue().enqueue(track.clone())?;
    let started = session.controller().ensure_playing()?;

    Ok(Json(json!({
        "success": true,
        "index": added.index,
        "pruned": added.pruned,
        "track": track,
        "started": started.is_some(),
    })))
}

pub async fn remove_from_queue(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<RemoveRequest>,
) -> Result<Json<Value>, ApiError> {
    access::require_member(&state, &headers, &guild)?;

    let session = state.session(&guild)?;
    let index = body
        .index
        .ok_or_else(|| ApiError::BadRequest("No index provided".to_string()))?;
    let removed = session.queue().remove_at(index)?;

    Ok(Json(json!({ "success": true, "removed": removed })))
}

pub async fn clear_queue(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    access::require_member(&state, &headers, &guild)?;

    state.session(&guild)?.queue().clear();
    Ok(Json(json!({ "success": true })))
}

pub async fn shuffle_queue(
    Path(guild): Path<GuildId>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    access::require_member(&state, &headers, &guild)?;

    state.session(&guild)?.queue().shuffle()?;
    Ok(Json(json!({ "success": true })))
}
