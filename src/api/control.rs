use std::sync::Arc;

use axum::{Extension, Json, extract::Path, http::HeaderMap};
use serde_json::{Value, json};

use crate::{
    api::{ApiError, AppState, access},
    types::GuildId,
};

/// `POST /api/sessions/{guild}/control/{action}`
pub async fn control(
    Path((guild, action)): Path<(GuildId, String)>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    access::require_member(&state, &headers, &guild)?;

    let session = state.session(&guild)?;
    let controller = session.controller();

    let message = match action.as_str() {
        "play" => {
            let track = controller.play()?;
            format!("Playing {} - {}", track.title, track.artist)
        }
        "pause" => {
            controller.pause()?;
            "Paused".to_string()
        }
        "resume" => {
            controller.resume()?;
            "Resumed".to_string()
        }
        "skip" => {
            controller.skip()?;
            "Skipped".to_string()
        }
        "previous" => {
            controller.previous()?;
            "Going back".to_string()
        }
        "stop" => {
            controller.stop();
            "Stopped and cleared queue".to_string()
        }
        other => return Err(ApiError::NotFound(format!("unknown action '{other}'"))),
    };

    tracing::info!(guild = %guild, action = %action, "playback control");
    Ok(Json(json!({
        "success": true,
        "message": message,
        "status": controller.status(),
    })))
}
