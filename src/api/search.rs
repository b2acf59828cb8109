use std::sync::Arc;

use axum::{Extension, Json, http::HeaderMap};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::{ApiError, AppState, access};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

pub async fn search(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<Value>, ApiError> {
    access::require_general_read(&state, &headers)?;

    let query = body.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("No query provided".to_string()));
    }

    let results = state.search.search(query).await?;
    Ok(Json(json!({ "success": true, "results": results })))
}
