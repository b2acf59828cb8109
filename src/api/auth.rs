use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Json,
    extract::Query,
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde_json::{Value, json};

use crate::{
    api::{
        ApiError, AppState,
        access::{self, SESSION_COOKIE, STATE_COOKIE},
    },
    error::AuthError,
    types::SessionClaims,
    utils,
};

const STATE_TTL_SECS: u64 = 600;

fn set_cookie(name: &str, value: &str, max_age: u64) -> String {
    format!("{name}={value}; HttpOnly; Path=/; Max-Age={max_age}; SameSite=Lax")
}

/// Redirects the browser to Discord's consent page.
pub async fn login(Extension(state): Extension<Arc<AppState>>) -> Result<Response, ApiError> {
    let discord = state.discord.as_ref().ok_or(AuthError::Disabled)?;

    let oauth_state = utils::generate_state();
    let url = discord.authorize_url(&oauth_state)?;

    Ok((
        AppendHeaders([(SET_COOKIE, set_cookie(STATE_COOKIE, &oauth_state, STATE_TTL_SECS))]),
        Redirect::to(&url),
    )
        .into_response())
}

/// Completes the login: checks `state`, exchanges the code, fetches the
/// user and their guilds, and stores them in a signed session cookie.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let discord = state.discord.as_ref().ok_or(AuthError::Disabled)?;

    if let Some(error) = params.get("error") {
        return Err(ApiError::BadRequest(format!("login was declined: {error}")));
    }

    let expected = access::cookie(&headers, STATE_COOKIE);
    if expected.is_none() || params.get("state") != expected.as_ref() {
        return Err(AuthError::StateMismatch.into());
    }

    let Some(code) = params.get("code") else {
        return Err(ApiError::BadRequest("missing authorization code".to_string()));
    };

    let token = discord.exchange_code(code).await?;
    let user = discord.user(&token.access_token).await?;
    let guilds = discord.guilds(&token.access_token).await?;

    let now = utils::now();
    let claims = SessionClaims {
        user_id: user.id,
        username: user.username,
        guilds,
        iat: now,
        exp: now + utils::SESSION_TTL_SECS,
    };
    tracing::info!(user = %claims.username, guilds = claims.guilds.len(), "user logged in");

    let session = utils::sign_session(&claims, &state.config.session_secret);
    Ok((
        AppendHeaders([
            (SET_COOKIE, set_cookie(SESSION_COOKIE, &session, utils::SESSION_TTL_SECS)),
            (SET_COOKIE, set_cookie(STATE_COOKIE, "", 0)),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}

pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, set_cookie(SESSION_COOKIE, "", 0))]),
        Json(json!({ "success": true })),
    )
}

/// The logged-in user and the guilds they may control.
pub async fn me(
    headers: HeaderMap,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    if !state.auth_enabled() {
        return Ok(Json(json!({
            "success": true,
            "auth_enabled": false,
        })));
    }

    let claims = access::session(&state, &headers)?.ok_or(AuthError::MissingSession)?;
    Ok(Json(json!({
        "success": true,
        "auth_enabled": true,
        "user": {
            "id": claims.user_id,
            "username": claims.username,
        },
        "guilds": claims.guilds,
        "expires_at": claims.exp,
    })))
}
