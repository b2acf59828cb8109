use std::{future::Future, io, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::api::{self, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .route("/auth/login", get(api::login))
        .route("/auth/callback", get(api::callback))
        .route("/auth/logout", post(api::logout))
        .route("/api/me", get(api::me))
        .route("/api/search", post(api::search))
        .route("/api/sessions", get(api::list_sessions))
        .route("/api/sessions/{guild}/join", post(api::join_session))
        .route("/api/sessions/{guild}/leave", post(api::leave_session))
        .route("/api/sessions/{guild}/status", get(api::session_status))
        .route("/api/sessions/{guild}/queue", get(api::get_queue))
        .route("/api/sessions/{guild}/queue/add", post(api::add_to_queue))
        .route("/api/sessions/{guild}/queue/remove", post(api::remove_from_queue))
        .route("/api/sessions/{guild}/queue/clear", post(api::clear_queue))
        .route("/api/sessions/{guild}/queue/shuffle", post(api::shuffle_queue))
        .route("/api/sessions/{guild}/control/{action}", post(api::control))
        .layer(Extension(state))
}

/// Serves the API on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "web interface listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Binds the configured address and serves the API.
pub async fn start_api_server(
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    let listener = TcpListener::bind(state.config.server_addr).await?;
    serve(listener, state, shutdown).await
}
