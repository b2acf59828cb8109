use axum::response::{Html, Json};
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn index() -> Html<&'static str> {
    Html(concat!(
        "<!doctype html><html><head><title>Psychosonus</title></head><body>",
        "<h2>Psychosonus</h2>",
        "<p>Music bot dashboard API, version ",
        env!("CARGO_PKG_VERSION"),
        ".</p>",
        "<ul>",
        "<li><a href=\"/auth/login\">Log in with Discord</a></li>",
        "<li><a href=\"/api/sessions\">Active sessions</a></li>",
        "<li><a href=\"/health\">Health</a></li>",
        "</ul>",
        "</body></html>"
    ))
}
