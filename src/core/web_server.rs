//! Keep-alive HTTP stub.
//!
//! Hosting platforms that idle out containers ping this server to keep the
//! bot warm. Serves a plain-text liveness line at `/` and JSON at `/health`.

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Start the keep-alive server. Blocks until the listener fails.
pub async fn start_keep_alive_server(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = Router::new().route("/", get(root_handler)).route("/health", get(health_handler));

    log::info!("Starting keep-alive server on http://{}", addr);
    log::info!("  /        - liveness text");
    log::info!("  /health  - health check (JSON)");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /: plain-text liveness probe.
async fn root_handler() -> impl IntoResponse {
    "I'm alive"
}

/// GET /health: JSON health check.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
