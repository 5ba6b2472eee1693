//! Inbound HTTP surface for GitHub webhooks.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::{base::types::Void, interaction, runtime::Runtime};

/// Header carrying the GitHub event kind.
pub const EVENT_HEADER: &str = "x-github-event";

/// The acknowledgement returned for every delivery.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookResponse {
    pub result: String,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self { result: "ok".to_string() }
    }
}

pub fn webhook_router(runtime: Runtime) -> Router {
    Router::new()
        .route("/", post(github_webhook_handler))
        .route("/webhook", post(github_webhook_handler))
        .route("/health", get(health_check))
        .with_state(runtime)
}

/// Handle a GitHub delivery and acknowledge it, whatever happened.
#[instrument(skip_all)]
pub async fn github_webhook_handler(State(runtime): State<Runtime>, headers: HeaderMap, body: Bytes) -> Json<WebhookResponse> {
    let kind = headers.get(EVENT_HEADER).and_then(|h| h.to_str().ok()).unwrap_or_default();
    info!("Received `{}` webhook ({} bytes).", kind, body.len());

    interaction::handle_webhook(&runtime, kind, &body).await;

    Json(WebhookResponse::ok())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "review-bell"
    }))
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(runtime: Runtime) -> Void {
    let listener = tokio::net::TcpListener::bind(&runtime.config.bind_address).await?;
    info!("Listening for webhooks on {}", listener.local_addr()?);

    axum::serve(listener, webhook_router(runtime))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down ...");
        })
        .await?;

    Ok(())
}
