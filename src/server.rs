//! HTTP front end.
//!
//! `POST /` and `POST /generate` take a campaign request body and answer with
//! the email draft. Failures get an explicit status and a JSON error body.

use std::net::SocketAddr;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::pipeline::{EmailPipeline, PipelineError};

/// JSON body describing a failed invocation.
pub fn error_body(error: &PipelineError) -> Value {
    json!({
        "error": error.kind(),
        "message": error.to_string(),
    })
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(error_body(&self))).into_response()
    }
}

/// Create the application router.
pub fn create_router(pipeline: EmailPipeline) -> Router {
    Router::new()
        .route("/", post(generate_email))
        .route("/generate", post(generate_email))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

async fn generate_email(State(pipeline): State<EmailPipeline>, body: Bytes) -> Response {
    match pipeline.handle_body(&body).await {
        Ok(draft) => (StatusCode::OK, Json(draft)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run_server(pipeline: EmailPipeline, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "listening for campaign requests");

    axum::serve(listener, create_router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
