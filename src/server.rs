//! JSON-over-HTTP snapshot endpoint and HTML dashboard.
//!
//! Every request runs the pipeline afresh; caching is left to the edge via
//! the configured `Cache-Control` header.

use crate::error::PulseError;
use crate::pipeline::Pipeline;
use crate::report;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
    cache_control: HeaderValue,
}

/// Build the router serving the dashboard, `/api/pulse` and `/health`.
pub fn router(pipeline: Pipeline, cache_control: &str) -> Result<Router> {
    let cache_control = HeaderValue::from_str(cache_control)
        .with_context(|| format!("Invalid Cache-Control value: {}", cache_control))?;

    let state = AppState {
        pipeline: Arc::new(pipeline),
        cache_control,
    };

    Ok(Router::new()
        .route("/", get(dashboard))
        .route("/api/pulse", get(pulse))
        .route("/health", get(health))
        .with_state(state))
}

/// Bind and serve until the process is stopped.
pub async fn serve(pipeline: Pipeline, bind: &str, cache_control: &str) -> Result<()> {
    let app = router(pipeline, cache_control)?;
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Solana Pulse API running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    "OK"
}

async fn pulse(State(state): State<AppState>) -> Response {
    match state.pipeline.produce_snapshot().await {
        Ok(snapshot) => (
            [(header::CACHE_CONTROL, state.cache_control.clone())],
            Json(snapshot),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

async fn dashboard(State(state): State<AppState>) -> Response {
    match state.pipeline.produce_snapshot().await {
        Ok(snapshot) => (
            [(header::CACHE_CONTROL, state.cache_control.clone())],
            Html(report::generate_html_dashboard(&snapshot)),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// Upstream failures become placeholder cards, so only configuration errors get here.
fn error_response(err: PulseError) -> Response {
    error!("Snapshot request failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}
