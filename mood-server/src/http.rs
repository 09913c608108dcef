//! Mood Analyzer HTTP API
//!
//! Axum-based HTTP server exposing sentiment prediction and the stored
//! history. Each endpoint has a thin axum handler that delegates to an inner
//! function returning `(StatusCode, serde_json::Value)`; the inner functions
//! are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - POST /predict/ : classify text, store the result, return label + score
//! - GET  /history/ : every stored record
//! - GET  /health   : store and model status
//! - GET  /version  : server version info
//!
//! `/predict` and `/history` are served with and without the trailing slash.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use mood_core::api::PredictRequest;
use mood_core::{db, MoodConfig, SentimentClassifier};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::subsystems::{history, predict};

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub config: MoodConfig,
    pub classifier: Arc<dyn SentimentClassifier>,
}

impl HttpState {
    pub fn store_path(&self) -> &Path {
        &self.config.database.path
    }
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/predict/", post(predict_handler))
        .route("/history", get(history_handler))
        .route("/history/", get(history_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    config: MoodConfig,
    classifier: Arc<dyn SentimentClassifier>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { config, classifier });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Mood Analyzer API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        serde_json::json!({ "message": e.to_string() }),
    )
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner predict: classify, store, and answer `{label, score}`.
///
/// The text is passed through as-is; an empty string is still classified.
pub async fn predict_inner(state: &HttpState, req: PredictRequest) -> (StatusCode, serde_json::Value) {
    match predict::predict_and_store(&req.text, state.classifier.as_ref(), state.store_path()).await
    {
        Ok(resp) => (
            StatusCode::OK,
            serde_json::json!({
                "label": resp.label.as_str(),
                "score": resp.score,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Prediction failed");
            internal_error(e)
        }
    }
}

/// Inner history: full-table scan of the store.
pub async fn history_inner(store: &Path) -> (StatusCode, serde_json::Value) {
    let loaded = history::load_history(store)
        .await
        .and_then(|h| serde_json::to_value(h).map_err(anyhow::Error::from));

    match loaded {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "Loading history failed");
            internal_error(e)
        }
    }
}

/// Inner health check: probes the store and reports the classifier backend.
pub async fn health_inner(store: &Path, classifier: &str) -> (StatusCode, serde_json::Value) {
    let probed = match db::probe(store).await {
        Ok(()) => db::count_sentiments(store).await,
        Err(e) => Err(e),
    };

    match probed {
        Ok(records) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "database": store.display().to_string(),
                "records": records,
                "model": classifier,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version: returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "api": "mood/1",
    })
}

// ============================================================================
// Axum handler wrappers (thin; delegate to inner functions)
// ============================================================================

pub async fn predict_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<PredictRequest>,
) -> impl IntoResponse {
    let (status, body) = predict_inner(&state, req).await;
    (status, Json(body))
}

pub async fn history_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = history_inner(state.store_path()).await;
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.store_path(), state.classifier.name()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Unit Tests (inner functions called directly)
// ============================================================================
