//! HTTP integration tests for the Mood Analyzer API
//!
//! Each test builds the real router over a temporary SQLite store and a stub
//! classifier, then drives it with `oneshot` for full handler dispatch.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use mood_core::config::DatabaseConfig;
use mood_core::{db, Classification, ClassifierError, MoodConfig, SentimentClassifier};
use mood_server::http::{build_router, HttpState};
use serde_json::json;
use tower::ServiceExt;

/// Classifier that keys the raw label off the text, like a tiny lexicon.
struct LexiconClassifier;

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let lower = text.to_lowercase();
        let (raw_label, score) = if lower.contains("love") {
            ("LABEL_2", 0.93)
        } else if lower.contains("hate") {
            ("LABEL_0", 0.88)
        } else if lower.contains("glitch") {
            ("LABEL_9", 0.5)
        } else {
            ("LABEL_1", 0.64)
        };
        Ok(Classification {
            raw_label: raw_label.to_string(),
            score,
        })
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, ClassifierError> {
        Err(ClassifierError::OnnxInference("model unavailable".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

async fn make_state(
    store: &Path,
    classifier: Arc<dyn SentimentClassifier>,
) -> Arc<HttpState> {
    let mut config = MoodConfig::default();
    config.database = DatabaseConfig {
        path: store.to_path_buf(),
        ..Default::default()
    };
    db::ensure_database(&config.database).await.unwrap();
    Arc::new(HttpState { config, classifier })
}

async fn post_predict(state: Arc<HttpState>, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();
    let resp = build_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn get_json(state: Arc<HttpState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = build_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_predict_returns_known_label_and_bounded_score() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir.path().join("moods.db"), Arc::new(LexiconClassifier)).await;

    for text in ["I love this", "I hate this", "It is a chair", "glitch"] {
        let (status, body) = post_predict(state.clone(), "/predict/", json!({ "text": text })).await;
        assert_eq!(status, StatusCode::OK, "text {text:?}: {body}");

        let label = body["label"].as_str().unwrap();
        assert!(
            ["positive", "neutral", "negative", "unknown"].contains(&label),
            "unexpected label {label}"
        );
        let score = body["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score), "score {score} out of range");
    }
}

#[tokio::test]
async fn test_predict_maps_each_model_label() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir.path().join("moods.db"), Arc::new(LexiconClassifier)).await;

    let cases = [
        ("love it", "positive"),
        ("hate it", "negative"),
        ("a table", "neutral"),
        ("glitch", "unknown"),
    ];
    for (text, expected) in cases {
        let (_, body) = post_predict(state.clone(), "/predict/", json!({ "text": text })).await;
        assert_eq!(body["label"], expected, "text {text:?}");
    }
}

#[tokio::test]
async fn test_predict_appends_exactly_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("moods.db");
    let state = make_state(&store, Arc::new(LexiconClassifier)).await;

    let before = db::count_sentiments(&store).await.unwrap();
    let (status, _) = post_predict(state, "/predict/", json!({ "text": "I love rainy days" })).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(db::count_sentiments(&store).await.unwrap(), before + 1);
    let rows = db::list_sentiments(&store).await.unwrap();
    let last = rows.last().unwrap();
    assert_eq!(last.text, "I love rainy days");
    assert_eq!(last.sentiment_label, "positive");
}

#[tokio::test]
async fn test_predict_without_trailing_slash() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir.path().join("moods.db"), Arc::new(LexiconClassifier)).await;

    let (status, body) = post_predict(state, "/predict", json!({ "text": "hate mondays" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "negative");
}

#[tokio::test]
async fn test_predict_missing_text_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("moods.db");
    let state = make_state(&store, Arc::new(LexiconClassifier)).await;

    let (status, _) = post_predict(state, "/predict/", json!({ "body": "wrong field" })).await;
    assert!(status.is_client_error(), "got {status}");
    assert_eq!(db::count_sentiments(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn test_inference_failure_is_500_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("moods.db");
    let state = make_state(&store, Arc::new(FailingClassifier)).await;

    let (status, body) = post_predict(state, "/predict/", json!({ "text": "hello" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["message"].as_str().unwrap().contains("model unavailable"),
        "body was {body}"
    );
    assert_eq!(db::count_sentiments(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn test_history_returns_inserted_rows() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir.path().join("moods.db"), Arc::new(LexiconClassifier)).await;

    for text in ["love the coffee", "hate the queue", "the bus is blue"] {
        post_predict(state.clone(), "/predict/", json!({ "text": text })).await;
    }

    let (status, body) = get_json(state, "/history/").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["sentiments"].as_array().unwrap();
    assert_eq!(rows.len(), 3);

    let texts: Vec<&str> = rows.iter().map(|r| r["text"].as_str().unwrap()).collect();
    assert_eq!(texts, ["love the coffee", "hate the queue", "the bus is blue"]);
    assert_eq!(rows[1]["sentiment_label"], "negative");
    assert!(rows[0]["id"].is_i64());
    assert!(rows[0]["sentiment_score"].is_f64());
    assert_eq!(rows[0]["timestamp"].as_str().unwrap().len(), 19);
}

#[tokio::test]
async fn test_deleted_store_restarts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("moods.db");
    let state = make_state(&store, Arc::new(LexiconClassifier)).await;
    post_predict(state, "/predict/", json!({ "text": "love" })).await;

    // Simulate a restart after the file was removed.
    std::fs::remove_file(&store).unwrap();
    let state = make_state(&store, Arc::new(LexiconClassifier)).await;

    let (status, body) = get_json(state, "/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "sentiments": [] }));
}

#[tokio::test]
async fn test_health_and_version_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let state = make_state(&dir.path().join("moods.db"), Arc::new(LexiconClassifier)).await;

    let (status, body) = get_json(state.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "lexicon");
    assert_eq!(body["records"], 0);

    let (status, body) = get_json(state, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "mood/1");
}
