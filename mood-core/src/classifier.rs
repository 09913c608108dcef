//! Sentiment classifier abstraction.
//!
//! The service only needs `(raw_label, score)` per text; label mapping to
//! `SentimentLabel` happens in the caller. The production backend is
//! [`crate::onnx_classifier::OnnxSentimentClassifier`].

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Base name of the default model files.
pub const DEFAULT_MODEL_NAME: &str = "twitter-roberta-base-sentiment";

/// Raw classifier output before label mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Model-specific label, e.g. `LABEL_2`.
    pub raw_label: String,
    /// Probability of `raw_label`, in `[0, 1]`.
    pub score: f32,
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;

    /// Backend name for logging and health output.
    fn name(&self) -> &str;
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("ONNX model not found at {path}; export twitter-roberta-base-sentiment to ONNX and place it there")]
    ModelNotFound { path: String },

    #[error("ONNX inference error: {0}")]
    OnnxInference(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Model produced no logits")]
    EmptyOutput,
}

/// Paths and limits for the ONNX backend.
#[derive(Debug, Clone)]
pub struct OnnxClassifierConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub max_length: usize,
    pub intra_threads: usize,
}

impl OnnxClassifierConfig {
    pub fn from_model_config(model: &crate::config::ModelConfig) -> Self {
        let (model_path, tokenizer_path) = resolve_model_paths(&model.onnx_model_path);
        Self {
            model_path,
            tokenizer_path,
            max_length: model.max_length,
            intra_threads: model.intra_threads.max(1),
        }
    }
}

/// Resolve the default model directory.
pub fn default_model_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".local/share")
        });
    data_home.join("mood/models")
}

/// Resolve paths for the ONNX model and its tokenizer.
///
/// An empty `onnx_model_path` selects the default model directory. Otherwise
/// the tokenizer is expected next to the model as `<stem>-tokenizer.json`.
pub fn resolve_model_paths(onnx_model_path: &str) -> (PathBuf, PathBuf) {
    if onnx_model_path.is_empty() {
        let dir = default_model_dir();
        (
            dir.join(format!("{DEFAULT_MODEL_NAME}.onnx")),
            dir.join(format!("{DEFAULT_MODEL_NAME}-tokenizer.json")),
        )
    } else {
        let model = PathBuf::from(onnx_model_path);
        let stem = model
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let tokenizer = model.with_file_name(format!("{stem}-tokenizer.json"));
        (model, tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_contains_mood() {
        let dir = default_model_dir();
        assert!(
            dir.to_string_lossy().contains("mood/models"),
            "Expected mood/models in path, got: {}",
            dir.display()
        );
    }

    #[test]
    fn test_resolve_model_paths_default() {
        let (model, tokenizer) = resolve_model_paths("");
        assert!(model
            .to_string_lossy()
            .ends_with("twitter-roberta-base-sentiment.onnx"));
        assert!(tokenizer
            .to_string_lossy()
            .ends_with("twitter-roberta-base-sentiment-tokenizer.json"));
    }

    #[test]
    fn test_resolve_model_paths_custom() {
        let (model, tokenizer) = resolve_model_paths("/opt/models/roberta.onnx");
        assert_eq!(model, PathBuf::from("/opt/models/roberta.onnx"));
        assert_eq!(tokenizer, PathBuf::from("/opt/models/roberta-tokenizer.json"));
    }

    #[test]
    fn test_intra_threads_never_zero() {
        let model = crate::config::ModelConfig {
            onnx_model_path: "/opt/models/roberta.onnx".to_string(),
            max_length: 128,
            intra_threads: 0,
        };
        let config = OnnxClassifierConfig::from_model_config(&model);
        assert_eq!(config.intra_threads, 1);
        assert_eq!(config.max_length, 128);
    }
}
