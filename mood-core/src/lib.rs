pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod onnx_classifier;

pub use classifier::{Classification, ClassifierError, OnnxClassifierConfig, SentimentClassifier};
pub use config::MoodConfig;
pub use error::MoodError;
pub use models::{NewSentiment, SentimentLabel, SentimentRecord};
pub use onnx_classifier::OnnxSentimentClassifier;
