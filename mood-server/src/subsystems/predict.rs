//! Predict subsystem: classify, map, persist.
//!
//! One successful call appends exactly one row. Any failure before the
//! insert leaves the store untouched; the insert itself is a single
//! statement.

use std::path::Path;

use mood_core::api::PredictResponse;
use mood_core::{db, NewSentiment, SentimentClassifier, SentimentLabel};

pub async fn predict_and_store(
    text: &str,
    classifier: &dyn SentimentClassifier,
    store: &Path,
) -> anyhow::Result<PredictResponse> {
    let classification = classifier.classify(text).await?;

    let score = f64::from(classification.score);
    if !(0.0..=1.0).contains(&score) {
        anyhow::bail!(
            "{} classifier returned out-of-range score {}",
            classifier.name(),
            score
        );
    }

    let label = SentimentLabel::from_model_label(&classification.raw_label);
    if label == SentimentLabel::Unknown {
        tracing::warn!(raw_label = %classification.raw_label, "Unmapped model label");
    }

    let row = NewSentiment::now(text, label, score);
    let id = db::insert_sentiment(store, &row).await?;
    tracing::info!(id, label = %label, score, "Stored sentiment");

    Ok(PredictResponse { label, score })
}
