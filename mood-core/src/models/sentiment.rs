use serde::{Deserialize, Serialize};
use std::fmt;

/// Format of the `timestamp` column, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output label exposed by the API and stored in `sentiment_label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Unknown,
}

impl SentimentLabel {
    /// Map a raw label of the three-class twitter-roberta model.
    ///
    /// The model contract is closed: anything outside `LABEL_0..=LABEL_2`
    /// becomes `Unknown` rather than an error.
    pub fn from_model_label(raw: &str) -> Self {
        match raw {
            "LABEL_0" => Self::Negative,
            "LABEL_1" => Self::Neutral,
            "LABEL_2" => Self::Positive,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `sentiments` table. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SentimentRecord {
    pub id: i64,
    pub text: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub timestamp: String,
}

/// Values for a row about to be inserted; the id is assigned by SQLite.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSentiment {
    pub text: String,
    pub label: SentimentLabel,
    pub score: f64,
    pub timestamp: String,
}

impl NewSentiment {
    /// Stamp a classification result with the current local time.
    pub fn now(text: impl Into<String>, label: SentimentLabel, score: f64) -> Self {
        Self {
            text: text.into(),
            label,
            score,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
