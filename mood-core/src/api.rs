//! Wire types of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::models::{SentimentLabel, SentimentRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub label: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub sentiments: Vec<SentimentRecord>,
}
