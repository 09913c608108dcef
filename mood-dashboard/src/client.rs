use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Body of a successful `POST /predict/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// A persisted row as returned by `GET /history/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSentiment {
    pub id: i64,
    pub text: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct StoredHistory {
    pub sentiments: Vec<StoredSentiment>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("server returned {0}")]
    Status(StatusCode),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Thin client over the Mood Analyzer HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `timeout` of `None` waits for the server indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Decode a 200 body; a bad body is `Decode`, never `Request`.
    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn predict(&self, text: &str) -> Result<Prediction, ClientError> {
        let url = format!("{}/predict/", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(ClientError::Status(resp.status()));
        }
        Self::decode(resp).await
    }

    pub async fn history(&self) -> Result<StoredHistory, ClientError> {
        let url = format!("{}/history/", self.base_url);
        let resp = self.http.get(&url).send().await?;

        if resp.status() != StatusCode::OK {
            return Err(ClientError::Status(resp.status()));
        }
        Self::decode(resp).await
    }

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/health", self.base_url);
        let resp = self.http.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(ClientError::Status(resp.status()));
        }
        Self::decode(resp).await
    }
}
