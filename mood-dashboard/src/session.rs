//! Dashboard session state.
//!
//! A `DashboardSession` owns the history of one dashboard run. It starts
//! empty, is never persisted, and is dropped with the session; the server's
//! stored history is never read back into it.

use chrono::{Local, NaiveDateTime, SubsecRound};
use reqwest::StatusCode;

use crate::client::{ApiClient, ClientError};
use crate::render::{self, RenderOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionHistoryEntry {
    pub text: String,
    pub label: String,
    pub score: f64,
    /// Captured by the client when the response arrived, second precision.
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<SessionHistoryEntry>,
}

impl SessionHistory {
    pub fn entries(&self) -> &[SessionHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: SessionHistoryEntry) {
        self.entries.push(entry);
    }
}

/// Result of one "Analyze" action.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    /// Nothing was sent.
    EmptyInput,
    Analyzed(SessionHistoryEntry),
    BackendError(StatusCode),
    /// 200 with a body that is not `{label, score}`.
    MalformedResponse(String),
    ConnectionError(String),
}

impl AnalyzeOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::EmptyInput => "Please enter some text!".to_string(),
            Self::Analyzed(entry) => format!(
                "Sentiment: {}\nConfidence Score: {:.4}",
                entry.label, entry.score
            ),
            Self::BackendError(status) => format!("Backend Error: {}", status.as_u16()),
            Self::MalformedResponse(e) => format!("Backend Error: malformed response ({e})"),
            Self::ConnectionError(e) => format!("Connection Error: {e}"),
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Analyzed(_))
    }
}

pub struct DashboardSession {
    client: ApiClient,
    history: SessionHistory,
}

impl DashboardSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            history: SessionHistory::default(),
        }
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Send `text` to the service and record the result.
    ///
    /// Empty text is refused locally. Failures never touch the history.
    pub async fn analyze(&mut self, text: &str) -> AnalyzeOutcome {
        if text.is_empty() {
            return AnalyzeOutcome::EmptyInput;
        }

        match self.client.predict(text).await {
            Ok(prediction) => {
                let entry = SessionHistoryEntry {
                    text: text.to_string(),
                    label: prediction.label,
                    score: prediction.score,
                    timestamp: Local::now().naive_local().trunc_subsecs(0),
                };
                self.history.push(entry.clone());
                AnalyzeOutcome::Analyzed(entry)
            }
            Err(ClientError::Status(status)) => AnalyzeOutcome::BackendError(status),
            Err(ClientError::Decode(e)) => AnalyzeOutcome::MalformedResponse(e.to_string()),
            Err(ClientError::Request(e)) => AnalyzeOutcome::ConnectionError(e.to_string()),
        }
    }

    pub fn render(&self, opts: RenderOptions) -> String {
        render::render_dashboard(&self.history, opts)
    }
}
