//! Error types for the intake client.
//!
//! The request path keeps its causes apart so they can be logged, but the
//! controller collapses all of them into the one static error panel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("analysis service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed analysis response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("analysis task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("field store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("field store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a submit event did not start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("a request is already in flight")]
    InFlight,

    #[error("required field is empty: {}", .0.label())]
    MissingField(crate::form::FieldId),
}
