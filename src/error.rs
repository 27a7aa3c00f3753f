//! Unified SDK error types.

use crate::shared::Instrument;
use thiserror::Error;

/// Top-level SDK error, returned by constructors and builders.
///
/// Runtime failures stay in their layer: retrieval returns [`FetchError`] and the
/// session records [`SessionError`] diagnostics in its state.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Retrieval-layer errors. Returned as values; the client never panics across its boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network failure, refused connection, or timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API Error: {status} {body}")]
    ApiStatus { status: u16, body: String },

    /// Body was not the expected JSON shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if e.is_timeout() {
            FetchError::Transport(format!("request timed out: {}", e))
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Synthetic series generation errors. Never expected in normal operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FallbackError {
    #[error("cannot generate a series of {days} days")]
    InvalidLength { days: u32 },

    #[error("generation failed: {0}")]
    Generation(String),
}

/// Lifecycle controller errors.
///
/// `Fetch`, `EmptyResult` and `FallbackFailure` are diagnostics: the session formats
/// them into `SessionState::error` rather than returning them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// `reason` is the provider's message, when it sent one.
    #[error("no data returned for {instrument}{}", reason_suffix(.reason))]
    EmptyResult {
        instrument: Instrument,
        reason: Option<String>,
    },

    #[error("Both API and sample data failed: {api}; {fallback}")]
    FallbackFailure { api: String, fallback: String },

    #[error("no query has been fetched yet")]
    NoQuery,
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(": {}", r)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_message() {
        let bare = SessionError::EmptyResult { instrument: "SPY".into(), reason: None };
        assert_eq!(bare.to_string(), "no data returned for SPY");

        let noted = SessionError::EmptyResult {
            instrument: "SPY".into(),
            reason: Some("symbol delisted".into()),
        };
        assert_eq!(noted.to_string(), "no data returned for SPY: symbol delisted");
    }

    #[test]
    fn test_config_error_message() {
        let err = SdkError::Config("fallback_days must be positive".into());
        assert_eq!(err.to_string(), "Configuration error: fallback_days must be positive");
    }
}
