//! Error types for the listing scraper.

use thiserror::Error;

/// Message shown to callers for failures whose details must stay internal.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Errors that can occur while validating input, fetching or parsing pages.
#[derive(Debug, Error)]
pub enum ScraperError {
    /// A caller-supplied parameter has the wrong shape or range.
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },

    /// A target URL failed the host/scheme gate.
    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    /// The listing site answered with a non-success status.
    #[error("HTTP error {status}")]
    HttpStatus { status: u16 },

    /// A single attempt exceeded the request timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Connection-level failure (DNS, TLS, reset, body read).
    #[error("Network error: {reason}")]
    Transport { reason: String },

    /// Every allowed attempt failed.
    #[error("Request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<ScraperError>,
    },

    /// A page schema could not be applied to a document.
    #[error("Failed to parse page: {reason}")]
    Parse { reason: String },

    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

pub type Result<T> = std::result::Result<T, ScraperError>;

impl ScraperError {
    pub fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_url(reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            reason: reason.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }

    /// Whether another attempt at the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpStatus { status } => (500..600).contains(status),
            Self::Timeout { .. } | Self::Transport { .. } => true,
            _ => false,
        }
    }

    /// Whether the failure happened on the wire rather than in our own checks.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::HttpStatus { .. }
                | Self::Timeout { .. }
                | Self::Transport { .. }
                | Self::RetriesExhausted { .. }
        )
    }

    /// Message safe to hand back to a remote caller.
    ///
    /// Parameter, URL, HTTP status and timeout errors are passed through.
    /// Everything else is reduced to a fixed text so internal details
    /// (hostnames, selector strings, library messages) never leak.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidParameter { .. }
            | Self::InvalidUrl { .. }
            | Self::HttpStatus { .. }
            | Self::Timeout { .. } => self.to_string(),
            Self::Transport { .. } => "Network error while contacting the listing site".to_string(),
            Self::RetriesExhausted { attempts, last } => format!(
                "Request failed after {} attempts: {}",
                attempts,
                last.public_message()
            ),
            Self::Parse { .. } | Self::Internal { .. } => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ScraperError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::HttpStatus {
                status: status.as_u16(),
            };
        }
        Self::Transport {
            reason: err.to_string(),
        }
    }
}
