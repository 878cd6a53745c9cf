//! Error taxonomy for platform calls.

use thiserror::Error;

/// Errors returned by platform API calls.
///
/// `NotFound` is the only variant the reconciler treats as normal
/// control flow (it routes the existence check to the create path);
/// everything else is fatal to the current application.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("API error {code}: {message}")]
    Status { code: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    /// An async operation reached a non-success terminal condition.
    /// The message is the platform's own failure description.
    #[error("operation failed: {message}")]
    OperationFailed { message: String },

    #[error("malformed platform response: {0}")]
    MalformedResponse(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlatformError::NotFound { .. })
    }
}
