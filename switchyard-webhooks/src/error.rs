//! Error types for webhook operations

use thiserror::Error;

/// Errors that can occur while receiving and dispatching webhooks
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Signature verification failed
    #[error("Signature verification failed: {0}")]
    SignatureInvalid(String),

    /// Signature missing from request
    #[error("Signature missing from request")]
    SignatureMissing,

    /// Timestamp validation failed
    #[error("Timestamp validation failed: {0}")]
    TimestampInvalid(String),

    /// Payload exceeds the configured limit
    #[error("Payload of {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// Payload deserialization failed
    #[error("Payload error: {0}")]
    PayloadError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Dispatching the verified event failed
    #[error(transparent)]
    Dispatch(#[from] switchyard_events::Error),
}

impl WebhookError {
    /// Check whether the request itself was rejected before dispatch
    pub fn is_verification_error(&self) -> bool {
        matches!(
            self,
            Self::SignatureInvalid(_)
                | Self::SignatureMissing
                | Self::TimestampInvalid(_)
                | Self::PayloadTooLarge { .. }
                | Self::PayloadError(_)
        )
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::PayloadError(err.to_string())
    }
}
