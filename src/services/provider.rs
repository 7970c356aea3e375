use crate::domain::message::FcmMessage;
use crate::domain::report::MulticastReport;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Token is no longer registered")]
    Unregistered,
    #[error("Rate limit exceeded")]
    QuotaExceeded,
    #[error("External service error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Client for the messaging provider. Authentication, transport setup, and
/// retry belong to the implementation, not to the channel.
#[async_trait]
pub trait Messaging: Send + Sync + std::fmt::Debug {
    /// Sends a message to the single device token attached to it.
    ///
    /// Returns whether the provider accepted the delivery.
    ///
    /// # Errors
    /// Returns `PushError::Unregistered` if the token is invalid and the
    /// corresponding device registration should be deleted.
    async fn send(&self, message: &FcmMessage) -> Result<bool, PushError>;

    /// Sends a message to every token in `tokens` with one request.
    ///
    /// Per-token rejections are reported through the unknown-token list of
    /// the report, not as errors.
    ///
    /// # Errors
    /// Returns a transport-level error when the request itself fails.
    async fn send_multicast(&self, message: &FcmMessage, tokens: &[String]) -> Result<MulticastReport, PushError>;
}
