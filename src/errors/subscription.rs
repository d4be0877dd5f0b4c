//! Error types delivered to live subscription listeners.

use std::sync::Arc;

use super::{TransformError, TransportError};

/// Errors delivered to subscription listeners.
///
/// One failure fans out to every listener of an observation, so the
/// underlying error is shared behind an `Arc` and this type is `Clone`.
/// Neither variant ends delivery on its own: a transform failure affects only
/// the event that raised it, and the stream ends only when the channel does.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubscriptionError {
    /// The live channel failed to open, reported an error, or closed for good.
    #[error("Live channel failed: {0}")]
    Channel(#[source] Arc<TransportError>),

    /// A live event could not be shaped into the observed type.
    #[error("Failed to transform live event: {0}")]
    Transform(#[source] Arc<TransformError>),
}

impl From<TransportError> for SubscriptionError {
    fn from(error: TransportError) -> Self {
        SubscriptionError::Channel(Arc::new(error))
    }
}

impl From<TransformError> for SubscriptionError {
    fn from(error: TransformError) -> Self {
        SubscriptionError::Transform(Arc::new(error))
    }
}
