//! Error type returned by entity query operations.

use super::{ConfigError, PageFetchError, ResolutionError, TransformError};

/// Errors returned by entity operations such as `servings` or `users`.
///
/// An empty result set is `Ok(vec![])`, never an error, so callers can tell
/// "nothing matched" apart from "the query failed".
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The requested timestamp could not be pinned to a block.
    #[error("Block resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// A page request failed.
    #[error("Pagination failed: {0}")]
    Page(#[from] PageFetchError),

    /// The fetched records could not be normalized.
    #[error("Normalization failed: {0}")]
    Transform(#[from] TransformError),

    /// The operation targets a subgraph with unusable configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
