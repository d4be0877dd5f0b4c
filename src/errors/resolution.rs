//! Error types for timestamp-to-block resolution.

use super::TransportError;

/// Errors that can occur while resolving a timestamp to a block number.
///
/// A block-pinned query that hits any of these fails as a whole; there is no
/// fallback to the latest block.
///
/// # Examples
///
/// ```rust,ignore
/// use sushidata::{ResolutionError, UnixTimestamp};
///
/// match client.blocks().resolve_block(UnixTimestamp(1_600_000_000)).await {
///     Ok(block) => println!("Block {block}"),
///     Err(ResolutionError::NoBlockAtOrBefore { timestamp }) => {
///         eprintln!("Nothing indexed at or before {timestamp}");
///     }
///     Err(e) => eprintln!("Resolution failed: {e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The timestamp is negative.
    #[error("Invalid timestamp {timestamp}: must be non-negative")]
    InvalidTimestamp {
        /// The rejected timestamp
        timestamp: i64,
    },

    /// The block index holds no block at or before the timestamp.
    #[error("No indexed block at or before timestamp {timestamp}")]
    NoBlockAtOrBefore {
        /// The timestamp that could not be resolved
        timestamp: i64,
    },

    /// The block index could not be queried.
    #[error("Failed to query block index for timestamp {timestamp}")]
    Transport {
        /// The timestamp being resolved
        timestamp: i64,
        /// The underlying transport error
        #[source]
        source: TransportError,
    },

    /// The block record returned by the index is unusable.
    #[error("Malformed block record for timestamp {timestamp}: {details}")]
    MalformedBlock {
        /// The timestamp being resolved
        timestamp: i64,
        /// What was wrong with the record
        details: String,
    },
}

impl ResolutionError {
    /// Create a `MalformedBlock` error with details.
    pub fn malformed_block(timestamp: i64, details: impl Into<String>) -> Self {
        ResolutionError::MalformedBlock {
            timestamp,
            details: details.into(),
        }
    }
}
