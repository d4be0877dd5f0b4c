//! Error types for cursor-based pagination.

use super::TransportError;

/// Errors that abort a pagination run.
///
/// Any of these discards the records already fetched during the run; the
/// pager never hands back a partial result set.
#[derive(Debug, thiserror::Error)]
pub enum PageFetchError {
    /// A page request failed.
    #[error("Failed to fetch page {page} of {entity}")]
    Transport {
        /// The entity collection being paged
        entity: String,
        /// Zero-based index of the failing page
        page: usize,
        /// The underlying transport error
        #[source]
        source: TransportError,
    },

    /// A record lacks the `id` or sort value the cursor advances past.
    #[error("Record {index} on page {page} of {entity} has no `{key}` to page after")]
    MissingCursorKey {
        /// The entity collection being paged
        entity: String,
        /// Zero-based index of the page
        page: usize,
        /// Index of the record within the page
        index: usize,
        /// The missing key
        key: String,
    },
}

impl PageFetchError {
    /// Create a `Transport` error for a page of an entity.
    pub fn transport(entity: impl Into<String>, page: usize, source: TransportError) -> Self {
        PageFetchError::Transport {
            entity: entity.into(),
            page,
            source,
        }
    }
}
