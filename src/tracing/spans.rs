//! Span creation helpers for sushidata operations.
//!
//! This module follows an orthogonal design pattern where telemetry concerns
//! are separated from business logic. Instead of using `#[instrument]`
//! attributes directly on functions, each instrumented operation has a
//! corresponding span helper function in this module.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use alloy_primitives::BlockNumber;
use tracing::{Level, Span};

use crate::config::Subgraph;

/// Create span for resolving a timestamp to a block number.
///
/// Parent: entity operation span (when pinning by timestamp)
/// Children: the block-index request
#[inline]
pub(crate) fn resolve_block(timestamp: i64) -> Span {
    tracing::debug_span!("sushidata.resolve_block", timestamp = timestamp)
}

/// Create span for one pagination run over an entity collection.
///
/// Parent: entity operation span
/// Children: fetch_page spans (one per page)
#[inline]
pub(crate) fn paginate(entity: &str, block: Option<BlockNumber>) -> Span {
    tracing::debug_span!(
        "sushidata.paginate",
        entity = entity,
        block = ?block,
    )
}

/// Create span for a single page request.
///
/// Parent: paginate span
#[inline]
pub(crate) fn fetch_page(entity: &str, page: usize, first: usize) -> Span {
    tracing::trace_span!(
        "sushidata.fetch_page",
        entity = entity,
        page = page,
        first = first,
    )
}

/// Create span for an entity operation such as `servings` or `users`.
///
/// This is the main public API entry point for entity queries.
///
/// Parent: None (root span for this operation)
/// Children: resolve_block, paginate spans
#[inline]
pub(crate) fn entity_query(subgraph: Subgraph, operation: &'static str) -> Span {
    tracing::span!(
        Level::INFO,
        "sushidata.entity_query",
        subgraph = %subgraph,
        operation = operation,
    )
}

/// Create span for the task pumping a live channel to its listeners.
///
/// Parent: None (lives as long as the channel)
#[inline]
pub(crate) fn live_pump(entity: &str) -> Span {
    tracing::info_span!("sushidata.live_pump", entity = entity)
}

/// Create span for one WebSocket live-query connection.
///
/// Parent: None (spawned task)
#[inline]
pub(crate) fn live_connection(endpoint: &str) -> Span {
    tracing::debug_span!("sushidata.live_connection", endpoint = endpoint)
}

/// Create span for a timeseries fan-out.
///
/// Parent: None (root span for this operation)
/// Children: one entity_query span per point
#[inline]
pub(crate) fn timeseries(points: usize) -> Span {
    tracing::info_span!("sushidata.timeseries", points = points)
}
