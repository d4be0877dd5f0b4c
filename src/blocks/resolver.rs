// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Timestamp to block resolution against the block index subgraph
//!
//! The block index records one entity per chain block with its number and
//! timestamp. Resolving a timestamp `T` asks for the single most recent block
//! with `timestamp <= T`:
//!
//! ```graphql
//! { blocks(first: 1, orderBy: timestamp, orderDirection: desc,
//!          where: { timestamp_lte: T }) { id number timestamp } }
//! ```
//!
//! The result is therefore the latest block produced at or before `T`, never
//! one produced after it.

use std::sync::Arc;

use alloy_primitives::BlockNumber;
use serde::Deserialize;
use tracing::{debug, Instrument};
use url::Url;

use super::UnixTimestamp;
use crate::entities::numeric::u64_from_any;
use crate::errors::ResolutionError;
use crate::query::{FilterOp, OrderDirection, PageRequest, QueryDescriptor};
use crate::tracing::spans;
use crate::transport::QueryTransport;

const BLOCK_ENTITY: &str = "blocks";

#[derive(Debug, Deserialize)]
struct BlockRecord {
    #[serde(deserialize_with = "u64_from_any")]
    number: u64,
}

/// Resolves Unix timestamps to block numbers
///
/// Stateless: every call issues one request to the block index.
#[derive(Clone)]
pub struct BlockResolver {
    transport: Arc<dyn QueryTransport>,
    endpoint: Url,
}

impl BlockResolver {
    /// Create a resolver querying the block index at `endpoint`
    pub fn new(transport: Arc<dyn QueryTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Query selecting the latest block at or before `timestamp`
    fn descriptor(timestamp: i64) -> QueryDescriptor {
        QueryDescriptor::builder(BLOCK_ENTITY)
            .order_by("timestamp", OrderDirection::Desc)
            .filter("timestamp", FilterOp::Lte, timestamp)
            .properties(["id", "number", "timestamp"])
            .build()
    }

    /// Resolve `timestamp` to the number of the latest block at or before it
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::InvalidTimestamp`] for negative timestamps
    /// - [`ResolutionError::NoBlockAtOrBefore`] when the index has no such block
    /// - [`ResolutionError::Transport`] when the index cannot be queried
    /// - [`ResolutionError::MalformedBlock`] when the returned record has no usable number
    pub async fn resolve_block(
        &self,
        timestamp: UnixTimestamp,
    ) -> Result<BlockNumber, ResolutionError> {
        let timestamp = timestamp.0;
        if timestamp < 0 {
            return Err(ResolutionError::InvalidTimestamp { timestamp });
        }

        let span = spans::resolve_block(timestamp);
        async move {
            let descriptor = Self::descriptor(timestamp);
            let request = PageRequest::head(&descriptor, 1);
            let mut records = self
                .transport
                .fetch(&self.endpoint, &request)
                .await
                .map_err(|source| ResolutionError::Transport { timestamp, source })?;

            if records.is_empty() {
                return Err(ResolutionError::NoBlockAtOrBefore { timestamp });
            }

            let block: BlockRecord = serde_json::from_value(records.swap_remove(0))
                .map_err(|e| ResolutionError::malformed_block(timestamp, e.to_string()))?;

            debug!(timestamp, block = block.number, "Resolved timestamp to block");
            Ok(block.number)
        }
        .instrument(span)
        .await
    }
}
