// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Client entry point tying configuration, transports and entity modules together.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sushidata::{PinOptions, SushiData, SushiDataConfig, UnixTimestamp};
//!
//! let client = SushiData::new(SushiDataConfig::default())?;
//!
//! // Maker totals as of 2020-09-13
//! let info = client
//!     .maker()
//!     .info(PinOptions::at_timestamp(UnixTimestamp(1_600_000_000)))
//!     .await?;
//! ```

use std::sync::Arc;

use alloy_primitives::BlockNumber;
use tracing::{debug, warn};

use crate::blocks::BlockResolver;
use crate::config::{Subgraph, SushiDataConfig};
use crate::entities::lockup::Lockup;
use crate::entities::maker::Maker;
use crate::entities::{Normalizer, PinOptions};
use crate::errors::{ConfigError, QueryError, SushiDataError};
use crate::pager::Pager;
use crate::query::QueryDescriptor;
use crate::subscription::SubscriptionBridge;
use crate::transport::{HttpTransport, LiveTransport, QueryTransport, WsTransport};

/// Access to the SushiSwap subgraphs
///
/// Cheap to clone; clones share transports and configuration.
#[derive(Clone)]
pub struct SushiData {
    config: Arc<SushiDataConfig>,
    query: Arc<dyn QueryTransport>,
    live: Arc<dyn LiveTransport>,
}

impl SushiData {
    /// Create a client over HTTP and WebSocket transports
    pub fn new(config: SushiDataConfig) -> Result<Self, SushiDataError> {
        let query = HttpTransport::new(config.request_timeout)?;
        let live = WsTransport::new(config.reconnect.clone());
        Ok(Self::with_transports(config, query, live))
    }

    /// Create a client over custom transports
    pub fn with_transports(
        config: SushiDataConfig,
        query: impl QueryTransport + 'static,
        live: impl LiveTransport + 'static,
    ) -> Self {
        Self::with_shared_transports(config, Arc::new(query), Arc::new(live))
    }

    /// Create a client over transports shared with other owners
    pub fn with_shared_transports(
        config: SushiDataConfig,
        query: Arc<dyn QueryTransport>,
        live: Arc<dyn LiveTransport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            query,
            live,
        }
    }

    pub fn config(&self) -> &SushiDataConfig {
        &self.config
    }

    /// Resolver backed by the block index subgraph
    pub fn blocks(&self) -> Result<BlockResolver, ConfigError> {
        Ok(BlockResolver::new(
            self.query.clone(),
            self.config.http_endpoint(Subgraph::Blocklytics)?,
        ))
    }

    /// Pager over one subgraph, using the configured page size and cap
    pub fn pager(&self, subgraph: Subgraph) -> Result<Pager, ConfigError> {
        Ok(Pager::new(
            self.query.clone(),
            self.config.http_endpoint(subgraph)?,
            self.config.page_size,
            self.config.max_records,
        ))
    }

    /// Bridge for live queries
    pub fn bridge(&self) -> SubscriptionBridge {
        SubscriptionBridge::new(self.live.clone())
    }

    pub fn maker(&self) -> Maker<'_> {
        Maker::new(self)
    }

    pub fn lockup(&self) -> Lockup<'_> {
        Lockup::new(self)
    }

    /// Turn a pin into a block number, resolving the timestamp if needed
    ///
    /// An explicit block wins over a timestamp.
    pub(crate) async fn pin_block(
        &self,
        pin: PinOptions,
    ) -> Result<Option<BlockNumber>, QueryError> {
        match (pin.block, pin.timestamp) {
            (Some(block), _) => Ok(Some(block)),
            (None, Some(timestamp)) => {
                let block = self
                    .blocks()?
                    .resolve_block(timestamp)
                    .await
                    .inspect_err(|e| warn!(error = %e, "Failed to pin query to timestamp"))?;
                Ok(Some(block))
            }
            (None, None) => Ok(None),
        }
    }

    /// Page through `descriptor` and normalize the records
    pub(crate) async fn collect<N: Normalizer>(
        &self,
        subgraph: Subgraph,
        descriptor: &QueryDescriptor,
    ) -> Result<N::Output, QueryError> {
        let records = self
            .pager(subgraph)?
            .paginate(descriptor)
            .await
            .inspect_err(|e| warn!(error = %e, entity = N::ENTITY, "Entity query failed"))?;
        debug!(entity = N::ENTITY, records = records.len(), "Normalizing records");
        N::normalize(records)
            .inspect_err(|e| warn!(error = %e, entity = N::ENTITY, "Failed to normalize records"))
            .map_err(QueryError::from)
    }

    /// Fetch the first `first` records of `descriptor` and normalize them
    pub(crate) async fn fetch_first<N: Normalizer>(
        &self,
        subgraph: Subgraph,
        descriptor: &QueryDescriptor,
        first: usize,
    ) -> Result<N::Output, QueryError> {
        let records = self
            .pager(subgraph)?
            .fetch_first(descriptor, first)
            .await
            .inspect_err(|e| warn!(error = %e, entity = N::ENTITY, "Entity query failed"))?;
        N::normalize(records)
            .inspect_err(|e| warn!(error = %e, entity = N::ENTITY, "Failed to normalize records"))
            .map_err(QueryError::from)
    }
}

impl std::fmt::Debug for SushiData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SushiData")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
