// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # sushidata
//!
//! Typed, read-only access to the SushiSwap subgraphs.
//!
//! ## Overview
//!
//! - **Block resolution**: map a Unix timestamp to the latest block at or before it
//! - **Pagination**: cursor-based paging over entity collections, all-or-nothing
//! - **Live queries**: one shared WebSocket channel fanned out to any number of listeners
//! - **Entity queries**: maker servings, servers and pending servings; lockup users
//! - **Timeseries**: run an entity query at a series of blocks or timestamps
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sushidata::{PinOptions, ServingsOptions, SushiData, SushiDataConfig, UnixTimestamp};
//!
//! let client = SushiData::new(SushiDataConfig::default())?;
//!
//! let servings = client
//!     .maker()
//!     .servings(ServingsOptions::blocks(11_000_000, 11_100_000))
//!     .await?;
//!
//! let info = client
//!     .maker()
//!     .info(PinOptions::at_timestamp(UnixTimestamp(1_600_000_000)))
//!     .await?;
//! ```
//!
//! ## Errors
//!
//! Entity operations return [`QueryError`]; an empty result is `Ok(vec![])`,
//! so "nothing matched" and "the query failed" are always distinguishable.
//! See [`errors`] for the full hierarchy.
//!
//! ## Logging
//!
//! All operations emit [`tracing`](https://docs.rs/tracing) spans and events
//! under the `sushidata.` prefix. Install any subscriber to see them.

pub mod blocks;
mod client;
pub mod config;
pub mod entities;
pub mod errors;
pub mod pager;
pub mod query;
pub mod subscription;
#[cfg(test)]
mod testing;
pub mod timeseries;
mod tracing;
pub mod transport;

pub use blocks::{BlockResolver, UnixTimestamp};
pub use client::SushiData;
pub use config::constants;
pub use config::{PageSize, ReconnectConfig, Subgraph, SushiDataConfig, SushiDataConfigBuilder};
pub use entities::lockup::{Lockup, LockupPool, LockupUser};
pub use entities::maker::{
    Maker, MakerInfo, PendingServing, Server, ServerServing, Serving, Token,
};
pub use entities::{Normalizer, PinOptions, ServingsOptions, UsersOptions};
pub use errors::{
    ConfigError, PageFetchError, QueryError, ResolutionError, SubscriptionError, SushiDataError,
    TransformError, TransportError,
};
pub use pager::Pager;
pub use subscription::{Observation, Observer, Subscription, SubscriptionBridge, SubscriptionHandle};
pub use timeseries::{timeseries, TimeseriesPoints};
pub use transport::{EventStream, HttpTransport, LiveTransport, QueryTransport, WsTransport};
