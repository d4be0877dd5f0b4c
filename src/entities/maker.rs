// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! SushiMaker queries: servings, servers and unserved liquidity.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sushidata::{ServingsOptions, SushiData, SushiDataConfig};
//!
//! let client = SushiData::new(SushiDataConfig::default())?;
//! let servings = client
//!     .maker()
//!     .servings(ServingsOptions::blocks(11_000_000, 11_100_000))
//!     .await?;
//!
//! for serving in &servings {
//!     println!("{} served {} SUSHI at {}", serving.server_address, serving.sushi_served, serving.date);
//! }
//! ```

use alloy_primitives::{Address, BlockNumber, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;

use super::numeric::{f64_from_any, u64_from_any};
use super::{Normalizer, PinOptions, ServingsOptions};
use crate::client::SushiData;
use crate::config::constants::{subgraph_id, MAKER_EXCHANGE_ACCOUNT};
use crate::config::Subgraph;
use crate::errors::{ConfigError, QueryError, TransformError};
use crate::query::{FilterOp, LiveQuery, OrderDirection, QueryDescriptor};
use crate::subscription::Observation;
use crate::tracing::spans;

/// Records requested by the pending-servings live query
const LIVE_FIRST: usize = 1000;

/// Maker totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakerInfo {
    pub address: Address,
    pub sushi_served: f64,
}

/// One conversion of collected fees into SUSHI for the bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serving {
    /// Account that triggered the serving
    pub server_address: Address,
    pub tx: TxHash,
    /// Liquidity pair that was converted
    pub pair: Address,
    pub token0: Address,
    pub token1: Address,
    pub sushi_served: f64,
    pub block: BlockNumber,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub date: DateTime<Utc>,
}

/// An account that has triggered servings, with its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub server_address: Address,
    pub sushi_served: f64,
    pub servings: Vec<ServerServing>,
}

/// A serving as listed under its server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerServing {
    pub tx: TxHash,
    pub block: BlockNumber,
    pub pair: Address,
    pub sushi_served: f64,
}

/// Token metadata as indexed by the exchange subgraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: Address,
    pub name: String,
    pub symbol: String,
}

/// A liquidity position the maker holds but has not yet served
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingServing {
    /// Pair address
    pub address: Address,
    pub token0: Token,
    pub token1: Token,
    /// Position value: share of the pair's supply times its USD reserve
    pub value_usd: f64,
}

#[derive(Debug, Deserialize)]
struct IdRef {
    id: Address,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMaker {
    id: Address,
    #[serde(deserialize_with = "f64_from_any")]
    sushi_served: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawServing {
    server: IdRef,
    tx: TxHash,
    pair: Address,
    token0: Address,
    token1: Address,
    #[serde(deserialize_with = "f64_from_any")]
    sushi_served: f64,
    #[serde(deserialize_with = "u64_from_any")]
    block: u64,
    #[serde(deserialize_with = "u64_from_any")]
    timestamp: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawServer {
    id: Address,
    #[serde(deserialize_with = "f64_from_any")]
    sushi_served: f64,
    #[serde(default)]
    servings: Vec<RawServerServing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServerServing {
    tx: TxHash,
    #[serde(deserialize_with = "u64_from_any")]
    block: u64,
    pair: Address,
    #[serde(deserialize_with = "f64_from_any")]
    sushi_served: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawExchangeUser {
    #[serde(default)]
    liquidity_positions: Vec<RawLiquidityPosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLiquidityPosition {
    #[serde(deserialize_with = "f64_from_any")]
    liquidity_token_balance: f64,
    pair: RawPair,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPair {
    id: Address,
    #[serde(deserialize_with = "f64_from_any")]
    total_supply: f64,
    #[serde(rename = "reserveUSD", deserialize_with = "f64_from_any")]
    reserve_usd: f64,
    token0: Token,
    token1: Token,
}

/// `makers` on the maker subgraph
pub(crate) struct MakerInfoQuery;

impl Normalizer for MakerInfoQuery {
    const ENTITY: &'static str = "makers";
    const PROPERTIES: &'static [&'static str] = &["id", "sushiServed"];
    type Raw = RawMaker;
    type Output = Option<MakerInfo>;

    fn shape(raw: Vec<RawMaker>) -> Result<Self::Output, TransformError> {
        Ok(raw.into_iter().next().map(|maker| MakerInfo {
            address: maker.id,
            sushi_served: maker.sushi_served,
        }))
    }
}

/// `servings` on the maker subgraph
pub(crate) struct ServingsQuery;

impl Normalizer for ServingsQuery {
    const ENTITY: &'static str = "servings";
    const PROPERTIES: &'static [&'static str] = &[
        "server { id }",
        "tx",
        "pair",
        "token0",
        "token1",
        "sushiServed",
        "block",
        "timestamp",
    ];
    type Raw = RawServing;
    type Output = Vec<Serving>;

    fn shape(raw: Vec<RawServing>) -> Result<Vec<Serving>, TransformError> {
        raw.into_iter()
            .map(|serving| {
                let seconds = i64::try_from(serving.timestamp)
                    .map_err(|e| TransformError::invalid_value("timestamp", e.to_string()))?;
                let date = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                    TransformError::invalid_value("timestamp", format!("{seconds} is out of range"))
                })?;
                Ok(Serving {
                    server_address: serving.server.id,
                    tx: serving.tx,
                    pair: serving.pair,
                    token0: serving.token0,
                    token1: serving.token1,
                    sushi_served: serving.sushi_served,
                    block: serving.block,
                    timestamp: date.timestamp_millis(),
                    date,
                })
            })
            .collect()
    }
}

/// `servers` on the maker subgraph
pub(crate) struct ServersQuery;

impl Normalizer for ServersQuery {
    const ENTITY: &'static str = "servers";
    const PROPERTIES: &'static [&'static str] = &[
        "id",
        "sushiServed",
        "servings { tx, block, pair, sushiServed }",
    ];
    type Raw = RawServer;
    type Output = Vec<Server>;

    fn shape(raw: Vec<RawServer>) -> Result<Vec<Server>, TransformError> {
        Ok(raw
            .into_iter()
            .map(|server| Server {
                server_address: server.id,
                sushi_served: server.sushi_served,
                servings: server
                    .servings
                    .into_iter()
                    .map(|s| ServerServing {
                        tx: s.tx,
                        block: s.block,
                        pair: s.pair,
                        sushi_served: s.sushi_served,
                    })
                    .collect(),
            })
            .collect())
    }
}

/// The maker's `users` record on the exchange subgraph
pub(crate) struct PendingServingsQuery;

impl Normalizer for PendingServingsQuery {
    const ENTITY: &'static str = "users";
    const PROPERTIES: &'static [&'static str] = &[
        "liquidityPositions { id, liquidityTokenBalance, pair { id, totalSupply, reserveUSD, token0 { id, name, symbol }, token1 { id, symbol, name } } }",
    ];
    type Raw = RawExchangeUser;
    type Output = Vec<PendingServing>;

    fn shape(raw: Vec<RawExchangeUser>) -> Result<Vec<PendingServing>, TransformError> {
        let user = raw
            .into_iter()
            .next()
            .ok_or_else(|| TransformError::missing_record(Self::ENTITY))?;

        let mut pending: Vec<PendingServing> = user
            .liquidity_positions
            .into_iter()
            .map(|position| {
                let pair = position.pair;
                let value_usd = if pair.total_supply > 0.0 {
                    position.liquidity_token_balance / pair.total_supply * pair.reserve_usd
                } else {
                    0.0
                };
                PendingServing {
                    address: pair.id,
                    token0: pair.token0,
                    token1: pair.token1,
                    value_usd,
                }
            })
            .collect();
        pending.sort_by(|a, b| b.value_usd.total_cmp(&a.value_usd));
        Ok(pending)
    }
}

/// Shape one live payload (`{ "users": [...] }`)
fn pending_from_payload(mut payload: Value) -> Result<Vec<PendingServing>, TransformError> {
    match payload
        .get_mut(PendingServingsQuery::ENTITY)
        .map(Value::take)
    {
        Some(Value::Array(users)) => PendingServingsQuery::normalize(users),
        _ => Err(TransformError::missing_field(PendingServingsQuery::ENTITY)),
    }
}

fn pending_servings_descriptor(block: Option<BlockNumber>) -> QueryDescriptor {
    QueryDescriptor::builder(PendingServingsQuery::ENTITY)
        .filter("id", FilterOp::Eq, subgraph_id(MAKER_EXCHANGE_ACCOUNT))
        .block(block)
        .properties(PendingServingsQuery::PROPERTIES.iter().copied())
        .build()
}

/// Queries against the SushiMaker
///
/// Obtained from [`SushiData::maker`].
#[derive(Clone, Copy)]
pub struct Maker<'a> {
    client: &'a SushiData,
}

impl<'a> Maker<'a> {
    pub(crate) fn new(client: &'a SushiData) -> Self {
        Self { client }
    }

    /// Maker totals, as of the pinned block
    ///
    /// `Ok(None)` when the subgraph holds no maker record at that block.
    pub async fn info(&self, pin: PinOptions) -> Result<Option<MakerInfo>, QueryError> {
        let span = spans::entity_query(Subgraph::Maker, "info");
        async move {
            let block = self.client.pin_block(pin).await?;
            let descriptor = QueryDescriptor::builder(MakerInfoQuery::ENTITY)
                .block(block)
                .properties(MakerInfoQuery::PROPERTIES.iter().copied())
                .build();
            self.client
                .fetch_first::<MakerInfoQuery>(Subgraph::Maker, &descriptor, 1)
                .await
        }
        .instrument(span)
        .await
    }

    /// Servings within the given bounds, most recent block first
    pub async fn servings(&self, options: ServingsOptions) -> Result<Vec<Serving>, QueryError> {
        let span = spans::entity_query(Subgraph::Maker, "servings");
        async move {
            let descriptor = QueryDescriptor::builder(ServingsQuery::ENTITY)
                .order_by("block", OrderDirection::Desc)
                .filter_opt("block", FilterOp::Gte, options.min_block)
                .filter_opt("block", FilterOp::Lte, options.max_block)
                .filter_opt("timestamp", FilterOp::Gte, options.min_timestamp.map(|t| t.0))
                .filter_opt("timestamp", FilterOp::Lte, options.max_timestamp.map(|t| t.0))
                .properties(ServingsQuery::PROPERTIES.iter().copied())
                .build();
            self.client
                .collect::<ServingsQuery>(Subgraph::Maker, &descriptor)
                .await
        }
        .instrument(span)
        .await
    }

    /// Every server with its servings, largest total first
    pub async fn servers(&self, pin: PinOptions) -> Result<Vec<Server>, QueryError> {
        let span = spans::entity_query(Subgraph::Maker, "servers");
        async move {
            let block = self.client.pin_block(pin).await?;
            let descriptor = QueryDescriptor::builder(ServersQuery::ENTITY)
                .order_by("sushiServed", OrderDirection::Desc)
                .block(block)
                .properties(ServersQuery::PROPERTIES.iter().copied())
                .build();
            self.client
                .collect::<ServersQuery>(Subgraph::Maker, &descriptor)
                .await
        }
        .instrument(span)
        .await
    }

    /// Liquidity the maker holds but has not yet served, most valuable first
    ///
    /// # Errors
    ///
    /// Besides fetch failures, [`TransformError::MissingRecord`] when the
    /// exchange subgraph holds no record for the maker's account.
    pub async fn pending_servings(
        &self,
        pin: PinOptions,
    ) -> Result<Vec<PendingServing>, QueryError> {
        let span = spans::entity_query(Subgraph::Exchange, "pending_servings");
        async move {
            let block = self.client.pin_block(pin).await?;
            let descriptor = pending_servings_descriptor(block);
            self.client
                .collect::<PendingServingsQuery>(Subgraph::Exchange, &descriptor)
                .await
        }
        .instrument(span)
        .await
    }

    /// Follow pending servings live
    ///
    /// Each update carries the full, re-sorted list.
    pub fn observe_pending_servings(
        &self,
    ) -> Result<Observation<Vec<PendingServing>>, ConfigError> {
        let endpoint = self.client.config().ws_endpoint(Subgraph::Exchange)?;
        let query = LiveQuery::new(&pending_servings_descriptor(None), LIVE_FIRST);
        Ok(self
            .client
            .bridge()
            .observe(endpoint, query, pending_from_payload))
    }
}
