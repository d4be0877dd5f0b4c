// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Lockup queries: per-user SUSHI locked in MasterChef pools.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use super::numeric::f64_from_any;
use super::{Normalizer, UsersOptions};
use crate::client::SushiData;
use crate::config::constants::subgraph_id;
use crate::config::Subgraph;
use crate::errors::{QueryError, TransformError};
use crate::query::{FilterOp, QueryDescriptor};
use crate::tracing::spans;

/// A user's position in one lockup pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockupUser {
    /// Subgraph id of the position (pool and user)
    pub id: String,
    pub address: Address,
    pub amount: f64,
    pub reward_debt: f64,
    pub pool: LockupPool,
    pub sushi_at_lockup: f64,
    pub sushi_harvested_since_lockup: f64,
    pub sushi_locked: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockupPool {
    pub id: String,
    pub balance: f64,
    pub acc_sushi_per_share: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawUser {
    id: String,
    address: Address,
    #[serde(deserialize_with = "f64_from_any")]
    amount: f64,
    #[serde(deserialize_with = "f64_from_any")]
    reward_debt: f64,
    pool: RawPool,
    #[serde(deserialize_with = "f64_from_any")]
    sushi_at_lockup: f64,
    #[serde(deserialize_with = "f64_from_any")]
    sushi_harvested_since_lockup: f64,
    #[serde(deserialize_with = "f64_from_any")]
    sushi_locked: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPool {
    id: String,
    #[serde(deserialize_with = "f64_from_any")]
    balance: f64,
    #[serde(deserialize_with = "f64_from_any")]
    acc_sushi_per_share: f64,
}

/// `users` on the lockup subgraph
pub(crate) struct UsersQuery;

impl Normalizer for UsersQuery {
    const ENTITY: &'static str = "users";
    const PROPERTIES: &'static [&'static str] = &[
        "id",
        "address",
        "amount",
        "rewardDebt",
        "pool { id, balance, accSushiPerShare }",
        "sushiAtLockup",
        "sushiHarvestedSinceLockup",
        "sushiLocked",
    ];
    type Raw = RawUser;
    type Output = Vec<LockupUser>;

    fn shape(raw: Vec<RawUser>) -> Result<Vec<LockupUser>, TransformError> {
        Ok(raw
            .into_iter()
            .map(|user| LockupUser {
                id: user.id,
                address: user.address,
                amount: user.amount,
                reward_debt: user.reward_debt,
                pool: LockupPool {
                    id: user.pool.id,
                    balance: user.pool.balance,
                    acc_sushi_per_share: user.pool.acc_sushi_per_share,
                },
                sushi_at_lockup: user.sushi_at_lockup,
                sushi_harvested_since_lockup: user.sushi_harvested_since_lockup,
                sushi_locked: user.sushi_locked,
            })
            .collect())
    }
}

fn users_descriptor(user_address: Option<Address>, block: Option<u64>) -> QueryDescriptor {
    QueryDescriptor::builder(UsersQuery::ENTITY)
        .filter_opt("address", FilterOp::Eq, user_address.map(subgraph_id))
        .block(block)
        .properties(UsersQuery::PROPERTIES.iter().copied())
        .build()
}

/// Queries against the lockup subgraph
///
/// Obtained from [`SushiData::lockup`].
#[derive(Clone, Copy)]
pub struct Lockup<'a> {
    client: &'a SushiData,
}

impl<'a> Lockup<'a> {
    pub(crate) fn new(client: &'a SushiData) -> Self {
        Self { client }
    }

    /// Lockup positions, optionally for a single user
    ///
    /// The user address is matched in its lower-case hex form, which is how
    /// the subgraph stores it.
    pub async fn users(&self, options: UsersOptions) -> Result<Vec<LockupUser>, QueryError> {
        let span = spans::entity_query(Subgraph::Lockup, "users");
        async move {
            let block = self.client.pin_block(options.pin).await?;
            let descriptor = users_descriptor(options.user_address, block);
            self.client
                .collect::<UsersQuery>(Subgraph::Lockup, &descriptor)
                .await
        }
        .instrument(span)
        .await
    }
}
