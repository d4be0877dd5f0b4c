// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Lockup queries against an in-memory subgraph

mod helpers;

use std::sync::Arc;

use alloy_primitives::Address;
use helpers::{address, block, client, FixtureSubgraph, ManualLive};
use serde_json::{json, Value};
use sushidata::timeseries::{timeseries, TimeseriesPoints};
use sushidata::{PinOptions, QueryError, UnixTimestamp, UsersOptions};

fn user(pool: u64, user: u64, amount: &str) -> Value {
    json!({
        "id": format!("{pool}-{}", address(user)),
        "address": address(user),
        "amount": amount,
        "rewardDebt": "0",
        "pool": {"id": pool.to_string(), "balance": "1000", "accSushiPerShare": "0.5"},
        "sushiAtLockup": "4",
        "sushiHarvestedSinceLockup": "1",
        "sushiLocked": "3",
    })
}

fn lockup() -> Arc<FixtureSubgraph> {
    Arc::new(
        FixtureSubgraph::new()
            .with_records(
                "users",
                vec![user(0, 1, "10"), user(1, 1, "20"), user(0, 2, "30")],
            )
            .with_records("blocks", vec![block(500, 1_600_000_000)]),
    )
}

#[tokio::test]
async fn test_users_for_one_address() {
    let subgraph = lockup();
    let client = client(&subgraph, &Arc::new(ManualLive::new()));

    let users = client
        .lockup()
        .users(UsersOptions {
            user_address: Some(address(1).parse::<Address>().unwrap()),
            ..UsersOptions::default()
        })
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.address == address(1).parse::<Address>().unwrap()));
    let amounts: Vec<f64> = users.iter().map(|u| u.amount).collect();
    assert_eq!(amounts, vec![10.0, 20.0]);
    assert_eq!(users[0].pool.acc_sushi_per_share, 0.5);
    assert!(subgraph.requests()[0].endpoint.ends_with("matthewlilley/lockup"));
}

#[tokio::test]
async fn test_users_without_address_returns_everyone() {
    let subgraph = lockup();
    let client = client(&subgraph, &Arc::new(ManualLive::new()));

    let users = client.lockup().users(UsersOptions::default()).await.unwrap();
    assert_eq!(users.len(), 3);
}

#[tokio::test]
async fn test_users_pinned_by_timestamp() {
    let subgraph = lockup();
    let client = client(&subgraph, &Arc::new(ManualLive::new()));

    client
        .lockup()
        .users(UsersOptions {
            pin: PinOptions::at_timestamp(UnixTimestamp(1_600_000_100)),
            user_address: None,
        })
        .await
        .unwrap();

    let requests = subgraph.requests();
    assert_eq!(requests[0].entity, "blocks");
    assert_eq!(requests[1].entity, "users");
    assert_eq!(requests[1].block, Some(500));
}

#[tokio::test]
async fn test_users_timeseries_by_block() {
    let subgraph = lockup();
    let client = client(&subgraph, &Arc::new(ManualLive::new()));
    let lockup = client.lockup();

    let series = timeseries(TimeseriesPoints::Blocks(vec![100, 200, 300]), |pin| {
        lockup.users(UsersOptions {
            pin,
            user_address: None,
        })
    })
    .await
    .unwrap();

    assert_eq!(series.len(), 3);
    assert!(series.iter().all(|users| users.len() == 3));
    let mut pinned: Vec<Option<u64>> = subgraph.requests().iter().map(|r| r.block).collect();
    pinned.sort();
    assert_eq!(pinned, vec![Some(100), Some(200), Some(300)]);
}

#[tokio::test]
async fn test_timeseries_surfaces_resolution_failure() {
    let subgraph = lockup();
    let client = client(&subgraph, &Arc::new(ManualLive::new()));
    let lockup = client.lockup();

    // The block index starts at 1_600_000_000
    let err = timeseries(
        TimeseriesPoints::Timestamps(vec![UnixTimestamp(1_600_000_000), UnixTimestamp(1)]),
        |pin| {
            lockup.users(UsersOptions {
                pin,
                user_address: None,
            })
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, QueryError::Resolution(_)));
}
