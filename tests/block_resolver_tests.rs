// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block resolution against an in-memory block index

mod helpers;

use std::sync::Arc;

use helpers::{block, block_on, client, FixtureSubgraph, ManualLive};
use proptest::prelude::*;
use sushidata::{ResolutionError, UnixTimestamp};

/// Blocks 100.. with timestamps 13 seconds apart
fn chain(length: u64) -> Vec<serde_json::Value> {
    (0..length)
        .map(|i| block(100 + i, 1_600_000_000 + (i as i64) * 13))
        .collect()
}

fn index(length: u64) -> Arc<FixtureSubgraph> {
    Arc::new(FixtureSubgraph::new().with_records("blocks", chain(length)))
}

#[tokio::test]
async fn test_exact_timestamp_resolves_to_that_block() {
    let subgraph = index(10);
    let resolver = client(&subgraph, &Arc::new(ManualLive::new())).blocks().unwrap();

    let number = resolver
        .resolve_block(UnixTimestamp(1_600_000_000 + 3 * 13))
        .await
        .unwrap();
    assert_eq!(number, 103);
    assert_eq!(subgraph.request_count(), 1);
}

#[tokio::test]
async fn test_timestamp_between_blocks_resolves_to_earlier() {
    let subgraph = index(10);
    let resolver = client(&subgraph, &Arc::new(ManualLive::new())).blocks().unwrap();

    let number = resolver
        .resolve_block(UnixTimestamp(1_600_000_000 + 3 * 13 + 12))
        .await
        .unwrap();
    assert_eq!(number, 103);
}

#[tokio::test]
async fn test_timestamp_before_first_block_fails() {
    let subgraph = index(10);
    let resolver = client(&subgraph, &Arc::new(ManualLive::new())).blocks().unwrap();

    let err = resolver
        .resolve_block(UnixTimestamp(1_599_999_999))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::NoBlockAtOrBefore { .. }));
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    let subgraph = Arc::new(
        FixtureSubgraph::new()
            .with_records("blocks", chain(3))
            .failing_on_request(0),
    );
    let resolver = client(&subgraph, &Arc::new(ManualLive::new())).blocks().unwrap();

    let err = resolver
        .resolve_block(UnixTimestamp(1_600_000_000))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Transport { .. }));
}

#[tokio::test]
async fn test_resolution_targets_block_index_endpoint() {
    let subgraph = index(2);
    let resolver = client(&subgraph, &Arc::new(ManualLive::new())).blocks().unwrap();
    resolver
        .resolve_block(UnixTimestamp(1_600_000_000))
        .await
        .unwrap();

    let request = &subgraph.requests()[0];
    assert!(request.endpoint.ends_with("blocklytics/ethereum-blocks"));
    assert_eq!(request.first, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the resolved block is the latest one at or before the timestamp
    #[test]
    fn prop_resolves_at_or_before(length in 1u64..60, offset in 0i64..(60 * 13)) {
        let subgraph = index(length);
        let resolver = client(&subgraph, &Arc::new(ManualLive::new())).blocks().unwrap();
        let timestamp = 1_600_000_000 + offset;

        let number = block_on(resolver.resolve_block(UnixTimestamp(timestamp))).unwrap();

        let expected = 100 + ((offset / 13) as u64).min(length - 1);
        prop_assert_eq!(number, expected);
    }
}
