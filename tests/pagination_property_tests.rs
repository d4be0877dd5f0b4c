// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for pagination
//!
//! These tests run the pager against an in-memory subgraph holding R records
//! with page size P, checking completeness, ordering, request counts, the
//! all-or-nothing failure behavior and stability while new records arrive.

mod helpers;

use std::sync::Arc;

use helpers::{block_on, FixtureSubgraph};
use proptest::prelude::*;
use serde_json::{json, Value};
use sushidata::query::{FilterValue, OrderDirection, QueryDescriptor};
use sushidata::{PageFetchError, PageSize, Pager};
use url::Url;

fn endpoint() -> Url {
    "http://localhost:8000/subgraphs/name/fixture".parse().unwrap()
}

fn records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"id": format!("r{i:05}"), "block": i.to_string()}))
        .collect()
}

fn ordered() -> QueryDescriptor {
    QueryDescriptor::builder("servings")
        .order_by("block", OrderDirection::Desc)
        .properties(["id", "block"])
        .build()
}

/// Records whose blocks repeat `width` times each
fn tied_records(count: usize, width: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({"id": format!("r{i:05}"), "block": (i / width).to_string()}))
        .collect()
}

/// Ids sorted the way a subgraph orders `block desc`: ties by id
fn newest_first(records: &[Value]) -> Vec<String> {
    let mut sorted: Vec<(u64, String)> = records
        .iter()
        .map(|r| {
            (
                r["block"].as_str().unwrap().parse().unwrap(),
                r["id"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    sorted.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    sorted.into_iter().map(|(_, id)| id).collect()
}

fn unordered() -> QueryDescriptor {
    QueryDescriptor::builder("servings").properties(["block"]).build()
}

fn ids(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

fn pager(subgraph: &Arc<FixtureSubgraph>, page_size: usize, cap: Option<usize>) -> Pager {
    Pager::new(subgraph.clone(), endpoint(), PageSize::new(page_size), cap)
}

/// Requests a complete run needs: full pages plus the one short page that ends it
fn expected_requests(records: usize, page_size: usize) -> usize {
    records / page_size + 1
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: an ordered run returns every record once, in source order
    #[test]
    fn prop_ordered_run_is_complete(count in 0usize..1500, page_size in 1usize..200) {
        let subgraph = Arc::new(FixtureSubgraph::new().with_records("servings", records(count)));
        let result = block_on(pager(&subgraph, page_size, None).paginate(&ordered())).unwrap();

        let mut expected = ids(&records(count));
        expected.reverse();
        prop_assert_eq!(ids(&result), expected);
        prop_assert_eq!(subgraph.request_count(), expected_requests(count, page_size));
    }

    /// Property: a run without declared order pages by id and still sees every record
    #[test]
    fn prop_keyset_run_is_complete(count in 0usize..1500, page_size in 1usize..200) {
        let subgraph = Arc::new(FixtureSubgraph::new().with_records("servings", records(count)));
        let result = block_on(pager(&subgraph, page_size, None).paginate(&unordered())).unwrap();

        prop_assert_eq!(ids(&result), ids(&records(count)));
        prop_assert_eq!(subgraph.request_count(), expected_requests(count, page_size));
        prop_assert!(subgraph
            .requests()
            .iter()
            .all(|r| r.order == Some(("id".to_string(), OrderDirection::Asc))));
    }

    /// Property: records sharing a sort value are neither repeated nor lost
    /// across page boundaries
    #[test]
    fn prop_ties_on_sort_field_are_complete(
        count in 0usize..600,
        page_size in 1usize..50,
        width in 1usize..80,
    ) {
        let fixture = tied_records(count, width);
        let subgraph = Arc::new(FixtureSubgraph::new().with_records("servings", fixture.clone()));
        let result = block_on(pager(&subgraph, page_size, None).paginate(&ordered())).unwrap();

        prop_assert_eq!(ids(&result), newest_first(&fixture));
        prop_assert_eq!(subgraph.request_count(), expected_requests(count, page_size));
    }

    /// Property: no page is requested after a short page
    #[test]
    fn prop_no_request_past_exhaustion(count in 0usize..500, page_size in 1usize..100) {
        let subgraph = Arc::new(FixtureSubgraph::new().with_records("servings", records(count)));
        block_on(pager(&subgraph, page_size, None).paginate(&ordered())).unwrap();

        let requests = subgraph.requests();
        let (last, full) = requests.split_last().unwrap();
        prop_assert!(full.iter().all(|r| r.returned == page_size));
        prop_assert!(last.returned < page_size);
        prop_assert!(requests.iter().all(|r| r.first == page_size));
    }

    /// Property: a failed page yields an error and no records at all
    #[test]
    fn prop_failure_leaks_nothing(
        count in 1usize..1000,
        page_size in 1usize..100,
        seed in any::<usize>(),
    ) {
        let failing = seed % expected_requests(count, page_size);
        let subgraph = Arc::new(
            FixtureSubgraph::new()
                .with_records("servings", records(count))
                .failing_on_request(failing),
        );
        let result = block_on(pager(&subgraph, page_size, None).paginate(&ordered()));

        match result {
            Err(PageFetchError::Transport { page, .. }) => prop_assert_eq!(page, failing),
            other => prop_assert!(false, "expected a transport failure, got {:?}", other.map(|r| r.len())),
        }
        prop_assert_eq!(subgraph.request_count(), failing + 1);
    }

    /// Property: the record cap bounds a run without skipping records
    #[test]
    fn prop_cap_bounds_run(count in 0usize..800, page_size in 1usize..100, cap in 1usize..800) {
        let subgraph = Arc::new(FixtureSubgraph::new().with_records("servings", records(count)));
        let result = block_on(pager(&subgraph, page_size, Some(cap)).paginate(&unordered())).unwrap();

        let mut expected = ids(&records(count));
        expected.truncate(cap);
        prop_assert_eq!(ids(&result), expected);
    }
}

#[tokio::test]
async fn test_fixed_scenario_request_count() {
    // 2500 records in pages of 1000: two full pages and one short one
    let subgraph = Arc::new(FixtureSubgraph::new().with_records("servings", records(2500)));
    let result = pager(&subgraph, 1000, None)
        .paginate(&ordered())
        .await
        .unwrap();

    assert_eq!(result.len(), 2500);
    let requests = subgraph.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].filters.is_empty());
    assert_eq!(
        requests[1].filters,
        vec![
            ("block_lte".to_string(), FilterValue::from("1500")),
            (
                "id_not_in".to_string(),
                FilterValue::List(vec![FilterValue::from("r01500")])
            ),
        ]
    );
    assert_eq!(requests[2].filters[0], ("block_lte".to_string(), FilterValue::from("500")));
}

#[tokio::test]
async fn test_new_head_record_mid_run_is_not_repeated() {
    // r0..r3 at blocks 0..3; a serving at block 4 is indexed after the first page
    let subgraph = Arc::new(
        FixtureSubgraph::new()
            .with_records("servings", records(4))
            .arriving_after(0, "servings", json!({"id": "r00004", "block": "4"})),
    );
    let result = pager(&subgraph, 2, None)
        .paginate(&ordered())
        .await
        .unwrap();

    assert_eq!(ids(&result), vec!["r00003", "r00002", "r00001", "r00000"]);
    assert_eq!(subgraph.request_count(), 3);
}

#[tokio::test]
async fn test_record_arriving_inside_a_tie_mid_run_is_delivered_once() {
    // Four servings in block 7; a fifth lands in the same block after page one
    let fixture: Vec<Value> = (0..4)
        .map(|i| json!({"id": format!("r{i:05}"), "block": "7"}))
        .collect();
    let subgraph = Arc::new(
        FixtureSubgraph::new()
            .with_records("servings", fixture)
            .arriving_after(0, "servings", json!({"id": "r00009", "block": "7"})),
    );
    let result = pager(&subgraph, 2, None)
        .paginate(&ordered())
        .await
        .unwrap();

    assert_eq!(
        ids(&result),
        vec!["r00000", "r00001", "r00002", "r00003", "r00009"]
    );
}
