// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for sushidata integration tests
//!
//! Provides an in-memory subgraph and a hand-fed live channel so the public
//! API can be exercised without network access.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::BlockNumber;
use async_trait::async_trait;
use serde_json::{json, Value};
use sushidata::query::{FilterOp, FilterValue, LiveQuery, OrderDirection, PageRequest};
use sushidata::{EventStream, LiveTransport, QueryTransport, SushiData, SushiDataConfig, TransportError};
use tokio::sync::mpsc;
use url::Url;

/// What the in-memory subgraph was asked for
#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub endpoint: String,
    pub entity: String,
    pub first: usize,
    pub order: Option<(String, OrderDirection)>,
    pub filters: Vec<(String, FilterValue)>,
    pub block: Option<BlockNumber>,
    /// Records the subgraph answered with
    pub returned: usize,
}

/// In-memory subgraph evaluating page requests against fixture records
///
/// Filters, ordering and `first` are applied the way a subgraph would. Block
/// pins are recorded but not evaluated. Records can be scheduled to appear
/// after a given request, like a subgraph indexing new blocks mid-run.
///
/// # Example
///
/// ```rust,ignore
/// let subgraph = FixtureSubgraph::new()
///     .with_records("servings", servings)
///     .failing_on_request(2);
/// ```
#[derive(Default)]
pub struct FixtureSubgraph {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    arrivals: Mutex<Vec<(usize, String, Value)>>,
    fail_on: Option<usize>,
    requests: Mutex<Vec<LoggedRequest>>,
}

impl FixtureSubgraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` for `entity`
    pub fn with_records(self, entity: &str, records: Vec<Value>) -> Self {
        self.collections
            .lock()
            .unwrap()
            .insert(entity.to_string(), records);
        self
    }

    /// Add `record` to `entity` once the request with this zero-based index
    /// has been answered
    pub fn arriving_after(self, index: usize, entity: &str, record: Value) -> Self {
        self.arrivals
            .lock()
            .unwrap()
            .push((index, entity.to_string(), record));
        self
    }

    /// Fail the request with this zero-based index
    pub fn failing_on_request(mut self, index: usize) -> Self {
        self.fail_on = Some(index);
        self
    }

    pub fn requests(&self) -> Vec<LoggedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryTransport for FixtureSubgraph {
    async fn fetch(
        &self,
        endpoint: &Url,
        request: &PageRequest<'_>,
    ) -> Result<Vec<Value>, TransportError> {
        let filters = request.filters();
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(LoggedRequest {
                endpoint: endpoint.to_string(),
                entity: request.entity().to_string(),
                first: request.first(),
                order: request.order().map(|(f, d)| (f.to_string(), d)),
                filters: filters.iter().map(|f| (f.key(), f.value.clone())).collect(),
                block: request.descriptor().block(),
                returned: 0,
            });
            requests.len() - 1
        };
        if self.fail_on == Some(index) {
            return Err(TransportError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: 502,
            });
        }

        let mut collections = self.collections.lock().unwrap();
        let mut records: Vec<Value> = collections
            .get(request.entity())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|record| {
                filters
                    .iter()
                    .all(|f| matches_filter(record.get(&f.field), f.op, &f.value))
            })
            .collect();

        if let Some((field, direction)) = request.order() {
            // Ties fall back to id order, as graph-node does
            records.sort_by(|a, b| {
                let ordering = compare(a.get(field), b.get(field));
                let ordering = match direction {
                    OrderDirection::Asc => ordering,
                    OrderDirection::Desc => ordering.reverse(),
                };
                ordering.then_with(|| compare(a.get("id"), b.get("id")))
            });
        }
        records.truncate(request.first());

        for (after, entity, record) in self.arrivals.lock().unwrap().iter() {
            if *after == index {
                collections.entry(entity.clone()).or_default().push(record.clone());
            }
        }
        self.requests.lock().unwrap()[index].returned = records.len();
        Ok(records)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Numeric when both sides parse as numbers, lexicographic otherwise
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => a.as_str().cmp(&b.as_str()),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_values(a, b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

fn compare_to(field: &Value, value: &FilterValue) -> Option<Ordering> {
    match value {
        FilterValue::Int(expected) => {
            as_number(field).map(|actual| actual.total_cmp(&(*expected as f64)))
        }
        FilterValue::Str(expected) => field
            .as_str()
            .map(|_| compare_values(field, &Value::from(expected.as_str()))),
        FilterValue::Bool(expected) => field.as_bool().map(|actual| actual.cmp(expected)),
        FilterValue::List(_) => None,
    }
}

fn matches_filter(field: Option<&Value>, op: FilterOp, value: &FilterValue) -> bool {
    let Some(field) = field else {
        return false;
    };
    if let FilterValue::List(options) = value {
        let member = options
            .iter()
            .any(|option| compare_to(field, option) == Some(Ordering::Equal));
        return match op {
            FilterOp::In => member,
            FilterOp::NotIn => !member,
            _ => false,
        };
    }
    match compare_to(field, value) {
        Some(ordering) => match op {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
            FilterOp::In | FilterOp::NotIn => false,
        },
        None => false,
    }
}

/// Live transport whose channels are fed by the test
#[derive(Default)]
pub struct ManualLive {
    senders: Mutex<Vec<mpsc::UnboundedSender<Result<Value, TransportError>>>>,
    documents: Mutex<Vec<String>>,
}

impl ManualLive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> usize {
        self.senders.lock().unwrap().len()
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }

    /// Push a payload on the most recent channel
    pub fn push(&self, payload: Value) {
        let senders = self.senders.lock().unwrap();
        senders
            .last()
            .expect("no channel open")
            .send(Ok(payload))
            .expect("channel reader gone");
    }

    /// Whether the most recent channel's reader has gone away
    pub fn is_closed(&self) -> bool {
        self.senders
            .lock()
            .unwrap()
            .last()
            .is_none_or(|sender| sender.is_closed())
    }
}

#[async_trait]
impl LiveTransport for ManualLive {
    async fn open(&self, _endpoint: &Url, query: &LiveQuery) -> Result<EventStream, TransportError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.senders.lock().unwrap().push(sender);
        self.documents
            .lock()
            .unwrap()
            .push(query.document().to_string());
        Ok(Box::pin(futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        })))
    }
}

/// Client over the given fixtures with default configuration
pub fn client(subgraph: &Arc<FixtureSubgraph>, live: &Arc<ManualLive>) -> SushiData {
    client_with(SushiDataConfig::default(), subgraph, live)
}

pub fn client_with(
    config: SushiDataConfig,
    subgraph: &Arc<FixtureSubgraph>,
    live: &Arc<ManualLive>,
) -> SushiData {
    SushiData::with_shared_transports(config, subgraph.clone(), live.clone())
}

/// Block-index record
pub fn block(number: u64, timestamp: i64) -> Value {
    json!({
        "id": format!("0x{number:064x}"),
        "number": number.to_string(),
        "timestamp": timestamp.to_string(),
    })
}

pub fn address(n: u64) -> String {
    format!("0x{n:040x}")
}

pub fn tx_hash(n: u64) -> String {
    format!("0x{n:064x}")
}

/// Maker-subgraph serving record
pub fn serving(n: u64, block: u64, timestamp: i64, sushi_served: &str) -> Value {
    json!({
        "id": tx_hash(n),
        "server": {"id": address(0x5e17e1)},
        "tx": tx_hash(n),
        "pair": address(0xa000 + n),
        "token0": address(0xb000 + n),
        "token1": address(0xc000 + n),
        "sushiServed": sushi_served,
        "block": block.to_string(),
        "timestamp": timestamp.to_string(),
    })
}

/// Run an async block on a fresh current-thread runtime
///
/// For use inside `proptest!` bodies, which are synchronous.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
        .block_on(future)
}
