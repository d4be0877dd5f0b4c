// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer for subgraph access.
//!
//! The query engine talks to subgraphs through two object-safe traits, so
//! tests and custom middleware can stand in for the network:
//!
//! - [`QueryTransport`]: request/response, one page per call
//! - [`LiveTransport`]: a persistent channel pushing live-query payloads
//!
//! # Usage
//!
//! ```rust,ignore
//! use sushidata::transport::{HttpTransport, WsTransport};
//! use sushidata::{ReconnectConfig, SushiData, SushiDataConfig};
//! use std::time::Duration;
//!
//! let config = SushiDataConfig::default();
//! let client = SushiData::with_transports(
//!     config,
//!     HttpTransport::new(Duration::from_secs(10))?,
//!     WsTransport::new(ReconnectConfig::disabled()),
//! );
//! ```

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use url::Url;

use crate::errors::TransportError;
use crate::query::{LiveQuery, PageRequest};

mod http;
mod ws;

pub use http::HttpTransport;
pub use ws::WsTransport;

/// Stream of live-query payloads
///
/// Each item is the `data` object of one pushed result. The stream ends when
/// the channel completes or closes for good.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Value, TransportError>> + Send>>;

/// Request/response access to a subgraph
///
/// Implementations must evaluate the request exactly as described by
/// [`PageRequest`]: its order, filters, first and block pin.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    /// Fetch the records selected by `request`, in the order the subgraph returns them
    async fn fetch(
        &self,
        endpoint: &Url,
        request: &PageRequest<'_>,
    ) -> Result<Vec<Value>, TransportError>;
}

/// Persistent-channel access to a subgraph
#[async_trait]
pub trait LiveTransport: Send + Sync {
    /// Open a channel and start `query` on it
    ///
    /// Fails if the channel cannot be opened. Failures after that are
    /// reported as items of the returned stream.
    async fn open(&self, endpoint: &Url, query: &LiveQuery)
        -> Result<EventStream, TransportError>;
}

/// Pull `data.<entity>` out of a GraphQL `data` object as an array
pub(crate) fn entity_records(data: Value, entity: &str) -> Result<Vec<Value>, TransportError> {
    match data {
        Value::Object(mut fields) => match fields.remove(entity) {
            Some(Value::Array(records)) => Ok(records),
            Some(Value::Null) => Ok(Vec::new()),
            Some(other) => Err(TransportError::malformed(format!(
                "`{entity}` is not a list: {other}"
            ))),
            None => Err(TransportError::malformed(format!(
                "response has no `{entity}` field"
            ))),
        },
        other => Err(TransportError::malformed(format!(
            "`data` is not an object: {other}"
        ))),
    }
}
