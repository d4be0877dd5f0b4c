// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! GraphQL over HTTP.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use super::{entity_records, QueryTransport};
use crate::errors::TransportError;
use crate::query::{render_query, PageRequest};

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
}

/// A GraphQL response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    #[serde(default)]
    pub(crate) data: Option<Value>,
    #[serde(default)]
    pub(crate) errors: Option<Vec<GraphQlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorMessage {
    pub(crate) message: String,
}

impl GraphQlResponse {
    /// The `data` object, or the reported errors
    pub(crate) fn into_data(self) -> Result<Value, TransportError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(TransportError::GraphQl {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }
        self.data
            .ok_or_else(|| TransportError::malformed("response has neither `data` nor `errors`"))
    }
}

/// [`QueryTransport`] posting GraphQL documents with `reqwest`
///
/// The client is cheap to clone and shares one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::request_failed("build HTTP client", e))?;
        Ok(Self { client })
    }

    /// Create a transport from an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn fetch(
        &self,
        endpoint: &Url,
        request: &PageRequest<'_>,
    ) -> Result<Vec<Value>, TransportError> {
        let document = render_query(request);
        let operation = format!("{} query", request.entity());
        trace!(%endpoint, document = %document, "GraphQL request");

        let start = Instant::now();
        let response = self
            .client
            .post(endpoint.clone())
            .json(&GraphQlRequest { query: &document })
            .send()
            .await
            .map_err(|e| TransportError::request_failed(operation.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "Subgraph answered with error status");
            return Err(TransportError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| TransportError::request_failed(operation, e))?;
        let records = entity_records(body.into_data()?, request.entity())?;

        debug!(
            entity = request.entity(),
            records = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "GraphQL request completed"
        );
        Ok(records)
    }
}
