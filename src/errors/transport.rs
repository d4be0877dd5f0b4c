//! Shared transport error types for subgraph operations.
//!
//! This module provides error types for the failures that can occur when
//! talking to a subgraph, either over HTTP request/response or over a
//! persistent WebSocket channel.

/// Errors that can occur while talking to a subgraph endpoint.
///
/// Captures the common failure modes of both transports and carries enough
/// context (operation, endpoint, status) to aid debugging.
///
/// # Examples
///
/// ```rust
/// use sushidata::TransportError;
///
/// let error = TransportError::GraphQl {
///     messages: vec!["Store error: block not found".to_string()],
/// };
/// assert!(error.to_string().contains("block not found"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or its response could not be read.
    ///
    /// Covers connection failures, timeouts and body decoding errors.
    #[error("Request failed during {operation}")]
    RequestFailed {
        /// Description of the operation that failed (e.g., "servings page 3")
        operation: String,
        /// The underlying client error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("Endpoint {endpoint} answered with HTTP status {status}")]
    HttpStatus {
        /// The endpoint that was queried
        endpoint: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// The subgraph answered with a GraphQL `errors` array.
    #[error("Subgraph returned errors: {}", messages.join("; "))]
    GraphQl {
        /// The error messages reported by the subgraph
        messages: Vec<String>,
    },

    /// The response did not have the expected shape.
    #[error("Malformed response: {details}")]
    MalformedResponse {
        /// What was missing or unexpected
        details: String,
    },

    /// The WebSocket connection failed.
    #[error("WebSocket failure during {operation}")]
    WebSocket {
        /// Description of the operation that failed (e.g., "connect", "send start")
        operation: String,
        /// The underlying socket error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server violated the live-query protocol.
    #[error("Live-query protocol error: {details}")]
    Protocol {
        /// Description of the violation
        details: String,
    },

    /// The live channel closed and could not be re-established.
    ///
    /// Events emitted by the subgraph between the disconnect and this error
    /// were not delivered.
    #[error("Live channel to {endpoint} closed after {attempts} reconnect attempt(s)")]
    ChannelClosed {
        /// The endpoint of the closed channel
        endpoint: String,
        /// Number of reconnect attempts made before giving up
        attempts: u32,
    },
}

impl TransportError {
    /// Helper to create a `RequestFailed` error from any error type.
    pub fn request_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TransportError::RequestFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `WebSocket` error from any error type.
    pub fn websocket(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TransportError::WebSocket {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a `MalformedResponse` error with details.
    pub fn malformed(details: impl Into<String>) -> Self {
        TransportError::MalformedResponse {
            details: details.into(),
        }
    }

    /// Create a `Protocol` error with details.
    pub fn protocol(details: impl Into<String>) -> Self {
        TransportError::Protocol {
            details: details.into(),
        }
    }
}
