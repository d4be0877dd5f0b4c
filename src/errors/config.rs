//! Error types for endpoint configuration.

use crate::config::Subgraph;

/// Errors raised while resolving configured endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The subgraph has no live-query endpoint configured.
    #[error("No WebSocket endpoint configured for the {subgraph} subgraph")]
    MissingLiveEndpoint {
        /// The subgraph that was requested
        subgraph: Subgraph,
    },

    /// A configured endpoint is not a valid URL.
    #[error("Invalid endpoint {endpoint} for the {subgraph} subgraph")]
    InvalidEndpoint {
        /// The subgraph the endpoint belongs to
        subgraph: Subgraph,
        /// The rejected endpoint text
        endpoint: String,
        /// The underlying parse error
        #[source]
        source: url::ParseError,
    },
}
