//! Configuration for sushidata operations
//!
//! This module provides a flexible configuration system for controlling
//! which subgraph endpoints are queried, how pagination is bounded, and how
//! the live-query channel reconnects.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use sushidata::SushiDataConfig;
//!
//! // Hosted-service endpoints, 1000-record pages, 30s request timeout
//! let config = SushiDataConfig::default();
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use sushidata::{PageSize, Subgraph, SushiDataConfigBuilder};
//! use std::time::Duration;
//!
//! let config = SushiDataConfigBuilder::with_defaults()
//!     .page_size(PageSize::new(500))
//!     .max_records(10_000)
//!     .endpoint(Subgraph::Maker, "http://localhost:8000/subgraphs/name/sushi-maker".parse().unwrap())
//!     .request_timeout(Duration::from_secs(10))
//!     .build();
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::errors::ConfigError;

pub mod constants;

/// A subgraph known to sushidata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subgraph {
    /// MasterChef staking pools
    MasterChef,
    /// SushiBar (xSUSHI)
    Bar,
    /// Governance timelock
    Timelock,
    /// SushiMaker servings
    Maker,
    /// SushiSwap exchange
    Exchange,
    /// Legacy SushiSwap exchange
    ExchangeV1,
    /// Ethereum block index, used to resolve timestamps to blocks
    Blocklytics,
    /// Lockup rewards
    Lockup,
}

impl Subgraph {
    /// Returns the default hosted-service HTTP endpoint
    pub fn default_http_endpoint(&self) -> &'static str {
        use constants::endpoints::http;
        match self {
            Subgraph::MasterChef => http::MASTERCHEF,
            Subgraph::Bar => http::BAR,
            Subgraph::Timelock => http::TIMELOCK,
            Subgraph::Maker => http::MAKER,
            Subgraph::Exchange => http::EXCHANGE,
            Subgraph::ExchangeV1 => http::EXCHANGE_V1,
            Subgraph::Blocklytics => http::BLOCKLYTICS,
            Subgraph::Lockup => http::LOCKUP,
        }
    }

    /// Returns the default hosted-service WebSocket endpoint, if the subgraph has one
    pub fn default_ws_endpoint(&self) -> Option<&'static str> {
        use constants::endpoints::ws;
        match self {
            Subgraph::Bar => Some(ws::BAR),
            Subgraph::Exchange => Some(ws::EXCHANGE),
            Subgraph::Blocklytics => Some(ws::BLOCKLYTICS),
            _ => None,
        }
    }

    /// Short lowercase name used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Subgraph::MasterChef => "masterchef",
            Subgraph::Bar => "bar",
            Subgraph::Timelock => "timelock",
            Subgraph::Maker => "maker",
            Subgraph::Exchange => "exchange",
            Subgraph::ExchangeV1 => "exchange_v1",
            Subgraph::Blocklytics => "blocklytics",
            Subgraph::Lockup => "lockup",
        }
    }
}

impl fmt::Display for Subgraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of records requested per page
///
/// The hosted service rejects `first` values above 1000, so sizes are clamped
/// to `1..=1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageSize(usize);

impl PageSize {
    /// Largest page the hosted service serves
    pub const MAX: Self = Self(1000);

    /// Create a page size, clamped to `1..=1000`
    ///
    /// # Examples
    ///
    /// ```
    /// use sushidata::PageSize;
    ///
    /// assert_eq!(PageSize::new(250).as_usize(), 250);
    /// assert_eq!(PageSize::new(0).as_usize(), 1);
    /// assert_eq!(PageSize::new(5000), PageSize::MAX);
    /// ```
    pub const fn new(records: usize) -> Self {
        if records == 0 {
            Self(1)
        } else if records > Self::MAX.0 {
            Self::MAX
        } else {
            Self(records)
        }
    }

    /// Get the inner value
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::MAX
    }
}

/// Reconnection policy for live-query channels
///
/// Delays grow exponentially from `initial_delay`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Whether to reconnect at all after the socket drops
    pub enabled: bool,
    /// Attempts per disconnect before the channel is reported closed
    pub max_attempts: u32,
    /// Delay before the first attempt
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl ReconnectConfig {
    /// Never reconnect; the first disconnect closes the channel
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Delay before the given 1-based attempt
    ///
    /// # Examples
    ///
    /// ```
    /// use sushidata::ReconnectConfig;
    /// use std::time::Duration;
    ///
    /// let config = ReconnectConfig::default();
    /// assert_eq!(config.backoff(1), Duration::from_millis(500));
    /// assert_eq!(config.backoff(3), Duration::from_millis(2000));
    /// assert_eq!(config.backoff(30), Duration::from_secs(30));
    /// ```
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Configuration for sushidata operations
///
/// Use [`SushiDataConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct SushiDataConfig {
    /// Records requested per page
    /// Default: 1000 (hosted-service maximum)
    pub page_size: PageSize,

    /// Hard cap on records gathered by one pagination run
    /// Default: None (page until exhaustion)
    pub max_records: Option<usize>,

    /// Timeout applied by the HTTP transport to each request
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Reconnection policy of the WebSocket transport
    pub reconnect: ReconnectConfig,

    /// HTTP endpoint overrides
    pub endpoints: HashMap<Subgraph, Url>,

    /// WebSocket endpoint overrides
    pub ws_endpoints: HashMap<Subgraph, Url>,
}

impl Default for SushiDataConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            max_records: None,
            request_timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
            endpoints: HashMap::new(),
            ws_endpoints: HashMap::new(),
        }
    }
}

impl SushiDataConfig {
    /// Get the effective HTTP endpoint for a subgraph
    ///
    /// Returns the override if set, otherwise the hosted-service default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sushidata::{Subgraph, SushiDataConfigBuilder};
    ///
    /// let config = SushiDataConfigBuilder::with_defaults()
    ///     .endpoint(Subgraph::Lockup, "http://localhost:8000/lockup".parse().unwrap())
    ///     .build();
    ///
    /// assert_eq!(
    ///     config.http_endpoint(Subgraph::Lockup).unwrap().as_str(),
    ///     "http://localhost:8000/lockup"
    /// );
    /// assert!(config
    ///     .http_endpoint(Subgraph::Maker)
    ///     .unwrap()
    ///     .as_str()
    ///     .ends_with("sushiswap/sushi-maker"));
    /// ```
    pub fn http_endpoint(&self, subgraph: Subgraph) -> Result<Url, ConfigError> {
        if let Some(url) = self.endpoints.get(&subgraph) {
            return Ok(url.clone());
        }
        parse_endpoint(subgraph, subgraph.default_http_endpoint())
    }

    /// Get the effective WebSocket endpoint for a subgraph
    ///
    /// Fails with [`ConfigError::MissingLiveEndpoint`] when the subgraph has
    /// neither an override nor a hosted-service default.
    pub fn ws_endpoint(&self, subgraph: Subgraph) -> Result<Url, ConfigError> {
        if let Some(url) = self.ws_endpoints.get(&subgraph) {
            return Ok(url.clone());
        }
        let endpoint = subgraph
            .default_ws_endpoint()
            .ok_or(ConfigError::MissingLiveEndpoint { subgraph })?;
        parse_endpoint(subgraph, endpoint)
    }
}

fn parse_endpoint(subgraph: Subgraph, endpoint: &str) -> Result<Url, ConfigError> {
    Url::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
        subgraph,
        endpoint: endpoint.to_string(),
        source,
    })
}

/// Builder for [`SushiDataConfig`]
#[derive(Debug, Clone, Default)]
pub struct SushiDataConfigBuilder {
    config: SushiDataConfig,
}

impl SushiDataConfigBuilder {
    /// Start from an empty builder (same as defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the hosted-service defaults
    pub fn with_defaults() -> Self {
        Self {
            config: SushiDataConfig::default(),
        }
    }

    /// Set the page size
    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Cap the number of records one pagination run may gather
    pub fn max_records(mut self, max_records: usize) -> Self {
        self.config.max_records = Some(max_records);
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the live-channel reconnection policy
    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.config.reconnect = reconnect;
        self
    }

    /// Override the HTTP endpoint of a subgraph
    pub fn endpoint(mut self, subgraph: Subgraph, url: Url) -> Self {
        self.config.endpoints.insert(subgraph, url);
        self
    }

    /// Override the WebSocket endpoint of a subgraph
    pub fn ws_endpoint(mut self, subgraph: Subgraph, url: Url) -> Self {
        self.config.ws_endpoints.insert(subgraph, url);
        self
    }

    /// Build the configuration
    pub fn build(self) -> SushiDataConfig {
        self.config
    }
}
