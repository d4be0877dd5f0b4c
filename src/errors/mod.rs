//! Error types for the sushidata library.
//!
//! This module provides strongly-typed errors for all public APIs in sushidata.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`ResolutionError`,
//!   `PageFetchError`, etc.)
//! - **Unified error type** (`SushiDataError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! # Architecture
//!
//! Each stage of a query has its own error type:
//! - [`ResolutionError`] - A timestamp could not be mapped to a block
//! - [`PageFetchError`] - A page request failed, aborting the whole pagination run
//! - [`TransformError`] - Raw records could not be shaped into typed results
//! - [`SubscriptionError`] - A live channel failed or a live event could not be shaped
//! - [`QueryError`] - What every entity operation returns (wraps the first three)
//!
//! Additionally, [`TransportError`] provides shared variants for subgraph
//! request/response and WebSocket failures.
//!
//! # Examples
//!
//! ## Telling "empty" apart from "failed"
//!
//! ```rust,ignore
//! use sushidata::{QueryError, ServingsOptions, SushiData, SushiDataConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SushiData::new(SushiDataConfig::default())?;
//!
//!     match client.maker().servings(ServingsOptions::default()).await {
//!         Ok(servings) if servings.is_empty() => println!("No servings yet"),
//!         Ok(servings) => println!("{} servings", servings.len()),
//!         Err(QueryError::Page(e)) => eprintln!("Subgraph request failed: {e}"),
//!         Err(e) => eprintln!("Other error: {e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Using the unified error type
//!
//! ```rust,ignore
//! use sushidata::{PinOptions, SushiData, SushiDataConfig, SushiDataError, UnixTimestamp};
//!
//! async fn example() -> Result<(), SushiDataError> {
//!     let client = SushiData::new(SushiDataConfig::default())?;
//!     let info = client.maker().info(PinOptions::at_timestamp(UnixTimestamp(1_600_000_000))).await?;
//!     // Errors automatically convert to SushiDataError via From implementations
//!     Ok(())
//! }
//! ```

mod config;
mod page;
mod query;
mod resolution;
mod subscription;
mod transform;
mod transport;

pub use config::ConfigError;
pub use page::PageFetchError;
pub use query::QueryError;
pub use resolution::ResolutionError;
pub use subscription::SubscriptionError;
pub use transform::TransformError;
pub use transport::TransportError;

/// Unified error type for all sushidata operations.
///
/// All module-specific error types automatically convert to `SushiDataError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
#[derive(Debug, thiserror::Error)]
pub enum SushiDataError {
    /// Error from an entity query (resolution, pagination or normalization).
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Error delivered by a live subscription.
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// Error constructing a transport.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<ResolutionError> for SushiDataError {
    fn from(error: ResolutionError) -> Self {
        SushiDataError::Query(error.into())
    }
}

impl From<PageFetchError> for SushiDataError {
    fn from(error: PageFetchError) -> Self {
        SushiDataError::Query(error.into())
    }
}

impl From<TransformError> for SushiDataError {
    fn from(error: TransformError) -> Self {
        SushiDataError::Query(error.into())
    }
}
