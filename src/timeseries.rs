// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Run one entity operation at a series of historical points.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sushidata::timeseries::{timeseries, TimeseriesPoints};
//!
//! let client = SushiData::new(SushiDataConfig::default())?;
//! let maker = client.maker();
//! let history = timeseries(
//!     TimeseriesPoints::Blocks(vec![11_000_000, 11_500_000, 12_000_000]),
//!     |pin| maker.info(pin),
//! )
//! .await?;
//! ```

use std::future::Future;

use alloy_primitives::BlockNumber;
use futures::future::try_join_all;
use tracing::{debug, Instrument};

use crate::blocks::UnixTimestamp;
use crate::entities::PinOptions;
use crate::tracing::spans;

/// Points at which a timeseries is sampled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeseriesPoints {
    Blocks(Vec<BlockNumber>),
    Timestamps(Vec<UnixTimestamp>),
}

impl TimeseriesPoints {
    /// One pin per point, in input order
    pub fn pins(&self) -> Vec<PinOptions> {
        match self {
            TimeseriesPoints::Blocks(blocks) => {
                blocks.iter().copied().map(PinOptions::at_block).collect()
            }
            TimeseriesPoints::Timestamps(timestamps) => timestamps
                .iter()
                .copied()
                .map(PinOptions::at_timestamp)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TimeseriesPoints::Blocks(blocks) => blocks.len(),
            TimeseriesPoints::Timestamps(timestamps) => timestamps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Call `target` once per point and collect the results in input order
///
/// The calls run concurrently. The first failure is returned and the
/// remaining calls are dropped.
pub async fn timeseries<T, E, F, Fut>(points: TimeseriesPoints, target: F) -> Result<Vec<T>, E>
where
    F: Fn(PinOptions) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let span = spans::timeseries(points.len());
    async move {
        let results = try_join_all(points.pins().into_iter().map(&target)).await?;
        debug!(points = results.len(), "Timeseries complete");
        Ok(results)
    }
    .instrument(span)
    .await
}
