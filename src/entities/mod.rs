// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Typed entity queries over the SushiSwap subgraphs.
//!
//! Each entity module composes the same pieces:
//!
//! 1. Pin the query to a block, resolving a timestamp first if needed
//! 2. Build a [`QueryDescriptor`](crate::query::QueryDescriptor) from the
//!    entity's static properties and the caller's options
//! 3. Page through the results with the [`Pager`](crate::pager::Pager)
//! 4. Shape the raw records with the entity's [`Normalizer`]
//!
//! Failures at any step are returned to the caller as a
//! [`QueryError`](crate::errors::QueryError). An empty result is `Ok`.

use alloy_primitives::BlockNumber;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::blocks::UnixTimestamp;
use crate::errors::TransformError;

pub mod lockup;
pub mod maker;
pub(crate) mod numeric;

/// Shapes raw subgraph records into an entity's typed output
///
/// Implementors declare the entity collection and the properties to select;
/// [`normalize`](Normalizer::normalize) decodes every record into
/// [`Raw`](Normalizer::Raw) and hands the batch to
/// [`shape`](Normalizer::shape).
pub trait Normalizer {
    /// Entity collection queried
    const ENTITY: &'static str;
    /// Property selections, passed through verbatim (nested selections allowed)
    const PROPERTIES: &'static [&'static str];

    /// One record as returned by the subgraph
    type Raw: DeserializeOwned;
    /// Typed result of the whole query
    type Output;

    /// Shape decoded records into the output
    fn shape(raw: Vec<Self::Raw>) -> Result<Self::Output, TransformError>;

    /// Decode and shape raw records
    fn normalize(records: Vec<Value>) -> Result<Self::Output, TransformError> {
        let raw = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                serde_json::from_value(record)
                    .map_err(|e| TransformError::decode(Self::ENTITY, index, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::shape(raw)
    }
}

/// Historical pin for a query
///
/// With neither field set the query reads the latest indexed state. When both
/// are set, `block` wins and no resolution happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinOptions {
    /// Read state as of this block
    pub block: Option<BlockNumber>,
    /// Read state as of the latest block at or before this time
    pub timestamp: Option<UnixTimestamp>,
}

impl PinOptions {
    /// Read the latest indexed state
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn at_block(block: BlockNumber) -> Self {
        Self {
            block: Some(block),
            timestamp: None,
        }
    }

    pub fn at_timestamp(timestamp: UnixTimestamp) -> Self {
        Self {
            block: None,
            timestamp: Some(timestamp),
        }
    }
}

/// Bounds for [`Maker::servings`](maker::Maker::servings)
///
/// All bounds are inclusive, optional and combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServingsOptions {
    pub min_block: Option<BlockNumber>,
    pub max_block: Option<BlockNumber>,
    pub min_timestamp: Option<UnixTimestamp>,
    pub max_timestamp: Option<UnixTimestamp>,
}

impl ServingsOptions {
    /// Servings with `min <= block <= max`
    pub fn blocks(min: BlockNumber, max: BlockNumber) -> Self {
        Self {
            min_block: Some(min),
            max_block: Some(max),
            ..Self::default()
        }
    }

    /// Servings with `min <= timestamp <= max`
    pub fn timestamps(min: UnixTimestamp, max: UnixTimestamp) -> Self {
        Self {
            min_timestamp: Some(min),
            max_timestamp: Some(max),
            ..Self::default()
        }
    }
}

/// Options for [`Lockup::users`](lockup::Lockup::users)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsersOptions {
    pub pin: PinOptions,
    /// Only this user's positions; all users when `None`
    pub user_address: Option<alloy_primitives::Address>,
}
