// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block numbers and timestamps.
//!
//! This module provides:
//! - [`UnixTimestamp`], the timestamp type accepted by every pinning API
//! - [`BlockResolver`], which maps a timestamp to the latest block at or before it

mod resolver;
mod timestamp;

pub use resolver::BlockResolver;
pub use timestamp::UnixTimestamp;
