// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Query descriptors, page cursors and GraphQL rendering.
//!
//! This module handles:
//! - Immutable descriptions of entity queries ([`QueryDescriptor`])
//! - Cursor state of a pagination run ([`PageCursor`]) and the bounded
//!   requests derived from it ([`PageRequest`])
//! - Rendering requests and live queries as GraphQL documents

pub mod cursor;
pub mod descriptor;
pub mod document;

pub use cursor::{CursorKeyError, PageCursor, PageRequest};
pub use descriptor::{
    Filter, FilterOp, FilterValue, OrderDirection, QueryDescriptor, QueryDescriptorBuilder,
    Selection,
};
pub use document::{render_query, LiveQuery};
