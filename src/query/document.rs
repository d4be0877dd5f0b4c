// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! GraphQL document rendering.

use std::fmt::Write;

use super::cursor::PageRequest;
use super::descriptor::{Filter, QueryDescriptor};

/// Render a page request as a GraphQL query document
///
/// # Examples
///
/// ```
/// use sushidata::query::{render_query, FilterOp, OrderDirection, PageCursor, PageRequest, QueryDescriptor};
/// use serde_json::json;
///
/// let descriptor = QueryDescriptor::builder("servings")
///     .order_by("block", OrderDirection::Desc)
///     .filter("block", FilterOp::Gte, 100i64)
///     .block(Some(11_000_000))
///     .properties(["id", "block", "server { id }"])
///     .build();
/// let mut cursor = PageCursor::start(&descriptor);
/// cursor.advance(&[json!({"id": "0x01", "block": "150"})]).unwrap();
/// let document = render_query(&PageRequest::new(&descriptor, 1000, &cursor));
///
/// assert_eq!(
///     document,
///     "{ servings(first: 1000, orderBy: block, orderDirection: desc, \
///      where: { block_gte: 100, block_lte: \"150\", id_not_in: [\"0x01\"] }, \
///      block: { number: 11000000 }) { id block server { id } } }"
/// );
/// ```
pub fn render_query(request: &PageRequest<'_>) -> String {
    let mut arguments = vec![format!("first: {}", request.first())];
    if let Some((field, direction)) = request.order() {
        arguments.push(format!("orderBy: {field}"));
        arguments.push(format!("orderDirection: {}", direction.as_str()));
    }
    if let Some(clause) = where_clause(&request.filters()) {
        arguments.push(clause);
    }
    if let Some(block) = request.descriptor().block() {
        arguments.push(format!("block: {{ number: {block} }}"));
    }

    format!(
        "{{ {}({}) {{ {} }} }}",
        request.entity(),
        arguments.join(", "),
        request.properties().join(" ")
    )
}

fn where_clause(filters: &[Filter]) -> Option<String> {
    if filters.is_empty() {
        return None;
    }
    let mut clause = String::from("where: { ");
    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            clause.push_str(", ");
        }
        // Writing into a String cannot fail
        let _ = write!(clause, "{}: {}", filter.key(), filter.value);
    }
    clause.push_str(" }");
    Some(clause)
}

/// A standing query sent over a live channel
///
/// Live queries are never paged; they ask for up to `first` records and the
/// subgraph pushes the full result set again whenever it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveQuery {
    entity: String,
    document: String,
}

impl LiveQuery {
    /// Build a live query from a descriptor
    ///
    /// Block pins are ignored: a live query always follows the chain head.
    ///
    /// # Examples
    ///
    /// ```
    /// use sushidata::query::{FilterOp, LiveQuery, QueryDescriptor};
    ///
    /// let descriptor = QueryDescriptor::builder("users")
    ///     .filter("id", FilterOp::Eq, "0x95c6")
    ///     .properties(["liquidityPositions { id }"])
    ///     .build();
    /// let live = LiveQuery::new(&descriptor, 1000);
    ///
    /// assert_eq!(live.entity(), "users");
    /// assert_eq!(
    ///     live.document(),
    ///     "subscription { users(first: 1000, where: { id: \"0x95c6\" }) { liquidityPositions { id } } }"
    /// );
    /// ```
    pub fn new(descriptor: &QueryDescriptor, first: usize) -> Self {
        let selection = descriptor.selection();
        let mut arguments = vec![format!("first: {first}")];
        if let Some(field) = &selection.order_by {
            arguments.push(format!("orderBy: {field}"));
            arguments.push(format!(
                "orderDirection: {}",
                selection.order_direction.as_str()
            ));
        }
        if let Some(clause) = where_clause(&selection.filters) {
            arguments.push(clause);
        }

        let document = format!(
            "subscription {{ {}({}) {{ {} }} }}",
            descriptor.entity(),
            arguments.join(", "),
            descriptor.properties().join(" ")
        );
        Self {
            entity: descriptor.entity().to_string(),
            document,
        }
    }

    /// Entity the live query selects; its payloads carry a field of this name
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// GraphQL subscription document
    pub fn document(&self) -> &str {
        &self.document
    }
}
