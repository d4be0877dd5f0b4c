// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Immutable descriptions of entity queries.

use std::fmt;

use alloy_primitives::BlockNumber;

/// Sort direction of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl OrderDirection {
    /// GraphQL enum literal
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

/// Comparison applied by a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `field: value`
    Eq,
    /// `field_gt: value`
    Gt,
    /// `field_gte: value`
    Gte,
    /// `field_lt: value`
    Lt,
    /// `field_lte: value`
    Lte,
    /// `field_in: [values]`
    In,
    /// `field_not_in: [values]`
    NotIn,
}

impl FilterOp {
    /// Suffix appended to the field name in a `where` clause
    pub fn suffix(&self) -> &'static str {
        match self {
            FilterOp::Eq => "",
            FilterOp::Gt => "_gt",
            FilterOp::Gte => "_gte",
            FilterOp::Lt => "_lt",
            FilterOp::Lte => "_lte",
            FilterOp::In => "_in",
            FilterOp::NotIn => "_not_in",
        }
    }
}

/// Value compared against by a [`Filter`]
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Integer literal (block numbers, timestamps)
    Int(i64),
    /// String literal (ids, addresses, big numbers)
    Str(String),
    /// Boolean literal
    Bool(bool),
    /// List literal, for set membership
    List(Vec<FilterValue>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Int(value) => write!(f, "{value}"),
            // JSON string escaping matches GraphQL string literal escaping
            FilterValue::Str(value) => write!(f, "{}", serde_json::Value::from(value.as_str())),
            FilterValue::Bool(value) => write!(f, "{value}"),
            FilterValue::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

/// Values past `i64::MAX` become `BigInt` string literals rather than being
/// clamped.
impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| FilterValue::Str(value.to_string()), FilterValue::Int)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Str(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Str(value.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// One constraint of a `where` clause
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field being constrained
    pub field: String,
    /// Comparison
    pub op: FilterOp,
    /// Compared value
    pub value: FilterValue,
}

impl Filter {
    /// Create a filter
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Key as it appears in a `where` clause (e.g. `block_gte`)
    pub fn key(&self) -> String {
        format!("{}{}", self.field, self.op.suffix())
    }
}

/// Filter and sort clause of a query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    /// Field to sort by; `None` lets the pager page by id
    pub order_by: Option<String>,
    /// Sort direction
    pub order_direction: OrderDirection,
    /// Constraints, combined with logical AND
    pub filters: Vec<Filter>,
}

/// An immutable description of what to fetch
///
/// Built once by [`QueryDescriptor::builder`] and only ever read by the
/// pager, which derives every page request from it.
///
/// # Examples
///
/// ```
/// use sushidata::query::{FilterOp, OrderDirection, QueryDescriptor};
///
/// let descriptor = QueryDescriptor::builder("servings")
///     .order_by("block", OrderDirection::Desc)
///     .filter_opt("block", FilterOp::Gte, Some(100u64))
///     .filter_opt("block", FilterOp::Lte, None::<u64>)
///     .properties(["tx", "server { id }"])
///     .build();
///
/// assert_eq!(descriptor.entity(), "servings");
/// assert_eq!(descriptor.selection().filters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    entity: String,
    selection: Selection,
    block: Option<BlockNumber>,
    properties: Vec<String>,
}

impl QueryDescriptor {
    /// Start describing a query over an entity collection
    pub fn builder(entity: impl Into<String>) -> QueryDescriptorBuilder {
        QueryDescriptorBuilder {
            descriptor: QueryDescriptor {
                entity: entity.into(),
                selection: Selection::default(),
                block: None,
                properties: Vec::new(),
            },
        }
    }

    /// Name of the remote collection
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Filter and sort clause
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Block the query is pinned to, if any
    pub fn block(&self) -> Option<BlockNumber> {
        self.block
    }

    /// Requested field selections, passed through verbatim
    pub fn properties(&self) -> &[String] {
        &self.properties
    }
}

/// Builder for [`QueryDescriptor`]
#[derive(Debug, Clone)]
pub struct QueryDescriptorBuilder {
    descriptor: QueryDescriptor,
}

impl QueryDescriptorBuilder {
    /// Sort by a field
    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.descriptor.selection.order_by = Some(field.into());
        self.descriptor.selection.order_direction = direction;
        self
    }

    /// Add a constraint
    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        self.descriptor
            .selection
            .filters
            .push(Filter::new(field, op, value));
        self
    }

    /// Add a constraint only when a value is present
    pub fn filter_opt<V: Into<FilterValue>>(
        self,
        field: impl Into<String>,
        op: FilterOp,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.filter(field, op, value),
            None => self,
        }
    }

    /// Pin the query to a block
    pub fn block(mut self, block: Option<BlockNumber>) -> Self {
        self.descriptor.block = block;
        self
    }

    /// Set the requested field selections
    pub fn properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> QueryDescriptor {
        self.descriptor
    }
}
