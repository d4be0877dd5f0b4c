// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Page cursors and the page requests derived from them.
//!
//! Every cursor is a keyset: each page asks for the records past the last one
//! already received, so records inserted or removed between pages cannot
//! shift the window.
//!
//! - **After value**: used when the descriptor declares its own sort order.
//!   Each page bounds the sort field by the last value seen (`<field>_lte` for
//!   descending order, `<field>_gte` for ascending) and excludes the ids
//!   already received with exactly that value (`id_not_in`), so ties on the
//!   sort field are neither repeated nor lost.
//! - **After id**: used when no order is declared. Pages are sorted by `id`
//!   ascending and each page asks for `id_gt: <last id seen>`.

use serde_json::Value;

use super::descriptor::{Filter, FilterOp, FilterValue, OrderDirection, QueryDescriptor};

/// Position of a pagination run
#[derive(Debug, Clone, PartialEq)]
pub enum PageCursor {
    /// Keyset over the declared sort field
    AfterValue {
        /// Sort field of the descriptor
        field: String,
        /// Sort value of the last record received; `None` before the first page
        last: Option<FilterValue>,
        /// Ids already received whose sort value equals `last`
        seen: Vec<String>,
    },
    /// Last id seen in a collection paged by id; `None` before the first page
    AfterId(Option<String>),
}

/// A record lacks a key the cursor needs to move past it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorKeyError {
    /// Index of the record within its page
    pub index: usize,
    /// The missing key
    pub key: String,
}

impl CursorKeyError {
    fn new(index: usize, key: &str) -> Self {
        Self {
            index,
            key: key.to_string(),
        }
    }
}

impl PageCursor {
    /// The cursor a pagination run over `descriptor` starts from
    pub fn start(descriptor: &QueryDescriptor) -> Self {
        match &descriptor.selection().order_by {
            Some(field) => PageCursor::AfterValue {
                field: field.clone(),
                last: None,
                seen: Vec::new(),
            },
            None => PageCursor::AfterId(None),
        }
    }

    /// Move past a page of records
    ///
    /// Fails on the first record without a string `id`, or without a string
    /// or numeric sort value when paging by value. The cursor is left
    /// untouched in that case.
    pub fn advance(&mut self, page: &[Value]) -> Result<(), CursorKeyError> {
        match self {
            PageCursor::AfterValue { field, last, seen } => {
                let mut keys = Vec::with_capacity(page.len());
                for (index, record) in page.iter().enumerate() {
                    let id = record_id(record).ok_or_else(|| CursorKeyError::new(index, "id"))?;
                    let value = sort_value(record.get(field.as_str()))
                        .ok_or_else(|| CursorKeyError::new(index, field.as_str()))?;
                    keys.push((id, value));
                }
                let Some((_, boundary)) = keys.last() else {
                    return Ok(());
                };
                let boundary = boundary.clone();

                if last.as_ref() != Some(&boundary) {
                    seen.clear();
                }
                seen.extend(
                    keys.iter()
                        .filter(|(_, value)| *value == boundary)
                        .map(|(id, _)| id.to_string()),
                );
                *last = Some(boundary);
                Ok(())
            }
            PageCursor::AfterId(last) => {
                if let Some(index) = page.iter().position(|r| record_id(r).is_none()) {
                    return Err(CursorKeyError::new(index, "id"));
                }
                if let Some(id) = page.last().and_then(record_id) {
                    *last = Some(id.to_string());
                }
                Ok(())
            }
        }
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Sort value of a record as a filter literal
///
/// Subgraphs serialize `BigInt` and `BigDecimal` fields as strings and accept
/// them back as string literals.
fn sort_value(value: Option<&Value>) -> Option<FilterValue> {
    match value? {
        Value::String(value) => Some(FilterValue::Str(value.clone())),
        Value::Number(number) => Some(
            number
                .as_i64()
                .map_or_else(|| FilterValue::Str(number.to_string()), FilterValue::Int),
        ),
        _ => None,
    }
}

/// One bounded request of a pagination run
///
/// Transports must honour [`order`](PageRequest::order),
/// [`filters`](PageRequest::filters) and [`first`](PageRequest::first)
/// exactly; they already fold in the cursor.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    descriptor: &'a QueryDescriptor,
    first: usize,
    cursor: Option<&'a PageCursor>,
}

impl<'a> PageRequest<'a> {
    /// Request up to `first` records from the position of `cursor`
    pub fn new(descriptor: &'a QueryDescriptor, first: usize, cursor: &'a PageCursor) -> Self {
        Self {
            descriptor,
            first,
            cursor: Some(cursor),
        }
    }

    /// Request only the first `first` records, in the descriptor's own order
    pub fn head(descriptor: &'a QueryDescriptor, first: usize) -> Self {
        Self {
            descriptor,
            first,
            cursor: None,
        }
    }

    /// The descriptor this request was derived from
    pub fn descriptor(&self) -> &'a QueryDescriptor {
        self.descriptor
    }

    /// Entity collection to query
    pub fn entity(&self) -> &'a str {
        self.descriptor.entity()
    }

    /// Maximum number of records to return
    pub fn first(&self) -> usize {
        self.first
    }

    /// Effective sort field and direction
    pub fn order(&self) -> Option<(&'a str, OrderDirection)> {
        match self.cursor {
            Some(PageCursor::AfterId(_)) => Some(("id", OrderDirection::Asc)),
            _ => {
                let selection = self.descriptor.selection();
                selection
                    .order_by
                    .as_deref()
                    .map(|field| (field, selection.order_direction))
            }
        }
    }

    /// Effective constraints, including the cursor's own
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = self.descriptor.selection().filters.clone();
        match self.cursor {
            Some(PageCursor::AfterId(Some(last))) => {
                filters.push(Filter::new("id", FilterOp::Gt, last.as_str()));
            }
            Some(PageCursor::AfterValue {
                field,
                last: Some(last),
                seen,
            }) => {
                let op = match self.descriptor.selection().order_direction {
                    OrderDirection::Desc => FilterOp::Lte,
                    OrderDirection::Asc => FilterOp::Gte,
                };
                let bound = Filter::new(field.as_str(), op, last.clone());
                // The last value came from a record inside the descriptor's
                // own bound, so the cursor bound is at least as tight
                filters.retain(|filter| filter.key() != bound.key());
                filters.push(bound);
                if !seen.is_empty() {
                    let ids = seen.iter().map(|id| FilterValue::from(id.as_str())).collect();
                    filters.push(Filter::new("id", FilterOp::NotIn, FilterValue::List(ids)));
                }
            }
            _ => {}
        }
        filters
    }

    /// Effective field selections
    ///
    /// A cursor needs `id` and the sort field on every record, so they are
    /// requested when the descriptor leaves them out.
    pub fn properties(&self) -> Vec<&'a str> {
        let mut properties: Vec<&str> = self
            .descriptor
            .properties()
            .iter()
            .map(String::as_str)
            .collect();
        let mut required = Vec::with_capacity(2);
        match self.cursor {
            Some(PageCursor::AfterId(_)) => required.push("id"),
            Some(PageCursor::AfterValue { field, .. }) => {
                required.push("id");
                required.push(field.as_str());
            }
            None => {}
        }
        for (position, key) in required.into_iter().enumerate() {
            if !properties.contains(&key) {
                properties.insert(position, key);
            }
        }
        properties
    }
}
