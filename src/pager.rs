// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cursor-based pagination over subgraph entity collections
//!
//! The pager turns one [`QueryDescriptor`] into a sequence of bounded page
//! requests and concatenates the results.
//!
//! # Algorithm
//!
//! - Start from [`PageCursor::start`]: a keyset over the declared sort field
//!   (with `id` breaking ties), or over `id` when no order is declared.
//! - Request up to `page_size` records, strictly one page at a time.
//! - A page shorter than requested means the collection is exhausted. This is
//!   the only exhaustion test; no total count is requested.
//! - Otherwise advance the cursor past the last record of the page and
//!   continue, unless the configured `max_records` cap has been reached.
//!   Records indexed while a run is in progress never shift a later page.
//!
//! # Examples
//!
//! ```rust,ignore
//! use sushidata::pager::Pager;
//! use sushidata::query::{OrderDirection, QueryDescriptor};
//!
//! let pager = Pager::new(transport, endpoint, PageSize::MAX, None);
//! let descriptor = QueryDescriptor::builder("servings")
//!     .order_by("block", OrderDirection::Desc)
//!     .properties(["tx", "block"])
//!     .build();
//!
//! // Everything at once (all-or-nothing)
//! let records = pager.paginate(&descriptor).await?;
//!
//! // Or page by page
//! let mut pages = pager.pages(&descriptor);
//! while let Some(page) = pages.try_next().await? {
//!     println!("{} records", page.len());
//! }
//! ```

use std::sync::Arc;

use futures::{Stream, TryStreamExt};
use serde_json::Value;
use tracing::{debug, warn, Instrument};
use url::Url;

use crate::config::PageSize;
use crate::errors::PageFetchError;
use crate::query::{PageCursor, PageRequest, QueryDescriptor};
use crate::tracing::spans;
use crate::transport::QueryTransport;

/// Progress of one pagination run
struct RunState {
    cursor: PageCursor,
    page: usize,
    fetched: usize,
    done: bool,
}

/// Drives cursor-based pagination against one subgraph endpoint
///
/// A pager holds no per-run state: every call to [`pages`](Pager::pages) or
/// [`paginate`](Pager::paginate) starts a fresh run with its own cursor.
#[derive(Clone)]
pub struct Pager {
    transport: Arc<dyn QueryTransport>,
    endpoint: Url,
    page_size: PageSize,
    max_records: Option<usize>,
}

impl Pager {
    /// Creates a pager for an endpoint
    ///
    /// # Arguments
    ///
    /// * `transport` - Request/response transport used for every page
    /// * `endpoint` - Subgraph endpoint to page through
    /// * `page_size` - Records requested per page
    /// * `max_records` - Hard cap on records gathered by one run
    pub fn new(
        transport: Arc<dyn QueryTransport>,
        endpoint: Url,
        page_size: PageSize,
        max_records: Option<usize>,
    ) -> Self {
        Self {
            transport,
            endpoint,
            page_size,
            max_records,
        }
    }

    /// The endpoint this pager queries
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Records to request next, given how many a run already holds
    fn next_page_len(&self, fetched: usize) -> usize {
        let page_size = self.page_size.as_usize();
        match self.max_records {
            Some(cap) => page_size.min(cap.saturating_sub(fetched)),
            None => page_size,
        }
    }

    /// Lazily page through the records selected by `descriptor`
    ///
    /// Pages are requested one at a time as the stream is polled, so page
    /// N+1 is never requested before page N has arrived. The stream ends
    /// after the first short page or once `max_records` is reached, and ends
    /// with an error item if a request fails.
    ///
    /// A short page is the only exhaustion signal, so a run over `R` records
    /// makes `R / page_size + 1` requests. When `R` is an exact multiple of
    /// the page size the last request comes back empty.
    pub fn pages<'a>(
        &'a self,
        descriptor: &'a QueryDescriptor,
    ) -> impl Stream<Item = Result<Vec<Value>, PageFetchError>> + Send + 'a {
        let state = RunState {
            cursor: PageCursor::start(descriptor),
            page: 0,
            fetched: 0,
            done: false,
        };

        futures::stream::try_unfold(state, move |mut state| async move {
            if state.done {
                return Ok(None);
            }

            let first = self.next_page_len(state.fetched);
            if first == 0 {
                warn!(
                    entity = descriptor.entity(),
                    fetched = state.fetched,
                    "Reached max_records cap, stopping pagination"
                );
                return Ok(None);
            }

            let request = PageRequest::new(descriptor, first, &state.cursor);
            let records = self
                .transport
                .fetch(&self.endpoint, &request)
                .instrument(spans::fetch_page(descriptor.entity(), state.page, first))
                .await
                .map_err(|e| PageFetchError::transport(descriptor.entity(), state.page, e))?;

            debug!(
                entity = descriptor.entity(),
                page = state.page,
                requested = first,
                received = records.len(),
                "Fetched page"
            );

            state
                .cursor
                .advance(&records)
                .map_err(|e| PageFetchError::MissingCursorKey {
                    entity: descriptor.entity().to_string(),
                    page: state.page,
                    index: e.index,
                    key: e.key,
                })?;

            state.done = records.len() < first;
            state.fetched += records.len();
            state.page += 1;

            Ok(Some((records, state)))
        })
    }

    /// Fetch every record selected by `descriptor`
    ///
    /// Returns the concatenation of all pages in the order the subgraph
    /// returned them. If any page fails, the records already fetched are
    /// discarded and the error is returned.
    pub async fn paginate(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<Value>, PageFetchError> {
        let span = spans::paginate(descriptor.entity(), descriptor.block());
        async move {
            let records: Vec<Value> = self.pages(descriptor).try_concat().await?;
            debug!(
                entity = descriptor.entity(),
                records = records.len(),
                "Pagination complete"
            );
            Ok(records)
        }
        .instrument(span)
        .await
    }

    /// Fetch at most `first` records in a single request
    ///
    /// For lookups that only ever want the head of a collection, such as the
    /// single maker record or the nearest block.
    pub async fn fetch_first(
        &self,
        descriptor: &QueryDescriptor,
        first: usize,
    ) -> Result<Vec<Value>, PageFetchError> {
        let request = PageRequest::head(descriptor, first);
        self.transport
            .fetch(&self.endpoint, &request)
            .instrument(spans::fetch_page(descriptor.entity(), 0, first))
            .await
            .map_err(|e| PageFetchError::transport(descriptor.entity(), 0, e))
    }
}
