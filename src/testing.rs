//! Scripted transports for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy_primitives::BlockNumber;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use url::Url;

use crate::errors::TransportError;
use crate::query::{Filter, LiveQuery, OrderDirection, PageRequest};
use crate::transport::{EventStream, LiveTransport, QueryTransport};

/// What a transport was asked for
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub(crate) endpoint: String,
    pub(crate) entity: String,
    pub(crate) first: usize,
    pub(crate) order: Option<(String, OrderDirection)>,
    pub(crate) filters: Vec<Filter>,
    pub(crate) block: Option<BlockNumber>,
}

/// Answers requests with pre-scripted pages, in order
///
/// Once the script runs out every request gets an empty page.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Vec<Value>, String>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, records: Vec<Value>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(records));
        self
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryTransport for ScriptedTransport {
    async fn fetch(
        &self,
        endpoint: &Url,
        request: &PageRequest<'_>,
    ) -> Result<Vec<Value>, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            endpoint: endpoint.to_string(),
            entity: request.entity().to_string(),
            first: request.first(),
            order: request
                .order()
                .map(|(field, direction)| (field.to_string(), direction)),
            filters: request.filters(),
            block: request.descriptor().block(),
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(records)) => Ok(records),
            Some(Err(message)) => Err(TransportError::request_failed(
                "scripted",
                std::io::Error::other(message),
            )),
            None => Ok(Vec::new()),
        }
    }
}

/// Live transport whose channels are fed by the test
#[derive(Default)]
pub(crate) struct ChannelLive {
    channels: Mutex<Vec<Option<mpsc::UnboundedSender<Result<Value, TransportError>>>>>,
    queries: Mutex<Vec<String>>,
    refuse: bool,
}

impl ChannelLive {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every `open` fails
    pub(crate) fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Number of channels opened so far
    pub(crate) fn opened(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    /// Documents of every opened live query
    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Push an event on the most recently opened channel
    pub(crate) fn push(&self, event: Result<Value, TransportError>) {
        let channels = self.channels.lock().unwrap();
        channels
            .last()
            .and_then(Option::as_ref)
            .expect("no open channel")
            .send(event)
            .expect("channel reader gone");
    }

    /// End the most recently opened channel
    pub(crate) fn finish(&self) {
        if let Some(last) = self.channels.lock().unwrap().last_mut() {
            last.take();
        }
    }

    /// Whether the reader of the most recently opened channel is gone
    pub(crate) fn is_closed(&self) -> bool {
        self.channels
            .lock()
            .unwrap()
            .last()
            .and_then(Option::as_ref)
            .is_none_or(|sender| sender.is_closed())
    }
}

#[async_trait]
impl LiveTransport for ChannelLive {
    async fn open(
        &self,
        _endpoint: &Url,
        query: &LiveQuery,
    ) -> Result<EventStream, TransportError> {
        if self.refuse {
            return Err(TransportError::protocol("connection refused"));
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        self.channels.lock().unwrap().push(Some(sender));
        self.queries
            .lock()
            .unwrap()
            .push(query.document().to_string());
        Ok(Box::pin(futures::stream::unfold(
            receiver,
            |mut receiver| async move { receiver.recv().await.map(|event| (event, receiver)) },
        )))
    }
}
