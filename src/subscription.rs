// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Live subscriptions with listener fan-out.
//!
//! A [`SubscriptionBridge`] turns a live query into an [`Observation`]: a
//! multicast source that any number of listeners can subscribe to. All
//! listeners of one observation share a single channel to the subgraph.
//!
//! # Lifecycle
//!
//! - The channel is opened when the first listener subscribes.
//! - Every pushed payload is transformed once and delivered to each current
//!   listener, in arrival order.
//! - When the last listener goes away the channel is closed. A later
//!   subscription opens a fresh one.
//! - When the channel completes, or cannot be opened, every listener's
//!   stream ends (after receiving the error, if there was one).
//!
//! A payload the transform rejects is delivered to listeners as a
//! [`SubscriptionError::Transform`] item; the subscription keeps running.
//!
//! # Examples
//!
//! ```rust,ignore
//! use futures::StreamExt;
//!
//! let observation = client.maker().observe_pending_servings()?;
//!
//! // Stream style
//! let mut subscription = observation.subscribe();
//! while let Some(update) = subscription.next().await {
//!     match update {
//!         Ok(servings) => println!("{} pending", servings.len()),
//!         Err(e) => eprintln!("update failed: {e}"),
//!     }
//! }
//!
//! // Callback style
//! let handle = observation.subscribe_with(
//!     Observer::new(|servings: Vec<PendingServing>| println!("{}", servings.len()))
//!         .on_error(|e| eprintln!("{e}")),
//! );
//! handle.dispose();
//! ```

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};
use url::Url;

use crate::errors::{SubscriptionError, TransformError};
use crate::query::LiveQuery;
use crate::tracing::spans;
use crate::transport::LiveTransport;

type Transform<T> = Box<dyn Fn(Value) -> Result<T, TransformError> + Send + Sync>;
type Listener<T> = mpsc::UnboundedSender<Result<T, SubscriptionError>>;

/// Creates observations over a [`LiveTransport`]
#[derive(Clone)]
pub struct SubscriptionBridge {
    live: Arc<dyn LiveTransport>,
}

impl SubscriptionBridge {
    pub fn new(live: Arc<dyn LiveTransport>) -> Self {
        Self { live }
    }

    /// Observe `query` on `endpoint`, mapping every payload with `transform`
    ///
    /// Nothing is opened until the first listener subscribes.
    pub fn observe<T, F>(&self, endpoint: Url, query: LiveQuery, transform: F) -> Observation<T>
    where
        T: Clone + Send + 'static,
        F: Fn(Value) -> Result<T, TransformError> + Send + Sync + 'static,
    {
        Observation {
            shared: Arc::new(Shared {
                live: self.live.clone(),
                endpoint,
                query,
                transform: Box::new(transform),
                registry: Mutex::new(Registry::default()),
                idle: Notify::new(),
            }),
        }
    }
}

struct Registry<T> {
    next_id: u64,
    listeners: HashMap<u64, Listener<T>>,
    pumping: bool,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: HashMap::new(),
            pumping: false,
        }
    }
}

struct Shared<T> {
    live: Arc<dyn LiveTransport>,
    endpoint: Url,
    query: LiveQuery,
    transform: Transform<T>,
    registry: Mutex<Registry<T>>,
    /// Signalled whenever a listener leaves
    idle: Notify,
}

impl<T: Clone + Send + 'static> Shared<T> {
    fn registry(&self) -> MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener, starting the pump if none is running
    fn register(self: &Arc<Self>, listener: Listener<T>) -> u64 {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, listener);

        if !registry.pumping {
            registry.pumping = true;
            let span = spans::live_pump(self.query.entity());
            tokio::spawn(pump(self.clone()).instrument(span));
        }
        id
    }

    fn unregister(&self, id: u64) {
        let mut registry = self.registry();
        if registry.listeners.remove(&id).is_some() && registry.listeners.is_empty() {
            self.idle.notify_one();
        }
    }

    /// Deliver one event to every listener
    ///
    /// Returns `false` when no listener is left, in which case the pump
    /// has been marked stopped.
    fn broadcast(&self, event: Result<T, SubscriptionError>) -> bool {
        let mut registry = self.registry();
        registry
            .listeners
            .retain(|_, listener| listener.send(event.clone()).is_ok());
        if registry.listeners.is_empty() {
            registry.pumping = false;
            return false;
        }
        true
    }

    /// Stop the pump if nobody is listening any more
    fn stop_if_idle(&self) -> bool {
        let mut registry = self.registry();
        if registry.listeners.is_empty() {
            registry.pumping = false;
            return true;
        }
        false
    }

    /// End every listener's stream and stop the pump
    fn complete(&self) {
        let mut registry = self.registry();
        registry.listeners.clear();
        registry.pumping = false;
    }

    fn listener_count(&self) -> usize {
        self.registry().listeners.len()
    }
}

/// Open the channel and forward its payloads until it ends or nobody listens
async fn pump<T: Clone + Send + 'static>(shared: Arc<Shared<T>>) {
    let mut events = match shared.live.open(&shared.endpoint, &shared.query).await {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "Failed to open live channel");
            shared.broadcast(Err(SubscriptionError::from(e)));
            shared.complete();
            return;
        }
    };
    info!(endpoint = %shared.endpoint, "Live channel open");

    loop {
        tokio::select! {
            _ = shared.idle.notified() => {
                if shared.stop_if_idle() {
                    debug!("Last listener left, closing live channel");
                    return;
                }
            }
            event = events.next() => match event {
                Some(Ok(payload)) => {
                    let event = (shared.transform)(payload).map_err(SubscriptionError::from);
                    if let Err(e) = &event {
                        warn!(error = %e, "Failed to transform live payload");
                    }
                    if !shared.broadcast(event) {
                        debug!("No listeners left, closing live channel");
                        return;
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Live channel error");
                    if !shared.broadcast(Err(SubscriptionError::from(e))) {
                        return;
                    }
                }
                None => {
                    info!("Live channel completed");
                    shared.complete();
                    return;
                }
            }
        }
    }
}

/// A multicast source of transformed live-query results
///
/// Cloning an observation shares its channel and listeners.
pub struct Observation<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Observation<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Observation<T> {
    /// Add a listener and receive events as a stream
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.shared.register(sender);
        Subscription {
            id,
            receiver,
            shared: self.shared.clone(),
        }
    }

    /// Add a listener driven by callbacks
    ///
    /// Callbacks run on a spawned task. Disposing (or dropping) the returned
    /// handle removes the listener without calling `complete`.
    pub fn subscribe_with(&self, observer: Observer<T>) -> SubscriptionHandle {
        let mut subscription = self.subscribe();
        let Observer {
            mut next,
            mut error,
            complete,
        } = observer;

        let task = tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                match event {
                    Ok(value) => next(value),
                    Err(e) => {
                        if let Some(error) = error.as_mut() {
                            error(e);
                        }
                    }
                }
            }
            if let Some(complete) = complete {
                complete();
            }
        });
        SubscriptionHandle { task }
    }

    /// Number of listeners currently subscribed
    pub fn listener_count(&self) -> usize {
        self.shared.listener_count()
    }
}

/// One listener's stream of events
///
/// Ends when the channel completes. Dropping it unsubscribes.
pub struct Subscription<T: Clone + Send + 'static> {
    id: u64,
    receiver: mpsc::UnboundedReceiver<Result<T, SubscriptionError>>,
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Subscription<T> {
    /// Stop listening
    pub fn dispose(self) {}
}

impl<T: Clone + Send + 'static> Stream for Subscription<T> {
    type Item = Result<T, SubscriptionError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T: Clone + Send + 'static> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.shared.unregister(self.id);
    }
}

/// Callbacks for [`Observation::subscribe_with`]
pub struct Observer<T> {
    next: Box<dyn FnMut(T) + Send>,
    error: Option<Box<dyn FnMut(SubscriptionError) + Send>>,
    complete: Option<Box<dyn FnOnce() + Send>>,
}

impl<T> Observer<T> {
    /// Observer calling `next` for every event
    pub fn new(next: impl FnMut(T) + Send + 'static) -> Self {
        Self {
            next: Box::new(next),
            error: None,
            complete: None,
        }
    }

    /// Called for every error item
    pub fn on_error(mut self, error: impl FnMut(SubscriptionError) + Send + 'static) -> Self {
        self.error = Some(Box::new(error));
        self
    }

    /// Called once when the channel completes
    pub fn on_complete(mut self, complete: impl FnOnce() + Send + 'static) -> Self {
        self.complete = Some(Box::new(complete));
        self
    }
}

/// Handle to a callback subscription
///
/// Dropping the handle disposes the subscription.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stop delivering events to the observer
    pub fn dispose(self) {}

    /// Whether the observer may still receive events
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
