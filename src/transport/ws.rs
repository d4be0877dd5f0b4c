// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Live queries over WebSocket.
//!
//! Speaks the `graphql-ws` sub-protocol used by the hosted service
//! (subscriptions-transport-ws):
//!
//! ```text
//! client                      server
//!   connection_init  ───────▶
//!                    ◀───────  connection_ack
//!   start {query}    ───────▶
//!                    ◀───────  data {payload}   (repeated)
//!                    ◀───────  ka               (keep-alive)
//!   stop             ───────▶
//! ```
//!
//! When the socket drops, the connection task reconnects with exponential
//! backoff and issues the query again. Each `data` message carries the full
//! result of the live query, so the first payload after a reconnect
//! supersedes anything pushed while disconnected. If the channel cannot be
//! re-established the stream yields [`TransportError::ChannelClosed`] and ends.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn, Instrument};
use url::Url;

use super::http::GraphQlResponse;
use super::{EventStream, LiveTransport};
use crate::config::ReconnectConfig;
use crate::errors::TransportError;
use crate::query::LiveQuery;
use crate::tracing::spans;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const SUBPROTOCOL: &str = "graphql-ws";

// One live query per connection
const OPERATION_ID: &str = "1";

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage<'a> {
    ConnectionInit { payload: Value },
    Start { id: &'a str, payload: StartPayload<'a> },
    Stop { id: &'a str },
    ConnectionTerminate,
}

#[derive(Debug, Serialize)]
struct StartPayload<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    ConnectionAck,
    ConnectionError {
        #[serde(default)]
        payload: Value,
    },
    Ka,
    Data {
        payload: GraphQlResponse,
    },
    Error {
        #[serde(default)]
        payload: Value,
    },
    Complete,
    #[serde(other)]
    Unknown,
}

/// How a connected socket stopped forwarding
#[derive(Debug)]
enum Outcome {
    /// The server completed the live query
    Completed,
    /// Nobody reads the event stream any more
    ListenerGone,
    /// The socket dropped
    Disconnected(TransportError),
}

/// How a reconnect attempt series ended
enum Reconnect {
    Connected(Socket),
    ListenerGone,
    GaveUp(u32),
}

/// [`LiveTransport`] over WebSocket using `tokio-tungstenite`
///
/// Each opened channel runs on its own task, which exits when the returned
/// stream is dropped.
#[derive(Debug, Clone, Default)]
pub struct WsTransport {
    reconnect: ReconnectConfig,
}

impl WsTransport {
    /// Create a transport with the given reconnection policy
    pub fn new(reconnect: ReconnectConfig) -> Self {
        Self { reconnect }
    }
}

#[async_trait]
impl LiveTransport for WsTransport {
    async fn open(
        &self,
        endpoint: &Url,
        query: &LiveQuery,
    ) -> Result<EventStream, TransportError> {
        let socket = connect(endpoint, query).await?;
        info!(%endpoint, entity = query.entity(), "Live query started");

        let (events, receiver) = mpsc::unbounded_channel();
        let span = spans::live_connection(endpoint.as_str());
        tokio::spawn(
            run(
                socket,
                endpoint.clone(),
                query.clone(),
                self.reconnect.clone(),
                events,
            )
            .instrument(span),
        );

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        });
        Ok(Box::pin(stream))
    }
}

async fn run(
    mut socket: Socket,
    endpoint: Url,
    query: LiveQuery,
    reconnect: ReconnectConfig,
    events: mpsc::UnboundedSender<Result<Value, TransportError>>,
) {
    loop {
        let outcome = tokio::select! {
            _ = events.closed() => Outcome::ListenerGone,
            outcome = forward(&mut socket, &events) => outcome,
        };

        match outcome {
            Outcome::Completed => {
                debug!("Live query completed by server");
                close(&mut socket).await;
                return;
            }
            Outcome::ListenerGone => {
                debug!("Live query has no reader, stopping");
                stop(&mut socket).await;
                return;
            }
            Outcome::Disconnected(reason) => {
                warn!(error = %reason, "Live channel disconnected");
                match reestablish(&endpoint, &query, &reconnect, &events).await {
                    Reconnect::Connected(fresh) => socket = fresh,
                    Reconnect::ListenerGone => return,
                    Reconnect::GaveUp(attempts) => {
                        warn!(attempts, "Giving up on live channel");
                        let _ = events.send(Err(TransportError::ChannelClosed {
                            endpoint: endpoint.to_string(),
                            attempts,
                        }));
                        return;
                    }
                }
            }
        }
    }
}

/// Forward `data` payloads until the socket stops delivering them
async fn forward(
    socket: &mut Socket,
    events: &mpsc::UnboundedSender<Result<Value, TransportError>>,
) -> Outcome {
    loop {
        let message = match next_message(socket).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                return Outcome::Disconnected(TransportError::protocol("socket closed by server"))
            }
            Err(e @ TransportError::Protocol { .. }) => {
                if events.send(Err(e)).is_err() {
                    return Outcome::ListenerGone;
                }
                continue;
            }
            Err(e) => return Outcome::Disconnected(e),
        };

        let event = match message {
            ServerMessage::Data { payload } => payload.into_data(),
            ServerMessage::Error { payload } => {
                let _ = events.send(Err(TransportError::protocol(format!(
                    "live query rejected: {payload}"
                ))));
                return Outcome::Completed;
            }
            ServerMessage::Complete => return Outcome::Completed,
            ServerMessage::ConnectionError { payload } => {
                return Outcome::Disconnected(TransportError::protocol(format!(
                    "connection error: {payload}"
                )))
            }
            ServerMessage::ConnectionAck | ServerMessage::Ka | ServerMessage::Unknown => continue,
        };

        if events.send(event).is_err() {
            return Outcome::ListenerGone;
        }
    }
}

async fn reestablish(
    endpoint: &Url,
    query: &LiveQuery,
    reconnect: &ReconnectConfig,
    events: &mpsc::UnboundedSender<Result<Value, TransportError>>,
) -> Reconnect {
    if !reconnect.enabled {
        return Reconnect::GaveUp(0);
    }

    for attempt in 1..=reconnect.max_attempts {
        let delay = reconnect.backoff(attempt);
        debug!(attempt, delay_ms = delay.as_millis() as u64, "Waiting before reconnect");
        tokio::select! {
            _ = events.closed() => return Reconnect::ListenerGone,
            _ = tokio::time::sleep(delay) => {}
        }

        match connect(endpoint, query).await {
            Ok(socket) => {
                info!(attempt, "Live channel re-established");
                return Reconnect::Connected(socket);
            }
            Err(e) => warn!(attempt, error = %e, "Reconnect attempt failed"),
        }
    }

    Reconnect::GaveUp(reconnect.max_attempts)
}

/// Connect, complete the handshake and start the live query
async fn connect(endpoint: &Url, query: &LiveQuery) -> Result<Socket, TransportError> {
    let mut request = endpoint
        .as_str()
        .into_client_request()
        .map_err(|e| TransportError::websocket("build handshake", e))?;
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));

    let (mut socket, _response) = connect_async(request)
        .await
        .map_err(|e| TransportError::websocket("connect", e))?;

    send(
        &mut socket,
        &ClientMessage::ConnectionInit { payload: json!({}) },
    )
    .await?;

    loop {
        match next_message(&mut socket).await? {
            Some(ServerMessage::ConnectionAck) => break,
            Some(ServerMessage::Ka) | Some(ServerMessage::Unknown) => continue,
            Some(ServerMessage::ConnectionError { payload }) => {
                return Err(TransportError::protocol(format!(
                    "connection rejected: {payload}"
                )))
            }
            Some(_) => {
                return Err(TransportError::protocol(
                    "unexpected message before connection_ack",
                ))
            }
            None => {
                return Err(TransportError::protocol(
                    "socket closed before connection_ack",
                ))
            }
        }
    }

    send(
        &mut socket,
        &ClientMessage::Start {
            id: OPERATION_ID,
            payload: StartPayload {
                query: query.document(),
            },
        },
    )
    .await?;

    Ok(socket)
}

async fn send(socket: &mut Socket, message: &ClientMessage<'_>) -> Result<(), TransportError> {
    let text = serde_json::to_string(message)
        .map_err(|e| TransportError::protocol(format!("unencodable client message: {e}")))?;
    socket
        .send(Message::Text(text))
        .await
        .map_err(|e| TransportError::websocket("send", e))
}

/// Next protocol message, or `None` once the socket is closed
async fn next_message(socket: &mut Socket) -> Result<Option<ServerMessage>, TransportError> {
    while let Some(frame) = socket.next().await {
        match frame.map_err(|e| TransportError::websocket("receive", e))? {
            Message::Text(text) => {
                return decode_server_message(&text).map(Some);
            }
            Message::Close(_) => return Ok(None),
            // Pings are answered by tungstenite itself
            _ => continue,
        }
    }
    Ok(None)
}

fn decode_server_message(text: &str) -> Result<ServerMessage, TransportError> {
    serde_json::from_str(text)
        .map_err(|e| TransportError::protocol(format!("undecodable server message: {e}")))
}

/// Stop the live query and close the socket
async fn stop(socket: &mut Socket) {
    if let Err(e) = send(socket, &ClientMessage::Stop { id: OPERATION_ID }).await {
        debug!(error = %e, "Failed to send stop");
    }
    close(socket).await;
}

async fn close(socket: &mut Socket) {
    if let Err(e) = send(socket, &ClientMessage::ConnectionTerminate).await {
        debug!(error = %e, "Failed to send connection_terminate");
    }
    if let Err(e) = socket.close(None).await {
        debug!(error = %e, "Failed to close socket");
    }
}
