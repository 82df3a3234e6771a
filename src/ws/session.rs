//! One live WebSocket API connection.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, broadcast, oneshot};
use tokio::time::{Instant, Interval, interval_at};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::BinanceError;
use crate::request::Params;
use crate::ws::config::WsConfig;
use crate::ws::correlation::PendingResponses;
use crate::ws::events::UserDataEvent;
use crate::ws::messages::{InboundFrame, WsApiRequest, WsApiResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsReceiver = SplitStream<WsStream>;

/// Resolves when the session terminates without having been stopped.
///
/// The sender is dropped instead when the session is stopped on purpose, so
/// awaiting it yields `Err` for a deliberate close.
pub type DisconnectSignal = oneshot::Receiver<()>;

/// A single WebSocket API connection.
///
/// A background reader task owns the receive half and demultiplexes frames:
/// responses are routed to their pending slot by ID, push events are published
/// on the event channel. Writers share the send half behind a mutex.
pub struct WsSession {
    url: String,
    sink: Arc<Mutex<WsSink>>,
    pending: Arc<PendingResponses>,
    stop: CancellationToken,
    response_timeout: Duration,
}

impl std::fmt::Debug for WsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSession")
            .field("url", &self.url)
            .field("pending", &self.pending.len())
            .field("stopped", &self.stop.is_cancelled())
            .finish()
    }
}

impl WsSession {
    /// Dial `url` and start the reader task.
    ///
    /// `parent` bounds the session's lifetime: cancelling it stops the reader
    /// like [`WsSession::close`] does.
    pub async fn connect(
        url: &str,
        config: &WsConfig,
        events: broadcast::Sender<UserDataEvent>,
        parent: &CancellationToken,
    ) -> Result<(Arc<Self>, DisconnectSignal), BinanceError> {
        let endpoint = url::Url::parse(url)?;
        let handshake = connect_async(endpoint.as_str());
        let (ws_stream, _) = tokio::time::timeout(config.handshake_timeout, handshake)
            .await
            .map_err(|_| BinanceError::WebSocketMsg(format!("Handshake with {url} timed out")))?
            .map_err(|e| BinanceError::WebSocketMsg(format!("Failed to connect to {url}: {e}")))?;

        let (sink, receiver) = ws_stream.split();
        let session = Arc::new(Self {
            url: url.to_string(),
            sink: Arc::new(Mutex::new(sink)),
            pending: Arc::new(PendingResponses::new()),
            stop: parent.child_token(),
            response_timeout: config.response_timeout,
        });

        let (disconnected_tx, disconnected_rx) = oneshot::channel();
        let reader = Reader {
            receiver,
            sink: Arc::clone(&session.sink),
            pending: Arc::clone(&session.pending),
            events,
            stop: session.stop.clone(),
            keepalive: config.keepalive_interval,
        };
        tokio::spawn(reader.run(disconnected_tx));

        tracing::debug!(url, "WebSocket session established");
        Ok((session, disconnected_rx))
    }

    /// Send a request and wait for its correlated response.
    ///
    /// Completes with whichever comes first: the response, `cancel` firing
    /// ([`BinanceError::Cancelled`]), or the response timeout
    /// ([`BinanceError::Timeout`]). The pending slot is released on every path.
    pub async fn call(
        &self,
        method: &str,
        params: &Params,
        cancel: &CancellationToken,
    ) -> Result<WsApiResponse, BinanceError> {
        if self.stop.is_cancelled() {
            return Err(BinanceError::NotConnected);
        }

        let id = Uuid::new_v4().to_string();
        let mut slot = self.pending.register(id.as_str());

        let json = serde_json::to_string(&WsApiRequest::new(&id, method, params))?;
        tracing::debug!(%id, method, "Sending WebSocket API request");

        tokio::select! {
            _ = cancel.cancelled() => return Err(BinanceError::Cancelled),
            sent = self.send_text(json) => sent?,
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(BinanceError::Cancelled),
            _ = tokio::time::sleep(self.response_timeout) => {
                tracing::debug!(%id, method, "WebSocket API request timed out");
                Err(BinanceError::Timeout)
            }
            response = slot.recv() => response,
        }
    }

    /// Stop the session. The reader closes the connection and exits without
    /// raising the disconnect signal.
    pub fn close(&self) {
        self.stop.cancel();
    }

    /// Whether the session has been stopped.
    pub fn is_closed(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// URL this session is connected to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of requests awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    async fn send_text(&self, json: String) -> Result<(), BinanceError> {
        let mut sink = self.sink.lock().await;
        sink.send(WsMessage::Text(json.into()))
            .await
            .map_err(|e| BinanceError::WebSocketMsg(format!("Failed to send message: {e}")))
    }
}

struct Reader {
    receiver: WsReceiver,
    sink: Arc<Mutex<WsSink>>,
    pending: Arc<PendingResponses>,
    events: broadcast::Sender<UserDataEvent>,
    stop: CancellationToken,
    keepalive: Option<Duration>,
}

impl Reader {
    async fn run(mut self, disconnected: oneshot::Sender<()>) {
        let mut ping_timer = self
            .keepalive
            .map(|period| interval_at(Instant::now() + period, period));
        let mut awaiting_traffic = false;

        loop {
            tokio::select! {
                _ = self.stop.cancelled() => break,
                _ = tick(&mut ping_timer) => {
                    if awaiting_traffic {
                        tracing::warn!("No traffic since last keepalive ping, dropping session");
                        break;
                    }
                    awaiting_traffic = true;
                    let mut sink = self.sink.lock().await;
                    if let Err(e) = sink.send(WsMessage::Ping(Default::default())).await {
                        tracing::warn!("Failed to send keepalive ping: {}", e);
                        break;
                    }
                }
                msg = self.receiver.next() => {
                    awaiting_traffic = false;
                    match msg {
                        Some(Ok(WsMessage::Text(text))) => self.handle_frame(text.as_str()),
                        Some(Ok(WsMessage::Binary(data))) => match std::str::from_utf8(&data) {
                            Ok(text) => self.handle_frame(text),
                            Err(e) => tracing::warn!("Dropping non UTF-8 binary frame: {}", e),
                        },
                        Some(Ok(WsMessage::Close(frame))) => {
                            tracing::debug!(?frame, "Server closed the WebSocket session");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("WebSocket read failed: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
            }
        }

        self.pending.close();

        if self.stop.is_cancelled() {
            let mut sink = self.sink.lock().await;
            let _ = sink.send(WsMessage::Close(None)).await;
            let _ = sink.close().await;
            tracing::debug!("WebSocket session stopped");
            return;
        }

        // Unexpected termination: stop the session so later callers fail
        // fast, then raise the signal for the supervisor.
        self.stop.cancel();
        let _ = disconnected.send(());
    }

    fn handle_frame(&self, text: &str) {
        match InboundFrame::parse(text) {
            Ok(InboundFrame::Response(response)) => {
                let id = response.id.clone().unwrap_or_default();
                tracing::debug!(%id, status = response.status, "Received WebSocket API response");
                if !self.pending.deliver(&id, response) {
                    tracing::debug!(%id, "Dropping response with no pending request");
                }
            }
            Ok(InboundFrame::Event {
                subscription_id,
                event,
            }) => {
                tracing::debug!(
                    subscription_id,
                    event_type = event.event_type(),
                    "Received user data event"
                );
                // No receivers is not an error.
                let _ = self.events.send(event);
            }
            Err(e) => {
                tracing::warn!("Failed to decode WebSocket frame: {}", e);
            }
        }
    }
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}
