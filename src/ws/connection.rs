//! The client's WebSocket connection slot and its state machine.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::{Mutex, broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::error::BinanceError;
use crate::ws::config::{ConnectionState, WsConfig};
use crate::ws::events::UserDataEvent;
use crate::ws::session::{DisconnectSignal, WsSession};
use crate::ws::supervisor;

/// Holds the current [`WsSession`] and the [`ConnectionState`].
///
/// The session reference is swapped atomically by the supervisor after a
/// successful redial; callers load it without locking.
pub(crate) struct WsConnection {
    url: String,
    config: WsConfig,
    session: ArcSwapOption<WsSession>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<UserDataEvent>,
    shutdown: CancellationToken,
    // Held across the first dial so concurrent `connect` calls dial once.
    first_dial: Mutex<()>,
}

impl WsConnection {
    pub(crate) fn new(
        url: String,
        config: WsConfig,
        events: broadcast::Sender<UserDataEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            url,
            config,
            session: ArcSwapOption::empty(),
            state: watch::Sender::new(ConnectionState::Init),
            events,
            shutdown,
            first_dial: Mutex::new(()),
        }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn config(&self) -> &WsConfig {
        &self.config
    }

    /// Dial a fresh session without touching the held reference.
    pub(crate) async fn dial(&self) -> Result<(Arc<WsSession>, DisconnectSignal), BinanceError> {
        WsSession::connect(&self.url, &self.config, self.events.clone(), &self.shutdown).await
    }

    /// Establish the first session. A failed dial is reported as `false` and
    /// leaves the state at `Init`. Concurrent callers wait for the dial in
    /// progress and report its outcome.
    pub(crate) async fn connect(self: &Arc<Self>) -> bool {
        let _dialing = self.first_dial.lock().await;
        match self.state() {
            ConnectionState::Init => {}
            state => return state == ConnectionState::Connected,
        }

        match self.dial().await {
            Ok((session, disconnected)) => {
                self.session.store(Some(session));
                self.state.send_replace(ConnectionState::Connected);
                supervisor::spawn(Arc::downgrade(self), disconnected, self.shutdown.clone());
                tracing::info!(url = %self.url, "WebSocket API connected");
                true
            }
            Err(e) => {
                tracing::warn!(url = %self.url, "WebSocket API unavailable, using HTTP only: {}", e);
                false
            }
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub(crate) fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// The session to use for a call, only while `Connected`.
    pub(crate) fn active_session(&self) -> Option<Arc<WsSession>> {
        if self.state() != ConnectionState::Connected {
            return None;
        }
        self.session.load_full().filter(|session| !session.is_closed())
    }

    /// The held session reference regardless of state.
    pub(crate) fn current_session(&self) -> Option<Arc<WsSession>> {
        self.session.load_full()
    }

    /// Caller-initiated close: `Connected -> AdminClosing`.
    pub(crate) fn close(&self) -> bool {
        let closed = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                *state = ConnectionState::AdminClosing;
                true
            } else {
                false
            }
        });
        if closed {
            if let Some(session) = self.session.load_full() {
                session.close();
            }
            tracing::info!(url = %self.url, "WebSocket API closed");
        }
        closed
    }

    /// `Connected -> Connecting` after an unexpected disconnect. Returns
    /// `false` when the connection must not be re-established.
    pub(crate) fn begin_reconnect(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                *state = ConnectionState::Connecting;
                true
            } else {
                false
            }
        })
    }

    /// Swap in a redialed session and move `Connecting -> Connected`.
    pub(crate) fn install(&self, session: Arc<WsSession>) -> bool {
        if self.state() != ConnectionState::Connecting {
            session.close();
            return false;
        }
        self.session.store(Some(Arc::clone(&session)));
        let installed = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Connected;
                true
            } else {
                false
            }
        });
        if !installed {
            session.close();
        }
        installed
    }
}

impl std::fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsConnection")
            .field("url", &self.url)
            .field("state", &self.state())
            .finish()
    }
}
