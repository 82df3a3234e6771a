//! Request/response correlation table.
//!
//! Each session owns one table. A slot is registered under a fresh ID before
//! the request frame is written and is removed exactly once: either by the
//! reader when the matching response arrives, or by the slot's guard when the
//! caller stops waiting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::BinanceError;
use crate::ws::messages::WsApiResponse;

/// Pending response slots keyed by correlation ID.
#[derive(Debug, Default)]
pub struct PendingResponses {
    slots: Mutex<HashMap<String, oneshot::Sender<WsApiResponse>>>,
}

impl PendingResponses {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slot under `id`.
    ///
    /// The returned guard removes the entry when dropped, so a caller that
    /// times out or is cancelled never leaves an orphan behind.
    pub fn register(self: &Arc<Self>, id: impl Into<String>) -> PendingSlot {
        let id = id.into();
        let (sender, receiver) = oneshot::channel();
        self.lock().insert(id.clone(), sender);
        PendingSlot {
            id,
            table: Arc::clone(self),
            receiver,
        }
    }

    /// Deliver a response to the slot registered under `id`.
    ///
    /// Returns `false` when no slot is waiting, e.g. for a duplicate or late
    /// frame.
    pub fn deliver(&self, id: &str, response: WsApiResponse) -> bool {
        match self.lock().remove(id) {
            Some(sender) => sender.send(response).is_ok(),
            None => false,
        }
    }

    /// Drop every slot so their waiters fail fast.
    pub fn close(&self) {
        self.lock().clear();
    }

    /// Number of registered slots.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no slot is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn remove(&self, id: &str) {
        self.lock().remove(id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, oneshot::Sender<WsApiResponse>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A registered slot awaiting one response.
#[derive(Debug)]
pub struct PendingSlot {
    id: String,
    table: Arc<PendingResponses>,
    receiver: oneshot::Receiver<WsApiResponse>,
}

impl PendingSlot {
    /// Correlation ID of this slot.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the response.
    ///
    /// Fails with [`BinanceError::ConnectionClosed`] if the session shut down
    /// before the response arrived.
    pub async fn recv(&mut self) -> Result<WsApiResponse, BinanceError> {
        (&mut self.receiver)
            .await
            .map_err(|_| BinanceError::ConnectionClosed {
                reason: "session closed before the response arrived".to_string(),
            })
    }
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        self.table.remove(&self.id);
    }
}
