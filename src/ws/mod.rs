//! WebSocket API transport.
//!
//! A [`WsSession`] owns one connection. Requests are written as
//! `{"id", "method", "params"}` frames and matched to their responses by ID;
//! push frames carrying a `subscriptionId` are decoded into
//! [`UserDataEvent`]s. The client keeps one session at a time and a
//! background supervisor replaces it after an unexpected disconnect.

mod config;
pub(crate) mod connection;
mod correlation;
pub mod events;
mod messages;
mod session;
mod supervisor;
mod user_data;

pub use config::{
    ConnectionState, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_RECONNECT_INTERVAL,
    DEFAULT_RESPONSE_TIMEOUT, FUTURES_RESPONSE_TIMEOUT, WsConfig, WsConfigBuilder,
};
pub use correlation::{PendingResponses, PendingSlot};
pub use events::UserDataEvent;
pub use messages::{InboundFrame, WsApiRequest, WsApiResponse};
pub use session::{DisconnectSignal, WsSession};
pub use user_data::UserDataStream;
