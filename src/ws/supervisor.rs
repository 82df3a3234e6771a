//! Reconnection supervisor.
//!
//! One task per client, parked on the current session's disconnect signal.
//! After an unexpected disconnect it redials at a fixed interval until a dial
//! succeeds, swaps the new session in and parks on that session's signal. It
//! exits when the caller closed the connection, when the client shuts down,
//! or when the client is gone.

use std::sync::Weak;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::ws::config::ConnectionState;
use crate::ws::connection::WsConnection;
use crate::ws::session::DisconnectSignal;

pub(crate) fn spawn(
    connection: Weak<WsConnection>,
    disconnected: DisconnectSignal,
    shutdown: CancellationToken,
) {
    tokio::spawn(supervise(connection, disconnected, shutdown));
}

async fn supervise(
    connection: Weak<WsConnection>,
    mut disconnected: DisconnectSignal,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            signal = &mut disconnected => {
                if signal.is_err() {
                    // Stopped on purpose.
                    return;
                }
            }
        }

        let period = {
            let Some(connection) = connection.upgrade() else {
                return;
            };
            if !connection.begin_reconnect() {
                tracing::debug!("Connection closed by caller, not reconnecting");
                return;
            }
            tracing::warn!(
                url = %connection.url(),
                "WebSocket API disconnected, reconnecting"
            );
            connection.config().reconnect_interval
        };

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        disconnected = loop {
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let Some(connection) = connection.upgrade() else {
                return;
            };
            if connection.state() == ConnectionState::AdminClosing {
                return;
            }

            match connection.dial().await {
                Ok((session, signal)) => {
                    if !connection.install(session) {
                        return;
                    }
                    tracing::info!(url = %connection.url(), "WebSocket API reconnected");
                    break signal;
                }
                Err(e) => {
                    tracing::warn!("Reconnect attempt failed: {}", e);
                }
            }
        };
    }
}
