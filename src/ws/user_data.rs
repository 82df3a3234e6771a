//! User data stream over the WebSocket API.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::Deserialize;
use tokio::sync::watch;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::client::{Client, WeakClient};
use crate::endpoints::ws_methods;
use crate::error::BinanceError;
use crate::request::{Request, SecurityType};
use crate::ws::config::ConnectionState;
use crate::ws::events::UserDataEvent;

#[derive(Debug, Deserialize)]
struct SubscribeResult {
    #[serde(rename = "subscriptionId")]
    subscription_id: u64,
}

fn subscribe_request() -> Request {
    Request::ws_only(ws_methods::USER_DATA_STREAM_SUBSCRIBE).security(SecurityType::Signed)
}

/// Stream of [`UserDataEvent`]s for this account.
///
/// The subscription is renewed after every reconnection for as long as the
/// stream is alive. Events missed because the consumer fell behind are
/// skipped with a warning.
pub struct UserDataStream {
    events: BroadcastStream<UserDataEvent>,
    subscription_id: u64,
    _resubscribe: DropGuard,
}

impl UserDataStream {
    /// Subscription ID assigned by the server to the initial subscription.
    pub fn subscription_id(&self) -> u64 {
        self.subscription_id
    }
}

impl std::fmt::Debug for UserDataStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDataStream")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

impl Stream for UserDataStream {
    type Item = UserDataEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.events).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(event)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(skipped)))) => {
                    tracing::warn!(skipped, "User data stream lagged, events dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Client {
    /// Subscribe to the account's user data stream over the WebSocket API.
    ///
    /// Requires credentials and a connected WebSocket API.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use binance_api_client::Client;
    /// use binance_api_client::auth::EnvCredentials;
    /// use futures_util::StreamExt;
    /// use std::sync::Arc;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::builder()
    ///         .credentials(Arc::new(EnvCredentials::try_from_env().ok_or("missing credentials")?))
    ///         .connect()
    ///         .await;
    ///
    ///     let mut stream = client.subscribe_user_data().await?;
    ///     while let Some(event) = stream.next().await {
    ///         println!("{}: {:?}", event.event_type(), event);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn subscribe_user_data(&self) -> Result<UserDataStream, BinanceError> {
        // Subscribe locally first so no event between the response and the
        // stream's creation is lost.
        let receiver = self.subscribe_events();
        let state = self.watch_state();
        let stop = self.shutdown_token().child_token();

        let response = self
            .call_ws_api(subscribe_request(), &stop, &[])
            .await?;
        let result: SubscribeResult = response.json()?;

        tokio::spawn(resubscribe_on_reconnect(
            self.downgrade(),
            state,
            stop.clone(),
        ));

        Ok(UserDataStream {
            events: BroadcastStream::new(receiver),
            subscription_id: result.subscription_id,
            _resubscribe: stop.drop_guard(),
        })
    }
}

async fn resubscribe_on_reconnect(
    client: WeakClient,
    mut state: watch::Receiver<ConnectionState>,
    stop: CancellationToken,
) {
    // Every notification ending in `Connected` is a completed reconnect: the
    // stream only exists once the first session is up, and the state only
    // re-enters `Connected` from `Connecting`.
    loop {
        tokio::select! {
            _ = stop.cancelled() => return,
            changed = state.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }

        let current = *state.borrow_and_update();
        match current {
            ConnectionState::AdminClosing => return,
            ConnectionState::Connected => {
                let Some(client) = client.upgrade() else {
                    return;
                };
                match client.call_ws_api(subscribe_request(), &stop, &[]).await {
                    Ok(response) => match response.json::<SubscribeResult>() {
                        Ok(result) => tracing::info!(
                            subscription_id = result.subscription_id,
                            "User data stream re-subscribed"
                        ),
                        Err(e) => tracing::warn!("Unexpected re-subscribe response: {}", e),
                    },
                    Err(e) => tracing::warn!("Failed to re-subscribe user data stream: {}", e),
                }
            }
            _ => {}
        }
    }
}
