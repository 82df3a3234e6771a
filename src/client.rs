//! The Binance API client and its transport dispatcher.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::auth::{Clock, Credentials, CredentialsProvider, SystemClock};
use crate::endpoints::ApiFlavor;
use crate::error::BinanceError;
use crate::http::HttpTransport;
use crate::rate_limit::RateLimits;
use crate::request::{Request, RequestOption};
use crate::ws::connection::WsConnection;
use crate::ws::{ConnectionState, UserDataEvent, WsConfig, WsSession};

/// Default capacity of the user data event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// The raw outcome of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Undecoded response payload.
    pub data: Vec<u8>,
    /// Usage counters reported with the response.
    pub rate_limits: RateLimits,
}

impl ApiResponse {
    /// Decode the payload.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BinanceError> {
        serde_json::from_slice(&self.data).map_err(|e| {
            BinanceError::InvalidResponse(format!(
                "Failed to parse response: {}. Body: {}",
                e,
                String::from_utf8_lossy(&self.data)
            ))
        })
    }
}

/// The Binance API client.
///
/// Every call goes through one dispatcher. When the WebSocket API is connected
/// and the call has a WebSocket method, it travels over the socket; otherwise
/// it is an HTTP request. Cloning is cheap and clones share the connection.
///
/// # Example
///
/// ```rust,no_run
/// use binance_api_client::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // HTTP only
///     let client = Client::new();
///     let time = client.server_time().send().await?;
///     println!("Server time: {}", time);
///     Ok(())
/// }
/// ```
///
/// With credentials and the WebSocket API:
///
/// ```rust,no_run
/// use binance_api_client::Client;
/// use binance_api_client::auth::StaticCredentials;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let credentials = Arc::new(StaticCredentials::new("api_key", "api_secret"));
///     let client = Client::builder()
///         .credentials(credentials)
///         .connect()
///         .await;
///
///     let account = client.account().send().await?;
///     println!("Balances: {:?}", account.balances);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    credentials: Option<Arc<dyn CredentialsProvider>>,
    http: HttpTransport,
    ws: Arc<WsConnection>,
    clock: Arc<dyn Clock>,
    time_offset: AtomicI64,
    events: broadcast::Sender<UserDataEvent>,
    shutdown: CancellationToken,
}

/// A non-owning handle that does not keep the client's background tasks alive.
#[derive(Clone)]
pub(crate) struct WeakClient {
    inner: std::sync::Weak<ClientInner>,
}

impl WeakClient {
    pub(crate) fn upgrade(&self) -> Option<Client> {
        self.inner.upgrade().map(|inner| Client { inner })
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl Client {
    /// Create a spot client with default settings, HTTP only.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Dispatch a call over the WebSocket API when connected and the request
    /// names a WebSocket method, over HTTP otherwise.
    ///
    /// Options are applied before validation. Signed requests are stamped
    /// with the skew-adjusted timestamp and signed for the chosen transport.
    pub async fn call_api(
        &self,
        mut request: Request,
        cancel: &CancellationToken,
        options: &[RequestOption],
    ) -> Result<ApiResponse, BinanceError> {
        for option in options {
            option.apply(&mut request);
        }
        request.validate()?;

        if request.ws_method_name().is_some() {
            if let Some(session) = self.inner.ws.active_session() {
                return self.dispatch_ws(&session, &mut request, cancel).await;
            }
        }

        if request.endpoint().is_empty() {
            return Err(BinanceError::NotConnected);
        }
        self.dispatch_http(&mut request, cancel).await
    }

    /// Dispatch a call over the WebSocket API only.
    ///
    /// Fails with [`BinanceError::NotConnected`] unless a session is connected.
    pub async fn call_ws_api(
        &self,
        mut request: Request,
        cancel: &CancellationToken,
        options: &[RequestOption],
    ) -> Result<ApiResponse, BinanceError> {
        for option in options {
            option.apply(&mut request);
        }
        request.validate()?;

        if request.ws_method_name().is_none() {
            return Err(BinanceError::InvalidRequest(
                "request has no WebSocket method".to_string(),
            ));
        }
        let session = self
            .inner
            .ws
            .active_session()
            .ok_or(BinanceError::NotConnected)?;
        self.dispatch_ws(&session, &mut request, cancel).await
    }

    async fn dispatch_http(
        &self,
        request: &mut Request,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, BinanceError> {
        let timestamp = self.timestamp();
        let credentials = self.credentials();
        let encoded = request.sign_http(credentials, timestamp)?;

        self.inner
            .http
            .send(
                request.method().clone(),
                request.endpoint(),
                &encoded,
                request.headers(),
                cancel,
            )
            .await
    }

    async fn dispatch_ws(
        &self,
        session: &WsSession,
        request: &mut Request,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, BinanceError> {
        let timestamp = self.timestamp();
        let credentials = self.credentials();
        let params = request.sign_ws(credentials, timestamp)?;
        let method = request.ws_method_name().unwrap_or_default();

        let response = session.call(method, &params, cancel).await?;
        response.into_api_response()
    }

    fn credentials(&self) -> Option<&Credentials> {
        self.inner
            .credentials
            .as_ref()
            .map(|provider| provider.credentials())
    }

    /// Whether credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.inner.credentials.is_some()
    }

    /// Timestamp for signed requests: local clock minus the skew offset.
    pub fn timestamp(&self) -> i64 {
        self.inner.clock.now_millis() - self.time_offset()
    }

    /// Local clock reading in milliseconds.
    pub fn local_time(&self) -> i64 {
        self.inner.clock.now_millis()
    }

    /// Set the clock-skew offset (`local - server`, milliseconds).
    pub fn set_time_offset(&self, offset_millis: i64) {
        self.inner.time_offset.store(offset_millis, Ordering::Relaxed);
    }

    /// Current clock-skew offset in milliseconds.
    pub fn time_offset(&self) -> i64 {
        self.inner.time_offset.load(Ordering::Relaxed)
    }

    /// REST API base URL.
    pub fn base_url(&self) -> &str {
        self.inner.http.base_url()
    }

    /// WebSocket API URL.
    pub fn ws_url(&self) -> &str {
        self.inner.ws.url()
    }

    /// Dial the WebSocket API if no session was ever established.
    ///
    /// Returns whether the client is connected afterwards. A failed dial is
    /// not an error; calls keep using HTTP.
    pub async fn connect_ws(&self) -> bool {
        self.inner.ws.connect().await
    }

    /// Current WebSocket connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.ws.state()
    }

    /// Watch WebSocket connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.ws.watch_state()
    }

    /// Whether calls with a WebSocket method currently use the WebSocket API.
    pub fn is_ws_connected(&self) -> bool {
        self.inner.ws.active_session().is_some()
    }

    /// The WebSocket session currently held by the client.
    pub fn ws_session(&self) -> Option<Arc<WsSession>> {
        self.inner.ws.current_session()
    }

    /// Close the WebSocket API connection on purpose.
    ///
    /// Only a connected client can be closed; the connection is not
    /// re-established afterwards. Returns whether a close happened.
    ///
    /// # Note
    ///
    /// While a reconnect is pending (state [`ConnectionState::Connecting`])
    /// this does nothing and returns `false`. Use [`Client::shutdown`] to
    /// stop the redial loop.
    pub fn close(&self) -> bool {
        self.inner.ws.close()
    }

    /// Stop every background task of this client: the session reader and the
    /// reconnection supervisor exit even while a redial is pending. HTTP
    /// calls keep working.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    /// Receive every user data event published by the WebSocket API.
    pub fn subscribe_events(&self) -> broadcast::Receiver<UserDataEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn downgrade(&self) -> WeakClient {
        WeakClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.http.base_url())
            .field("ws_url", &self.inner.ws.url())
            .field("state", &self.inner.ws.state())
            .field("has_credentials", &self.inner.credentials.is_some())
            .finish()
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    flavor: ApiFlavor,
    testnet: bool,
    base_url: Option<String>,
    ws_url: Option<String>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    user_agent: Option<String>,
    http_timeout: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
    ws_config: Option<WsConfig>,
    event_capacity: usize,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            flavor: ApiFlavor::Spot,
            testnet: false,
            base_url: None,
            ws_url: None,
            credentials: None,
            user_agent: None,
            http_timeout: None,
            clock: None,
            ws_config: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Select the API family.
    pub fn flavor(mut self, flavor: ApiFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Use the testnet URLs of the selected flavor.
    pub fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// Override the REST base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the WebSocket API URL.
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    /// Set the credentials provider for authenticated requests.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialsProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the overall timeout of each HTTP request.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Set the clock used to stamp signed requests.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the WebSocket API configuration.
    pub fn ws_config(mut self, config: WsConfig) -> Self {
        self.ws_config = Some(config);
        self
    }

    /// Set the capacity of the user data event channel.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Build an HTTP-only client. Call [`Client::connect_ws`] to add the
    /// WebSocket API later.
    pub fn build(self) -> Client {
        let base_url = self
            .base_url
            .unwrap_or_else(|| self.flavor.base_url(self.testnet).to_string());
        let ws_url = self
            .ws_url
            .unwrap_or_else(|| self.flavor.ws_api_url(self.testnet).to_string());
        let ws_config = self
            .ws_config
            .unwrap_or_else(|| self.flavor.default_ws_config());

        let mut http = HttpTransport::builder(base_url);
        if let Some(user_agent) = self.user_agent {
            http = http.user_agent(user_agent);
        }
        if let Some(timeout) = self.http_timeout {
            http = http.timeout(timeout);
        }

        let shutdown = CancellationToken::new();
        let (events, _) = broadcast::channel(self.event_capacity);
        let ws = Arc::new(WsConnection::new(
            ws_url,
            ws_config,
            events.clone(),
            shutdown.clone(),
        ));

        Client {
            inner: Arc::new(ClientInner {
                credentials: self.credentials,
                http: http.build(),
                ws,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
                time_offset: AtomicI64::new(0),
                events,
                shutdown,
            }),
        }
    }

    /// Build the client and dial the WebSocket API.
    ///
    /// If the dial fails the client is still returned, HTTP only, in state
    /// [`ConnectionState::Init`].
    pub async fn connect(self) -> Client {
        let client = self.build();
        client.connect_ws().await;
        client
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
