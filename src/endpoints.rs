//! Binance endpoint constants.

use crate::ws::WsConfig;

/// Spot REST API base URL.
pub const SPOT_BASE_URL: &str = "https://api.binance.com";
/// Spot testnet REST API base URL.
pub const SPOT_TESTNET_BASE_URL: &str = "https://testnet.binance.vision";
/// Spot WebSocket API URL.
pub const SPOT_WS_API_URL: &str = "wss://ws-api.binance.com:443/ws-api/v3";
/// Spot testnet WebSocket API URL.
pub const SPOT_TESTNET_WS_API_URL: &str = "wss://testnet.binance.vision/ws-api/v3";

/// USD-M futures REST API base URL.
pub const FUTURES_BASE_URL: &str = "https://fapi.binance.com";
/// USD-M futures testnet REST API base URL.
pub const FUTURES_TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
/// USD-M futures WebSocket API URL.
pub const FUTURES_WS_API_URL: &str = "wss://ws-fapi.binance.com/ws-fapi/v1";
/// USD-M futures testnet WebSocket API URL.
pub const FUTURES_TESTNET_WS_API_URL: &str = "wss://testnet.binancefuture.com/ws-fapi/v1";

/// Spot REST paths.
pub mod spot {
    /// Test connectivity.
    pub const PING: &str = "/api/v3/ping";
    /// Get server time.
    pub const TIME: &str = "/api/v3/time";
    /// Get order book.
    pub const DEPTH: &str = "/api/v3/depth";
    /// Get account information.
    pub const ACCOUNT: &str = "/api/v3/account";
    /// Get commission rates.
    pub const ACCOUNT_COMMISSION: &str = "/api/v3/account/commission";
    /// Place an order.
    pub const ORDER: &str = "/api/v3/order";
    /// Start, keep alive or close a user data stream.
    pub const USER_DATA_STREAM: &str = "/api/v3/userDataStream";
}

/// WebSocket API method names.
pub mod ws_methods {
    /// Test connectivity.
    pub const PING: &str = "ping";
    /// Get server time.
    pub const TIME: &str = "time";
    /// Get order book.
    pub const DEPTH: &str = "depth";
    /// Get account information.
    pub const ACCOUNT_STATUS: &str = "account.status";
    /// Place an order.
    pub const ORDER_PLACE: &str = "order.place";
    /// Subscribe to the user data stream with a signed request.
    pub const USER_DATA_STREAM_SUBSCRIBE: &str = "userDataStream.subscribe.signature";
    /// Stop a user data stream subscription.
    pub const USER_DATA_STREAM_UNSUBSCRIBE: &str = "userDataStream.unsubscribe";
}

/// Which Binance API family a client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ApiFlavor {
    /// Spot API.
    #[default]
    Spot,
    /// USD-M futures API.
    UsdMFutures,
}

impl ApiFlavor {
    /// REST API base URL.
    pub fn base_url(self, testnet: bool) -> &'static str {
        match (self, testnet) {
            (Self::Spot, false) => SPOT_BASE_URL,
            (Self::Spot, true) => SPOT_TESTNET_BASE_URL,
            (Self::UsdMFutures, false) => FUTURES_BASE_URL,
            (Self::UsdMFutures, true) => FUTURES_TESTNET_BASE_URL,
        }
    }

    /// WebSocket API URL.
    pub fn ws_api_url(self, testnet: bool) -> &'static str {
        match (self, testnet) {
            (Self::Spot, false) => SPOT_WS_API_URL,
            (Self::Spot, true) => SPOT_TESTNET_WS_API_URL,
            (Self::UsdMFutures, false) => FUTURES_WS_API_URL,
            (Self::UsdMFutures, true) => FUTURES_TESTNET_WS_API_URL,
        }
    }

    /// Default WebSocket configuration.
    pub fn default_ws_config(self) -> WsConfig {
        match self {
            Self::Spot => WsConfig::default(),
            Self::UsdMFutures => WsConfig::futures(),
        }
    }
}
