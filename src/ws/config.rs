//! WebSocket API configuration and connection state.

use std::time::Duration;

/// Default wait for a correlated response on the spot WebSocket API.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(15);
/// Default wait for a correlated response on the futures WebSocket API.
pub const FUTURES_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default delay between reconnection attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(10);
/// Default limit on the opening handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(45);

/// Configuration for WebSocket API sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsConfig {
    /// How long a call waits for its correlated response.
    pub response_timeout: Duration,
    /// Fixed delay between reconnection attempts. There is no backoff and no
    /// attempt limit.
    pub reconnect_interval: Duration,
    /// Limit on dialing and the opening handshake.
    pub handshake_timeout: Duration,
    /// Send a ping at this interval and drop the session if nothing arrives
    /// before the next one. Disabled by default.
    pub keepalive_interval: Option<Duration>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            keepalive_interval: None,
        }
    }
}

impl WsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> WsConfigBuilder {
        WsConfigBuilder::new()
    }

    /// Defaults for the USD-M futures WebSocket API.
    pub fn futures() -> Self {
        Self {
            response_timeout: FUTURES_RESPONSE_TIMEOUT,
            ..Self::default()
        }
    }
}

/// Builder for [`WsConfig`].
#[derive(Debug, Clone, Default)]
pub struct WsConfigBuilder {
    config: WsConfig,
}

impl WsConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WsConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: WsConfig) -> Self {
        Self { config }
    }

    /// Set the response timeout.
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Set the reconnection interval.
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval = interval;
        self
    }

    /// Set the handshake timeout.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Enable keepalive pings.
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.config.keepalive_interval = Some(interval);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> WsConfig {
        self.config
    }
}

/// Lifecycle state of the client's WebSocket connection.
///
/// ```text
/// Init --dial ok--> Connected --read failure--> Connecting --dial ok--> Connected
///                   Connected --close()--> AdminClosing (terminal)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No session has been established.
    #[default]
    Init,
    /// The session dropped and the supervisor is redialing.
    Connecting,
    /// A session is live.
    Connected,
    /// The caller closed the connection; it will not be re-established.
    AdminClosing,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Init => write!(f, "init"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::AdminClosing => write!(f, "admin_closing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WsConfig::default();
        assert_eq!(config.response_timeout, Duration::from_secs(15));
        assert_eq!(config.reconnect_interval, Duration::from_secs(10));
        assert_eq!(config.handshake_timeout, Duration::from_secs(45));
        assert_eq!(config.keepalive_interval, None);
        assert_eq!(WsConfig::futures().response_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder() {
        let config = WsConfig::builder()
            .response_timeout(Duration::from_millis(200))
            .reconnect_interval(Duration::from_millis(50))
            .keepalive_interval(Duration::from_secs(30))
            .build();

        assert_eq!(config.response_timeout, Duration::from_millis(200));
        assert_eq!(config.reconnect_interval, Duration::from_millis(50));
        assert_eq!(config.handshake_timeout, DEFAULT_HANDSHAKE_TIMEOUT);
        assert_eq!(config.keepalive_interval, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_state_default_is_init() {
        assert_eq!(ConnectionState::default(), ConnectionState::Init);
        assert_eq!(ConnectionState::AdminClosing.to_string(), "admin_closing");
    }
}
