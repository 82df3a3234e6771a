//! Error types for the Binance client library.

use serde::Deserialize;
use thiserror::Error;

use crate::rate_limit::RateLimits;

/// The main error type for all Binance client operations.
#[derive(Error, Debug)]
pub enum BinanceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// WebSocket communication error (with message)
    #[error("WebSocket error: {0}")]
    WebSocketMsg(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Binance API returned an error
    #[error("Binance API error: {0}")]
    Api(ApiError),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The request descriptor failed validation before being sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// WebSocket connection closed unexpectedly
    #[error("WebSocket connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for the closure
        reason: String,
    },

    /// No WebSocket session is connected
    #[error("WebSocket API is not connected")]
    NotConnected,

    /// No response arrived within the configured WebSocket response timeout
    #[error("Request timed out")]
    Timeout,

    /// The caller cancelled the request before a response arrived
    #[error("Request cancelled")]
    Cancelled,

    /// Missing required credentials
    #[error("Missing credentials: API key and secret required for authenticated endpoints")]
    MissingCredentials,
}

impl BinanceError {
    /// Returns the remote API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the call was abandoned locally (timeout or cancellation) rather
    /// than failed by the transport or the remote service.
    pub fn is_local_abort(&self) -> bool {
        matches!(self, Self::Timeout | Self::Cancelled)
    }
}

impl From<ApiError> for BinanceError {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

/// Binance API error codes and messages.
///
/// These are errors returned by Binance itself, either as the body of an HTTP
/// response with status >= 400 or as the `error` object of a WebSocket API
/// response with `status >= 400`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Numeric error code (e.g. `-1021`)
    pub code: i64,
    /// Human-readable error message
    #[serde(rename = "msg")]
    pub message: String,
    /// Rate-limit counters reported alongside the failing response.
    #[serde(skip)]
    pub rate_limits: Option<RateLimits>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "code={}, msg={}", self.code, self.message)
    }
}

impl ApiError {
    /// Create a new API error from code and message.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            rate_limits: None,
        }
    }

    /// Attach the rate-limit snapshot observed with this error.
    pub fn with_rate_limits(mut self, rate_limits: RateLimits) -> Self {
        self.rate_limits = Some(rate_limits);
        self
    }

    /// Parse an API error from an HTTP error body.
    ///
    /// Bodies that are not a `{"code", "msg"}` object are kept verbatim as the
    /// message with code `0`.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice::<ApiError>(body).unwrap_or_else(|e| {
            tracing::debug!("Failed to decode API error body: {}", e);
            Self::new(0, String::from_utf8_lossy(body).into_owned())
        })
    }

    /// Check if the request timestamp fell outside `recvWindow`.
    pub fn is_timestamp_outside_recv_window(&self) -> bool {
        self.code == error_codes::INVALID_TIMESTAMP
    }

    /// Check if this is an invalid signature error.
    pub fn is_invalid_signature(&self) -> bool {
        self.code == error_codes::INVALID_SIGNATURE
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.code,
            error_codes::TOO_MANY_REQUESTS | error_codes::TOO_MANY_ORDERS
        )
    }

    /// Check if the referenced order does not exist.
    pub fn is_unknown_order(&self) -> bool {
        self.code == error_codes::NO_SUCH_ORDER
    }
}

/// Known Binance error codes for pattern matching.
pub mod error_codes {
    pub const UNKNOWN: i64 = -1000;
    pub const DISCONNECTED: i64 = -1001;
    pub const UNAUTHORIZED: i64 = -1002;
    pub const TOO_MANY_REQUESTS: i64 = -1003;
    pub const UNEXPECTED_RESPONSE: i64 = -1006;
    pub const TIMEOUT: i64 = -1007;
    pub const TOO_MANY_ORDERS: i64 = -1015;
    pub const INVALID_TIMESTAMP: i64 = -1021;
    pub const INVALID_SIGNATURE: i64 = -1022;
    pub const ILLEGAL_CHARS: i64 = -1100;
    pub const MANDATORY_PARAM_EMPTY_OR_MALFORMED: i64 = -1102;
    pub const INVALID_SYMBOL: i64 = -1121;
    pub const NEW_ORDER_REJECTED: i64 = -2010;
    pub const CANCEL_REJECTED: i64 = -2011;
    pub const NO_SUCH_ORDER: i64 = -2013;
    pub const BAD_API_KEY_FMT: i64 = -2014;
    pub const REJECTED_MBX_KEY: i64 = -2015;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_body() {
        let error = ApiError::from_body(br#"{"code":-1021,"msg":"Timestamp outside recvWindow"}"#);
        assert_eq!(error.code, -1021);
        assert_eq!(error.message, "Timestamp outside recvWindow");
        assert!(error.is_timestamp_outside_recv_window());
        assert!(error.rate_limits.is_none());
    }

    #[test]
    fn test_api_error_from_non_json_body() {
        let error = ApiError::from_body(b"<html>Bad Gateway</html>");
        assert_eq!(error.code, 0);
        assert_eq!(error.message, "<html>Bad Gateway</html>");
    }

    #[test]
    fn test_api_error_display() {
        let error = ApiError::new(-2010, "Account has insufficient balance");
        assert_eq!(error.to_string(), "code=-2010, msg=Account has insufficient balance");
    }

    #[test]
    fn test_local_abort_classification() {
        assert!(BinanceError::Timeout.is_local_abort());
        assert!(BinanceError::Cancelled.is_local_abort());
        assert!(!BinanceError::Api(ApiError::new(-1003, "Too many requests")).is_local_abort());
        assert!(!BinanceError::NotConnected.is_local_abort());
    }
}
