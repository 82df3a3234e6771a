//! Rate-limit usage reported by Binance.
//!
//! Every response carries the caller's current usage counters, either as HTTP
//! headers or as the `rateLimits` array of a WebSocket API response. The client
//! only reports them: a fresh [`RateLimits`] snapshot is extracted per call and
//! nothing is accumulated or enforced locally.
//!
//! ## Example
//!
//! ```rust
//! use binance_api_client::rate_limit::RateLimits;
//! use reqwest::header::{HeaderMap, HeaderValue};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("x-mbx-used-weight-1m", HeaderValue::from_static("42"));
//!
//! let limits = RateLimits::from_headers(&headers);
//! assert_eq!(limits.request_weight_1m, 42);
//! assert_eq!(limits.orders_10s, 0);
//! ```

use reqwest::header::HeaderMap;
use serde::Deserialize;

/// Header carrying the request weight used in the current minute.
pub const USED_WEIGHT_1M_HEADER: &str = "X-Mbx-Used-Weight-1m";
/// Header carrying the raw request count in the current five minutes.
pub const RAW_REQUESTS_5M_HEADER: &str = "X-Mbx-Raw-Requests-5m";
/// Header carrying the order count in the current ten seconds.
pub const ORDER_COUNT_10S_HEADER: &str = "X-Mbx-Order-Count-10s";
/// Header carrying the order count in the current minute.
pub const ORDER_COUNT_1M_HEADER: &str = "X-Mbx-Order-Count-1m";

/// Snapshot of the four usage counters for one call.
///
/// Absent or unparseable values are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimits {
    /// Request weight used in the current 1-minute window.
    pub request_weight_1m: i64,
    /// Raw requests in the current 5-minute window.
    pub raw_requests_5m: i64,
    /// Orders placed in the current 10-second window.
    pub orders_10s: i64,
    /// Orders placed in the current 1-minute window.
    pub orders_1m: i64,
}

/// One entry of a WebSocket API response's `rateLimits` array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsRateLimit {
    /// `REQUEST_WEIGHT`, `ORDERS` or `RAW_REQUESTS`
    pub rate_limit_type: String,
    /// `SECOND`, `MINUTE` or `DAY`
    pub interval: String,
    /// Number of `interval` units in the window
    pub interval_num: u32,
    /// Window limit
    #[serde(default)]
    pub limit: i64,
    /// Current usage
    #[serde(default)]
    pub count: i64,
}

impl RateLimits {
    /// Extract counters from HTTP response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(0)
        };

        Self {
            request_weight_1m: read(USED_WEIGHT_1M_HEADER),
            raw_requests_5m: read(RAW_REQUESTS_5M_HEADER),
            orders_10s: read(ORDER_COUNT_10S_HEADER),
            orders_1m: read(ORDER_COUNT_1M_HEADER),
        }
    }

    /// Extract counters from a WebSocket API `rateLimits` array, matching each
    /// counter by its `(rateLimitType, interval, intervalNum)` triple.
    pub fn from_ws_entries(entries: &[WsRateLimit]) -> Self {
        let locate = |kind: &str, interval: &str, num: u32| {
            entries
                .iter()
                .find(|e| e.rate_limit_type == kind && e.interval == interval && e.interval_num == num)
                .map(|e| e.count)
                .unwrap_or(0)
        };

        Self {
            request_weight_1m: locate("REQUEST_WEIGHT", "MINUTE", 1),
            raw_requests_5m: locate("RAW_REQUESTS", "MINUTE", 5),
            orders_10s: locate("ORDERS", "SECOND", 10),
            orders_1m: locate("ORDERS", "MINUTE", 1),
        }
    }
}
