//! WebSocket API frame envelopes.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::client::ApiResponse;
use crate::error::{ApiError, BinanceError};
use crate::rate_limit::{RateLimits, WsRateLimit};
use crate::request::Params;
use crate::ws::events::UserDataEvent;

/// Outbound request frame: `{"id", "method", "params"?}`.
#[derive(Debug, Clone, Serialize)]
pub struct WsApiRequest<'a> {
    /// Correlation ID echoed back in the response.
    pub id: &'a str,
    /// WebSocket API method name.
    pub method: &'a str,
    /// Parameters, omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a Params>,
}

impl<'a> WsApiRequest<'a> {
    /// Create a request frame.
    pub fn new(id: &'a str, method: &'a str, params: &'a Params) -> Self {
        Self {
            id,
            method,
            params: (!params.is_empty()).then_some(params),
        }
    }
}

/// Response frame correlated to a request by `id`.
///
/// `result` is kept as raw JSON so each service can apply its own schema.
#[derive(Debug, Clone, Deserialize)]
pub struct WsApiResponse {
    /// Correlation ID of the originating request.
    #[serde(default)]
    pub id: Option<String>,
    /// HTTP-like status code.
    pub status: u16,
    /// Error envelope, present when `status >= 400`.
    #[serde(default)]
    pub error: Option<ApiError>,
    /// Undecoded result payload.
    #[serde(default)]
    pub result: Option<Box<RawValue>>,
    /// Usage counters reported with this response.
    #[serde(default, rename = "rateLimits")]
    pub rate_limits: Vec<WsRateLimit>,
}

impl WsApiResponse {
    /// Rate-limit snapshot for this response.
    pub fn rate_limit_snapshot(&self) -> RateLimits {
        RateLimits::from_ws_entries(&self.rate_limits)
    }

    /// Convert into the call result, mapping `status >= 400` to an API error.
    pub fn into_api_response(self) -> Result<ApiResponse, BinanceError> {
        let rate_limits = self.rate_limit_snapshot();

        if self.status >= 400 {
            let error = self
                .error
                .unwrap_or_else(|| ApiError::new(0, format!("status {}", self.status)));
            return Err(BinanceError::Api(error.with_rate_limits(rate_limits)));
        }

        let data = self
            .result
            .map(|raw| raw.get().as_bytes().to_vec())
            .unwrap_or_default();

        Ok(ApiResponse { data, rate_limits })
    }
}

#[derive(Deserialize)]
struct FrameProbe<'a> {
    #[serde(default, rename = "subscriptionId")]
    subscription_id: Option<u64>,
    #[serde(default, borrow)]
    event: Option<&'a RawValue>,
}

/// A decoded inbound frame.
#[derive(Debug, Clone)]
pub enum InboundFrame {
    /// Response to a pending request.
    Response(WsApiResponse),
    /// Push event from a subscription.
    Event {
        /// Subscription that produced the event.
        subscription_id: u64,
        /// Decoded event.
        event: UserDataEvent,
    },
}

impl InboundFrame {
    /// Classify and decode one text frame.
    ///
    /// Frames carrying `subscriptionId` are push events; everything else is a
    /// correlated response.
    pub fn parse(text: &str) -> Result<Self, BinanceError> {
        let probe: FrameProbe<'_> = serde_json::from_str(text)?;

        match probe.subscription_id {
            Some(subscription_id) => {
                let raw = probe.event.ok_or_else(|| {
                    BinanceError::InvalidResponse("push frame without event payload".to_string())
                })?;
                Ok(Self::Event {
                    subscription_id,
                    event: UserDataEvent::from_json(raw.get())?,
                })
            }
            None => Ok(Self::Response(serde_json::from_str(text)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_frame_omits_empty_params() {
        let params = Params::new();
        let frame = WsApiRequest::new("abc", "ping", &params);
        assert_eq!(
            serde_json::to_string(&frame).unwrap(),
            r#"{"id":"abc","method":"ping"}"#
        );
    }

    #[test]
    fn test_request_frame_with_params() {
        let params = Params::new().with("symbol", "BTCUSDT").with("limit", 5u32);
        let frame = WsApiRequest::new("abc", "depth", &params);
        assert_eq!(
            serde_json::to_string(&frame).unwrap(),
            r#"{"id":"abc","method":"depth","params":{"limit":5,"symbol":"BTCUSDT"}}"#
        );
    }

    #[test]
    fn test_parse_success_response_keeps_raw_result() {
        let frame = InboundFrame::parse(
            r#"{"id":"1","status":200,"result":{"serverTime":1700000000000},"rateLimits":[{"rateLimitType":"REQUEST_WEIGHT","interval":"MINUTE","intervalNum":1,"limit":6000,"count":1}]}"#,
        )
        .unwrap();

        let InboundFrame::Response(response) = frame else {
            panic!("expected response");
        };
        assert_eq!(response.id.as_deref(), Some("1"));

        let api_response = response.into_api_response().unwrap();
        assert_eq!(api_response.data, br#"{"serverTime":1700000000000}"#);
        assert_eq!(api_response.rate_limits.request_weight_1m, 1);
    }

    #[test]
    fn test_parse_error_response() {
        let frame = InboundFrame::parse(
            r#"{"id":"2","status":400,"error":{"code":-1102,"msg":"Mandatory parameter 'symbol' was not sent"},"rateLimits":[{"rateLimitType":"REQUEST_WEIGHT","interval":"MINUTE","intervalNum":1,"limit":6000,"count":7}]}"#,
        )
        .unwrap();

        let InboundFrame::Response(response) = frame else {
            panic!("expected response");
        };
        let err = response.into_api_response().unwrap_err();
        let api = err.api_error().unwrap();
        assert_eq!(api.code, -1102);
        assert_eq!(api.rate_limits.unwrap().request_weight_1m, 7);
    }

    #[test]
    fn test_parse_push_event() {
        let frame = InboundFrame::parse(
            r#"{"subscriptionId":0,"event":{"e":"balanceUpdate","E":1573200697110,"a":"BTC","d":"100.00000000","T":1573200697068}}"#,
        )
        .unwrap();

        match frame {
            InboundFrame::Event {
                subscription_id,
                event: UserDataEvent::BalanceUpdate(update),
            } => {
                assert_eq!(subscription_id, 0);
                assert_eq!(update.asset, "BTC");
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_frame() {
        assert!(InboundFrame::parse("not json").is_err());
        assert!(InboundFrame::parse(r#"{"subscriptionId":1}"#).is_err());
    }
}
