//! The request descriptor and its signing step.

use reqwest::Method;

use crate::auth::{Credentials, sign_payload};
use crate::error::BinanceError;
use crate::request::{
    API_KEY_KEY, ParamValue, Params, RECV_WINDOW_KEY, SIGNATURE_KEY, TIMESTAMP_KEY,
};

/// Security classification of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityType {
    /// Public endpoint.
    #[default]
    None,
    /// Requires the API key (`X-MBX-APIKEY` header, or `apiKey` on the WebSocket API).
    ApiKey,
    /// Requires the API key, a timestamp and a signature.
    Signed,
}

impl SecurityType {
    /// Whether the API key must be sent.
    pub fn needs_api_key(self) -> bool {
        matches!(self, Self::ApiKey | Self::Signed)
    }
}

/// A logical API call, transport-independent until dispatched.
///
/// # Example
///
/// ```rust
/// use binance_api_client::request::{Request, SecurityType};
/// use reqwest::Method;
///
/// let request = Request::new(Method::GET, "/api/v3/depth")
///     .ws_method("depth")
///     .query("symbol", "BTCUSDT")
///     .query("limit", 5u32)
///     .require("symbol");
///
/// assert_eq!(request.security_type(), SecurityType::None);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    endpoint: String,
    ws_method: Option<String>,
    query: Params,
    form: Params,
    security: SecurityType,
    recv_window: Option<u64>,
    headers: Vec<(String, String)>,
    required: Vec<String>,
}

/// Wire-ready HTTP parts produced by [`Request::sign_http`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHttpRequest {
    /// Query string without the leading `?`; the signature, if any, is last.
    pub query_string: String,
    /// Form-encoded body, empty when there is none.
    pub body: String,
    /// API key for the `X-MBX-APIKEY` header.
    pub api_key: Option<String>,
}

impl Request {
    /// Create a request for an HTTP endpoint.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            ws_method: None,
            query: Params::new(),
            form: Params::new(),
            security: SecurityType::None,
            recv_window: None,
            headers: Vec::new(),
            required: Vec::new(),
        }
    }

    /// Create a request that only exists on the WebSocket API.
    pub fn ws_only(ws_method: impl Into<String>) -> Self {
        Self::new(Method::GET, "").ws_method(ws_method)
    }

    /// Name the WebSocket API method for this call, preferring that transport
    /// whenever the session is connected.
    pub fn ws_method(mut self, ws_method: impl Into<String>) -> Self {
        let ws_method = ws_method.into();
        self.ws_method = (!ws_method.is_empty()).then_some(ws_method);
        self
    }

    /// Set the security classification.
    pub fn security(mut self, security: SecurityType) -> Self {
        self.security = security;
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query.set(key, value);
        self
    }

    /// Add a query parameter when the value is present.
    pub fn query_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Add a form body parameter.
    pub fn form(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.form.set(key, value);
        self
    }

    /// Add a form body parameter when the value is present.
    pub fn form_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.form(key, value),
            None => self,
        }
    }

    /// Declare a parameter that must be present in the query or form.
    pub fn require(mut self, key: impl Into<String>) -> Self {
        self.required.push(key.into());
        self
    }

    /// Set the receive window in milliseconds.
    pub fn recv_window(mut self, millis: u64) -> Self {
        self.recv_window = Some(millis);
        self
    }

    pub(crate) fn set_recv_window(&mut self, millis: u64) {
        self.recv_window = Some(millis);
    }

    pub(crate) fn set_header(&mut self, name: String, value: String) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value));
    }

    pub(crate) fn form_mut(&mut self) -> &mut Params {
        &mut self.form
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// HTTP endpoint path; empty for WebSocket-only calls.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// WebSocket API method name, if the call has one.
    pub fn ws_method_name(&self) -> Option<&str> {
        self.ws_method.as_deref()
    }

    /// Query parameters.
    pub fn query_params(&self) -> &Params {
        &self.query
    }

    /// Form body parameters.
    pub fn form_params(&self) -> &Params {
        &self.form
    }

    /// Security classification.
    pub fn security_type(&self) -> SecurityType {
        self.security
    }

    /// Receive window in milliseconds.
    pub fn recv_window_millis(&self) -> Option<u64> {
        self.recv_window
    }

    /// Extra HTTP headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Check the descriptor is complete.
    pub fn validate(&self) -> Result<(), BinanceError> {
        if self.endpoint.is_empty() && self.ws_method.is_none() {
            return Err(BinanceError::InvalidRequest(
                "request has neither an endpoint nor a WebSocket method".to_string(),
            ));
        }
        if let Some(missing) = self
            .required
            .iter()
            .find(|key| !self.query.contains(key) && !self.form.contains(key))
        {
            return Err(BinanceError::InvalidRequest(format!(
                "missing required parameter '{missing}'"
            )));
        }
        Ok(())
    }

    /// Stamp and sign the request for HTTP.
    ///
    /// `recvWindow` and, for signed calls, `timestamp` are injected into the
    /// query. The signature covers the encoded query immediately followed by
    /// the encoded body and is appended as the last query parameter.
    pub fn sign_http(
        &mut self,
        credentials: Option<&Credentials>,
        timestamp: i64,
    ) -> Result<EncodedHttpRequest, BinanceError> {
        let credentials = self.credentials_for_call(credentials)?;

        if let Some(recv_window) = self.recv_window {
            self.query.set(RECV_WINDOW_KEY, recv_window);
        }
        if self.security == SecurityType::Signed {
            self.query.set(TIMESTAMP_KEY, timestamp);
        }

        let mut query_string = self.query.encode()?;
        let body = self.form.encode()?;

        if let (SecurityType::Signed, Some(credentials)) = (self.security, credentials) {
            let signature = sign_payload(credentials, &format!("{query_string}{body}"))?;
            if !query_string.is_empty() {
                query_string.push('&');
            }
            query_string.push_str(SIGNATURE_KEY);
            query_string.push('=');
            query_string.push_str(&signature);
        }

        Ok(EncodedHttpRequest {
            query_string,
            body,
            api_key: credentials.map(|c| c.api_key().to_string()),
        })
    }

    /// Stamp and sign the request for the WebSocket API.
    ///
    /// Query and form parameters are merged into one set. Signed calls add
    /// `timestamp` and `apiKey`, then `signature` over the unescaped canonical
    /// encoding of everything else.
    pub fn sign_ws(
        &mut self,
        credentials: Option<&Credentials>,
        timestamp: i64,
    ) -> Result<Params, BinanceError> {
        let credentials = self.credentials_for_call(credentials)?;

        let mut params = self.query.clone();
        params.merge(&self.form);
        if let Some(recv_window) = self.recv_window {
            params.set(RECV_WINDOW_KEY, recv_window);
        }

        if let Some(credentials) = credentials {
            params.set(API_KEY_KEY, credentials.api_key());
            if self.security == SecurityType::Signed {
                params.set(TIMESTAMP_KEY, timestamp);
                let signature = sign_payload(credentials, &params.encode_raw())?;
                params.set(SIGNATURE_KEY, signature);
            }
        }

        Ok(params)
    }

    fn credentials_for_call<'a>(
        &self,
        credentials: Option<&'a Credentials>,
    ) -> Result<Option<&'a Credentials>, BinanceError> {
        if !self.security.needs_api_key() {
            return Ok(None);
        }
        credentials.map(Some).ok_or(BinanceError::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("my-key", "s3cr3t")
    }

    #[test]
    fn test_validate_missing_required_param() {
        let request = Request::new(Method::GET, "/api/v3/depth").require("symbol");
        let err = request.validate().unwrap_err();
        assert!(matches!(err, BinanceError::InvalidRequest(msg) if msg.contains("symbol")));
    }

    #[test]
    fn test_validate_accepts_form_param() {
        let request = Request::new(Method::POST, "/api/v3/order")
            .form("symbol", "BTCUSDT")
            .require("symbol");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_descriptor() {
        let request = Request::new(Method::GET, "");
        assert!(matches!(
            request.validate(),
            Err(BinanceError::InvalidRequest(_))
        ));
        assert!(Request::ws_only("ping").validate().is_ok());
    }

    #[test]
    fn test_empty_ws_method_is_ignored() {
        let request = Request::new(Method::GET, "/api/v3/ping").ws_method("");
        assert_eq!(request.ws_method_name(), None);
    }

    #[test]
    fn test_unsigned_http_request() {
        let mut request = Request::new(Method::GET, "/api/v3/depth")
            .query("symbol", "BTCUSDT")
            .query("limit", 5u32);
        let encoded = request.sign_http(None, 0).unwrap();

        assert_eq!(encoded.query_string, "limit=5&symbol=BTCUSDT");
        assert_eq!(encoded.body, "");
        assert_eq!(encoded.api_key, None);
    }

    #[test]
    fn test_signed_http_request_signs_query_then_body() {
        let creds = credentials();
        let mut request = Request::new(Method::POST, "/api/v3/order")
            .security(SecurityType::Signed)
            .form("symbol", "BTCUSDT")
            .form("side", "BUY")
            .recv_window(5000);
        let encoded = request.sign_http(Some(&creds), 1_700_000_000_000).unwrap();

        let query = "recvWindow=5000&timestamp=1700000000000";
        let body = "side=BUY&symbol=BTCUSDT";
        let signature = sign_payload(&creds, &format!("{query}{body}")).unwrap();

        assert_eq!(
            encoded.query_string,
            format!("{query}&signature={signature}")
        );
        assert_eq!(encoded.body, body);
        assert_eq!(encoded.api_key.as_deref(), Some("my-key"));
    }

    #[test]
    fn test_signed_http_request_is_deterministic() {
        let creds = credentials();
        let build = || {
            Request::new(Method::GET, "/api/v3/account")
                .security(SecurityType::Signed)
                .query("omitZeroBalances", true)
        };

        let a = build().sign_http(Some(&creds), 42).unwrap();
        let b = build().sign_http(Some(&creds), 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signed_http_request_with_no_params() {
        let creds = credentials();
        let mut request =
            Request::new(Method::GET, "/api/v3/account").security(SecurityType::Signed);
        let encoded = request.sign_http(Some(&creds), 7).unwrap();

        let signature = sign_payload(&creds, "timestamp=7").unwrap();
        assert_eq!(
            encoded.query_string,
            format!("timestamp=7&signature={signature}")
        );
    }

    #[test]
    fn test_api_key_request_is_not_signed() {
        let creds = credentials();
        let mut request = Request::new(Method::POST, "/api/v3/userDataStream")
            .security(SecurityType::ApiKey);
        let encoded = request.sign_http(Some(&creds), 7).unwrap();

        assert_eq!(encoded.query_string, "");
        assert_eq!(encoded.api_key.as_deref(), Some("my-key"));
    }

    #[test]
    fn test_missing_credentials() {
        let mut request =
            Request::new(Method::GET, "/api/v3/account").security(SecurityType::Signed);
        assert!(matches!(
            request.sign_http(None, 0),
            Err(BinanceError::MissingCredentials)
        ));
        assert!(matches!(
            request.sign_ws(None, 0),
            Err(BinanceError::MissingCredentials)
        ));
    }

    #[test]
    fn test_signed_ws_params() {
        let creds = credentials();
        let mut request = Request::new(Method::POST, "/api/v3/order")
            .ws_method("order.place")
            .security(SecurityType::Signed)
            .query("symbol", "BTCUSDT")
            .form("side", "BUY");
        let params = request.sign_ws(Some(&creds), 1_700_000_000_000).unwrap();

        let expected_payload =
            "apiKey=my-key&side=BUY&symbol=BTCUSDT&timestamp=1700000000000";
        let signature = sign_payload(&creds, expected_payload).unwrap();

        assert_eq!(params.get("signature"), Some(&ParamValue::Str(signature)));
        assert_eq!(params.get("apiKey"), Some(&ParamValue::Str("my-key".into())));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_unsigned_ws_params_pass_through() {
        let mut request = Request::new(Method::GET, "/api/v3/depth")
            .ws_method("depth")
            .query("symbol", "BTCUSDT");
        let params = request.sign_ws(None, 0).unwrap();

        assert_eq!(params.encode_raw(), "symbol=BTCUSDT");
    }
}
