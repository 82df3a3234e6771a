//! HTTP transport implementation.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use tokio_util::sync::CancellationToken;

use crate::client::ApiResponse;
use crate::error::{ApiError, BinanceError};
use crate::rate_limit::RateLimits;
use crate::request::EncodedHttpRequest;

/// Header carrying the API key on authenticated calls.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Issues one HTTP request per call against a base URL.
///
/// Requests are traced through `reqwest-tracing`. Nothing is retried here:
/// whether a call is safe to repeat depends on the endpoint, so failures are
/// always returned to the caller.
#[derive(Clone)]
pub struct HttpTransport {
    http_client: ClientWithMiddleware,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    /// Create a transport builder.
    pub fn builder(base_url: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(base_url)
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send an encoded request.
    ///
    /// The rate-limit headers are read on every path. A status of 400 or
    /// above is decoded as an [`ApiError`] carrying those counters. Firing
    /// `cancel` aborts this request only.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        encoded: &EncodedHttpRequest,
        extra_headers: &[(String, String)],
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, BinanceError> {
        let url = if encoded.query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, encoded.query_string)
        };
        tracing::debug!(%method, %url, body = %encoded.body, "Sending HTTP request");

        let mut builder = self.http_client.request(method, &url);
        for (name, value) in extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BinanceError::InvalidRequest(format!("Invalid header name: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| BinanceError::InvalidRequest(format!("Invalid header value: {e}")))?;
            builder = builder.header(name, value);
        }
        if !encoded.body.is_empty() {
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(encoded.body.clone());
        }
        if let Some(api_key) = &encoded.api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let rate_limits = RateLimits::from_headers(response.headers());
            let body = response.bytes().await?;
            Ok::<_, BinanceError>((status, rate_limits, body))
        };

        let (status, rate_limits, body) = tokio::select! {
            _ = cancel.cancelled() => return Err(BinanceError::Cancelled),
            result = exchange => result?,
        };

        tracing::debug!(status = status.as_u16(), "Received HTTP response");

        if status.as_u16() >= 400 {
            let error = ApiError::from_body(&body).with_rate_limits(rate_limits);
            tracing::debug!(%error, "HTTP request rejected");
            return Err(BinanceError::Api(error));
        }

        Ok(ApiResponse {
            data: body.to_vec(),
            rate_limits,
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    base_url: String,
    user_agent: Option<String>,
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Create a new builder for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: None,
            timeout: None,
        }
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the overall timeout for each HTTP request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the transport.
    pub fn build(self) -> HttpTransport {
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("binance-api-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("binance-api-client"));
        headers.insert(USER_AGENT, header_value);

        let mut reqwest_builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            reqwest_builder = reqwest_builder.timeout(timeout);
        }
        let reqwest_client = reqwest_builder
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        HttpTransport {
            http_client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("https://api.binance.com/");
        assert_eq!(transport.base_url(), "https://api.binance.com");
    }

    #[test]
    fn test_debug_shows_base_url() {
        let transport = HttpTransport::new("http://localhost:1234");
        assert!(format!("{transport:?}").contains("localhost:1234"));
    }
}
