//! Listen-key management for the REST user data stream.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::Client;
use crate::endpoints::spot;
use crate::error::BinanceError;
use crate::request::{Request, RequestOption, SecurityType};

#[derive(Debug, Deserialize)]
struct ListenKey {
    #[serde(rename = "listenKey")]
    listen_key: String,
}

/// Create a listen key. `POST /api/v3/userDataStream`.
#[derive(Debug, Clone)]
pub struct StartUserStreamService {
    client: Client,
    options: Vec<RequestOption>,
}

impl StartUserStreamService {
    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Send the request, returning the listen key.
    pub async fn send(self) -> Result<String, BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(self, cancel: &CancellationToken) -> Result<String, BinanceError> {
        let request = Request::new(reqwest::Method::POST, spot::USER_DATA_STREAM)
            .security(SecurityType::ApiKey);
        let response = self.client.call_api(request, cancel, &self.options).await?;
        Ok(response.json::<ListenKey>()?.listen_key)
    }
}

/// Extend a listen key's validity. `PUT /api/v3/userDataStream`.
#[derive(Debug, Clone)]
pub struct KeepaliveUserStreamService {
    client: Client,
    listen_key: String,
    options: Vec<RequestOption>,
}

impl KeepaliveUserStreamService {
    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<(), BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(self, cancel: &CancellationToken) -> Result<(), BinanceError> {
        let request = Request::new(reqwest::Method::PUT, spot::USER_DATA_STREAM)
            .security(SecurityType::ApiKey)
            .form("listenKey", self.listen_key)
            .require("listenKey");
        self.client.call_api(request, cancel, &self.options).await?;
        Ok(())
    }
}

/// Invalidate a listen key. `DELETE /api/v3/userDataStream`.
#[derive(Debug, Clone)]
pub struct CloseUserStreamService {
    client: Client,
    listen_key: String,
    options: Vec<RequestOption>,
}

impl CloseUserStreamService {
    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<(), BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(self, cancel: &CancellationToken) -> Result<(), BinanceError> {
        let request = Request::new(reqwest::Method::DELETE, spot::USER_DATA_STREAM)
            .security(SecurityType::ApiKey)
            .form("listenKey", self.listen_key)
            .require("listenKey");
        self.client.call_api(request, cancel, &self.options).await?;
        Ok(())
    }
}

impl Client {
    /// Create a listen key for the REST user data stream.
    pub fn start_user_stream(&self) -> StartUserStreamService {
        StartUserStreamService {
            client: self.clone(),
            options: Vec::new(),
        }
    }

    /// Keep `listen_key` alive for another 60 minutes.
    pub fn keepalive_user_stream(&self, listen_key: impl Into<String>) -> KeepaliveUserStreamService {
        KeepaliveUserStreamService {
            client: self.clone(),
            listen_key: listen_key.into(),
            options: Vec::new(),
        }
    }

    /// Close `listen_key`.
    pub fn close_user_stream(&self, listen_key: impl Into<String>) -> CloseUserStreamService {
        CloseUserStreamService {
            client: self.clone(),
            listen_key: listen_key.into(),
            options: Vec::new(),
        }
    }
}
