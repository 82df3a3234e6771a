//! Market data and connectivity services.

use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::Client;
use crate::endpoints::{spot, ws_methods};
use crate::error::BinanceError;
use crate::request::{Request, RequestOption};

/// Test connectivity. `GET /api/v3/ping`, WebSocket `ping`.
#[derive(Debug, Clone)]
pub struct PingService {
    client: Client,
    options: Vec<RequestOption>,
}

impl PingService {
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
        let request = Request::new(reqwest::Method::GET, spot::PING).ws_method(ws_methods::PING);
        self.client.call_api(request, cancel, &self.options).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ServerTime {
    #[serde(rename = "serverTime")]
    server_time: i64,
}

/// Get the server time in milliseconds. `GET /api/v3/time`, WebSocket `time`.
#[derive(Debug, Clone)]
pub struct ServerTimeService {
    client: Client,
    options: Vec<RequestOption>,
}

impl ServerTimeService {
    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<i64, BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(self, cancel: &CancellationToken) -> Result<i64, BinanceError> {
        let request = Request::new(reqwest::Method::GET, spot::TIME).ws_method(ws_methods::TIME);
        let response = self.client.call_api(request, cancel, &self.options).await?;
        Ok(response.json::<ServerTime>()?.server_time)
    }
}

/// Measure the clock skew against the server and store it on the client.
///
/// The offset is `local - server`; later signed requests are stamped with
/// `local - offset`.
#[derive(Debug, Clone)]
pub struct SetServerTimeService {
    client: Client,
    options: Vec<RequestOption>,
}

impl SetServerTimeService {
    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Measure and store the offset, returning it.
    pub async fn send(self) -> Result<i64, BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Measure and store the offset, giving up when `cancel` fires.
    pub async fn send_with_cancel(self, cancel: &CancellationToken) -> Result<i64, BinanceError> {
        let server_time = ServerTimeService {
            client: self.client.clone(),
            options: self.options,
        }
        .send_with_cancel(cancel)
        .await?;

        let offset = self.client.local_time() - server_time;
        self.client.set_time_offset(offset);
        tracing::debug!(offset, "Clock skew measured");
        Ok(offset)
    }
}

/// One price level of an order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(Decimal, Decimal)")]
pub struct PriceLevel {
    /// Price
    pub price: Decimal,
    /// Quantity at this price
    pub quantity: Decimal,
}

impl From<(Decimal, Decimal)> for PriceLevel {
    fn from((price, quantity): (Decimal, Decimal)) -> Self {
        Self { price, quantity }
    }
}

/// Order book snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    /// Last update ID
    pub last_update_id: i64,
    /// Bids, best first
    pub bids: Vec<PriceLevel>,
    /// Asks, best first
    pub asks: Vec<PriceLevel>,
}

/// Get the order book. `GET /api/v3/depth`, WebSocket `depth`.
#[derive(Debug, Clone)]
pub struct DepthService {
    client: Client,
    symbol: String,
    limit: Option<u32>,
    options: Vec<RequestOption>,
}

impl DepthService {
    /// Number of levels per side.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<OrderBook, BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(
        self,
        cancel: &CancellationToken,
    ) -> Result<OrderBook, BinanceError> {
        let request = Request::new(reqwest::Method::GET, spot::DEPTH)
            .ws_method(ws_methods::DEPTH)
            .query("symbol", self.symbol)
            .query_opt("limit", self.limit)
            .require("symbol");
        self.client
            .call_api(request, cancel, &self.options)
            .await?
            .json()
    }
}

impl Client {
    /// Test connectivity.
    pub fn ping(&self) -> PingService {
        PingService {
            client: self.clone(),
            options: Vec::new(),
        }
    }

    /// Get the server time.
    pub fn server_time(&self) -> ServerTimeService {
        ServerTimeService {
            client: self.clone(),
            options: Vec::new(),
        }
    }

    /// Measure and store the clock skew against the server.
    pub fn set_server_time(&self) -> SetServerTimeService {
        SetServerTimeService {
            client: self.clone(),
            options: Vec::new(),
        }
    }

    /// Get the order book for `symbol`.
    pub fn depth(&self, symbol: impl Into<String>) -> DepthService {
        DepthService {
            client: self.clone(),
            symbol: symbol.into(),
            limit: None,
            options: Vec::new(),
        }
    }
}
