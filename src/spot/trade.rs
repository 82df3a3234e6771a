//! Order placement.

use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::Client;
use crate::endpoints::{spot, ws_methods};
use crate::error::BinanceError;
use crate::request::{Request, RequestOption, SecurityType};
use crate::types::{NewOrderRespType, OrderSide, OrderStatus, OrderType, TimeInForce};

/// A partial fill reported in a `FULL` order response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFill {
    /// Fill price
    pub price: Decimal,
    /// Filled quantity
    pub qty: Decimal,
    /// Commission paid
    pub commission: Decimal,
    /// Commission asset
    pub commission_asset: String,
    /// Trade ID
    #[serde(default)]
    pub trade_id: Option<i64>,
}

/// Response to a new order.
///
/// `ACK` responses carry only the identifiers; `RESULT` and `FULL` add the
/// order state, and `FULL` also lists the fills.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    /// Symbol
    pub symbol: String,
    /// Order ID
    pub order_id: i64,
    /// Order list ID, `-1` for standalone orders
    #[serde(default)]
    pub order_list_id: Option<i64>,
    /// Client order ID
    pub client_order_id: String,
    /// Transaction time
    pub transact_time: i64,
    /// Limit price
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Original quantity
    #[serde(default)]
    pub orig_qty: Option<Decimal>,
    /// Executed quantity
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    /// Cumulative quote quantity
    #[serde(default)]
    pub cummulative_quote_qty: Option<Decimal>,
    /// Order status
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Time in force
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    /// Order type
    #[serde(default, rename = "type")]
    pub order_type: Option<OrderType>,
    /// Side
    #[serde(default)]
    pub side: Option<OrderSide>,
    /// Fills
    #[serde(default)]
    pub fills: Vec<OrderFill>,
}

/// Place a new order.
/// Signed `POST /api/v3/order`, WebSocket `order.place`.
#[derive(Debug, Clone)]
pub struct CreateOrderService {
    client: Client,
    symbol: String,
    side: OrderSide,
    order_type: OrderType,
    time_in_force: Option<TimeInForce>,
    quantity: Option<Decimal>,
    quote_order_qty: Option<Decimal>,
    price: Option<Decimal>,
    new_client_order_id: Option<String>,
    stop_price: Option<Decimal>,
    iceberg_qty: Option<Decimal>,
    new_order_resp_type: Option<NewOrderRespType>,
    options: Vec<RequestOption>,
}

impl CreateOrderService {
    /// Set time in force.
    pub fn time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    /// Set base asset quantity.
    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set quote asset quantity for market orders.
    pub fn quote_order_qty(mut self, quote_order_qty: Decimal) -> Self {
        self.quote_order_qty = Some(quote_order_qty);
        self
    }

    /// Set limit price.
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Set a client order ID.
    pub fn new_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(id.into());
        self
    }

    /// Set stop price.
    pub fn stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    /// Set iceberg quantity.
    pub fn iceberg_qty(mut self, iceberg_qty: Decimal) -> Self {
        self.iceberg_qty = Some(iceberg_qty);
        self
    }

    /// Set the response detail level.
    pub fn new_order_resp_type(mut self, resp_type: NewOrderRespType) -> Self {
        self.new_order_resp_type = Some(resp_type);
        self
    }

    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    fn request(self) -> (Request, Client, Vec<RequestOption>) {
        let request = Request::new(reqwest::Method::POST, spot::ORDER)
            .ws_method(ws_methods::ORDER_PLACE)
            .security(SecurityType::Signed)
            .form("symbol", self.symbol)
            .form("side", self.side)
            .form("type", self.order_type)
            .form_opt("timeInForce", self.time_in_force)
            .form_opt("quantity", self.quantity)
            .form_opt("quoteOrderQty", self.quote_order_qty)
            .form_opt("price", self.price)
            .form_opt("newClientOrderId", self.new_client_order_id)
            .form_opt("stopPrice", self.stop_price)
            .form_opt("icebergQty", self.iceberg_qty)
            .form_opt("newOrderRespType", self.new_order_resp_type)
            .require("symbol");
        (request, self.client, self.options)
    }

    /// Send the request.
    pub async fn send(self) -> Result<CreateOrderResponse, BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(
        self,
        cancel: &CancellationToken,
    ) -> Result<CreateOrderResponse, BinanceError> {
        let (request, client, options) = self.request();
        client.call_api(request, cancel, &options).await?.json()
    }
}

impl Client {
    /// Start building a new order.
    pub fn create_order(
        &self,
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
    ) -> CreateOrderService {
        CreateOrderService {
            client: self.clone(),
            symbol: symbol.into(),
            side,
            order_type,
            time_in_force: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            new_client_order_id: None,
            stop_price: None,
            iceberg_qty: None,
            new_order_resp_type: None,
            options: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_limit_order_params() {
        let client = Client::new();
        let (request, _, _) = client
            .create_order("BTCUSDT", OrderSide::Buy, OrderType::Limit)
            .time_in_force(TimeInForce::GTC)
            .quantity(dec("0.01000"))
            .price(dec("30000.10"))
            .request();

        assert_eq!(
            request.form_params().encode_raw(),
            "price=30000.1&quantity=0.01&side=BUY&symbol=BTCUSDT&timeInForce=GTC&type=LIMIT"
        );
        assert!(request.query_params().is_empty());
        assert_eq!(request.ws_method_name(), Some("order.place"));
        assert_eq!(request.security_type(), SecurityType::Signed);
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let client = Client::new();
        let (request, _, _) = client
            .create_order("ETHUSDT", OrderSide::Sell, OrderType::Market)
            .quote_order_qty(dec("25"))
            .request();

        let form = request.form_params();
        assert_eq!(form.len(), 4);
        assert!(form.contains("quoteOrderQty"));
        assert!(!form.contains("price"));
    }

    #[test]
    fn test_create_order_response_full() {
        let response: CreateOrderResponse = serde_json::from_str(
            r#"{
                "symbol":"BTCUSDT","orderId":28,"orderListId":-1,
                "clientOrderId":"6gCrw2kRUAF9CvJDGP16IP","transactTime":1507725176595,
                "price":"0.00000000","origQty":"10.00000000","executedQty":"10.00000000",
                "cummulativeQuoteQty":"10.00000000","status":"FILLED","timeInForce":"GTC",
                "type":"MARKET","side":"SELL",
                "fills":[{"price":"4000.00000000","qty":"1.00000000","commission":"4.00000000","commissionAsset":"USDT","tradeId":56}]
            }"#,
        )
        .unwrap();

        assert_eq!(response.order_id, 28);
        assert_eq!(response.status, Some(OrderStatus::Filled));
        assert_eq!(response.fills.len(), 1);
        assert_eq!(response.fills[0].trade_id, Some(56));
    }

    #[test]
    fn test_create_order_response_ack() {
        let response: CreateOrderResponse = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","orderId":28,"orderListId":-1,"clientOrderId":"abc","transactTime":1507725176595}"#,
        )
        .unwrap();

        assert!(response.status.is_none());
        assert!(response.fills.is_empty());
    }
}
