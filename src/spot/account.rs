//! Account services.

use rust_decimal::Decimal;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::Client;
use crate::endpoints::{spot, ws_methods};
use crate::error::BinanceError;
use crate::request::{Request, RequestOption, SecurityType};

/// One asset balance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountBalance {
    /// Asset
    pub asset: String,
    /// Available amount
    pub free: Decimal,
    /// Amount locked in orders
    pub locked: Decimal,
}

/// Account information.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Maker commission in basis points
    #[serde(default)]
    pub maker_commission: i64,
    /// Taker commission in basis points
    #[serde(default)]
    pub taker_commission: i64,
    /// Buyer commission in basis points
    #[serde(default)]
    pub buyer_commission: i64,
    /// Seller commission in basis points
    #[serde(default)]
    pub seller_commission: i64,
    /// Whether trading is enabled
    pub can_trade: bool,
    /// Whether withdrawals are enabled
    pub can_withdraw: bool,
    /// Whether deposits are enabled
    pub can_deposit: bool,
    /// Last update time
    #[serde(default)]
    pub update_time: i64,
    /// Account type, e.g. `SPOT`
    pub account_type: String,
    /// Balances
    pub balances: Vec<AccountBalance>,
    /// Permissions
    #[serde(default)]
    pub permissions: Vec<String>,
    /// User ID
    #[serde(default)]
    pub uid: Option<i64>,
}

/// Get account information.
/// Signed `GET /api/v3/account`, WebSocket `account.status`.
#[derive(Debug, Clone)]
pub struct AccountService {
    client: Client,
    omit_zero_balances: Option<bool>,
    options: Vec<RequestOption>,
}

impl AccountService {
    /// Leave out assets with zero balance.
    pub fn omit_zero_balances(mut self, omit: bool) -> Self {
        self.omit_zero_balances = Some(omit);
        self
    }

    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<AccountInfo, BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(
        self,
        cancel: &CancellationToken,
    ) -> Result<AccountInfo, BinanceError> {
        let request = Request::new(reqwest::Method::GET, spot::ACCOUNT)
            .ws_method(ws_methods::ACCOUNT_STATUS)
            .security(SecurityType::Signed)
            .query_opt("omitZeroBalances", self.omit_zero_balances);
        self.client
            .call_api(request, cancel, &self.options)
            .await?
            .json()
    }
}

/// Commission rates for one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommissionSchedule {
    /// Maker rate
    pub maker: Decimal,
    /// Taker rate
    pub taker: Decimal,
    /// Buyer rate
    pub buyer: Decimal,
    /// Seller rate
    pub seller: Decimal,
}

/// Commission discount settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionDiscount {
    /// Whether the discount is enabled for the account
    pub enabled_for_account: bool,
    /// Whether the discount is enabled for the symbol
    pub enabled_for_symbol: bool,
    /// Asset used to pay discounted commissions
    pub discount_asset: String,
    /// Discount rate
    pub discount: Decimal,
}

/// Commission rates of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRates {
    /// Symbol
    pub symbol: String,
    /// Standard commission
    pub standard_commission: CommissionSchedule,
    /// Tax commission
    pub tax_commission: CommissionSchedule,
    /// Discount
    pub discount: CommissionDiscount,
}

/// Get the account's commission rates for a symbol.
/// Signed `GET /api/v3/account/commission`, HTTP only.
#[derive(Debug, Clone)]
pub struct CommissionRateService {
    client: Client,
    symbol: String,
    options: Vec<RequestOption>,
}

impl CommissionRateService {
    /// Add a request option.
    pub fn option(mut self, option: RequestOption) -> Self {
        self.options.push(option);
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<CommissionRates, BinanceError> {
        self.send_with_cancel(&CancellationToken::new()).await
    }

    /// Send the request, giving up when `cancel` fires.
    pub async fn send_with_cancel(
        self,
        cancel: &CancellationToken,
    ) -> Result<CommissionRates, BinanceError> {
        let request = Request::new(reqwest::Method::GET, spot::ACCOUNT_COMMISSION)
            .security(SecurityType::Signed)
            .query("symbol", self.symbol)
            .require("symbol");
        self.client
            .call_api(request, cancel, &self.options)
            .await?
            .json()
    }
}

impl Client {
    /// Get account information.
    pub fn account(&self) -> AccountService {
        AccountService {
            client: self.clone(),
            omit_zero_balances: None,
            options: Vec::new(),
        }
    }

    /// Get commission rates for `symbol`.
    pub fn commission_rate(&self, symbol: impl Into<String>) -> CommissionRateService {
        CommissionRateService {
            client: self.clone(),
            symbol: symbol.into(),
            options: Vec::new(),
        }
    }
}
