//! Spot API services.
//!
//! Each service wraps one REST endpoint and, where Binance offers one, the
//! equivalent WebSocket API method. Services are created from a [`Client`]
//! and configured builder-style before calling `send()`:
//!
//! ```rust,no_run
//! use binance_api_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new();
//!     let book = client.depth("BTCUSDT").limit(5).send().await?;
//!     println!("Best bid: {:?}", book.bids.first());
//!     Ok(())
//! }
//! ```
//!
//! [`Client`]: crate::Client

mod account;
mod market;
mod trade;
mod user_stream;

pub use account::{
    AccountBalance, AccountInfo, AccountService, CommissionDiscount, CommissionRateService,
    CommissionRates, CommissionSchedule,
};
pub use market::{
    DepthService, OrderBook, PingService, PriceLevel, ServerTimeService, SetServerTimeService,
};
pub use trade::{CreateOrderResponse, CreateOrderService, OrderFill};
pub use user_stream::{
    CloseUserStreamService, KeepaliveUserStreamService, StartUserStreamService,
};
