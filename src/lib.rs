//! # Binance Client
//!
//! An async Rust client library for the Binance REST API and WebSocket API.
//!
//! ## Features
//!
//! - One dispatcher for both transports: calls use the WebSocket API while it
//!   is connected and fall back to HTTP otherwise
//! - HMAC-SHA256 request signing with a server clock offset
//! - Request/response correlation with per-call timeouts and cancellation
//! - Automatic reconnection after an unexpected disconnect
//! - User data events pushed over the WebSocket API
//! - Rate-limit counters from every response
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use binance_api_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new();
//!     let time = client.server_time().send().await?;
//!     println!("Server time: {}", time);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod request;
pub mod spot;
pub mod types;
pub mod ws;

// Re-export commonly used types at crate root
pub use client::{ApiResponse, Client, ClientBuilder};
pub use endpoints::ApiFlavor;
pub use error::{ApiError, BinanceError};
pub use rate_limit::RateLimits;
pub use request::{Request, RequestOption, SecurityType};
pub use types::common::{OrderSide, OrderStatus, OrderType, TimeInForce};
pub use ws::{ConnectionState, UserDataEvent, UserDataStream, WsConfig};

/// Result type alias using BinanceError
pub type Result<T> = std::result::Result<T, BinanceError>;
