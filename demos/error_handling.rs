//! Example: Working with BinanceError and ApiError.
//!
//! Run with: cargo run --example error_handling

use binance_api_client::BinanceError;
use binance_api_client::error::{ApiError, error_codes};

fn main() {
    let api_error = ApiError::new(-1021, "Timestamp for this request is outside of the recvWindow.");
    println!("API error: {}", api_error);
    println!("Outside recvWindow: {}", api_error.is_timestamp_outside_recv_window());
    println!("Rate limited: {}", api_error.is_rate_limited());

    let err = BinanceError::Api(api_error);
    match &err {
        BinanceError::Api(inner) if inner.code == error_codes::INVALID_TIMESTAMP => {
            println!("Resynchronize the clock with set_server_time()");
        }
        BinanceError::Timeout | BinanceError::Cancelled => {
            println!("Abandoned locally, the request may still have executed");
        }
        _ => println!("Unexpected error: {}", err),
    }
}
