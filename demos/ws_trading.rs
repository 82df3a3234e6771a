//! Example: Signed calls and user data over the WebSocket API.
//!
//! Run with: cargo run --example ws_trading

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use binance_api_client::auth::EnvCredentials;
use binance_api_client::types::NewOrderRespType;
use binance_api_client::{Client, OrderSide, OrderType, RequestOption, TimeInForce, UserDataEvent};
use futures_util::StreamExt;
use rust_decimal::Decimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let credentials = match EnvCredentials::try_from_env() {
        Some(creds) => Arc::new(creds),
        None => {
            println!("Set BINANCE_API_KEY and BINANCE_API_SECRET to run this example.");
            return Ok(());
        }
    };

    let client = Client::builder()
        .testnet(true)
        .credentials(credentials)
        .connect()
        .await;
    println!("WebSocket API: {}", client.connection_state());

    client.set_server_time().send().await?;

    let mut events = client.subscribe_user_data().await?;
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                UserDataEvent::ExecutionReport(report) => {
                    println!("execution: {:?}", report);
                }
                other => println!("{}", other.event_type()),
            }
        }
    });

    let order = client
        .create_order("BTCUSDT", OrderSide::Buy, OrderType::Limit)
        .time_in_force(TimeInForce::GTC)
        .quantity(Decimal::from_str("0.001")?)
        .price(Decimal::from_str("10000")?)
        .new_order_resp_type(NewOrderRespType::Result)
        .option(RequestOption::recv_window(5000))
        .send()
        .await?;
    println!("Placed order {} ({:?})", order.order_id, order.status);

    tokio::time::sleep(Duration::from_secs(2)).await;
    client.close();
    Ok(())
}
