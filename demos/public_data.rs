//! Example: Public market data over HTTP.
//!
//! Run with: cargo run --example public_data

use binance_api_client::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new();

    client.ping().send().await?;
    let time = client.server_time().send().await?;
    println!("Server time: {}", time);

    let offset = client.set_server_time().send().await?;
    println!("Local clock is {} ms ahead of the server", offset);

    let book = client.depth("BTCUSDT").limit(5).send().await?;
    for level in &book.bids {
        println!("bid {} x {}", level.price, level.quantity);
    }
    for level in &book.asks {
        println!("ask {} x {}", level.price, level.quantity);
    }

    Ok(())
}
