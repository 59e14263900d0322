use shop_realtime_rs::{RealtimeClient, RealtimeClientOptions, ShopEvent};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // SHOP_REALTIME_SHOP_ID, SHOP_REALTIME_PAGE_ORIGIN, ...
    let options = RealtimeClientOptions::from_env()?;
    let client = RealtimeClient::new(options)?;

    let orders = client.subscribe(ShopEvent::OrderCreated, |data| {
        println!("New order: {}", data);
    });
    let statuses = client.subscribe(ShopEvent::StatusChanged, |data| {
        println!("Status changed: {}", data);
    });

    println!("Connecting to shop event stream...");
    if let Err(e) = client.connect().await {
        eprintln!("Initial connect failed ({}), retrying in the background", e);
    }

    tokio::signal::ctrl_c().await?;

    println!("Disconnecting...");
    orders.unsubscribe();
    statuses.unsubscribe();
    client.disconnect().await;

    Ok(())
}
