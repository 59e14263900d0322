use shop_realtime_rs::{
    FileTokenStore, RealtimeClient, RealtimeClientOptions, services::NoopCacheInvalidator,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Watches connection status while the backend is restarted or the network dropped
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let options = RealtimeClientOptions::from_env()?;
    let token_file =
        std::env::var("SHOP_REALTIME_TOKEN_FILE").unwrap_or_else(|_| "token.json".to_string());

    let client = RealtimeClient::builder(options)?
        .token_store(Arc::new(FileTokenStore::new(token_file)))
        .cache_invalidator(Arc::new(NoopCacheInvalidator))
        .build();

    let mut status = client.status();
    let watcher = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = *status.borrow_and_update();
            println!(
                "state={:?} attempts={} exhausted={}",
                current.state, current.attempts, current.exhausted
            );
            if current.exhausted {
                println!("Reconnection gave up; real-time updates are disabled");
            }
        }
    });

    if let Err(e) = client.connect().await {
        eprintln!("Initial connect failed: {}", e);
    }

    println!("Interrupt the backend to watch reconnection, ctrl-c to quit");
    tokio::signal::ctrl_c().await?;

    client.disconnect().await;
    watcher.abort();
    Ok(())
}
