/*
[INPUT]:  Market identifier and channels to watch
[OUTPUT]: Real-time ticker and orderbook updates printed to stdout
[POS]:    Examples - streaming watcher usage
[UPDATE]: When the watcher API changes
*/

use std::sync::Arc;

use hydro_sdk::*;
use tokio::time::{Duration, sleep};

struct PrintListener;

impl HydroListener for PrintListener {
    fn subscriptions_update(&self, channels: Vec<Channel>) {
        println!("subscriptions: {:?}", channels);
    }

    fn ticker_update(&self, ticker: Ticker) {
        println!("ticker {}: {}", ticker.market_id, ticker.price);
    }

    fn orderbook_update(&self, side: Side, level: PriceLevel) {
        println!("{} {} @ {}", side, level.amount, level.price);
    }
}

/// Example: watch a market for 30 seconds
#[tokio::main]
async fn main() {
    println!("=== Hydro Watcher Example ===\n");

    let watcher = HydroWatcher::new(Arc::new(PrintListener));

    // Queued until the socket opens
    watcher.subscribe(ChannelName::Ticker, ["HOT-WETH"]);
    watcher.subscribe(ChannelName::Orderbook, ["HOT-WETH"]);
    println!("✓ Subscriptions queued ({} pending)\n", watcher.pending_commands());

    sleep(Duration::from_secs(30)).await;

    watcher.close().await;
    println!(
        "\n✓ Watcher closed after {} connection attempt(s)",
        watcher.connection_attempts()
    );
}
