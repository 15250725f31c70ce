/*
[INPUT]:  Market identifier (e.g., "HOT-WETH")
[OUTPUT]: Market data (market info, ticker, orderbook, trades)
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use hydro_sdk::*;

/// Example: Query market data (no authentication required)
#[tokio::main]
async fn main() {
    println!("=== Hydro Market Data Example ===\n");

    // Create client (no signer needed for public endpoints)
    let client = match HydroClient::without_auth() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created (no auth required for public endpoints)\n");

    let market_id = "HOT-WETH";

    println!("Querying market {}...", market_id);
    match client.get_market(market_id).await {
        Ok(market) => println!("✓ Market: {:?}", market),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying ticker for {}...", market_id);
    match client.get_ticker(market_id).await {
        Ok(ticker) => println!("✓ Price {} (bid {}, ask {})", ticker.price, ticker.bid, ticker.ask),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying level 2 orderbook for {}...", market_id);
    match client.get_orderbook(market_id, OrderbookLevel::Two).await {
        Ok(book) => println!("✓ {} bids, {} asks", book.bids.len(), book.asks.len()),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying recent trades for {}...", market_id);
    match client.list_trades(market_id, Some(1), Some(10)).await {
        Ok(list) => println!("✓ {} trades on page {}", list.trades.len(), list.current_page),
        Err(e) => println!("✗ Error: {}", e),
    }

    // Private calls fail locally without a signer
    match client.list_orders(Some(market_id), None, None, None).await {
        Err(e) if e.is_auth_error() => println!("\n✓ Private call rejected locally: {}", e),
        other => println!("\n✗ Unexpected result: {:?}", other.map(|list| list.orders.len())),
    }

    println!("\n✓ Market data example complete");
}
