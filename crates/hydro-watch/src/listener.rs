/*
[INPUT]:  Watcher callbacks (tickers, orderbook changes, order and trade events)
[OUTPUT]: Structured tracing events and per-kind counters
[POS]:    Event sink - turns stream updates into log lines
[UPDATE]: When adding new listener callbacks or log fields
*/

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use hydro_sdk::{Channel, HydroListener, Order, Orderbook, PriceLevel, Side, Ticker, Trade};
use tracing::{debug, info};

/// Counts of events seen since startup
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventCounts {
    pub tickers: u64,
    pub snapshots: u64,
    pub level_updates: u64,
    pub order_events: u64,
    pub trade_events: u64,
}

/// Listener that logs every update
#[derive(Debug, Default)]
pub struct LogListener {
    tickers: AtomicU64,
    snapshots: AtomicU64,
    level_updates: AtomicU64,
    order_events: AtomicU64,
    trade_events: AtomicU64,
}

impl LogListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> EventCounts {
        EventCounts {
            tickers: self.tickers.load(Ordering::Relaxed),
            snapshots: self.snapshots.load(Ordering::Relaxed),
            level_updates: self.level_updates.load(Ordering::Relaxed),
            order_events: self.order_events.load(Ordering::Relaxed),
            trade_events: self.trade_events.load(Ordering::Relaxed),
        }
    }

    fn order_event(&self, event: &str, order: &Order, sequence: u64, time: DateTime<Utc>) {
        self.order_events.fetch_add(1, Ordering::Relaxed);
        info!(
            event,
            order_id = %order.id,
            market_id = %order.market_id,
            side = ?order.side,
            price = %order.price,
            amount = %order.amount,
            sequence,
            time = %time,
            "order"
        );
    }

    fn trade_event(&self, event: &str, trade: &Trade, sequence: u64, time: DateTime<Utc>) {
        self.trade_events.fetch_add(1, Ordering::Relaxed);
        info!(
            event,
            market_id = %trade.market_id,
            price = %trade.price,
            amount = %trade.amount,
            maker_order_id = %trade.maker_order_id,
            taker_order_id = %trade.taker_order_id,
            sequence,
            time = %time,
            "trade"
        );
    }
}

impl HydroListener for LogListener {
    fn subscriptions_update(&self, channels: Vec<Channel>) {
        for channel in channels {
            info!(
                channel = %channel.name,
                markets = ?channel.market_ids,
                "subscribed"
            );
        }
    }

    fn ticker_update(&self, ticker: Ticker) {
        self.tickers.fetch_add(1, Ordering::Relaxed);
        info!(
            market_id = %ticker.market_id,
            price = %ticker.price,
            bid = %ticker.bid,
            ask = %ticker.ask,
            volume = %ticker.volume,
            "ticker"
        );
    }

    fn orderbook_snapshot(&self, orderbook: Orderbook<PriceLevel>) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
        info!(
            market_id = %orderbook.market_id,
            bids = orderbook.bids.len(),
            asks = orderbook.asks.len(),
            best_bid = ?orderbook.bids.first().map(|level| level.price),
            best_ask = ?orderbook.asks.first().map(|level| level.price),
            "orderbook snapshot"
        );
    }

    fn orderbook_update(&self, side: Side, level: PriceLevel) {
        self.level_updates.fetch_add(1, Ordering::Relaxed);
        debug!(side = %side, price = %level.price, amount = %level.amount, "orderbook level");
    }

    fn full_snapshot(&self, orderbook: Orderbook<Order>, sequence: u64) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
        info!(
            market_id = %orderbook.market_id,
            bids = orderbook.bids.len(),
            asks = orderbook.asks.len(),
            sequence,
            "full orderbook snapshot"
        );
    }

    fn order_received(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.order_event("receive", &order, sequence, time);
    }

    fn order_opened(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.order_event("open", &order, sequence, time);
    }

    fn order_done(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.order_event("done", &order, sequence, time);
    }

    fn order_changed(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.order_event("change", &order, sequence, time);
    }

    fn trade_begin(&self, trade: Trade, sequence: u64, time: DateTime<Utc>) {
        self.trade_event("trade", &trade, sequence, time);
    }

    fn trade_success(&self, trade: Trade, sequence: u64, time: DateTime<Utc>) {
        self.trade_event("trade_success", &trade, sequence, time);
    }
}
