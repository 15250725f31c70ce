/*
[INPUT]:  Decoded InboundMessage values
[OUTPUT]: Typed listener callbacks, or WatcherEvent values on a channel
[POS]:    WebSocket layer - message routing to user code
[UPDATE]: When adding new message types or listener callbacks
*/

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::types::{Channel, Order, Orderbook, PriceLevel, Side, Ticker, Trade};
use crate::ws::message::InboundMessage;

/// Receives updates from a `HydroWatcher`
///
/// Every method has an empty default body, so implementors only override the
/// updates they care about. Callbacks run on the watcher's connection task and
/// should return quickly; slow work belongs on another task.
pub trait HydroListener: Send + Sync {
    /// Current subscriptions after a subscribe/unsubscribe was processed
    fn subscriptions_update(&self, _channels: Vec<Channel>) {}

    /// `ticker` channel
    fn ticker_update(&self, _ticker: Ticker) {}

    /// `orderbook` channel, sent once on subscribe
    fn orderbook_snapshot(&self, _orderbook: Orderbook<PriceLevel>) {}

    /// `orderbook` channel, one call per changed level
    fn orderbook_update(&self, _side: Side, _level: PriceLevel) {}

    /// `full` channel, sent once on subscribe
    fn full_snapshot(&self, _orderbook: Orderbook<Order>, _sequence: u64) {}

    fn order_received(&self, _order: Order, _sequence: u64, _time: DateTime<Utc>) {}

    fn order_opened(&self, _order: Order, _sequence: u64, _time: DateTime<Utc>) {}

    fn order_done(&self, _order: Order, _sequence: u64, _time: DateTime<Utc>) {}

    fn order_changed(&self, _order: Order, _sequence: u64, _time: DateTime<Utc>) {}

    /// A match was found and submitted to the chain
    fn trade_begin(&self, _trade: Trade, _sequence: u64, _time: DateTime<Utc>) {}

    /// A trade was confirmed on chain
    fn trade_success(&self, _trade: Trade, _sequence: u64, _time: DateTime<Utc>) {}
}

/// Route a decoded message to the matching listener callback
///
/// Delta frames fan out into one `orderbook_update` call per change, in frame
/// order. `Unknown` messages are not delivered.
pub fn dispatch(listener: &dyn HydroListener, message: InboundMessage) {
    match message {
        InboundMessage::Subscriptions(channels) => listener.subscriptions_update(channels),
        InboundMessage::Ticker(ticker) => listener.ticker_update(ticker),
        InboundMessage::OrderbookSnapshot(orderbook) => listener.orderbook_snapshot(orderbook),
        InboundMessage::OrderbookUpdate { changes, .. } => {
            for change in changes {
                listener.orderbook_update(change.side, change.level());
            }
        }
        InboundMessage::FullSnapshot {
            orderbook,
            sequence,
        } => listener.full_snapshot(orderbook, sequence),
        InboundMessage::OrderReceived(event) => {
            listener.order_received(event.order, event.sequence, event.time)
        }
        InboundMessage::OrderOpened(event) => {
            listener.order_opened(event.order, event.sequence, event.time)
        }
        InboundMessage::OrderDone(event) => listener.order_done(event.order, event.sequence, event.time),
        InboundMessage::OrderChanged(event) => {
            listener.order_changed(event.order, event.sequence, event.time)
        }
        InboundMessage::TradeBegin(event) => {
            listener.trade_begin(event.trade, event.sequence, event.time)
        }
        InboundMessage::TradeSuccess(event) => {
            listener.trade_success(event.trade, event.sequence, event.time)
        }
        InboundMessage::Unknown(_) => {}
    }
}

/// One listener callback as a value
#[derive(Debug, Clone, PartialEq)]
pub enum WatcherEvent {
    Subscriptions(Vec<Channel>),
    Ticker(Ticker),
    OrderbookSnapshot(Orderbook<PriceLevel>),
    OrderbookUpdate {
        side: Side,
        level: PriceLevel,
    },
    FullSnapshot {
        orderbook: Orderbook<Order>,
        sequence: u64,
    },
    OrderReceived {
        order: Order,
        sequence: u64,
        time: DateTime<Utc>,
    },
    OrderOpened {
        order: Order,
        sequence: u64,
        time: DateTime<Utc>,
    },
    OrderDone {
        order: Order,
        sequence: u64,
        time: DateTime<Utc>,
    },
    OrderChanged {
        order: Order,
        sequence: u64,
        time: DateTime<Utc>,
    },
    TradeBegin {
        trade: Trade,
        sequence: u64,
        time: DateTime<Utc>,
    },
    TradeSuccess {
        trade: Trade,
        sequence: u64,
        time: DateTime<Utc>,
    },
}

/// Listener that forwards every callback into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<WatcherEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WatcherEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: WatcherEvent) {
        // receiver gone means nobody is listening any more
        let _ = self.tx.send(event);
    }
}

impl HydroListener for ChannelListener {
    fn subscriptions_update(&self, channels: Vec<Channel>) {
        self.emit(WatcherEvent::Subscriptions(channels));
    }

    fn ticker_update(&self, ticker: Ticker) {
        self.emit(WatcherEvent::Ticker(ticker));
    }

    fn orderbook_snapshot(&self, orderbook: Orderbook<PriceLevel>) {
        self.emit(WatcherEvent::OrderbookSnapshot(orderbook));
    }

    fn orderbook_update(&self, side: Side, level: PriceLevel) {
        self.emit(WatcherEvent::OrderbookUpdate { side, level });
    }

    fn full_snapshot(&self, orderbook: Orderbook<Order>, sequence: u64) {
        self.emit(WatcherEvent::FullSnapshot { orderbook, sequence });
    }

    fn order_received(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.emit(WatcherEvent::OrderReceived {
            order,
            sequence,
            time,
        });
    }

    fn order_opened(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.emit(WatcherEvent::OrderOpened {
            order,
            sequence,
            time,
        });
    }

    fn order_done(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.emit(WatcherEvent::OrderDone {
            order,
            sequence,
            time,
        });
    }

    fn order_changed(&self, order: Order, sequence: u64, time: DateTime<Utc>) {
        self.emit(WatcherEvent::OrderChanged {
            order,
            sequence,
            time,
        });
    }

    fn trade_begin(&self, trade: Trade, sequence: u64, time: DateTime<Utc>) {
        self.emit(WatcherEvent::TradeBegin {
            trade,
            sequence,
            time,
        });
    }

    fn trade_success(&self, trade: Trade, sequence: u64, time: DateTime<Utc>) {
        self.emit(WatcherEvent::TradeSuccess {
            trade,
            sequence,
            time,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        updates: Mutex<Vec<(Side, PriceLevel)>>,
        tickers: Mutex<Vec<Ticker>>,
    }

    impl HydroListener for Recorder {
        fn ticker_update(&self, ticker: Ticker) {
            self.tickers.lock().unwrap().push(ticker);
        }

        fn orderbook_update(&self, side: Side, level: PriceLevel) {
            self.updates.lock().unwrap().push((side, level));
        }
    }

    #[test]
    fn test_delta_fans_out_in_order() {
        let recorder = Recorder::default();
        let message = InboundMessage::parse(
            r#"{"type":"level2OrderbookUpdate","marketId":"HOT-WETH","changes":[
                {"side":"buy","price":"1","amount":"10"},
                {"side":"sell","price":"2","amount":"20"},
                {"side":"buy","price":"3","amount":"0"}
            ]}"#,
        )
        .unwrap();

        dispatch(&recorder, message);

        let updates = recorder.updates.lock().unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].0, Side::Buy);
        assert_eq!(updates[1].0, Side::Sell);
        assert_eq!(updates[1].1.amount, Decimal::from(20));
        assert_eq!(updates[2].1.price, Decimal::from(3));
    }

    #[test]
    fn test_unset_callbacks_are_skipped() {
        let recorder = Recorder::default();
        let message = InboundMessage::parse(
            r#"{"type":"done","orderId":"0x1","sequence":1,"time":1546300800000}"#,
        )
        .unwrap();

        dispatch(&recorder, message);
        dispatch(&recorder, InboundMessage::Unknown("heartbeat".to_string()));

        assert!(recorder.updates.lock().unwrap().is_empty());
        assert!(recorder.tickers.lock().unwrap().is_empty());
    }

    #[test]
    fn test_channel_listener_forwards_events() {
        let (listener, mut rx) = ChannelListener::new();
        let message = InboundMessage::parse(
            r#"{"type":"trade_success","marketId":"HOT-WETH","price":"1","amount":"5",
                "sequence":9,"time":1546300800000}"#,
        )
        .unwrap();

        dispatch(&listener, message);

        match rx.try_recv().unwrap() {
            WatcherEvent::TradeSuccess { trade, sequence, .. } => {
                assert_eq!(trade.market_id, "HOT-WETH");
                assert_eq!(sequence, 9);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_listener_survives_dropped_receiver() {
        let (listener, rx) = ChannelListener::new();
        drop(rx);
        listener.ticker_update(Ticker::default());
    }
}
