/*
[INPUT]:  WebSocket configuration, subscription channels and a listener
[OUTPUT]: Real-time market data and order events
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new channels or changing connection logic
*/

pub mod client;
pub mod listener;
pub mod message;
mod queue;

pub use client::{ConnectionState, HydroWatcher, WS_URL, WatcherConfig};
pub use listener::{ChannelListener, HydroListener, WatcherEvent, dispatch};
pub use message::{
    CommandType, InboundMessage, MessageKind, OrderEvent, OutboundCommand, TradeEvent,
};
