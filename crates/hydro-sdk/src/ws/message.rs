/*
[INPUT]:  Raw WebSocket text frames and caller subscription intents
[OUTPUT]: Typed InboundMessage values and serialized outbound commands
[POS]:    WebSocket layer - message parsing and validation
[UPDATE]: When adding new message types or changing format
*/

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::Result;
use crate::types::{
    Channel, ChannelName, Order, Orderbook, OrderbookChange, PriceLevel, Ticker, Trade,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Subscribe,
    Unsubscribe,
}

/// Subscribe/unsubscribe request written to the socket
///
/// Wire format: `{"type":"subscribe","channels":[{"name":"ticker","marketIds":["HOT-WETH"]}]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundCommand {
    #[serde(rename = "type")]
    pub command: CommandType,
    pub channels: Vec<Channel>,
}

impl OutboundCommand {
    pub fn new(command: CommandType, channel: ChannelName, market_ids: Vec<String>) -> Self {
        Self {
            command,
            channels: vec![Channel::new(channel, market_ids)],
        }
    }

    pub fn subscribe(channel: ChannelName, market_ids: Vec<String>) -> Self {
        Self::new(CommandType::Subscribe, channel, market_ids)
    }

    pub fn unsubscribe(channel: ChannelName, market_ids: Vec<String>) -> Self {
        Self::new(CommandType::Unsubscribe, channel, market_ids)
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Known values of the `type` discriminator of inbound frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Subscriptions,
    Ticker,
    Level2Snapshot,
    Level2Update,
    Level3Snapshot,
    Receive,
    Open,
    Done,
    Change,
    Trade,
    TradeSuccess,
}

impl MessageKind {
    pub fn from_discriminator(discriminator: &str) -> Option<Self> {
        let kind = match discriminator {
            "subscriptions" => MessageKind::Subscriptions,
            "ticker" => MessageKind::Ticker,
            "level2OrderbookSnapshot" => MessageKind::Level2Snapshot,
            "level2OrderbookUpdate" => MessageKind::Level2Update,
            "level3OrderbookSnapshot" => MessageKind::Level3Snapshot,
            "receive" => MessageKind::Receive,
            "open" => MessageKind::Open,
            "done" => MessageKind::Done,
            "change" => MessageKind::Change,
            "trade" => MessageKind::Trade,
            "trade_success" => MessageKind::TradeSuccess,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Subscriptions => "subscriptions",
            MessageKind::Ticker => "ticker",
            MessageKind::Level2Snapshot => "level2OrderbookSnapshot",
            MessageKind::Level2Update => "level2OrderbookUpdate",
            MessageKind::Level3Snapshot => "level3OrderbookSnapshot",
            MessageKind::Receive => "receive",
            MessageKind::Open => "open",
            MessageKind::Done => "done",
            MessageKind::Change => "change",
            MessageKind::Trade => "trade",
            MessageKind::TradeSuccess => "trade_success",
        }
    }
}

/// Order lifecycle event from the `full` channel
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEvent {
    pub order: Order,
    pub sequence: u64,
    pub time: DateTime<Utc>,
}

/// Trade event from the `full` channel
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub trade: Trade,
    pub sequence: u64,
    pub time: DateTime<Utc>,
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Subscriptions(Vec<Channel>),
    Ticker(Ticker),
    OrderbookSnapshot(Orderbook<PriceLevel>),
    OrderbookUpdate {
        market_id: String,
        changes: Vec<OrderbookChange>,
    },
    FullSnapshot {
        orderbook: Orderbook<Order>,
        sequence: u64,
    },
    OrderReceived(OrderEvent),
    OrderOpened(OrderEvent),
    OrderDone(OrderEvent),
    OrderChanged(OrderEvent),
    TradeBegin(TradeEvent),
    TradeSuccess(TradeEvent),
    /// Frame with a discriminator this client does not handle
    Unknown(String),
}

#[derive(Deserialize)]
struct SubscriptionsFrame {
    #[serde(default)]
    channels: Vec<Channel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Level2UpdateFrame {
    #[serde(default)]
    market_id: String,
    #[serde(default)]
    changes: Vec<OrderbookChange>,
}

#[derive(Deserialize)]
struct SequenceFrame {
    sequence: u64,
}

#[derive(Deserialize)]
struct EventMeta {
    sequence: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    time: DateTime<Utc>,
}

impl InboundMessage {
    /// Parse a text frame: read `type`, then decode with that kind's decoder
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Some(discriminator) = value.get("type").and_then(Value::as_str) else {
            return Err(serde_json::Error::missing_field("type"));
        };

        match MessageKind::from_discriminator(discriminator) {
            Some(kind) => Self::decode(kind, &value),
            None => Ok(InboundMessage::Unknown(discriminator.to_string())),
        }
    }

    fn decode(kind: MessageKind, value: &Value) -> serde_json::Result<Self> {
        let message = match kind {
            MessageKind::Subscriptions => {
                InboundMessage::Subscriptions(SubscriptionsFrame::deserialize(value)?.channels)
            }
            MessageKind::Ticker => InboundMessage::Ticker(Ticker::deserialize(value)?),
            MessageKind::Level2Snapshot => {
                InboundMessage::OrderbookSnapshot(Orderbook::<PriceLevel>::deserialize(value)?)
            }
            MessageKind::Level2Update => {
                let frame = Level2UpdateFrame::deserialize(value)?;
                InboundMessage::OrderbookUpdate {
                    market_id: frame.market_id,
                    changes: frame.changes,
                }
            }
            MessageKind::Level3Snapshot => InboundMessage::FullSnapshot {
                orderbook: Orderbook::<Order>::deserialize(value)?,
                sequence: SequenceFrame::deserialize(value)?.sequence,
            },
            MessageKind::Receive => InboundMessage::OrderReceived(order_event(value)?),
            MessageKind::Open => InboundMessage::OrderOpened(order_event(value)?),
            MessageKind::Done => InboundMessage::OrderDone(order_event(value)?),
            MessageKind::Change => InboundMessage::OrderChanged(order_event(value)?),
            MessageKind::Trade => InboundMessage::TradeBegin(trade_event(value)?),
            MessageKind::TradeSuccess => InboundMessage::TradeSuccess(trade_event(value)?),
        };
        Ok(message)
    }

    /// Discriminator of the frame this message was decoded from
    pub fn kind_name(&self) -> &str {
        match self {
            InboundMessage::Subscriptions(_) => MessageKind::Subscriptions.as_str(),
            InboundMessage::Ticker(_) => MessageKind::Ticker.as_str(),
            InboundMessage::OrderbookSnapshot(_) => MessageKind::Level2Snapshot.as_str(),
            InboundMessage::OrderbookUpdate { .. } => MessageKind::Level2Update.as_str(),
            InboundMessage::FullSnapshot { .. } => MessageKind::Level3Snapshot.as_str(),
            InboundMessage::OrderReceived(_) => MessageKind::Receive.as_str(),
            InboundMessage::OrderOpened(_) => MessageKind::Open.as_str(),
            InboundMessage::OrderDone(_) => MessageKind::Done.as_str(),
            InboundMessage::OrderChanged(_) => MessageKind::Change.as_str(),
            InboundMessage::TradeBegin(_) => MessageKind::Trade.as_str(),
            InboundMessage::TradeSuccess(_) => MessageKind::TradeSuccess.as_str(),
            InboundMessage::Unknown(discriminator) => discriminator,
        }
    }
}

fn event_parts<T: DeserializeOwned>(value: &Value) -> serde_json::Result<(T, EventMeta)> {
    Ok((T::deserialize(value)?, EventMeta::deserialize(value)?))
}

fn order_event(value: &Value) -> serde_json::Result<OrderEvent> {
    let (order, meta) = event_parts::<Order>(value)?;
    Ok(OrderEvent {
        order,
        sequence: meta.sequence,
        time: meta.time,
    })
}

fn trade_event(value: &Value) -> serde_json::Result<TradeEvent> {
    let (trade, meta) = event_parts::<Trade>(value)?;
    Ok(TradeEvent {
        trade,
        sequence: meta.sequence,
        time: meta.time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[test]
    fn test_subscribe_command_wire_format() {
        let command = OutboundCommand::subscribe(ChannelName::Ticker, vec!["HOT-WETH".to_string()]);
        let value: Value = serde_json::from_str(&command.to_text().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "subscribe",
                "channels": [{"name": "ticker", "marketIds": ["HOT-WETH"]}]
            })
        );
    }

    #[test]
    fn test_unsubscribe_command_type() {
        let command = OutboundCommand::unsubscribe(ChannelName::Full, vec![]);
        let text = command.to_text().unwrap();
        assert!(text.contains(r#""type":"unsubscribe""#));
        assert!(text.contains(r#""name":"full""#));
    }

    #[rstest]
    #[case("subscriptions", Some(MessageKind::Subscriptions))]
    #[case("ticker", Some(MessageKind::Ticker))]
    #[case("level2OrderbookSnapshot", Some(MessageKind::Level2Snapshot))]
    #[case("level2OrderbookUpdate", Some(MessageKind::Level2Update))]
    #[case("level3OrderbookSnapshot", Some(MessageKind::Level3Snapshot))]
    #[case("receive", Some(MessageKind::Receive))]
    #[case("open", Some(MessageKind::Open))]
    #[case("done", Some(MessageKind::Done))]
    #[case("change", Some(MessageKind::Change))]
    #[case("trade", Some(MessageKind::Trade))]
    #[case("trade_success", Some(MessageKind::TradeSuccess))]
    #[case("heartbeat", None)]
    #[case("Ticker", None)]
    fn test_discriminator_mapping(#[case] discriminator: &str, #[case] expected: Option<MessageKind>) {
        let kind = MessageKind::from_discriminator(discriminator);
        assert_eq!(kind, expected);
        if let Some(kind) = kind {
            assert_eq!(kind.as_str(), discriminator);
        }
    }

    #[test]
    fn test_parse_level2_update() {
        let message = InboundMessage::parse(
            r#"{"type":"level2OrderbookUpdate","marketId":"HOT-WETH","changes":[
                {"side":"buy","price":"0.0000062","amount":"100"},
                {"side":"sell","price":"0.0000063","amount":"0"}
            ]}"#,
        )
        .unwrap();

        let InboundMessage::OrderbookUpdate { market_id, changes } = message else {
            panic!("expected orderbook update");
        };
        assert_eq!(market_id, "HOT-WETH");
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].side, Side::Sell);
        assert_eq!(changes[1].amount, Decimal::ZERO);
    }

    #[test]
    fn test_parse_order_event() {
        let message = InboundMessage::parse(
            r#"{"type":"receive","orderId":"0xabc","marketId":"HOT-WETH","side":"buy",
                "price":"0.0000062","amount":"100","sequence":42,"time":1546300800000}"#,
        )
        .unwrap();

        let InboundMessage::OrderReceived(event) = message else {
            panic!("expected order event");
        };
        assert_eq!(event.order.id, "0xabc");
        assert_eq!(event.sequence, 42);
        assert_eq!(event.time.timestamp_millis(), 1_546_300_800_000);
    }

    #[test]
    fn test_parse_full_snapshot_sequence() {
        let message = InboundMessage::parse(
            r#"{"type":"level3OrderbookSnapshot","marketId":"HOT-WETH","sequence":7,
                "bids":[{"orderId":"0x1","price":"1","amount":"2"}],"asks":[]}"#,
        )
        .unwrap();

        let InboundMessage::FullSnapshot { orderbook, sequence } = message else {
            panic!("expected full snapshot");
        };
        assert_eq!(sequence, 7);
        assert_eq!(orderbook.bids[0].id, "0x1");
    }

    #[test]
    fn test_unknown_discriminator() {
        let message = InboundMessage::parse(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(message, InboundMessage::Unknown("heartbeat".to_string()));
        assert_eq!(message.kind_name(), "heartbeat");
    }

    #[test]
    fn test_subscriptions_with_unmodelled_channel() {
        let message = InboundMessage::parse(
            r#"{"type":"subscriptions","channels":[{"name":"ticker","marketIds":["HOT-WETH"]},{"name":"candles","marketIds":[]}]}"#,
        )
        .unwrap();
        let InboundMessage::Subscriptions(channels) = message else {
            panic!("expected subscriptions");
        };
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].channel_name(), Some(ChannelName::Ticker));
        assert_eq!(channels[1].name, "candles");
    }

    #[rstest]
    #[case::not_json("not json")]
    #[case::missing_type(r#"{"marketId":"HOT-WETH"}"#)]
    #[case::event_without_sequence(r#"{"type":"done","orderId":"0x1","time":1}"#)]
    #[case::bad_side(r#"{"type":"level2OrderbookUpdate","changes":[{"side":"up","price":"1","amount":"1"}]}"#)]
    fn test_malformed_frames_fail_to_parse(#[case] text: &str) {
        assert!(InboundMessage::parse(text).is_err());
    }
}
