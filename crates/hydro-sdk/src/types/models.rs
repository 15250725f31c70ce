/*
[INPUT]:  Exchange API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs decoded from REST payloads and stream frames
[POS]:    Data layer - value objects shared by REST and streaming
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{ChannelName, OrderType, Side};

/// An aggregated orderbook level: total amount available at a price
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceLevel {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub amount: Decimal,
}

/// Orderbook for a market
///
/// Levels are `PriceLevel` for level 1/2 books and `Order` for the level 3
/// (non-aggregated) book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orderbook<L = PriceLevel> {
    #[serde(default)]
    pub market_id: String,
    #[serde(default = "Vec::new")]
    pub bids: Vec<L>,
    #[serde(default = "Vec::new")]
    pub asks: Vec<L>,
}

/// A single entry of a level 2 orderbook delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookChange {
    pub side: Side,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub amount: Decimal,
}

impl OrderbookChange {
    pub fn level(&self) -> PriceLevel {
        PriceLevel {
            price: self.price,
            amount: self.amount,
        }
    }
}

/// Latest market data for one market
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "TickerWire", rename_all = "camelCase")]
pub struct Ticker {
    pub market_id: String,
    pub price: Decimal,
    pub volume: Decimal,
    pub ask: Decimal,
    pub bid: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerWire {
    #[serde(default)]
    market_id: String,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    volume: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    ask: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    bid: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    low: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    high: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_timestamp_opt")]
    updated_at: Option<DateTime<Utc>>,
    // stream frames carry `time` instead of `updatedAt`
    #[serde(default, deserialize_with = "serde_helpers::deserialize_timestamp_opt")]
    time: Option<DateTime<Utc>>,
}

impl From<TickerWire> for Ticker {
    fn from(wire: TickerWire) -> Self {
        Self {
            market_id: wire.market_id,
            price: wire.price,
            volume: wire.volume,
            ask: wire.ask,
            bid: wire.bid,
            low: wire.low,
            high: wire.high,
            updated_at: wire.updated_at.or(wire.time),
        }
    }
}

/// Compact on-chain order description returned with built orders
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[serde(default)]
    pub trader: String,
    #[serde(default)]
    pub relayer: String,
    #[serde(default)]
    pub base_token: String,
    #[serde(default)]
    pub quote_token: String,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub base_token_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub quote_token_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub gas_token_amount: Decimal,
    #[serde(default)]
    pub data: String,
}

/// Fee rates in `data` are stored as integers scaled by this factor
const FEE_RATE_SCALE: u32 = 100_000;

impl OrderData {
    /// Layout version, byte 0 of `data`
    pub fn version(&self) -> Option<u64> {
        self.slice_data(0, 1)
    }

    pub fn side(&self) -> Option<Side> {
        self.slice_data(1, 1)
            .map(|value| if value == 0 { Side::Buy } else { Side::Sell })
    }

    pub fn order_type(&self) -> Option<OrderType> {
        self.slice_data(2, 1).map(|value| {
            if value == 0 {
                OrderType::Limit
            } else {
                OrderType::Market
            }
        })
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.slice_data(3, 5)
            .and_then(|secs| DateTime::from_timestamp(i64::try_from(secs).ok()?, 0))
    }

    pub fn maker_fee_rate(&self) -> Option<Decimal> {
        self.scaled_rate(8)
    }

    pub fn taker_fee_rate(&self) -> Option<Decimal> {
        self.scaled_rate(10)
    }

    pub fn maker_rebate_rate(&self) -> Option<Decimal> {
        self.scaled_rate(12)
    }

    fn scaled_rate(&self, offset: usize) -> Option<Decimal> {
        self.slice_data(offset, 2)
            .map(|raw| Decimal::from(raw) / Decimal::from(FEE_RATE_SCALE))
    }

    /// Big-endian integer of `size` bytes at byte `offset` of the hex `data` field
    fn slice_data(&self, offset: usize, size: usize) -> Option<u64> {
        let raw = self.data.strip_prefix("0x").unwrap_or(&self.data);
        let hex_slice = raw.get(offset * 2..(offset + size) * 2)?;
        let bytes = hex::decode(hex_slice).ok()?;
        Some(bytes.iter().fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
    }
}

/// An order on the exchange
///
/// Orders belonging to other accounts, and orders carried by stream events,
/// only populate a subset of the fields; missing amounts decode as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "OrderWire", rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub market_id: String,
    pub status: String,
    pub side: Option<Side>,
    pub account: String,
    pub data: Option<OrderData>,
    pub amount: Decimal,
    pub price: Decimal,
    pub fee_amount: Decimal,
    pub fee_rate: Decimal,
    pub available_amount: Decimal,
    pub pending_amount: Decimal,
    pub canceled_amount: Decimal,
    pub confirmed_amount: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    market_id: String,
    #[serde(default)]
    status: String,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_side_opt")]
    side: Option<Side>,
    #[serde(default)]
    account: String,
    #[serde(default)]
    json: Option<OrderData>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    fee_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    fee: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    available_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    new_available_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pending_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    canceled_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    confirmed_amount: Decimal,
}

impl From<OrderWire> for Order {
    fn from(wire: OrderWire) -> Self {
        let available_amount = if wire.available_amount.is_zero() {
            wire.new_available_amount
        } else {
            wire.available_amount
        };

        Self {
            id: wire
                .id
                .filter(|id| !id.is_empty())
                .or(wire.order_id)
                .unwrap_or_default(),
            market_id: wire.market_id,
            status: wire.status,
            side: wire.side,
            account: wire.account,
            data: wire.json,
            amount: wire.amount,
            price: wire.price,
            fee_amount: wire.fee_amount,
            fee_rate: wire.fee,
            available_amount,
            pending_amount: wire.pending_amount,
            canceled_amount: wire.canceled_amount,
            confirmed_amount: wire.confirmed_amount,
        }
    }
}

/// A match between a maker and a taker order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    #[serde(default)]
    pub market_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub maker_order_id: String,
    #[serde(default)]
    pub taker_order_id: String,
    #[serde(default)]
    pub maker: String,
    #[serde(default)]
    pub taker: String,
    #[serde(default)]
    pub buyer: String,
    #[serde(default)]
    pub seller: String,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub taker_price: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub fee_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_timestamp_opt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_timestamp_opt")]
    pub executed_at: Option<DateTime<Utc>>,
}

/// A streaming subscription: channel plus the markets it covers
///
/// `name` keeps whatever the server echoed, so a channel this client does
/// not model still reaches the listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub name: String,
    #[serde(default)]
    pub market_ids: Vec<String>,
}

impl Channel {
    pub fn new(name: ChannelName, market_ids: Vec<String>) -> Self {
        Self {
            name: name.as_str().to_string(),
            market_ids,
        }
    }

    /// The channel as a known `ChannelName`, if it is one
    pub fn channel_name(&self) -> Option<ChannelName> {
        match self.name.as_str() {
            "ticker" => Some(ChannelName::Ticker),
            "orderbook" => Some(ChannelName::Orderbook),
            "full" => Some(ChannelName::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: String,
    #[serde(default)]
    pub quote_token: String,
    #[serde(default)]
    pub quote_token_decimals: u32,
    #[serde(default)]
    pub quote_token_address: String,
    #[serde(default)]
    pub base_token: String,
    #[serde(default)]
    pub base_token_decimals: u32,
    #[serde(default)]
    pub base_token_address: String,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub min_order_size: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub max_order_size: Decimal,
    #[serde(default)]
    pub price_precision: u32,
    #[serde(default)]
    pub price_decimals: u32,
    #[serde(default)]
    pub amount_decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Candle {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub volume: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub open: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub close: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub high: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub low: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_timestamp_opt")]
    pub time: Option<DateTime<Utc>>,
}

/// Estimated fee for an order of a given price and amount
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub total_fee_amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub fee_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedBalance {
    pub symbol: String,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_decimal_or_zero")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub symbol: String,
    pub address: String,
    #[serde(default)]
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderList {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeList {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub trades: Vec<Trade>,
}

mod serde_helpers {
    use super::{Decimal, Side};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(Decimal::ZERO),
            Value::String(raw) if raw.trim().is_empty() => Ok(Decimal::ZERO),
            Value::String(raw) => Decimal::from_str(raw.trim()).map_err(serde::de::Error::custom),
            Value::Number(number) => {
                let raw = number.to_string();
                Decimal::from_str(&raw)
                    .or_else(|_| Decimal::from_scientific(&raw))
                    .map_err(serde::de::Error::custom)
            }
            other => Err(serde::de::Error::custom(format!(
                "expected decimal string or number, got {other}"
            ))),
        }
    }

    /// Unix milliseconds (number or numeric string), RFC 3339 text, or null
    pub fn deserialize_timestamp_opt<'de, D>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Null => Ok(None),
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|ms| ms as i64))
                .map(millis_to_datetime)
                .transpose(),
            Value::String(raw) if raw.trim().is_empty() => Ok(None),
            Value::String(raw) => {
                if let Ok(ms) = raw.trim().parse::<i64>() {
                    return millis_to_datetime(ms).map(Some);
                }
                DateTime::parse_from_rfc3339(raw.trim())
                    .map(|parsed| Some(parsed.with_timezone(&Utc)))
                    .map_err(serde::de::Error::custom)
            }
            other => Err(serde::de::Error::custom(format!(
                "expected timestamp, got {other}"
            ))),
        }
    }

    /// `buy`/`sell` in any case; anything else decodes as `None`
    pub fn deserialize_side_opt<'de, D>(deserializer: D) -> Result<Option<Side>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(raw) if raw.eq_ignore_ascii_case("buy") => Some(Side::Buy),
            Value::String(raw) if raw.eq_ignore_ascii_case("sell") => Some(Side::Sell),
            _ => None,
        })
    }

    fn millis_to_datetime<E: serde::de::Error>(ms: i64) -> Result<DateTime<Utc>, E> {
        DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}")))
    }
}
