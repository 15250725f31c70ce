/*
[INPUT]:  Exchange API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - enum definitions shared by REST and streaming
[UPDATE]: When API schema changes or new enum values are added
*/

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

/// Filter used when listing the account's orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    All,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::All => "all",
        }
    }
}

/// Amount of detail returned by the orderbook endpoint
///
/// Level 1 is the best bid/ask only, level 2 aggregates the top 50 price
/// levels, level 3 is the full non-aggregated book with individual orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderbookLevel {
    #[serde(rename = "1")]
    #[default]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl OrderbookLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderbookLevel::One => "1",
            OrderbookLevel::Two => "2",
            OrderbookLevel::Three => "3",
        }
    }
}

/// Streaming channels a watcher can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelName {
    Ticker,
    Orderbook,
    Full,
}

impl ChannelName {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelName::Ticker => "ticker",
            ChannelName::Orderbook => "orderbook",
            ChannelName::Full => "full",
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature scheme reported when placing an order
///
/// Only eth_sign is produced by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMethod {
    EthSign,
    Eip712,
}

impl SignatureMethod {
    pub fn code(self) -> u8 {
        match self {
            SignatureMethod::EthSign => 0,
            SignatureMethod::Eip712 => 1,
        }
    }
}

impl Serialize for SignatureMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_name_wire_format() {
        assert_eq!(
            serde_json::to_string(&ChannelName::Orderbook).unwrap(),
            r#""orderbook""#
        );
        let parsed: ChannelName = serde_json::from_str(r#""full""#).unwrap();
        assert_eq!(parsed, ChannelName::Full);
    }

    #[test]
    fn test_orderbook_level_serializes_as_digit() {
        assert_eq!(serde_json::to_string(&OrderbookLevel::Three).unwrap(), r#""3""#);
        assert_eq!(OrderbookLevel::default(), OrderbookLevel::One);
    }

    #[test]
    fn test_signature_method_serializes_as_code() {
        assert_eq!(serde_json::to_string(&SignatureMethod::EthSign).unwrap(), "0");
    }
}
