/*
[INPUT]:  Order parameters supplied by callers
[OUTPUT]: Serializable request bodies for private endpoints
[POS]:    Data layer - request bodies for REST communication
[UPDATE]: When request schemas change or new private endpoints are added
*/

use rust_decimal::Decimal;
use serde::Serialize;

use super::enums::{OrderType, Side, SignatureMethod};

/// Body of `POST orders/build`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOrderRequest {
    pub market_id: String,
    pub side: Side,
    pub order_type: OrderType,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Seconds until the order expires, 0 for no expiry
    pub expires: u64,
}

impl BuildOrderRequest {
    pub fn limit(market_id: impl Into<String>, side: Side, price: Decimal, amount: Decimal) -> Self {
        Self {
            market_id: market_id.into(),
            side,
            order_type: OrderType::Limit,
            price,
            amount,
            expires: 0,
        }
    }

    pub fn with_expiry(mut self, expires: u64) -> Self {
        self.expires = expires;
        self
    }
}

/// Body of `POST orders`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub order_id: String,
    pub signature: String,
    pub method: SignatureMethod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_build_order_request_wire_format() {
        let request = BuildOrderRequest::limit(
            "HOT-WETH",
            Side::Buy,
            Decimal::from_str("0.00001").unwrap(),
            Decimal::from(1000),
        )
        .with_expiry(3600);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "marketId": "HOT-WETH",
                "side": "buy",
                "orderType": "limit",
                "price": "0.00001",
                "amount": "1000",
                "expires": 3600
            })
        );
    }
}
