/*
[INPUT]:  Raw REST response bodies
[OUTPUT]: Envelope and payload wrappers around the typed models
[POS]:    Data layer - response shapes for REST communication
[UPDATE]: When API response schemas change
*/

use serde::Deserialize;
use serde_json::Value;

use super::models::{Candle, LockedBalance, Market, Order, Orderbook, Ticker, Token};

/// Status value of a successful envelope
pub const ENVELOPE_SUCCESS: i64 = 0;

/// Outer wrapper of every REST response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub status: i64,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status == ENVELOPE_SUCCESS
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketResponse {
    pub market: Market,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickersResponse {
    pub tickers: Vec<Ticker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerResponse {
    pub ticker: Ticker,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "L: Deserialize<'de>"))]
pub struct OrderbookResponse<L> {
    #[serde(rename = "orderBook")]
    pub order_book: Orderbook<L>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandlesResponse {
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedBalancesResponse {
    pub locked_balances: Vec<LockedBalance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedBalanceResponse {
    pub locked_balance: LockedBalance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: Token,
}
