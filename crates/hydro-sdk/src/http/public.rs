/*
[INPUT]:  Market identifiers and query parameters
[OUTPUT]: Market data (markets, tickers, orderbooks, trades, candles, fees, tokens)
[POS]:    HTTP layer - public endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use rust_decimal::Decimal;

use crate::http::{Access, HydroClient, HydroError, Result};
use crate::types::{
    Candle, CandlesResponse, Fee, Market, MarketResponse, MarketsResponse, Order, Orderbook,
    OrderbookLevel, OrderbookResponse, PriceLevel, Ticker, TickerResponse, TickersResponse,
    Token, TokenResponse, TradeList,
};

/// Query pairs with unset optional values dropped
pub(crate) fn query_params<'a>(
    params: impl IntoIterator<Item = (&'a str, Option<String>)>,
) -> Vec<(&'a str, String)> {
    params
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
}

impl HydroClient {
    /// List all active markets
    ///
    /// GET markets
    pub async fn list_markets(&self) -> Result<Vec<Market>> {
        let data: MarketsResponse = self.get("markets", &[], Access::Public).await?;
        Ok(data.markets)
    }

    /// Get a single market, e.g. "HOT-WETH"
    ///
    /// GET markets/{market_id}
    pub async fn get_market(&self, market_id: &str) -> Result<Market> {
        let endpoint = format!("markets/{}", market_id);
        let data: MarketResponse = self.get(&endpoint, &[], Access::Public).await?;
        Ok(data.market)
    }

    /// Tickers for all active markets
    ///
    /// GET markets/tickers
    pub async fn list_tickers(&self) -> Result<Vec<Ticker>> {
        let data: TickersResponse = self.get("markets/tickers", &[], Access::Public).await?;
        Ok(data.tickers)
    }

    /// Ticker for one market
    ///
    /// GET markets/{market_id}/ticker
    pub async fn get_ticker(&self, market_id: &str) -> Result<Ticker> {
        let endpoint = format!("markets/{}/ticker", market_id);
        let data: TickerResponse = self.get(&endpoint, &[], Access::Public).await?;
        Ok(data.ticker)
    }

    /// Aggregated orderbook (level 1 or 2)
    ///
    /// GET markets/{market_id}/orderbook?level={level}
    pub async fn get_orderbook(
        &self,
        market_id: &str,
        level: OrderbookLevel,
    ) -> Result<Orderbook<PriceLevel>> {
        if level == OrderbookLevel::Three {
            return Err(HydroError::Config(
                "level 3 orderbooks contain orders, use get_full_orderbook".to_string(),
            ));
        }
        let endpoint = format!("markets/{}/orderbook", market_id);
        let query = [("level", level.as_str().to_string())];
        let data: OrderbookResponse<PriceLevel> =
            self.get(&endpoint, &query, Access::Public).await?;
        Ok(data.order_book)
    }

    /// Full non-aggregated orderbook (level 3), one entry per order
    ///
    /// GET markets/{market_id}/orderbook?level=3
    pub async fn get_full_orderbook(&self, market_id: &str) -> Result<Orderbook<Order>> {
        let endpoint = format!("markets/{}/orderbook", market_id);
        let query = [("level", OrderbookLevel::Three.as_str().to_string())];
        let data: OrderbookResponse<Order> = self.get(&endpoint, &query, Access::Public).await?;
        Ok(data.order_book)
    }

    /// Paginated trades for a market
    ///
    /// GET markets/{market_id}/trades?page={page}&perPage={per_page}
    pub async fn list_trades(
        &self,
        market_id: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<TradeList> {
        let endpoint = format!("markets/{}/trades", market_id);
        let query = query_params([
            ("page", page.map(|p| p.to_string())),
            ("perPage", per_page.map(|p| p.to_string())),
        ]);
        self.get(&endpoint, &query, Access::Public).await
    }

    /// Candles for charting; `from`/`to` are unix seconds, `granularity` is the
    /// candle width in seconds
    ///
    /// GET markets/{market_id}/candles?from={from}&to={to}&granularity={granularity}
    pub async fn list_candles(
        &self,
        market_id: &str,
        from: i64,
        to: i64,
        granularity: u64,
    ) -> Result<Vec<Candle>> {
        let endpoint = format!("markets/{}/candles", market_id);
        let query = [
            ("from", from.to_string()),
            ("to", to.to_string()),
            ("granularity", granularity.to_string()),
        ];
        let data: CandlesResponse = self.get(&endpoint, &query, Access::Public).await?;
        Ok(data.candles)
    }

    /// Estimated exchange fee for an order
    ///
    /// GET fees?marketId={market_id}&price={price}&amount={amount}
    pub async fn calculate_fees(
        &self,
        market_id: &str,
        price: Decimal,
        amount: Decimal,
    ) -> Result<Fee> {
        let query = [
            ("marketId", market_id.to_string()),
            ("price", price.to_string()),
            ("amount", amount.to_string()),
        ];
        self.get("fees", &query, Access::Public).await
    }

    /// Token metadata by symbol
    ///
    /// GET tokens/{symbol}
    pub async fn get_token(&self, symbol: &str) -> Result<Token> {
        let endpoint = format!("tokens/{}", symbol);
        let data: TokenResponse = self.get(&endpoint, &[], Access::Public).await?;
        Ok(data.token)
    }

    /// Contract address of a token, cached per symbol after the first lookup
    pub async fn token_address(&self, symbol: &str) -> Result<String> {
        if let Some(address) = self.token_addresses.read().await.get(symbol) {
            return Ok(address.clone());
        }

        let token = self.get_token(symbol).await?;
        if token.address.is_empty() {
            return Err(HydroError::api(format!(
                "Unable to get token address for {}",
                symbol
            )));
        }

        self.token_addresses
            .write()
            .await
            .insert(symbol.to_string(), token.address.clone());
        Ok(token.address)
    }
}
