/*
[INPUT]:  Query parameters and the client's signed credential
[OUTPUT]: Account data (orders, account trades, locked balances)
[POS]:    HTTP layer - account endpoints (require auth)
[UPDATE]: When adding new account endpoints or changing query parameters
*/

// ### Account Endpoints

use crate::http::public::query_params;
use crate::http::{Access, HydroClient, Result};
use crate::types::{
    LockedBalance, LockedBalanceResponse, LockedBalancesResponse, Order, OrderList,
    OrderResponse, Status, TradeList,
};

impl HydroClient {
    /// Paginated orders submitted by this account
    ///
    /// GET orders?marketId={market_id}&status={status}&page={page}&perPage={per_page}
    pub async fn list_orders(
        &self,
        market_id: Option<&str>,
        status: Option<Status>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<OrderList> {
        let query = query_params([
            ("marketId", market_id.map(str::to_string)),
            ("status", status.map(|s| s.as_str().to_string())),
            ("page", page.map(|p| p.to_string())),
            ("perPage", per_page.map(|p| p.to_string())),
        ]);
        self.get("orders", &query, Access::Private).await
    }

    /// A single order submitted by this account
    ///
    /// GET orders/{order_id}
    pub async fn get_order(&self, order_id: &str) -> Result<Order> {
        let endpoint = format!("orders/{}", order_id);
        let data: OrderResponse = self.get(&endpoint, &[], Access::Private).await?;
        Ok(data.order)
    }

    /// Paginated trades this account took part in
    ///
    /// GET markets/{market_id}/trades/mine?page={page}&perPage={per_page}
    pub async fn list_account_trades(
        &self,
        market_id: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<TradeList> {
        let endpoint = format!("markets/{}/trades/mine", market_id);
        let query = query_params([
            ("page", page.map(|p| p.to_string())),
            ("perPage", per_page.map(|p| p.to_string())),
        ]);
        self.get(&endpoint, &query, Access::Private).await
    }

    /// Balances locked in open orders, one per active token
    ///
    /// GET account/lockedBalances
    pub async fn list_locked_balances(&self) -> Result<Vec<LockedBalance>> {
        let data: LockedBalancesResponse = self
            .get("account/lockedBalances", &[], Access::Private)
            .await?;
        Ok(data.locked_balances)
    }

    /// Locked balance of one token
    ///
    /// GET account/lockedBalance?symbol={symbol}
    pub async fn get_locked_balance(&self, symbol: &str) -> Result<LockedBalance> {
        let query = [("symbol", symbol.to_string())];
        let data: LockedBalanceResponse = self
            .get("account/lockedBalance", &query, Access::Private)
            .await?;
        Ok(data.locked_balance)
    }
}
