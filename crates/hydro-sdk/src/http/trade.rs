/*
[INPUT]:  Order requests and the client's signer
[OUTPUT]: Built, placed and cancelled orders
[POS]:    HTTP layer - trading endpoints (require auth)
[UPDATE]: When adding new trading endpoints or changing order flow
*/

use serde_json::Value;
use tracing::info;

use crate::http::{HydroClient, Result};
use crate::types::{BuildOrderRequest, Order, OrderResponse, PlaceOrderRequest, SignatureMethod};

impl HydroClient {
    /// Ask the exchange to build an unsigned order
    ///
    /// POST orders/build
    pub async fn build_order(&self, req: &BuildOrderRequest) -> Result<Order> {
        let data: OrderResponse = self.post("orders/build", req).await?;
        Ok(data.order)
    }

    /// Submit a built order together with the signature of its id
    ///
    /// POST orders
    pub async fn place_order(&self, order_id: &str, signature: &str) -> Result<Order> {
        let req = PlaceOrderRequest {
            order_id: order_id.to_string(),
            signature: signature.to_string(),
            method: SignatureMethod::EthSign,
        };
        let data: OrderResponse = self.post("orders", &req).await?;
        Ok(data.order)
    }

    /// Build an order, sign its id with the client's signer and place it
    pub async fn create_order(&self, req: &BuildOrderRequest) -> Result<Order> {
        let built = self.build_order(req).await?;
        let signature = self.sign(&built.id).await?;
        let placed = self.place_order(&built.id, &signature).await?;
        info!(
            order_id = %placed.id,
            market_id = %req.market_id,
            side = %req.side,
            "order placed"
        );
        Ok(placed)
    }

    /// Cancel an order submitted by this account
    ///
    /// DELETE orders/{order_id}
    pub async fn cancel_order(&self, order_id: &str) -> Result<()> {
        let endpoint = format!("orders/{}", order_id);
        let _: Value = self.delete(&endpoint).await?;
        Ok(())
    }
}
