use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::traits::OrderPlacer;
use crate::core::types::{Order, OrderSide, OrderStatus, OrderType};
use crate::exchanges::quoine::connector::QuoineConnector;
use crate::exchanges::quoine::parser::{
    filter_since_limit, order_status_to_native, parse_order,
};
use crate::exchanges::quoine::types::{Paginated, QuoineOrder};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::instrument;

#[async_trait]
impl<R: RestClient> OrderPlacer for QuoineConnector<R> {
    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: f64,
        price: Option<f64>,
    ) -> Result<Order, ExchangeError> {
        self.ensure_credentials()?;
        let market = self.market(symbol).await?;

        let mut body = json!({
            "order_type": order_type.as_str(),
            "product_id": market.id,
            "side": side.as_str(),
            "quantity": amount,
        });
        if order_type == OrderType::Limit {
            // A missing price is sent as null; the server rejects it with a
            // 422 that the error handler classifies.
            body["price"] = json!(price);
        }

        let raw: QuoineOrder = self.rest.post_json("/orders", &body, true).await?;
        parse_order(&raw, &*self.registry().await)
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn cancel_order(&self, id: &str, _symbol: Option<&str>) -> Result<Order, ExchangeError> {
        self.ensure_credentials()?;
        self.load_markets(false).await?;
        let raw: QuoineOrder = self
            .rest
            .put_json(&format!("/orders/{}/cancel", id), &Value::Null, true)
            .await?;
        let order = parse_order(&raw, &*self.registry().await)?;
        // The exchange acknowledges cancellation of already-filled orders;
        // surface those as not found instead of a successful cancel.
        if order.status == Some(OrderStatus::Closed) {
            let snapshot =
                serde_json::to_string(&order).unwrap_or_else(|_| order.id.clone());
            return Err(ExchangeError::OrderNotFound(format!("quoine {}", snapshot)));
        }
        Ok(order)
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_order(&self, id: &str, _symbol: Option<&str>) -> Result<Order, ExchangeError> {
        self.ensure_credentials()?;
        self.load_markets(false).await?;
        let raw: QuoineOrder = self
            .rest
            .get_json(&format!("/orders/{}", id), &[], true)
            .await?;
        parse_order(&raw, &*self.registry().await)
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        status: Option<OrderStatus>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>, ExchangeError> {
        self.ensure_credentials()?;
        self.load_markets(false).await?;

        let market = match symbol {
            Some(symbol) => Some(self.market(symbol).await?),
            None => None,
        };
        let limit_param = limit.map(|l| l.to_string());
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(market) = market.as_ref() {
            params.push(("product_id", market.id.as_str()));
        }
        if let Some(status) = status {
            params.push(("status", order_status_to_native(status)));
        }
        if let Some(limit) = limit_param.as_deref() {
            params.push(("limit", limit));
        }

        let page: Paginated<QuoineOrder> = self.rest.get_json("/orders", &params, true).await?;
        let registry = self.registry().await;
        let orders = page
            .models
            .iter()
            .map(|raw| parse_order(raw, &registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(filter_since_limit(orders, since, limit, |o| o.timestamp))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>, ExchangeError> {
        self.fetch_orders(symbol, Some(OrderStatus::Open), since, limit)
            .await
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>, ExchangeError> {
        self.fetch_orders(symbol, Some(OrderStatus::Closed), since, limit)
            .await
    }
}
