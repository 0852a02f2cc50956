use crate::core::{
    errors::ExchangeError,
    types::{Balances, Market, Order, OrderBook, OrderSide, OrderStatus, OrderType, Ticker, Trade},
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Public market-data operations.
#[async_trait]
pub trait MarketDataSource {
    /// Fetch all tradable markets from the exchange.
    async fn fetch_markets(&self) -> Result<Vec<Market>, ExchangeError>;

    /// Fetch a price snapshot for a single market.
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError>;

    /// Fetch price snapshots for every market, keyed by symbol.
    async fn fetch_tickers(&self) -> Result<HashMap<String, Ticker>, ExchangeError>;

    /// Fetch bid/ask depth. `limit` truncates each side when given.
    async fn fetch_order_book(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<OrderBook, ExchangeError>;

    /// Fetch public trades, newest first as the exchange returns them.
    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>, ExchangeError>;
}

/// Order placement and lookup. All operations require credentials.
#[async_trait]
pub trait OrderPlacer {
    async fn create_order(
        &self,
        symbol: &str,
        order_type: OrderType,
        side: OrderSide,
        amount: f64,
        price: Option<f64>,
    ) -> Result<Order, ExchangeError>;

    /// Cancel an order. `symbol` is accepted for interface parity with other
    /// connectors; this exchange resolves orders by id alone.
    async fn cancel_order(&self, id: &str, symbol: Option<&str>) -> Result<Order, ExchangeError>;

    async fn fetch_order(&self, id: &str, symbol: Option<&str>) -> Result<Order, ExchangeError>;

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        status: Option<OrderStatus>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>, ExchangeError>;

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>, ExchangeError>;

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Order>, ExchangeError>;
}

/// Account-scoped data. All operations require credentials.
#[async_trait]
pub trait AccountData {
    async fn fetch_balance(&self) -> Result<Balances, ExchangeError>;

    async fn fetch_my_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>, ExchangeError>;
}

/// Composite trait for callers that need the full connector surface.
pub trait ExchangeConnector: MarketDataSource + OrderPlacer + AccountData {}
