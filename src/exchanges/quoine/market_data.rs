use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::traits::MarketDataSource;
use crate::core::types::{milliseconds, Market, OrderBook, Ticker, Trade};
use crate::exchanges::quoine::connector::QuoineConnector;
use crate::exchanges::quoine::parser::{
    filter_since_limit, parse_order_book, parse_ticker, parse_trade,
};
use crate::exchanges::quoine::types::{
    value_to_string, Paginated, QuoineExecution, QuoinePriceLevels, QuoineProduct,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::instrument;

#[async_trait]
impl<R: RestClient> MarketDataSource for QuoineConnector<R> {
    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_markets(&self) -> Result<Vec<Market>, ExchangeError> {
        self.load_markets(true).await?;
        let registry = self.registry().await;
        Ok(registry
            .symbols()
            .iter()
            .filter_map(|symbol| registry.by_symbol(symbol).cloned())
            .collect())
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let market = self.market(symbol).await?;
        let timestamp = milliseconds();
        let raw: QuoineProduct = self
            .rest
            .get_json(&format!("/products/{}", market.id), &[], false)
            .await?;
        Ok(parse_ticker(&raw, Some(&market), timestamp))
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_tickers(&self) -> Result<HashMap<String, Ticker>, ExchangeError> {
        self.load_markets(false).await?;
        let timestamp = milliseconds();
        let products: Vec<QuoineProduct> = self.rest.get_json("/products", &[], false).await?;

        let registry = self.registry().await;
        let mut tickers = HashMap::with_capacity(products.len());
        for raw in &products {
            // Products that appeared since the registry was loaded still get
            // a symbol, built from the raw currency pair.
            let market = value_to_string(&raw.id).and_then(|id| registry.by_id(&id));
            let symbol = match market {
                Some(market) => market.symbol.clone(),
                None => format!("{}/{}", raw.base_currency, raw.quoted_currency),
            };
            let mut ticker = parse_ticker(raw, market, timestamp);
            ticker.symbol = Some(symbol.clone());
            tickers.insert(symbol, ticker);
        }
        Ok(tickers)
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_order_book(
        &self,
        symbol: &str,
        limit: Option<usize>,
    ) -> Result<OrderBook, ExchangeError> {
        let market = self.market(symbol).await?;
        let timestamp = milliseconds();
        let raw: QuoinePriceLevels = self
            .rest
            .get_json(&format!("/products/{}/price_levels", market.id), &[], false)
            .await?;
        parse_order_book(&raw, &market.symbol, timestamp, limit)
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        let market = self.market(symbol).await?;
        let limit_param = limit.map(|l| l.to_string());
        let mut params = vec![("product_id", market.id.as_str())];
        if let Some(limit) = limit_param.as_deref() {
            params.push(("limit", limit));
        }

        let page: Paginated<QuoineExecution> =
            self.rest.get_json("/executions", &params, false).await?;
        let trades = page
            .models
            .iter()
            .map(|raw| parse_trade(raw, &market))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(filter_since_limit(trades, since, limit, |t| t.timestamp))
    }
}
