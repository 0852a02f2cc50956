use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::types::{Market, MarketRegistry};
use crate::exchanges::quoine::parser::parse_market;
use crate::exchanges::quoine::types::QuoineProduct;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Connector for the Quoine v2 REST API (QRYPTOS).
///
/// Markets are loaded lazily on the first operation that needs symbol
/// resolution and cached for the connector's lifetime; pass `reload = true`
/// to [`Self::load_markets`] to refresh the cache.
pub struct QuoineConnector<R: RestClient> {
    pub(super) rest: R,
    config: ExchangeConfig,
    markets: RwLock<MarketRegistry>,
}

impl<R: RestClient> QuoineConnector<R> {
    pub fn new(rest: R, config: ExchangeConfig) -> Self {
        Self {
            rest,
            config,
            markets: RwLock::new(MarketRegistry::default()),
        }
    }

    /// Access the underlying transport.
    pub fn rest(&self) -> &R {
        &self.rest
    }

    /// Fetch the product list and rebuild the market registry.
    ///
    /// A no-op when the cache is already populated, unless `reload` forces a
    /// refresh.
    #[instrument(skip(self), fields(exchange = "quoine"))]
    pub async fn load_markets(&self, reload: bool) -> Result<(), ExchangeError> {
        if !reload && !self.markets.read().await.is_empty() {
            return Ok(());
        }

        let products: Vec<QuoineProduct> = self.rest.get_json("/products", &[], false).await?;
        let markets = products
            .iter()
            .map(parse_market)
            .collect::<Result<Vec<Market>, _>>()?;
        debug!(count = markets.len(), "loaded markets");

        *self.markets.write().await = MarketRegistry::from_markets(markets);
        Ok(())
    }

    /// Resolve a unified symbol against the cached registry.
    pub(super) async fn market(&self, symbol: &str) -> Result<Market, ExchangeError> {
        self.load_markets(false).await?;
        self.markets
            .read()
            .await
            .by_symbol(symbol)
            .cloned()
            .ok_or_else(|| ExchangeError::MarketNotFound(format!("quoine has no market {}", symbol)))
    }

    pub(super) async fn registry(&self) -> tokio::sync::RwLockReadGuard<'_, MarketRegistry> {
        self.markets.read().await
    }

    pub(super) fn ensure_credentials(&self) -> Result<(), ExchangeError> {
        if self.config.has_credentials() {
            Ok(())
        } else {
            Err(ExchangeError::MissingCredentials(
                "this operation requires an API token id and secret".to_string(),
            ))
        }
    }
}

impl<R: RestClient> crate::core::traits::ExchangeConnector for QuoineConnector<R> {}
