use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClient;
use crate::core::traits::AccountData;
use crate::core::types::{Balances, Trade};
use crate::exchanges::quoine::connector::QuoineConnector;
use crate::exchanges::quoine::parser::{filter_since_limit, parse_balances, parse_trade};
use crate::exchanges::quoine::types::{Paginated, QuoineBalance, QuoineExecution};
use async_trait::async_trait;
use tracing::instrument;

#[async_trait]
impl<R: RestClient> AccountData for QuoineConnector<R> {
    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_balance(&self) -> Result<Balances, ExchangeError> {
        self.ensure_credentials()?;
        let raw: Vec<QuoineBalance> = self.rest.get_json("/accounts/balance", &[], true).await?;
        Ok(parse_balances(&raw))
    }

    #[instrument(skip(self), fields(exchange = "quoine"))]
    async fn fetch_my_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Trade>, ExchangeError> {
        self.ensure_credentials()?;
        let market = self.market(symbol).await?;

        let limit_param = limit.map(|l| l.to_string());
        let mut params = vec![("product_id", market.id.as_str())];
        if let Some(limit) = limit_param.as_deref() {
            params.push(("limit", limit));
        }

        let page: Paginated<QuoineExecution> =
            self.rest.get_json("/executions/me", &params, true).await?;
        let trades = page
            .models
            .iter()
            .map(|raw| parse_trade(raw, &market))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(filter_since_limit(trades, since, limit, |t| t.timestamp))
    }
}
