use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestRest, RestClientBuilder, RestClientConfig};
use crate::exchanges::quoine::connector::QuoineConnector;
use crate::exchanges::quoine::errors::QuoineErrorHandler;
use crate::exchanges::quoine::signer::QuoineSigner;
use std::sync::Arc;

/// Production REST endpoint. The exchange has no testnet.
pub const API_BASE_URL: &str = "https://api.qryptos.com";

/// Wire up a connector from a configuration.
///
/// Without credentials the connector still serves public market data;
/// private operations then fail with
/// [`ExchangeError::MissingCredentials`](crate::core::errors::ExchangeError::MissingCredentials).
pub fn build_connector(
    config: ExchangeConfig,
) -> Result<QuoineConnector<ReqwestRest>, ExchangeError> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| API_BASE_URL.to_string());

    let rest_config = RestClientConfig::new(base_url, "quoine".to_string());
    let mut builder =
        RestClientBuilder::new(rest_config).with_error_handler(Arc::new(QuoineErrorHandler));

    if config.has_credentials() {
        let signer = QuoineSigner::new(config.api_key().to_string(), config.secret_key.clone());
        builder = builder.with_signer(Arc::new(signer));
    }

    let rest = builder.build()?;
    Ok(QuoineConnector::new(rest, config))
}
