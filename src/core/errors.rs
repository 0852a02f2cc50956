use thiserror::Error;

/// Errors surfaced by the connector.
///
/// Transport and serialization failures keep their source errors attached;
/// exchange business failures (`AuthenticationFailed`, `OrderNotFound`, ...)
/// carry the adapter id plus a serialized snapshot of the offending payload
/// so callers can log exactly what the exchange sent back.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("invalid nonce: {0}")]
    InvalidNonce(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("market not found: {0}")]
    MarketNotFound(String),

    #[error("API error: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("{0}")]
    Other(String),
}

impl From<crate::core::config::ConfigError> for ExchangeError {
    fn from(err: crate::core::config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}
