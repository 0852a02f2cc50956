use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::Signer;
use crate::core::types::milliseconds;
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, trace};

/// REST client trait for making HTTP requests.
///
/// This trait provides a unified interface for HTTP operations. The
/// implementation handles URL composition, request signing, and
/// exchange-specific error classification before JSON decoding.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request and return the raw JSON value.
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ExchangeError>;

    /// Make a GET request with strongly-typed response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<T, ExchangeError>;

    /// Make a POST request with a JSON body and strongly-typed response.
    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ExchangeError>;

    /// Make a PUT request with a JSON body and strongly-typed response.
    async fn put_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ExchangeError>;
}

/// Hook invoked on every HTTP response before JSON decoding.
///
/// Classifies recognized error bodies into typed failures. Returning `Ok(())`
/// means "nothing recognized": the transport then surfaces non-2xx statuses
/// as a generic [`ExchangeError::ApiError`].
pub trait HttpErrorHandler: Send + Sync {
    fn handle(&self, status: u16, body: &str) -> Result<(), ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "quoinex/0.1".to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
    error_handler: Option<Arc<dyn HttpErrorHandler>>,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            signer: None,
            error_handler: None,
        }
    }

    /// Set the signer for authenticated requests
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Set the error classifier consulted on every response
    pub fn with_error_handler(mut self, handler: Arc<dyn HttpErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| {
                ExchangeError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            signer: self.signer,
            error_handler: self.error_handler,
        })
    }
}

/// Implementation of [`RestClient`] using reqwest.
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    signer: Option<Arc<dyn Signer>>,
    error_handler: Option<Arc<dyn HttpErrorHandler>>,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    /// Create query string from parameters
    fn build_query_string(params: &[(&str, &str)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Handle the response: classify recognized error bodies, then decode.
    #[instrument(skip(self, response), fields(exchange = %self.config.exchange_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<Value, ExchangeError> {
        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ExchangeError::Network(format!("Failed to read response body: {}", e)))?;

        trace!("Response body: {}", response_text);

        if let Some(handler) = &self.error_handler {
            handler.handle(status.as_u16(), &response_text)?;
        }

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                ExchangeError::Deserialization(format!("Failed to parse JSON response: {}", e))
            })
        } else {
            // Unclassified failure status: generic transport-level error.
            Err(ExchangeError::ApiError {
                code: i32::from(status.as_u16()),
                message: response_text,
            })
        }
    }

    /// Make a request with the given parameters.
    ///
    /// Query parameters are appended to the URL verbatim; for authenticated
    /// requests the signer sees the same path and query string that go on
    /// the wire.
    #[instrument(skip(self, body), fields(exchange = %self.config.exchange_name, method = %method, endpoint = %endpoint))]
    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(&str, &str)],
        body: &[u8],
        authenticated: bool,
    ) -> Result<Value, ExchangeError> {
        let query_string = Self::build_query_string(query_params);
        let path = if query_string.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, query_string)
        };
        let url = format!("{}{}", self.config.base_url, path);

        let mut request = self.client.request(method.clone(), &url);

        if authenticated {
            let signer = self.signer.as_ref().ok_or_else(|| {
                ExchangeError::MissingCredentials(format!(
                    "{} requires API credentials for {}",
                    self.config.exchange_name, endpoint
                ))
            })?;

            let nonce = milliseconds() as u64;
            let headers =
                signer.sign_request(method.as_str(), endpoint, &query_string, body, nonce)?;
            for (key, value) in headers {
                request = request.header(&key, &value);
            }
        }

        if !body.is_empty() {
            request = request
                .header("Content-Type", "application/json")
                .body(body.to_vec());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::Network(format!("Request failed: {}", e)))?;

        self.handle_response(response).await
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ExchangeError> {
        serde_json::from_value(value).map_err(|e| {
            ExchangeError::Deserialization(format!("Failed to deserialize JSON: {}", e))
        })
    }

    /// `Null` means "no body": the request goes out without a payload.
    fn encode_body(body: &Value) -> Result<Vec<u8>, ExchangeError> {
        if body.is_null() {
            return Ok(Vec::new());
        }
        serde_json::to_vec(body).map_err(|e| {
            ExchangeError::Serialization(format!("Failed to serialize request body: {}", e))
        })
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ExchangeError> {
        self.make_request(Method::GET, endpoint, query_params, &[], authenticated)
            .await
    }

    #[instrument(skip(self, query_params), fields(exchange = %self.config.exchange_name, endpoint = %endpoint, param_count = query_params.len()))]
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<T, ExchangeError> {
        self.make_request(Method::GET, endpoint, query_params, &[], authenticated)
            .await
            .and_then(Self::decode)
    }

    #[instrument(skip(self, body), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ExchangeError> {
        let body_bytes = Self::encode_body(body)?;
        self.make_request(Method::POST, endpoint, &[], &body_bytes, authenticated)
            .await
            .and_then(Self::decode)
    }

    #[instrument(skip(self, body), fields(exchange = %self.config.exchange_name, endpoint = %endpoint))]
    async fn put_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ExchangeError> {
        let body_bytes = Self::encode_body(body)?;
        self.make_request(Method::PUT, endpoint, &[], &body_bytes, authenticated)
            .await
            .and_then(Self::decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_joins_pairs_in_order() {
        assert_eq!(
            ReqwestRest::build_query_string(&[("product_id", "1"), ("limit", "50")]),
            "product_id=1&limit=50"
        );
        assert_eq!(ReqwestRest::build_query_string(&[]), "");
    }

    #[test]
    fn builder_without_signer_still_builds() {
        let config =
            RestClientConfig::new("https://api.qryptos.com".to_string(), "quoine".to_string());
        let rest = RestClientBuilder::new(config).build().unwrap();
        assert!(format!("{:?}", rest).contains("has_signer: false"));
    }
}
