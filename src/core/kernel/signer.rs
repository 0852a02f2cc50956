use crate::core::errors::ExchangeError;
use std::collections::HashMap;

/// Headers produced by signing a request.
pub type SignedHeaders = HashMap<String, String>;

/// Request authentication interface.
///
/// The transport calls this for every authenticated request; the
/// implementation owns the credentials and produces whatever headers the
/// exchange requires. Signing is pure: no I/O, no state mutation.
pub trait Signer: Send + Sync {
    /// Sign a request and return the headers to attach.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, ...)
    /// * `endpoint` - API endpoint path, leading slash included
    /// * `query_string` - Encoded query string without the leading `?`
    /// * `body` - Raw request body bytes
    /// * `nonce` - Monotonically non-decreasing nonce in milliseconds
    fn sign_request(
        &self,
        method: &str,
        endpoint: &str,
        query_string: &str,
        body: &[u8],
        nonce: u64,
    ) -> Result<SignedHeaders, ExchangeError>;
}
