//! Transport kernel: exchange-agnostic HTTP plumbing.
//!
//! The kernel contains no exchange-specific logic. It exposes:
//!
//! - [`RestClient`]: unified HTTP client interface, implemented by
//!   [`ReqwestRest`]
//! - [`Signer`]: pluggable request-authentication interface
//! - [`HttpErrorHandler`]: per-exchange response classification hook,
//!   consulted by the transport before JSON decoding
//!
//! The adapter in `exchanges::quoine` supplies the concrete signer and error
//! handler; the kernel only composes URLs, attaches signed headers, and
//! dispatches requests.

pub mod rest;
pub mod signer;

// Re-export key types for convenience
pub use rest::{HttpErrorHandler, ReqwestRest, RestClient, RestClientBuilder, RestClientConfig};
pub use signer::{SignedHeaders, Signer};
