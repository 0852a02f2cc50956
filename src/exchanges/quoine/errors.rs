use crate::core::errors::ExchangeError;
use crate::core::kernel::HttpErrorHandler;
use serde_json::Value;
use tracing::debug;

/// Maps the exchange's error payloads onto typed errors.
///
/// The exchange has three distinct failure shapes: 401 responses carry a
/// bare string instead of JSON, 404 responses carry a `message` field, and
/// 422 validation failures nest arrays of message codes under `errors`.
/// Anything unrecognized is left for the transport layer's generic error.
pub struct QuoineErrorHandler;

fn feedback(body: &str) -> String {
    format!("quoine {}", body)
}

impl HttpErrorHandler for QuoineErrorHandler {
    fn handle(&self, status: u16, body: &str) -> Result<(), ExchangeError> {
        if (200..300).contains(&status) {
            return Ok(());
        }
        if status == 401 {
            // 401 bodies are plain strings, matched verbatim.
            return match body {
                "API Authentication failed" => {
                    Err(ExchangeError::AuthenticationFailed(feedback(body)))
                }
                "Nonce is too small" => Err(ExchangeError::InvalidNonce(feedback(body))),
                _ => Ok(()),
            };
        }
        if !body.starts_with('{') && !body.starts_with('[') {
            // Non-JSON error pages (proxies, maintenance) get the generic path.
            return Ok(());
        }
        let response: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(err) => {
                debug!(status, error = %err, "undecodable error body");
                return Ok(());
            }
        };

        match status {
            404 => {
                if response["message"].as_str() == Some("Order not found") {
                    return Err(ExchangeError::OrderNotFound(feedback(body)));
                }
            }
            422 => {
                let errors = &response["errors"];
                if contains_code(&errors["user"], "not_enough_free_balance") {
                    return Err(ExchangeError::InsufficientFunds(feedback(body)));
                }
                if contains_code(&errors["quantity"], "less_than_order_size") {
                    return Err(ExchangeError::InvalidOrder(feedback(body)));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn contains_code(messages: &Value, code: &str) -> bool {
    messages
        .as_array()
        .map(|list| list.iter().any(|entry| entry.as_str() == Some(code)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(status: u16, body: &str) -> Result<(), ExchangeError> {
        QuoineErrorHandler.handle(status, body)
    }

    #[test]
    fn success_bodies_are_never_inspected() {
        // A 200 carrying an error-looking payload must not raise.
        assert!(handle(200, r#"{"message": "Order not found"}"#).is_ok());
        assert!(handle(204, "").is_ok());
    }

    #[test]
    fn auth_failure_matches_exact_string() {
        assert!(matches!(
            handle(401, "API Authentication failed"),
            Err(ExchangeError::AuthenticationFailed(msg)) if msg == "quoine API Authentication failed"
        ));
    }

    #[test]
    fn stale_nonce_matches_exact_string() {
        assert!(matches!(
            handle(401, "Nonce is too small"),
            Err(ExchangeError::InvalidNonce(_))
        ));
    }

    #[test]
    fn unknown_401_body_falls_through() {
        assert!(handle(401, "API Authentication failed.").is_ok());
        assert!(handle(401, "token revoked").is_ok());
    }

    #[test]
    fn missing_order_maps_on_404_only() {
        let body = r#"{"message": "Order not found"}"#;
        assert!(matches!(
            handle(404, body),
            Err(ExchangeError::OrderNotFound(msg)) if msg.starts_with("quoine ")
        ));
        // Same body on another status is not this error.
        assert!(handle(400, body).is_ok());
    }

    #[test]
    fn insufficient_balance_maps_from_user_errors() {
        let body = r#"{"errors": {"user": ["not_enough_free_balance"]}}"#;
        assert!(matches!(
            handle(422, body),
            Err(ExchangeError::InsufficientFunds(_))
        ));
    }

    #[test]
    fn undersized_order_maps_from_quantity_errors() {
        let body = r#"{"errors": {"quantity": ["less_than_order_size"]}}"#;
        assert!(matches!(
            handle(422, body),
            Err(ExchangeError::InvalidOrder(_))
        ));
    }

    #[test]
    fn unknown_422_codes_fall_through() {
        assert!(handle(422, r#"{"errors": {"price": ["must_be_positive"]}}"#).is_ok());
        assert!(handle(422, r#"{"errors": {}}"#).is_ok());
        assert!(handle(422, r#"{"errors": {"user": "not_enough_free_balance"}}"#).is_ok());
    }

    #[test]
    fn non_json_error_bodies_fall_through() {
        assert!(handle(502, "<html>Bad Gateway</html>").is_ok());
        assert!(handle(500, "").is_ok());
        assert!(handle(404, "Order not found").is_ok());
    }
}
