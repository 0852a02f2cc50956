use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The exchange is inconsistent about numeric encoding: prices and
/// quantities arrive as strings in most payloads but as numbers in a few.
/// These helpers coerce either form, mapping null and empty strings to
/// `None` the way ccxt's `safe_float` does.
pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Identifiers arrive as numbers or strings depending on the endpoint.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// Envelope for paginated private endpoints (`orders`, `executions`).
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub models: Vec<T>,
}

/// A product entry from `GET /products`.
///
/// The same payload doubles as the ticker for the product, so the snapshot
/// fields live here too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoineProduct {
    pub id: Value,
    pub base_currency: String,
    pub quoted_currency: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub maker_fee: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub taker_fee: Option<f64>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub last_traded_price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub high_market_ask: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub low_market_bid: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub market_bid: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub market_ask: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub volume_24h: Option<f64>,
}

/// Depth snapshot from `GET /products/{id}/price_levels`.
/// Levels are `[price, amount]` string pairs, already sorted by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoinePriceLevels {
    #[serde(default)]
    pub buy_price_levels: Vec<[String; 2]>,
    #[serde(default)]
    pub sell_price_levels: Vec<[String; 2]>,
}

/// An execution from `GET /executions` or `GET /executions/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoineExecution {
    #[serde(default)]
    pub id: Value,
    /// Seconds since the Unix epoch.
    pub created_at: Option<i64>,
    pub taker_side: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub quantity: Option<f64>,
}

/// An order from the `orders` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoineOrder {
    #[serde(default)]
    pub id: Value,
    /// Seconds since the Unix epoch.
    pub created_at: Option<i64>,
    pub order_type: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub product_id: Value,
    pub side: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub filled_quantity: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub order_fee: Option<f64>,
}

/// A per-currency balance from `GET /accounts/balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoineBalance {
    pub currency: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub balance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_coercion_accepts_strings_and_numbers() {
        assert_eq!(value_to_f64(&json!("0.001")), Some(0.001));
        assert_eq!(value_to_f64(&json!(42)), Some(42.0));
        assert_eq!(value_to_f64(&json!("")), None);
        assert_eq!(value_to_f64(&json!(null)), None);
        assert_eq!(value_to_string(&json!(5)).as_deref(), Some("5"));
        assert_eq!(value_to_string(&json!("5")).as_deref(), Some("5"));
        assert_eq!(value_to_string(&json!(null)), None);
    }

    #[test]
    fn product_deserializes_mixed_field_encodings() {
        let raw = json!({
            "id": 5,
            "base_currency": "BTC",
            "quoted_currency": "USD",
            "maker_fee": "0.0",
            "taker_fee": 0.001,
            "disabled": false,
            "last_traded_price": "",
            "high_market_ask": "100.5",
            "volume_24h": "12.25"
        });
        let product: QuoineProduct = serde_json::from_value(raw).unwrap();

        assert_eq!(product.base_currency, "BTC");
        assert_eq!(product.maker_fee, Some(0.0));
        assert_eq!(product.taker_fee, Some(0.001));
        assert_eq!(product.last_traded_price, None);
        assert_eq!(product.high_market_ask, Some(100.5));
        assert_eq!(product.market_bid, None);
    }

    #[test]
    fn paginated_envelope_unwraps_models() {
        let raw = json!({"models": [{"currency": "BTC", "balance": "1.5"}], "current_page": 1});
        let page: Paginated<QuoineBalance> = serde_json::from_value(raw).unwrap();
        assert_eq!(page.models.len(), 1);
        assert_eq!(page.models[0].balance, Some(1.5));
    }
}
