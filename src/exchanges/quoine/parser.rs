use crate::core::errors::ExchangeError;
use crate::core::types::{
    iso8601, Balance, Balances, BookLevel, Fee, Limits, Market, MarketRegistry, MinMax, Order,
    OrderBook, OrderSide, OrderStatus, OrderType, Precision, Ticker, Trade,
};
use crate::exchanges::quoine::types::{
    value_to_string, QuoineBalance, QuoineExecution, QuoineOrder, QuoinePriceLevels, QuoineProduct,
};
use serde_json::Value;
use std::collections::HashMap;

// The v2 API does not expose precision or minimum order sizes, so these are
// hardcoded per-currency guesses carried over as configuration data. Known
// limitation: currencies outside these tables get no limits at all.
const MIN_AMOUNT_BY_BASE: &[(&str, f64)] = &[("BTC", 0.001), ("ETH", 0.01)];
const MIN_PRICE_BY_QUOTE: &[(&str, f64)] = &[
    ("BTC", 0.000_000_01),
    ("ETH", 0.000_01),
    ("USD", 0.000_01),
    ("JPY", 0.000_01),
];

fn table_lookup(table: &[(&str, f64)], key: &str) -> Option<f64> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, value)| *value)
}

fn missing(entity: &str, field: &str) -> ExchangeError {
    ExchangeError::Deserialization(format!("quoine {} is missing required field {}", entity, field))
}

/// Parse a product entry into a normalized [`Market`].
///
/// Precision is derived from the minimum increments as a decimal digit
/// count (`-log10(min)`); `cost.min` is defined only when both the price and
/// amount minimums are known.
pub fn parse_market(raw: &QuoineProduct) -> Result<Market, ExchangeError> {
    let id = value_to_string(&raw.id).ok_or_else(|| missing("product", "id"))?;
    let base = raw.base_currency.clone();
    let quote = raw.quoted_currency.clone();
    let symbol = format!("{}/{}", base, quote);

    let min_amount = table_lookup(MIN_AMOUNT_BY_BASE, &base);
    let min_price = table_lookup(MIN_PRICE_BY_QUOTE, &quote);
    let min_cost = match (min_price, min_amount) {
        (Some(price), Some(amount)) => Some(price * amount),
        _ => None,
    };

    Ok(Market {
        id,
        symbol,
        base,
        quote,
        maker: raw.maker_fee,
        taker: raw.taker_fee,
        active: !raw.disabled,
        precision: Precision {
            amount: min_amount.map(|m| -m.log10()),
            price: min_price.map(|m| -m.log10()),
        },
        limits: Limits {
            amount: MinMax {
                min: min_amount,
                max: None,
            },
            price: MinMax {
                min: min_price,
                max: None,
            },
            cost: MinMax {
                min: min_cost,
                max: None,
            },
        },
        info: serde_json::to_value(raw).unwrap_or(Value::Null),
    })
}

/// Parse a product payload as a [`Ticker`] snapshot.
///
/// The exchange sends no server timestamp, so `timestamp_ms` is the local
/// request time supplied by the caller. `last` is set only when the raw
/// last-traded-price field is present and non-empty; every field the
/// exchange does not report stays `None`.
pub fn parse_ticker(raw: &QuoineProduct, market: Option<&Market>, timestamp_ms: i64) -> Ticker {
    let last = raw.last_traded_price;

    Ticker {
        symbol: market.map(|m| m.symbol.clone()),
        timestamp: timestamp_ms,
        datetime: iso8601(timestamp_ms),
        high: raw.high_market_ask,
        low: raw.low_market_bid,
        bid: raw.market_bid,
        bid_volume: None,
        ask: raw.market_ask,
        ask_volume: None,
        vwap: None,
        open: None,
        close: last,
        last,
        previous_close: None,
        change: None,
        percentage: None,
        average: None,
        base_volume: raw.volume_24h,
        quote_volume: None,
        info: serde_json::to_value(raw).unwrap_or(Value::Null),
    }
}

/// Parse one execution into a [`Trade`] bound to `market`.
pub fn parse_trade(raw: &QuoineExecution, market: &Market) -> Result<Trade, ExchangeError> {
    let id = value_to_string(&raw.id).ok_or_else(|| missing("execution", "id"))?;
    // created_at is in seconds.
    let timestamp = raw
        .created_at
        .ok_or_else(|| missing("execution", "created_at"))?
        * 1000;
    let side = raw
        .taker_side
        .as_deref()
        .and_then(OrderSide::from_str)
        .ok_or_else(|| missing("execution", "taker_side"))?;
    let price = raw.price.ok_or_else(|| missing("execution", "price"))?;
    let amount = raw.quantity.ok_or_else(|| missing("execution", "quantity"))?;

    Ok(Trade {
        id,
        timestamp,
        datetime: iso8601(timestamp),
        symbol: market.symbol.clone(),
        side,
        price,
        amount,
        info: serde_json::to_value(raw).unwrap_or(Value::Null),
    })
}

/// Map the exchange-native lifecycle label onto [`OrderStatus`].
///
/// "cancelled" is the exchange's own spelling. Unrecognized labels map to
/// `None` rather than failing the whole parse.
pub fn parse_order_status(native: &str) -> Option<OrderStatus> {
    match native {
        "live" => Some(OrderStatus::Open),
        "filled" => Some(OrderStatus::Closed),
        "cancelled" => Some(OrderStatus::Canceled),
        _ => None,
    }
}

/// The wire value for a normalized status, used when filtering order lists.
pub fn order_status_to_native(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Open => "live",
        OrderStatus::Closed => "filled",
        OrderStatus::Canceled => "cancelled",
    }
}

/// Parse a raw order. The symbol is resolved through the registry from the
/// order's `product_id` when the market is known.
pub fn parse_order(raw: &QuoineOrder, registry: &MarketRegistry) -> Result<Order, ExchangeError> {
    let id = value_to_string(&raw.id).ok_or_else(|| missing("order", "id"))?;
    let timestamp = raw
        .created_at
        .ok_or_else(|| missing("order", "created_at"))?
        * 1000;
    let order_type = raw
        .order_type
        .as_deref()
        .and_then(OrderType::from_str)
        .ok_or_else(|| missing("order", "order_type"))?;
    let side = raw
        .side
        .as_deref()
        .and_then(OrderSide::from_str)
        .ok_or_else(|| missing("order", "side"))?;
    let status = raw.status.as_deref().and_then(parse_order_status);
    let price = raw.price.ok_or_else(|| missing("order", "price"))?;
    let amount = raw.quantity.ok_or_else(|| missing("order", "quantity"))?;
    let filled = raw
        .filled_quantity
        .ok_or_else(|| missing("order", "filled_quantity"))?;

    let symbol = value_to_string(&raw.product_id)
        .and_then(|market_id| registry.by_id(&market_id).map(|m| m.symbol.clone()));

    Ok(Order {
        id,
        timestamp,
        datetime: iso8601(timestamp),
        order_type,
        status,
        symbol,
        side,
        price,
        amount,
        filled,
        remaining: amount - filled,
        fee: Fee {
            currency: None,
            cost: raw.order_fee.unwrap_or(0.0),
        },
        info: serde_json::to_value(raw).unwrap_or(Value::Null),
    })
}

/// Parse the depth snapshot. Levels stay in the order the server sent them.
pub fn parse_order_book(
    raw: &QuoinePriceLevels,
    symbol: &str,
    timestamp_ms: i64,
    limit: Option<usize>,
) -> Result<OrderBook, ExchangeError> {
    let parse_side = |levels: &[[String; 2]]| -> Result<Vec<BookLevel>, ExchangeError> {
        let take = limit.unwrap_or(levels.len());
        levels
            .iter()
            .take(take)
            .map(|level| {
                let price = level[0].parse().map_err(|_| {
                    ExchangeError::Deserialization(format!(
                        "quoine price level has non-numeric price {:?}",
                        level[0]
                    ))
                })?;
                let amount = level[1].parse().map_err(|_| {
                    ExchangeError::Deserialization(format!(
                        "quoine price level has non-numeric amount {:?}",
                        level[1]
                    ))
                })?;
                Ok(BookLevel { price, amount })
            })
            .collect()
    };

    Ok(OrderBook {
        symbol: symbol.to_string(),
        bids: parse_side(&raw.buy_price_levels)?,
        asks: parse_side(&raw.sell_price_levels)?,
        timestamp: timestamp_ms,
        datetime: iso8601(timestamp_ms),
    })
}

/// Aggregate per-currency balances. The exchange reports no reservation
/// split, so `used` is always zero.
pub fn parse_balances(raw: &[QuoineBalance]) -> Balances {
    let mut currencies = HashMap::with_capacity(raw.len());
    for entry in raw {
        let total = entry.balance.unwrap_or(0.0);
        currencies.insert(
            entry.currency.clone(),
            Balance {
                free: total,
                used: 0.0,
                total,
            },
        );
    }

    Balances {
        currencies,
        info: serde_json::to_value(raw).unwrap_or(Value::Null),
    }
}

/// Keep `since`/`limit` as a post-filter over the parsed result set:
/// entries with `timestamp >= since` survive, then the list is truncated to
/// the first `limit` entries in server order.
pub fn filter_since_limit<T>(
    items: Vec<T>,
    since: Option<i64>,
    limit: Option<usize>,
    timestamp: impl Fn(&T) -> i64,
) -> Vec<T> {
    let mut filtered: Vec<T> = match since {
        Some(since) => items
            .into_iter()
            .filter(|item| timestamp(item) >= since)
            .collect(),
        None => items,
    };
    if let Some(limit) = limit {
        filtered.truncate(limit);
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(base: &str, quote: &str) -> QuoineProduct {
        serde_json::from_value(json!({
            "id": 1,
            "base_currency": base,
            "quoted_currency": quote,
            "disabled": false
        }))
        .unwrap()
    }

    fn registry_with(id: &str, symbol: &str) -> MarketRegistry {
        let mut raw = product(
            symbol.split('/').next().unwrap(),
            symbol.split('/').nth(1).unwrap(),
        );
        raw.id = json!(id);
        MarketRegistry::from_markets(vec![parse_market(&raw).unwrap()])
    }

    #[test]
    fn btc_base_gets_three_amount_digits() {
        let market = parse_market(&product("BTC", "USD")).unwrap();
        let amount_precision = market.precision.amount.unwrap();
        assert!((amount_precision - 3.0).abs() < 1e-9);
        assert_eq!(market.limits.amount.min, Some(0.001));
    }

    #[test]
    fn eth_base_gets_two_amount_digits() {
        let market = parse_market(&product("ETH", "BTC")).unwrap();
        let amount_precision = market.precision.amount.unwrap();
        assert!((amount_precision - 2.0).abs() < 1e-9);
        let price_precision = market.precision.price.unwrap();
        assert!((price_precision - 8.0).abs() < 1e-9);
    }

    #[test]
    fn cost_min_is_exact_product_of_minimums() {
        let market = parse_market(&product("BTC", "JPY")).unwrap();
        let min_price = market.limits.price.min.unwrap();
        let min_amount = market.limits.amount.min.unwrap();
        assert_eq!(market.limits.cost.min, Some(min_price * min_amount));
    }

    #[test]
    fn unknown_currencies_leave_limits_open() {
        let market = parse_market(&product("XRP", "SGD")).unwrap();
        assert_eq!(market.precision.amount, None);
        assert_eq!(market.precision.price, None);
        assert_eq!(market.limits.cost.min, None);
        assert!(market.active);
    }

    #[test]
    fn disabled_product_is_inactive() {
        let mut raw = product("BTC", "USD");
        raw.disabled = true;
        assert!(!parse_market(&raw).unwrap().active);
    }

    #[test]
    fn ticker_empty_last_price_is_none() {
        let raw: QuoineProduct = serde_json::from_value(json!({
            "id": 1,
            "base_currency": "BTC",
            "quoted_currency": "USD",
            "last_traded_price": "",
            "high_market_ask": "100"
        }))
        .unwrap();
        let ticker = parse_ticker(&raw, None, 1_500_000_000_000);

        assert_eq!(ticker.last, None);
        assert_eq!(ticker.close, None);
        assert_eq!(ticker.high, Some(100.0));
        assert_eq!(ticker.timestamp, 1_500_000_000_000);
        assert_eq!(ticker.vwap, None);
        assert_eq!(ticker.quote_volume, None);
    }

    #[test]
    fn ticker_binds_symbol_from_market() {
        let market = parse_market(&product("BTC", "USD")).unwrap();
        let raw: QuoineProduct = serde_json::from_value(json!({
            "id": 1,
            "base_currency": "BTC",
            "quoted_currency": "USD",
            "last_traded_price": "9500.5",
            "market_bid": "9499",
            "market_ask": "9501",
            "volume_24h": "120.5"
        }))
        .unwrap();
        let ticker = parse_ticker(&raw, Some(&market), 1_500_000_000_000);

        assert_eq!(ticker.symbol.as_deref(), Some("BTC/USD"));
        assert_eq!(ticker.last, Some(9500.5));
        assert_eq!(ticker.bid, Some(9499.0));
        assert_eq!(ticker.ask, Some(9501.0));
        assert_eq!(ticker.base_volume, Some(120.5));
    }

    #[test]
    fn trade_timestamp_scales_seconds_to_milliseconds() {
        let market = parse_market(&product("BTC", "USD")).unwrap();
        let raw: QuoineExecution = serde_json::from_value(json!({
            "id": 1011,
            "created_at": 1_500_000_000,
            "taker_side": "sell",
            "price": "9500.0",
            "quantity": "0.25"
        }))
        .unwrap();
        let trade = parse_trade(&raw, &market).unwrap();

        assert_eq!(trade.id, "1011");
        assert_eq!(trade.timestamp, 1_500_000_000_000);
        assert_eq!(trade.side, OrderSide::Sell);
        assert_eq!(trade.price, 9500.0);
        assert_eq!(trade.amount, 0.25);
        assert_eq!(trade.symbol, "BTC/USD");
    }

    #[test]
    fn trade_without_id_fails() {
        let market = parse_market(&product("BTC", "USD")).unwrap();
        let raw: QuoineExecution = serde_json::from_value(json!({
            "created_at": 1_500_000_000,
            "taker_side": "buy",
            "price": "1.0",
            "quantity": "1.0"
        }))
        .unwrap();
        assert!(matches!(
            parse_trade(&raw, &market),
            Err(ExchangeError::Deserialization(_))
        ));
    }

    #[test]
    fn order_status_mapping_matches_native_labels() {
        assert_eq!(parse_order_status("live"), Some(OrderStatus::Open));
        assert_eq!(parse_order_status("filled"), Some(OrderStatus::Closed));
        assert_eq!(parse_order_status("cancelled"), Some(OrderStatus::Canceled));
        assert_eq!(parse_order_status("suspended"), None);

        assert_eq!(order_status_to_native(OrderStatus::Open), "live");
        assert_eq!(order_status_to_native(OrderStatus::Closed), "filled");
        assert_eq!(order_status_to_native(OrderStatus::Canceled), "cancelled");
    }

    #[test]
    fn cancelled_order_parses_with_zero_remaining() {
        let registry = registry_with("5", "BTC/USD");
        let raw: QuoineOrder = serde_json::from_value(json!({
            "id": 2157474,
            "created_at": 1_462_123_639,
            "order_type": "limit",
            "status": "cancelled",
            "product_id": 5,
            "side": "buy",
            "price": "500.0",
            "quantity": "1.5",
            "filled_quantity": "1.5",
            "order_fee": "0.0"
        }))
        .unwrap();
        let order = parse_order(&raw, &registry).unwrap();

        assert_eq!(order.status, Some(OrderStatus::Canceled));
        assert_eq!(order.remaining, 0.0);
        assert_eq!(order.filled, 1.5);
        assert_eq!(order.symbol.as_deref(), Some("BTC/USD"));
        assert_eq!(order.fee.cost, 0.0);
        assert_eq!(order.fee.currency, None);
    }

    #[test]
    fn remaining_is_amount_minus_filled() {
        let registry = MarketRegistry::default();
        let raw: QuoineOrder = serde_json::from_value(json!({
            "id": "42",
            "created_at": 1_462_123_639,
            "order_type": "limit",
            "status": "live",
            "side": "sell",
            "price": "750.0",
            "quantity": "2.0",
            "filled_quantity": "0.0",
            "order_fee": "0.01"
        }))
        .unwrap();
        let order = parse_order(&raw, &registry).unwrap();

        assert_eq!(order.remaining, 2.0);
        assert_eq!(order.status, Some(OrderStatus::Open));
        // Unknown product_id leaves the symbol unresolved.
        assert_eq!(order.symbol, None);
        assert_eq!(order.timestamp, 1_462_123_639_000);
    }

    #[test]
    fn order_with_unknown_status_parses_as_none() {
        let registry = MarketRegistry::default();
        let raw: QuoineOrder = serde_json::from_value(json!({
            "id": 7,
            "created_at": 1_462_123_639,
            "order_type": "limit",
            "status": "partially_reviewed",
            "side": "buy",
            "price": "1.0",
            "quantity": "1.0",
            "filled_quantity": "0.5"
        }))
        .unwrap();
        assert_eq!(parse_order(&raw, &registry).unwrap().status, None);
    }

    #[test]
    fn order_without_id_fails() {
        let registry = MarketRegistry::default();
        let raw: QuoineOrder = serde_json::from_value(json!({
            "created_at": 1_462_123_639,
            "order_type": "limit",
            "side": "buy",
            "price": "1.0",
            "quantity": "1.0",
            "filled_quantity": "0.0"
        }))
        .unwrap();
        assert!(matches!(
            parse_order(&raw, &registry),
            Err(ExchangeError::Deserialization(_))
        ));
    }

    #[test]
    fn order_book_preserves_server_ordering() {
        let raw: QuoinePriceLevels = serde_json::from_value(json!({
            "buy_price_levels": [["100.0", "1.0"], ["99.5", "2.0"], ["99.0", "0.5"]],
            "sell_price_levels": [["100.5", "0.25"], ["101.0", "3.0"]]
        }))
        .unwrap();
        let book = parse_order_book(&raw, "BTC/USD", 1_500_000_000_000, None).unwrap();

        assert_eq!(book.bids.len(), 3);
        assert_eq!(book.bids[0].price, 100.0);
        assert_eq!(book.bids[2].amount, 0.5);
        assert_eq!(book.asks[0].price, 100.5);
    }

    #[test]
    fn order_book_limit_truncates_each_side() {
        let raw: QuoinePriceLevels = serde_json::from_value(json!({
            "buy_price_levels": [["100.0", "1.0"], ["99.5", "2.0"]],
            "sell_price_levels": [["100.5", "0.25"], ["101.0", "3.0"]]
        }))
        .unwrap();
        let book = parse_order_book(&raw, "BTC/USD", 0, Some(1)).unwrap();
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.asks.len(), 1);
    }

    #[test]
    fn balances_report_no_reservation_split() {
        let raw: Vec<QuoineBalance> = serde_json::from_value(json!([
            {"currency": "BTC", "balance": "0.04925688"},
            {"currency": "USD", "balance": "20.0"}
        ]))
        .unwrap();
        let balances = parse_balances(&raw);

        let btc = balances.get("BTC").unwrap();
        assert_eq!(btc.free, 0.049_256_88);
        assert_eq!(btc.used, 0.0);
        assert_eq!(btc.total, btc.free);
        assert_eq!(balances.get("USD").unwrap().total, 20.0);
        assert!(balances.info.is_array());
    }

    #[test]
    fn since_limit_post_filter_keeps_server_order() {
        let items = vec![40_i64, 30, 20, 10];
        let filtered = filter_since_limit(items.clone(), Some(20), None, |t| *t);
        assert_eq!(filtered, vec![40, 30, 20]);

        let limited = filter_since_limit(items, Some(20), Some(2), |t| *t);
        assert_eq!(limited, vec![40, 30]);
    }
}
