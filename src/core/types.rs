use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Millisecond timestamp rendered as an ISO-8601 UTC string.
///
/// Returns `None` for timestamps chrono cannot represent.
pub fn iso8601(timestamp_ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn milliseconds() -> i64 {
    Utc::now().timestamp_millis()
}

/// Order side, from the perspective of the order owner (or the taker, for
/// public trades).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Market => "market",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "limit" => Some(Self::Limit),
            "market" => Some(Self::Market),
            _ => None,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized order lifecycle status.
///
/// Exchange-native lifecycle labels are mapped into this three-value enum by
/// the adapter; an unrecognized native status maps to `None` on [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum/maximum bounds for one market limit dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Trading limits for a market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub amount: MinMax,
    pub price: MinMax,
    pub cost: MinMax,
}

/// Decimal-digit precision for a market, derived from its minimum order
/// increments. `None` when the increment is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Precision {
    pub amount: Option<f64>,
    pub price: Option<f64>,
}

/// A tradable base/quote currency pair with its trading rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Exchange-native market identifier.
    pub id: String,
    /// Normalized symbol, `BASE/QUOTE`.
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub maker: Option<f64>,
    pub taker: Option<f64>,
    pub active: bool,
    pub precision: Precision,
    pub limits: Limits,
    /// Raw exchange payload the market was parsed from.
    pub info: Value,
}

/// Point-in-time best-price/volume snapshot for a market.
///
/// Fields the exchange does not supply are always `None` rather than being
/// silently dropped, so a caller can tell "not provided" from "zero".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Option<String>,
    /// Request time in milliseconds; the exchange sends no server timestamp.
    pub timestamp: i64,
    pub datetime: Option<String>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub bid: Option<f64>,
    pub bid_volume: Option<f64>,
    pub ask: Option<f64>,
    pub ask_volume: Option<f64>,
    pub vwap: Option<f64>,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub last: Option<f64>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub percentage: Option<f64>,
    pub average: Option<f64>,
    pub base_volume: Option<f64>,
    pub quote_volume: Option<f64>,
    pub info: Value,
}

/// A single executed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub datetime: Option<String>,
    pub symbol: String,
    /// Which party initiated the matching trade.
    pub side: OrderSide,
    pub price: f64,
    pub amount: f64,
    pub info: Value,
}

/// Fee attached to an order. The exchange reports a flat cost with no
/// currency attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fee {
    pub currency: Option<String>,
    pub cost: f64,
}

/// A normalized exchange order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub timestamp: i64,
    pub datetime: Option<String>,
    pub order_type: OrderType,
    /// `None` when the exchange reported a lifecycle label this adapter does
    /// not recognize.
    pub status: Option<OrderStatus>,
    pub symbol: Option<String>,
    pub side: OrderSide,
    pub price: f64,
    pub amount: f64,
    pub filled: f64,
    /// Always `amount - filled`.
    pub remaining: f64,
    pub fee: Fee,
    pub info: Value,
}

/// One price level of an order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub amount: f64,
}

/// Bid/ask depth snapshot, in the order the exchange returned the levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub timestamp: i64,
    pub datetime: Option<String>,
}

/// Per-currency balance. The exchange reports no reservation split, so
/// `used` is always zero and `total == free`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub free: f64,
    pub used: f64,
    pub total: f64,
}

/// Account balance report keyed by currency code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balances {
    pub currencies: HashMap<String, Balance>,
    pub info: Value,
}

impl Balances {
    pub fn get(&self, currency: &str) -> Option<&Balance> {
        self.currencies.get(currency)
    }
}

/// Loaded-market cache with lookup by normalized symbol and by the
/// exchange-native id.
///
/// Owned by the connector and refreshed by `load_markets`; every other
/// operation only reads it.
#[derive(Debug, Clone, Default)]
pub struct MarketRegistry {
    by_symbol: HashMap<String, Market>,
    by_id: HashMap<String, Market>,
}

impl MarketRegistry {
    pub fn from_markets(markets: Vec<Market>) -> Self {
        let mut by_symbol = HashMap::with_capacity(markets.len());
        let mut by_id = HashMap::with_capacity(markets.len());
        for market in markets {
            by_id.insert(market.id.clone(), market.clone());
            by_symbol.insert(market.symbol.clone(), market);
        }
        Self { by_symbol, by_id }
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Market> {
        self.by_symbol.get(symbol)
    }

    pub fn by_id(&self, id: &str) -> Option<&Market> {
        self.by_id.get(id)
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.by_symbol.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}
