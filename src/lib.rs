//! REST connector for the Quoine v2 API (QRYPTOS).
//!
//! The crate is split into an exchange-agnostic kernel (`core`) and the
//! exchange adapter (`exchanges::quoine`). Typical usage:
//!
//! ```no_run
//! use quoinex::core::config::ExchangeConfig;
//! use quoinex::core::traits::MarketDataSource;
//! use quoinex::exchanges::quoine::build_connector;
//!
//! # async fn run() -> Result<(), quoinex::ExchangeError> {
//! let connector = build_connector(ExchangeConfig::read_only())?;
//! let ticker = connector.fetch_ticker("BTC/USD").await?;
//! println!("last: {:?}", ticker.last);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod exchanges;

pub use crate::core::config::ExchangeConfig;
pub use crate::core::errors::ExchangeError;
pub use crate::core::traits::{AccountData, ExchangeConnector, MarketDataSource, OrderPlacer};
pub use crate::core::types::{
    Balance, Balances, Market, Order, OrderBook, OrderSide, OrderStatus, OrderType, Ticker, Trade,
};
pub use crate::exchanges::quoine::{build_connector, QuoineConnector};
