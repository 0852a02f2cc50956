pub mod account;
pub mod builder;
pub mod connector;
pub mod errors;
pub mod market_data;
pub mod parser;
pub mod signer;
pub mod trading;
pub mod types;

// Re-export main types for easier importing
pub use builder::{build_connector, API_BASE_URL};
pub use connector::QuoineConnector;
pub use errors::QuoineErrorHandler;
pub use signer::QuoineSigner;
pub use types::{
    Paginated, QuoineBalance, QuoineExecution, QuoineOrder, QuoinePriceLevels, QuoineProduct,
};
