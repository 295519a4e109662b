//! Market-data provider abstraction.
//!
//! The scanner only ever needs to qualify an underlying, list its option
//! chain for an expiry and snapshot quotes. All calls are read-only, so a
//! caller may retry any of them safely; the trait itself never retries.

use async_trait::async_trait;

use crate::domain::{Contract, Quote, Stock, StockSpec};
use crate::error::Result;

/// Supplies contract specs and live quotes.
///
/// Failures surface as [`Error::DataFetch`](crate::error::Error::DataFetch).
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Resolve an underlying to its broker contract.
    async fn qualify(&self, spec: &StockSpec) -> Result<Stock>;

    /// List the option chain of an underlying for one `YYYYMMDD` expiry.
    async fn request_chain(&self, stock: &Stock, expiry: &str) -> Result<Vec<Contract>>;

    /// Snapshot quotes for contracts, returned in the same order, one each.
    async fn request_quotes(&self, contracts: &[Contract]) -> Result<Vec<Quote>>;

    /// Snapshot the underlying's own quote.
    async fn request_spot(&self, stock: &Stock) -> Result<Quote>;

    /// Provider name for logging.
    fn provider_name(&self) -> &'static str;
}
