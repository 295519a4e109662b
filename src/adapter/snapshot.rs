//! Offline provider replaying a recorded market snapshot.
//!
//! The snapshot is a JSON document holding, per underlying, its qualified
//! stock, a spot quote and the option chains by expiry with one quote per
//! contract:
//!
//! ```json
//! {
//!   "as_of": "2019-10-14T10:00:00",
//!   "underlyings": [{
//!     "stock": { "id": 1, "symbol": "GDX", "exchange": "SMART", "currency": "USD" },
//!     "spot": { "bid": 28.0, "ask": 28.02, "last": 28.01 },
//!     "chains": {
//!       "20191025": [
//!         { "contract": { "id": 101, "symbol": "GDX", "expiry": "2019-10-25",
//!                         "strike": "29", "right": "c", "multiplier": 100 },
//!           "quote": { "bid": 0.3, "ask": 0.32 } }
//!       ]
//!     }
//!   }]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Contract, ContractId, Quote, Stock, StockSpec};
use crate::error::{Error, Result};
use crate::exchange::MarketDataProvider;

/// A contract together with the quote recorded for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotedContract {
    pub contract: Contract,
    #[serde(default)]
    pub quote: Quote,
}

/// Everything recorded for one underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnderlyingSnapshot {
    pub stock: Stock,
    pub spot: Quote,
    /// Chains keyed by `YYYYMMDD` expiry.
    #[serde(default)]
    pub chains: BTreeMap<String, Vec<QuotedContract>>,
}

/// A recorded market state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Local time the snapshot was taken. Pricing is pinned to it on replay.
    #[serde(default)]
    pub as_of: Option<NaiveDateTime>,
    #[serde(default)]
    pub underlyings: Vec<UnderlyingSnapshot>,
}

/// [`MarketDataProvider`] serving a [`MarketSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    as_of: Option<NaiveDateTime>,
    underlyings: HashMap<String, UnderlyingSnapshot>,
    quotes: HashMap<ContractId, Quote>,
}

impl SnapshotProvider {
    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::data_fetch(format!("cannot read snapshot {}: {e}", path.display())))?;
        let snapshot: MarketSnapshot = serde_json::from_str(&content)?;
        info!(
            path = %path.display(),
            underlyings = snapshot.underlyings.len(),
            "Loaded market snapshot"
        );
        Ok(Self::new(snapshot))
    }

    #[must_use]
    pub fn new(snapshot: MarketSnapshot) -> Self {
        let quotes = snapshot
            .underlyings
            .iter()
            .flat_map(|u| u.chains.values().flatten())
            .map(|q| (q.contract.id, q.quote))
            .collect();
        let underlyings = snapshot
            .underlyings
            .into_iter()
            .map(|u| (u.stock.symbol.clone(), u))
            .collect();

        Self {
            as_of: snapshot.as_of,
            underlyings,
            quotes,
        }
    }

    /// Local time the snapshot was taken, if recorded.
    #[must_use]
    pub fn as_of(&self) -> Option<NaiveDateTime> {
        self.as_of
    }

    /// Recorded expiries for a symbol, ascending.
    #[must_use]
    pub fn expiries(&self, symbol: &str) -> Vec<String> {
        self.underlyings
            .get(symbol)
            .map(|u| u.chains.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn underlying(&self, symbol: &str) -> Result<&UnderlyingSnapshot> {
        self.underlyings
            .get(symbol)
            .ok_or_else(|| Error::data_fetch(format!("{symbol} not in snapshot")))
    }
}

#[async_trait]
impl MarketDataProvider for SnapshotProvider {
    async fn qualify(&self, spec: &StockSpec) -> Result<Stock> {
        let stock = &self.underlying(&spec.symbol)?.stock;
        if stock.currency != spec.currency {
            return Err(Error::data_fetch(format!(
                "{} is quoted in {}, not {}",
                spec.symbol, stock.currency, spec.currency
            )));
        }
        Ok(stock.clone())
    }

    async fn request_chain(&self, stock: &Stock, expiry: &str) -> Result<Vec<Contract>> {
        let chain = self
            .underlying(&stock.symbol)?
            .chains
            .get(expiry)
            .ok_or_else(|| Error::data_fetch(format!("no {} chain for {expiry}", stock.symbol)))?;
        debug!(symbol = %stock.symbol, expiry, contracts = chain.len(), "Replayed chain");
        Ok(chain.iter().map(|q| q.contract.clone()).collect())
    }

    async fn request_quotes(&self, contracts: &[Contract]) -> Result<Vec<Quote>> {
        contracts
            .iter()
            .map(|c| {
                self.quotes
                    .get(&c.id)
                    .copied()
                    .ok_or_else(|| Error::data_fetch(format!("no quote recorded for {c}")))
            })
            .collect()
    }

    async fn request_spot(&self, stock: &Stock) -> Result<Quote> {
        Ok(self.underlying(&stock.symbol)?.spot)
    }

    fn provider_name(&self) -> &'static str {
        "snapshot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Right;
    use crate::testkit::domain::{contract, stock};

    fn provider() -> SnapshotProvider {
        let chain = vec![
            QuotedContract {
                contract: contract(101, "GDX", "20191025", 29.0, Right::Call),
                quote: Quote::new(0.3, 0.32, 0.31),
            },
            QuotedContract {
                contract: contract(102, "GDX", "20191025", 27.0, Right::Put),
                quote: Quote::default(),
            },
        ];
        SnapshotProvider::new(MarketSnapshot {
            as_of: None,
            underlyings: vec![UnderlyingSnapshot {
                stock: stock(1, "GDX"),
                spot: Quote::new(28.0, 28.02, 28.01),
                chains: BTreeMap::from([("20191025".to_string(), chain)]),
            }],
        })
    }

    #[tokio::test]
    async fn replays_chain_and_quotes_in_order() {
        let provider = provider();
        let stock = provider.qualify(&StockSpec::smart("GDX")).await.unwrap();
        let chain = provider.request_chain(&stock, "20191025").await.unwrap();
        let quotes = provider.request_quotes(&chain).await.unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].bid, Some(0.3));
        assert_eq!(quotes[1], Quote::default());
        assert_eq!(provider.expiries("GDX"), vec!["20191025"]);
    }

    #[tokio::test]
    async fn missing_data_is_a_fetch_error() {
        let provider = provider();
        let err = provider.qualify(&StockSpec::smart("NUGT")).await.unwrap_err();
        assert!(matches!(err, Error::DataFetch(_)));

        let stock = stock(1, "GDX");
        let err = provider.request_chain(&stock, "20191101").await.unwrap_err();
        assert!(matches!(err, Error::DataFetch(_)));

        let unknown = contract(999, "GDX", "20191025", 30.0, Right::Call);
        let err = provider.request_quotes(&[unknown]).await.unwrap_err();
        assert!(matches!(err, Error::DataFetch(_)));
    }

    #[test]
    fn parses_documented_format() {
        let json = r#"{
            "as_of": "2019-10-14T10:00:00",
            "underlyings": [{
                "stock": { "id": 1, "symbol": "GDX", "exchange": "SMART", "currency": "USD" },
                "spot": { "bid": 28.0, "ask": 28.02, "last": 28.01 },
                "chains": {
                    "20191025": [
                        { "contract": { "id": 101, "symbol": "GDX", "expiry": "2019-10-25",
                                        "strike": "29", "right": "c", "multiplier": 100 },
                          "quote": { "bid": 0.3, "ask": 0.32 } }
                    ]
                }
            }]
        }"#;
        let snapshot: MarketSnapshot = serde_json::from_str(json).unwrap();
        let provider = SnapshotProvider::new(snapshot);
        assert!(provider.as_of().is_some());
        assert_eq!(provider.expiries("GDX"), vec!["20191025"]);
    }
}
