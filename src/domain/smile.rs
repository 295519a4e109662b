//! Priced option chain for one underlying and expiry.

use serde::Serialize;

use super::pricing::{GreekEngine, GreekResult};
use super::{Contract, Quote};
use crate::error::{Error, Result};

/// [`GreekResult`]s for one underlying and expiry, in chain order.
///
/// Materialized once per quote snapshot; iterate it as often as needed.
/// No filtering happens here.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Smile {
    pub symbol: String,
    pub expiry: String,
    pub spot: f64,
    results: Vec<GreekResult>,
}

impl Smile {
    /// Price every contract of a chain against its quote.
    ///
    /// `quotes` must be in chain order, one per contract.
    pub fn build(
        engine: &GreekEngine,
        symbol: impl Into<String>,
        expiry: impl Into<String>,
        spot: f64,
        chain: &[Contract],
        quotes: &[Quote],
    ) -> Result<Self> {
        let symbol = symbol.into();
        if chain.len() != quotes.len() {
            return Err(Error::data_fetch(format!(
                "{symbol}: {} contracts but {} quotes",
                chain.len(),
                quotes.len()
            )));
        }

        let results = chain
            .iter()
            .zip(quotes)
            .map(|(contract, quote)| engine.from_quote(contract, quote, spot))
            .collect();

        Ok(Self {
            symbol,
            expiry: expiry.into(),
            spot,
            results,
        })
    }

    /// Wrap already computed results.
    pub fn from_results(
        symbol: impl Into<String>,
        expiry: impl Into<String>,
        spot: f64,
        results: Vec<GreekResult>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            expiry: expiry.into(),
            spot,
            results,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GreekResult> {
        self.results.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of contracts whose implied vol could not be solved for.
    #[must_use]
    pub fn degraded_count(&self) -> usize {
        self.results.iter().filter(|r| r.iv_degraded).count()
    }
}

impl<'a> IntoIterator for &'a Smile {
    type Item = &'a GreekResult;
    type IntoIter = std::slice::Iter<'a, GreekResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl IntoIterator for Smile {
    type Item = GreekResult;
    type IntoIter = std::vec::IntoIter<GreekResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
