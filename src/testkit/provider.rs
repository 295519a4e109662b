//! In-memory market-data provider for tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::domain::stock;
use crate::domain::{Contract, ContractId, Quote, Stock, StockSpec};
use crate::error::{Error, Result};
use crate::exchange::MarketDataProvider;

/// Provider serving hand-built chains, counting every fetch.
///
/// Expiries registered with [`MockProvider::fail_expiry`] fail their chain
/// request with [`Error::DataFetch`].
#[derive(Debug, Default)]
pub struct MockProvider {
    stocks: HashMap<String, Stock>,
    spots: HashMap<String, Quote>,
    chains: HashMap<(String, String), Vec<Contract>>,
    quotes: HashMap<ContractId, Quote>,
    failing: HashSet<String>,
    chain_calls: AtomicUsize,
    quote_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an underlying whose spot trades at `spot`.
    pub fn with_underlying(mut self, id: i64, symbol: &str, spot: f64) -> Self {
        self.stocks.insert(symbol.to_string(), stock(id, symbol));
        self.spots.insert(symbol.to_string(), Quote::last_only(spot));
        self
    }

    /// Register a chain with one quote per contract.
    pub fn with_chain(mut self, symbol: &str, expiry: &str, chain: Vec<(Contract, Quote)>) -> Self {
        let contracts = chain
            .into_iter()
            .map(|(contract, quote)| {
                self.quotes.insert(contract.id, quote);
                contract
            })
            .collect();
        self.chains
            .insert((symbol.to_string(), expiry.to_string()), contracts);
        self
    }

    /// Make every chain request for `expiry` fail.
    pub fn fail_expiry(mut self, expiry: &str) -> Self {
        self.failing.insert(expiry.to_string());
        self
    }

    pub fn chain_calls(&self) -> usize {
        self.chain_calls.load(Ordering::SeqCst)
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn qualify(&self, spec: &StockSpec) -> Result<Stock> {
        self.stocks
            .get(&spec.symbol)
            .cloned()
            .ok_or_else(|| Error::data_fetch(format!("unknown symbol {}", spec.symbol)))
    }

    async fn request_chain(&self, stock: &Stock, expiry: &str) -> Result<Vec<Contract>> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(expiry) {
            return Err(Error::data_fetch(format!("injected failure for {expiry}")));
        }
        self.chains
            .get(&(stock.symbol.clone(), expiry.to_string()))
            .cloned()
            .ok_or_else(|| Error::data_fetch(format!("no {} chain for {expiry}", stock.symbol)))
    }

    async fn request_quotes(&self, contracts: &[Contract]) -> Result<Vec<Quote>> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        Ok(contracts
            .iter()
            .map(|c| self.quotes.get(&c.id).copied().unwrap_or_default())
            .collect())
    }

    async fn request_spot(&self, stock: &Stock) -> Result<Quote> {
        self.spots
            .get(&stock.symbol)
            .copied()
            .ok_or_else(|| Error::data_fetch(format!("no spot for {}", stock.symbol)))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
