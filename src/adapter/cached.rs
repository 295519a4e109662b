//! Caching decorator for market-data providers.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::{debug, warn};

use crate::cache::{chain_key, snapshot_key, ticker_key, TtlCache};
use crate::domain::{Contract, ContractId, Quote, Stock, StockSpec};
use crate::error::Result;
use crate::exchange::MarketDataProvider;

/// Serves chains and quotes from [`TtlCache`]s, delegating on a miss.
///
/// Quotes are cached per chain: a batch whose contracts share one symbol
/// and expiry is stored under [`snapshot_key`] and only served back for the
/// same contracts in the same order. Mixed batches always go to the inner
/// provider. Qualification is never cached. A failed cache write is logged
/// and the fetched data is still returned.
pub struct CachedProvider {
    inner: Arc<dyn MarketDataProvider>,
    chains: TtlCache<Vec<Contract>>,
    quotes: TtlCache<Vec<(ContractId, Quote)>>,
    spots: TtlCache<Quote>,
}

impl CachedProvider {
    /// In-memory caches.
    pub fn new(inner: Arc<dyn MarketDataProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            chains: TtlCache::new(ttl),
            quotes: TtlCache::new(ttl),
            spots: TtlCache::new(ttl),
        }
    }

    /// Caches persisted as JSON files under `dir`.
    pub fn open(inner: Arc<dyn MarketDataProvider>, dir: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            inner,
            chains: TtlCache::open(dir.join("chains.json"), ttl)?,
            quotes: TtlCache::open(dir.join("quotes.json"), ttl)?,
            spots: TtlCache::open(dir.join("spots.json"), ttl)?,
        })
    }

    /// Drop expired entries from every cache.
    pub fn prune_expired(&self) -> usize {
        self.chains.prune_expired() + self.quotes.prune_expired() + self.spots.prune_expired()
    }
}

fn store<V>(cache: &TtlCache<V>, key: String, value: V)
where
    V: Clone + serde::Serialize + serde::de::DeserializeOwned,
{
    if let Err(err) = cache.put(key.as_str(), value) {
        warn!(key = %key, error = %err, "Cache write failed");
    }
}

fn batch_key(contracts: &[Contract]) -> Option<String> {
    let first = contracts.first()?;
    contracts
        .iter()
        .all(|c| c.symbol == first.symbol && c.expiry == first.expiry)
        .then(|| snapshot_key(&first.symbol, &first.expiry_code()))
}

fn matches_batch(cached: &[(ContractId, Quote)], contracts: &[Contract]) -> bool {
    cached.len() == contracts.len() && cached.iter().zip(contracts).all(|((id, _), c)| *id == c.id)
}

#[async_trait]
impl MarketDataProvider for CachedProvider {
    async fn qualify(&self, spec: &StockSpec) -> Result<Stock> {
        self.inner.qualify(spec).await
    }

    async fn request_chain(&self, stock: &Stock, expiry: &str) -> Result<Vec<Contract>> {
        let key = chain_key(stock.id, expiry);
        if let Some(chain) = self.chains.get(&key) {
            debug!(key = %key, "Chain cache hit");
            return Ok(chain);
        }
        let chain = self.inner.request_chain(stock, expiry).await?;
        store(&self.chains, key, chain.clone());
        Ok(chain)
    }

    async fn request_quotes(&self, contracts: &[Contract]) -> Result<Vec<Quote>> {
        let Some(key) = batch_key(contracts) else {
            return self.inner.request_quotes(contracts).await;
        };
        if let Some(cached) = self.quotes.get(&key) {
            if matches_batch(&cached, contracts) {
                debug!(key = %key, "Quote cache hit");
                return Ok(cached.into_iter().map(|(_, q)| q).collect());
            }
        }
        let quotes = self.inner.request_quotes(contracts).await?;
        let entry = contracts.iter().map(|c| c.id).zip(quotes.iter().copied()).collect();
        store(&self.quotes, key, entry);
        Ok(quotes)
    }

    async fn request_spot(&self, stock: &Stock) -> Result<Quote> {
        let key = ticker_key(stock.id);
        if let Some(spot) = self.spots.get(&key) {
            return Ok(spot);
        }
        let spot = self.inner.request_spot(stock).await?;
        store(&self.spots, key, spot);
        Ok(spot)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Right;
    use crate::testkit::domain::contract;
    use crate::testkit::provider::MockProvider;

    fn mock() -> Arc<MockProvider> {
        Arc::new(
            MockProvider::new()
                .with_underlying(1, "GDX", 28.0)
                .with_chain(
                    "GDX",
                    "20191025",
                    vec![
                        (contract(101, "GDX", "20191025", 29.0, Right::Call), Quote::new(0.3, 0.32, 0.31)),
                        (contract(102, "GDX", "20191025", 30.0, Right::Call), Quote::new(0.1, 0.12, 0.11)),
                    ],
                ),
        )
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let mock = mock();
        let cached = CachedProvider::new(mock.clone(), Duration::hours(1));
        let stock = cached.qualify(&StockSpec::smart("GDX")).await.unwrap();

        let first = cached.request_chain(&stock, "20191025").await.unwrap();
        let second = cached.request_chain(&stock, "20191025").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(mock.chain_calls(), 1);

        let q1 = cached.request_quotes(&first).await.unwrap();
        let q2 = cached.request_quotes(&first).await.unwrap();
        assert_eq!(q1, q2);
        assert_eq!(mock.quote_calls(), 1);

        // A subset of the chain must not be answered from the full batch.
        let subset = cached.request_quotes(&first[1..]).await.unwrap();
        assert_eq!(subset, vec![Quote::new(0.1, 0.12, 0.11)]);
        assert_eq!(mock.quote_calls(), 2);
    }

    #[tokio::test]
    async fn expired_cache_delegates_every_time() {
        let mock = mock();
        let cached = CachedProvider::new(mock.clone(), Duration::zero());
        let stock = cached.qualify(&StockSpec::smart("GDX")).await.unwrap();

        cached.request_chain(&stock, "20191025").await.unwrap();
        cached.request_chain(&stock, "20191025").await.unwrap();
        assert_eq!(mock.chain_calls(), 2);
    }

    #[tokio::test]
    async fn fetch_errors_are_not_cached() {
        let mock = mock();
        let cached = CachedProvider::new(mock.clone(), Duration::hours(1));
        let stock = cached.qualify(&StockSpec::smart("GDX")).await.unwrap();

        assert!(cached.request_chain(&stock, "20191101").await.is_err());
        assert!(cached.request_chain(&stock, "20191101").await.is_err());
        assert_eq!(mock.chain_calls(), 2);
    }

    #[tokio::test]
    async fn cache_write_failure_still_returns_fetched_data() {
        let dir = tempfile::tempdir().unwrap();
        let mock = mock();
        let cached = CachedProvider::open(mock.clone(), dir.path(), Duration::hours(1)).unwrap();
        let stock = cached.qualify(&StockSpec::smart("GDX")).await.unwrap();

        std::fs::remove_dir_all(dir.path()).unwrap();

        let chain = cached.request_chain(&stock, "20191025").await.unwrap();
        assert_eq!(chain.len(), 2);
        let quotes = cached.request_quotes(&chain).await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert!(cached.request_spot(&stock).await.is_ok());

        // Nothing was cached, so the next fetch delegates again.
        cached.request_chain(&stock, "20191025").await.unwrap();
        assert_eq!(mock.chain_calls(), 2);
    }

    #[tokio::test]
    async fn persisted_cache_is_reused_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mock = mock();

        let stock = {
            let cached = CachedProvider::open(mock.clone(), dir.path(), Duration::hours(1)).unwrap();
            let stock = cached.qualify(&StockSpec::smart("GDX")).await.unwrap();
            cached.request_chain(&stock, "20191025").await.unwrap();
            stock
        };

        let reopened = CachedProvider::open(mock.clone(), dir.path(), Duration::hours(1)).unwrap();
        let chain = reopened.request_chain(&stock, "20191025").await.unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(mock.chain_calls(), 1);
    }
}
