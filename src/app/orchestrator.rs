//! Pair scanning across expiries.
//!
//! Each expiry is an independent unit: fetch both chains and quotes, build
//! one smile per underlying, then select legs. Units run concurrently on the
//! shared provider handle and a failing unit is recorded as skipped without
//! touching its siblings. Qualification and spot failures abort the scan.

use std::sync::Arc;

use futures_util::future::{join_all, try_join};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::config::Config;
use crate::domain::solver::Solver;
use crate::domain::strategy::{ArbConfig, ArbSmile, ArbSolution, PairRatios};
use crate::domain::{GreekEngine, Quote, Smile, Stock, StockSpec};
use crate::error::{Error, Result};
use crate::exchange::MarketDataProvider;

/// What happened to one expiry.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExpiryOutcome {
    Solved {
        expiry: String,
        solution: ArbSolution,
        /// Contracts across both smiles whose implied vol degraded to zero.
        degraded: usize,
    },
    Skipped {
        expiry: String,
        reason: String,
    },
}

impl ExpiryOutcome {
    #[must_use]
    pub fn expiry(&self) -> &str {
        match self {
            Self::Solved { expiry, .. } | Self::Skipped { expiry, .. } => expiry,
        }
    }

    #[must_use]
    pub fn solution(&self) -> Option<&ArbSolution> {
        match self {
            Self::Solved { solution, .. } => Some(solution),
            Self::Skipped { .. } => None,
        }
    }
}

/// Result of scanning a pair.
#[derive(Debug, Clone, Serialize)]
pub struct EtfPairResult {
    pub unlevered: String,
    pub levered: String,
    pub unlevered_spot: f64,
    pub levered_spot: f64,
    /// One entry per requested expiry, in request order.
    pub outcomes: Vec<ExpiryOutcome>,
    /// Highest-spread solution. Ties keep the earlier expiry.
    pub best: Option<ArbSolution>,
}

impl EtfPairResult {
    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.solution().is_some()).count()
    }
}

/// An unlevered/levered ETF pair and everything needed to scan it.
pub struct EtfPair {
    unlevered: StockSpec,
    levered: StockSpec,
    ratios: PairRatios,
    arb: ArbConfig,
    engine: GreekEngine,
    provider: Arc<dyn MarketDataProvider>,
    solver: Arc<dyn Solver>,
}

impl EtfPair {
    pub fn new(
        unlevered: StockSpec,
        levered: StockSpec,
        ratios: PairRatios,
        provider: Arc<dyn MarketDataProvider>,
        solver: Arc<dyn Solver>,
    ) -> Self {
        Self {
            unlevered,
            levered,
            ratios,
            arb: ArbConfig::default(),
            engine: GreekEngine::default(),
            provider,
            solver,
        }
    }

    /// Pair, pricing and selection settings from a loaded config.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn MarketDataProvider>,
        solver: Arc<dyn Solver>,
    ) -> Self {
        Self::new(
            config.pair.unlevered_spec(),
            config.pair.levered_spec(),
            config.pair.ratios(),
            provider,
            solver,
        )
        .with_arb(config.arb)
        .with_engine(config.pricing.engine())
    }

    #[must_use]
    pub fn with_arb(mut self, arb: ArbConfig) -> Self {
        self.arb = arb;
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: GreekEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Scan every expiry and keep the best leg selection.
    pub async fn scan(&self, expiries: &[String]) -> Result<EtfPairResult> {
        let provider = self.provider.as_ref();
        let (unlevered, levered) = try_join(
            provider.qualify(&self.unlevered),
            provider.qualify(&self.levered),
        )
        .await?;
        let (u_quote, l_quote) =
            try_join(provider.request_spot(&unlevered), provider.request_spot(&levered)).await?;
        let unlevered_spot = spot_price(&unlevered, &u_quote)?;
        let levered_spot = spot_price(&levered, &l_quote)?;

        info!(
            provider = provider.provider_name(),
            unlevered = %unlevered.symbol,
            levered = %levered.symbol,
            unlevered_spot,
            levered_spot,
            expiries = expiries.len(),
            "Scanning pair"
        );

        let units = expiries
            .iter()
            .map(|expiry| self.scan_expiry(&unlevered, &levered, unlevered_spot, levered_spot, expiry));
        let results = join_all(units).await;

        let outcomes: Vec<ExpiryOutcome> = expiries
            .iter()
            .zip(results)
            .map(|(expiry, result)| match result {
                Ok((solution, degraded)) => ExpiryOutcome::Solved {
                    expiry: expiry.clone(),
                    solution,
                    degraded,
                },
                Err(e) => {
                    warn!(expiry = %expiry, error = %e, "Skipping expiry");
                    ExpiryOutcome::Skipped {
                        expiry: expiry.clone(),
                        reason: e.to_string(),
                    }
                }
            })
            .collect();

        let best = outcomes
            .iter()
            .filter_map(ExpiryOutcome::solution)
            .fold(None::<&ArbSolution>, |best, s| match best {
                Some(b) if b.spread >= s.spread => Some(b),
                _ => Some(s),
            })
            .cloned();

        if let Some(best) = &best {
            info!(
                unlevered = %best.unlevered.contract,
                levered = %best.levered.contract,
                spread = best.spread,
                "Best selection"
            );
        }

        Ok(EtfPairResult {
            unlevered: unlevered.symbol,
            levered: levered.symbol,
            unlevered_spot,
            levered_spot,
            outcomes,
            best,
        })
    }

    async fn scan_expiry(
        &self,
        unlevered: &Stock,
        levered: &Stock,
        unlevered_spot: f64,
        levered_spot: f64,
        expiry: &str,
    ) -> Result<(ArbSolution, usize)> {
        let (u_smile, l_smile) = try_join(
            self.smile(unlevered, unlevered_spot, expiry),
            self.smile(levered, levered_spot, expiry),
        )
        .await?;
        let degraded = u_smile.degraded_count() + l_smile.degraded_count();

        let arb = ArbSmile::new(self.arb, self.ratios, &u_smile, &l_smile)?;
        let solution = arb.solve(self.solver.as_ref())?;
        Ok((solution, degraded))
    }

    async fn smile(&self, stock: &Stock, spot: f64, expiry: &str) -> Result<Smile> {
        let chain = self.provider.request_chain(stock, expiry).await?;
        let quotes = self.provider.request_quotes(&chain).await?;
        debug!(symbol = %stock.symbol, expiry, contracts = chain.len(), "Building smile");
        Smile::build(&self.engine, &stock.symbol, expiry, spot, &chain, &quotes)
    }
}

fn spot_price(stock: &Stock, quote: &Quote) -> Result<f64> {
    quote
        .market_price()
        .ok_or_else(|| Error::data_fetch(format!("no usable spot quote for {}", stock.symbol)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::solver::HiGHSSolver;
    use crate::domain::Right;
    use crate::testkit::domain::contract;
    use crate::testkit::provider::MockProvider;
    use chrono::NaiveDate;

    fn engine() -> GreekEngine {
        let now = NaiveDate::from_ymd_opt(2019, 10, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        GreekEngine::default().at(now)
    }

    fn pair(provider: MockProvider) -> EtfPair {
        EtfPair::new(
            StockSpec::smart("GDX"),
            StockSpec::smart("NUGT"),
            PairRatios::new(1.0, 3.0),
            Arc::new(provider),
            Arc::new(HiGHSSolver::new()),
        )
        .with_engine(engine())
    }

    #[tokio::test]
    async fn unknown_underlying_aborts_scan() {
        let provider = MockProvider::new().with_underlying(1, "GDX", 100.0);
        let err = pair(provider).scan(&["20191025".into()]).await.unwrap_err();
        assert!(matches!(err, Error::DataFetch(_)));
    }

    #[tokio::test]
    async fn empty_candidates_are_skipped_not_fatal() {
        // Only ITM calls on the unlevered side.
        let provider = MockProvider::new()
            .with_underlying(1, "GDX", 100.0)
            .with_underlying(2, "NUGT", 100.0)
            .with_chain(
                "GDX",
                "20191025",
                vec![(contract(10, "GDX", "20191025", 90.0, Right::Call), Quote::new(10.0, 10.2, 10.1))],
            )
            .with_chain(
                "NUGT",
                "20191025",
                vec![(contract(20, "NUGT", "20191025", 120.0, Right::Call), Quote::new(1.0, 1.1, 1.05))],
            );

        let result = pair(provider).scan(&["20191025".into()]).await.unwrap();
        assert!(result.best.is_none());
        match &result.outcomes[0] {
            ExpiryOutcome::Skipped { reason, .. } => assert!(reason.contains("unlevered")),
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_expiries_yields_empty_result() {
        let provider = MockProvider::new()
            .with_underlying(1, "GDX", 100.0)
            .with_underlying(2, "NUGT", 100.0);
        let result = pair(provider).scan(&[]).await.unwrap();
        assert!(result.outcomes.is_empty());
        assert!(result.best.is_none());
        assert_eq!(result.unlevered_spot, 100.0);
    }
}
