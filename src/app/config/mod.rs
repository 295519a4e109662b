//! Configuration loading from TOML.
//!
//! Every section except `[pair]` has defaults, so the smallest valid file is:
//!
//! ```toml
//! [pair]
//! unlevered = "GDX"
//! levered = "NUGT"
//! levered_ratio = 3.0
//! ```

mod logging;

pub use logging::LoggingConfig;

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use crate::domain::expiry::{expiries_from, parse_expiry};
use crate::domain::pricing::{DEFAULT_RISK_FREE_RATE, DEFAULT_STRESS_VOL};
use crate::domain::strategy::{ArbConfig, PairRatios};
use crate::domain::{GreekEngine, StockSpec};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pair: PairConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub arb: ArbConfig,
    #[serde(default)]
    pub expiry: ExpiryConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The ETF pair to scan.
#[derive(Debug, Clone, Deserialize)]
pub struct PairConfig {
    pub unlevered: String,
    pub levered: String,
    /// Notional units of the unlevered leg.
    #[serde(default = "default_unlevered_ratio")]
    pub unlevered_ratio: f64,
    /// Notional units of the levered leg, usually its leverage factor.
    pub levered_ratio: f64,
}

fn default_unlevered_ratio() -> f64 {
    1.0
}

impl PairConfig {
    #[must_use]
    pub fn ratios(&self) -> PairRatios {
        PairRatios::new(self.unlevered_ratio, self.levered_ratio)
    }

    #[must_use]
    pub fn unlevered_spec(&self) -> StockSpec {
        StockSpec::smart(&self.unlevered)
    }

    #[must_use]
    pub fn levered_spec(&self) -> StockSpec {
        StockSpec::smart(&self.levered)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_rate")]
    pub risk_free_rate: f64,
    /// Volatility used for the margin stress grid.
    #[serde(default = "default_stress_vol")]
    pub stress_vol: f64,
}

fn default_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

fn default_stress_vol() -> f64 {
    DEFAULT_STRESS_VOL
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_rate(),
            stress_vol: default_stress_vol(),
        }
    }
}

impl PricingConfig {
    /// Engine reading the local clock.
    #[must_use]
    pub fn engine(&self) -> GreekEngine {
        GreekEngine::new(self.risk_free_rate).with_stress_vol(self.stress_vol)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpiryConfig {
    /// How many forward expiries to generate.
    #[serde(default = "default_expiry_count")]
    pub count: usize,
    /// Prefer the Thursday before a third-week Friday.
    #[serde(default)]
    pub cboe: bool,
    /// Explicit `YYYYMMDD` expiries. Overrides generation when non-empty.
    #[serde(default)]
    pub dates: Vec<String>,
}

fn default_expiry_count() -> usize {
    3
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            count: default_expiry_count(),
            cboe: false,
            dates: Vec::new(),
        }
    }
}

impl ExpiryConfig {
    /// Expiries to scan, generated relative to `today` unless listed.
    #[must_use]
    pub fn resolve(&self, today: NaiveDate) -> Vec<String> {
        if self.dates.is_empty() {
            expiries_from(today, self.count, self.cboe)
        } else {
            self.dates.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    /// Recorded market snapshot to replay.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory for persisted chain and quote caches. Caching is off when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    900
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pair.unlevered.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "pair.unlevered",
            }
            .into());
        }
        if self.pair.levered.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "pair.levered",
            }
            .into());
        }
        if self.pair.unlevered == self.pair.levered {
            return Err(invalid("pair.levered", "must differ from pair.unlevered"));
        }
        positive("pair.unlevered_ratio", self.pair.unlevered_ratio)?;
        positive("pair.levered_ratio", self.pair.levered_ratio)?;

        if !self.pricing.risk_free_rate.is_finite() {
            return Err(invalid("pricing.risk_free_rate", "must be finite"));
        }
        positive("pricing.stress_vol", self.pricing.stress_vol)?;
        positive("arb.safety_margin", self.arb.safety_margin)?;

        if self.expiry.dates.is_empty() && self.expiry.count == 0 {
            return Err(invalid("expiry.count", "must be at least 1"));
        }
        for date in &self.expiry.dates {
            parse_expiry(date)
                .map_err(|e| invalid("expiry.dates", format!("'{date}' is not YYYYMMDD: {e}")))?;
        }

        if self.cache.ttl_secs == 0 {
            return Err(invalid("cache.ttl_secs", "must be at least 1"));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("logging.format", "expected 'pretty' or 'json'"));
        }
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a positive number, got {value}")))
    }
}
