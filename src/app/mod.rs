//! Application layer: configuration, pair orchestration and reporting.

pub mod config;
mod orchestrator;
pub mod report;

pub use config::{
    CacheConfig, Config, DataConfig, ExpiryConfig, LoggingConfig, PairConfig, PricingConfig,
};
pub use orchestrator::{EtfPair, EtfPairResult, ExpiryOutcome};
