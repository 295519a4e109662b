//! smilearb - Option smile arbitrage between leveraged and unlevered ETFs.
//!
//! For an ETF pair such as GDX/NUGT, the crate builds an implied-volatility
//! smile per underlying and expiry, then selects one option per side that
//! maximizes a ratio-weighted premium spread while the levered strike stays
//! relatively further away than the unlevered one.
//!
//! # Architecture
//!
//! - **`domain::expiry`** - Forward expiry generation (Fridays, CBOE Thursdays)
//! - **`domain::pricing`** - Black-Scholes implied vol, Greeks and margin stress
//! - **`domain::smile`** - Priced chain for one underlying and expiry
//! - **`domain::strategy`** - Leg selection as a binary program (`ArbSmile`)
//! - **`domain::solver`** - LP/ILP solver abstraction
//!   - `HiGHSSolver` - Open-source HiGHS via good_lp
//! - **`exchange`** - Market-data provider trait
//! - **`adapter`** - Snapshot replay and caching providers
//! - **`cache`** - Time-to-live cache with optional JSON persistence
//! - **`app`** - Configuration, pair orchestration and reporting
//! - **`cli`** - The `smilearb` command line
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use smilearb::adapter::SnapshotProvider;
//! use smilearb::app::{Config, EtfPair};
//! use smilearb::domain::solver::HiGHSSolver;
//!
//! # async fn run() -> smilearb::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let provider = Arc::new(SnapshotProvider::load("snapshot.json")?);
//! let pair = EtfPair::from_config(&config, provider, Arc::new(HiGHSSolver::new()));
//! let result = pair.scan(&["20191025".to_string()]).await?;
//! println!("{:?}", result.best);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod cache;
pub mod cli;
pub mod domain;
pub mod error;
pub mod exchange;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
