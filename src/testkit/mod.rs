//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`]: builders for contracts, stocks, greek results and smiles.
//! - [`provider`]: in-memory [`MarketDataProvider`](crate::exchange::MarketDataProvider)
//!   with call counting and per-expiry failure injection.

pub mod domain;
pub mod provider;
