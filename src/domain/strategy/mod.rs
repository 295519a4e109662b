//! Arbitrage strategies over option smiles.
//!
//! - [`ArbSmile`] - one-leg-per-side selection between an unlevered and a
//!   levered smile, solved as a binary program.

pub mod arb_smile;

pub use arb_smile::{ArbConfig, ArbModel, ArbSmile, ArbSolution, ObjectiveMode, PairRatios};
