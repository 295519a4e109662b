//! Option pricing: Black-Scholes kernel and the per-contract Greek engine.

pub mod black_scholes;
mod engine;

pub use black_scholes::ImpliedVolFailure;
pub use engine::{
    GreekEngine, GreekResult, PriceInput, DEFAULT_RISK_FREE_RATE, DEFAULT_STRESS_VOL,
    YEAR_SECONDS,
};
