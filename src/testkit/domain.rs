//! Builders for domain primitives used across tests.
//!
//! Strikes are given as floats and expiries as `YYYYMMDD` so tests read like
//! the chains they describe.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::domain::expiry::parse_expiry;
use crate::domain::{Contract, ContractId, GreekResult, Right, Smile, Stock};

/// A qualified smart-routed USD stock.
pub fn stock(id: i64, symbol: &str) -> Stock {
    Stock {
        id: ContractId(id),
        symbol: symbol.to_string(),
        exchange: "SMART".to_string(),
        currency: "USD".to_string(),
    }
}

/// A 100-multiplier option contract.
///
/// # Panics
///
/// Panics on an unparseable expiry or a non-finite strike.
pub fn contract(id: i64, symbol: &str, expiry: &str, strike: f64, right: Right) -> Contract {
    Contract {
        id: ContractId(id),
        symbol: symbol.to_string(),
        expiry: parse_expiry(expiry).expect("valid YYYYMMDD expiry"),
        strike: Decimal::from_f64(strike).expect("finite strike"),
        right,
        multiplier: 100,
    }
}

/// A priced result with the given strike, price and theta, expiring 20191025.
///
/// Other Greeks are zero; only what leg selection reads is meaningful.
pub fn greek(symbol: &str, strike: f64, right: Right, price: f64, theta: f64) -> GreekResult {
    GreekResult {
        contract: contract(0, symbol, "20191025", strike, right),
        strike,
        right,
        iv: 0.3,
        price,
        delta: 0.0,
        theta,
        vega: 0.0,
        gamma: 0.0,
        margin_impacts: Vec::new(),
        bid: None,
        ask: None,
        dt: 0.05,
        rate: 0.025,
        iv_degraded: false,
    }
}

/// A smile at expiry 20191025 wrapping `results` as-is.
pub fn smile(symbol: &str, spot: f64, results: Vec<GreekResult>) -> Smile {
    Smile::from_results(symbol, "20191025", spot, results)
}
