//! Contract identity types.
//!
//! Contracts are produced by the market-data provider's qualification step
//! and never mutated afterwards.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broker-assigned contract identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub i64);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Right {
    #[serde(alias = "c", alias = "C")]
    Call,
    #[serde(alias = "p", alias = "P")]
    Put,
}

impl Right {
    /// Single-letter code used by brokers ("c" / "p").
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Call => 'c',
            Self::Put => 'p',
        }
    }

    /// Whether a strike is out of the money for this right at the given spot.
    ///
    /// Calls are OTM above spot, puts below. At-the-money is never OTM.
    #[must_use]
    pub fn is_otm(self, strike: f64, spot: f64) -> bool {
        match self {
            Self::Call => strike > spot,
            Self::Put => strike < spot,
        }
    }

    /// Intrinsic value at the given spot.
    #[must_use]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for Right {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "call" => Ok(Self::Call),
            "p" | "put" => Ok(Self::Put),
            other => Err(format!("unknown option right '{other}'")),
        }
    }
}

/// Request to qualify an underlying stock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockSpec {
    pub symbol: String,
    pub exchange: String,
    pub currency: String,
}

impl StockSpec {
    /// Smart-routed USD stock, the only kind the scanner trades.
    pub fn smart(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: "SMART".into(),
            currency: "USD".into(),
        }
    }
}

/// A qualified underlying.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stock {
    pub id: ContractId,
    pub symbol: String,
    pub exchange: String,
    pub currency: String,
}

/// A qualified option contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub symbol: String,
    pub expiry: NaiveDate,
    pub strike: Decimal,
    pub right: Right,
    pub multiplier: u32,
}

impl Contract {
    /// Strike as a float for pricing.
    #[must_use]
    pub fn strike_f64(&self) -> f64 {
        self.strike.to_f64().unwrap_or(f64::NAN)
    }

    /// Expiry in broker `YYYYMMDD` form.
    #[must_use]
    pub fn expiry_code(&self) -> String {
        self.expiry.format(super::expiry::EXPIRY_FORMAT).to_string()
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}{}",
            self.symbol,
            self.expiry_code(),
            self.strike,
            self.right.code().to_ascii_uppercase()
        )
    }
}
