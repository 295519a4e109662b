//! Market-agnostic domain logic: contracts, pricing, smiles and leg selection.

mod contract;
mod quote;

pub mod constraint;
pub mod error;
pub mod expiry;
pub mod pricing;
pub mod smile;
pub mod solver;
pub mod strategy;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use contract::{Contract, ContractId, Right, Stock, StockSpec};
pub use pricing::{GreekEngine, GreekResult, PriceInput};
pub use quote::Quote;
pub use smile::Smile;

/// Which side of the ETF pair a leg belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    Unlevered,
    Levered,
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlevered => write!(f, "unlevered"),
            Self::Levered => write!(f, "levered"),
        }
    }
}
