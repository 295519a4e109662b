//! Failure modes of a single arbitrage solve.
//!
//! Each variant is scoped to one (pair, expiry) unit. The orchestrator skips
//! the unit and keeps going with its siblings; none of these is ever turned
//! into an empty result.
//!
//! # Examples
//!
//! ```
//! use smilearb::domain::error::ArbError;
//! use smilearb::domain::LegKind;
//!
//! let err = ArbError::EmptyCandidateSet { leg: LegKind::Levered };
//! assert_eq!(err.to_string(), "no levered candidates survived filtering");
//! ```

use thiserror::Error;

use super::LegKind;

/// Errors raised while formulating or solving the leg-selection program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbError {
    /// No contract survived the side/OTM/NaN filtering on one leg.
    ///
    /// Raised before the solver is invoked.
    #[error("no {leg} candidates survived filtering")]
    EmptyCandidateSet {
        /// The leg whose candidate set is empty (unlevered is checked first).
        leg: LegKind,
    },

    /// The program has no assignment satisfying the ordering constraints.
    #[error("no leg pair satisfies the ordering constraints")]
    Infeasible,

    /// The solver backend failed, reported an unusable status, or returned an
    /// assignment that does not select exactly one leg per side.
    #[error("solver error: {0}")]
    Solver(String),
}

impl ArbError {
    /// Shorthand for a [`ArbError::Solver`] with a formatted reason.
    pub fn solver(reason: impl Into<String>) -> Self {
        Self::Solver(reason.into())
    }
}
