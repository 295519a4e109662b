//! Leg selection between an unlevered and a levered smile.
//!
//! # Model
//!
//! One binary variable per candidate, laid out `[unlevered..., levered...]`:
//!
//! ```text
//! maximize   100 * (ur * Σ L_j v_j  -  s * Σ U_i v_i)
//! subject to Σ U_i = 1
//!            Σ L_j = 1
//!            lr     * Σ U_i pct_i  <=  ur * Σ L_j pct_j
//!            m * s  * Σ U_i pct_i  <=  ur * Σ L_j pct_j
//! ```
//!
//! where `ur`/`lr` are the unlevered/levered notional ratios,
//! `s = round(lr * levered_spot / unlevered_spot)` is the standardized
//! levered ratio, `m` the safety margin, `pct = (strike - spot) / spot` and
//! `v` the leg's price (or theta in theta mode).
//!
//! The ordering constraints say the ratio-weighted move needed to touch the
//! unlevered strike must not exceed the move needed to touch the levered
//! strike. Both the base and the safety-margin form are enforced.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::constraint::Constraint;
use crate::domain::error::ArbError;
use crate::domain::pricing::GreekResult;
use crate::domain::smile::Smile;
use crate::domain::solver::{IlpProblem, LpProblem, SolutionStatus, Solver};
use crate::domain::{LegKind, Right};

/// Tolerance used when re-checking constraints on the selected legs.
const CONSTRAINT_TOLERANCE: f64 = 1e-9;

/// Scale applied to the objective (contract multiplier of 100 shares).
const OBJECTIVE_SCALE: f64 = 100.0;

/// Which per-leg value the objective spreads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveMode {
    /// Ratio-weighted premium spread.
    #[default]
    Premium,
    /// Ratio-weighted time-decay spread.
    Theta,
}

impl std::fmt::Display for ObjectiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Premium => write!(f, "premium"),
            Self::Theta => write!(f, "theta"),
        }
    }
}

impl ObjectiveMode {
    fn value(self, leg: &GreekResult) -> f64 {
        match self {
            Self::Premium => leg.price,
            Self::Theta => leg.theta,
        }
    }
}

/// Notional ratios of the two legs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairRatios {
    pub unlevered: f64,
    pub levered: f64,
}

impl PairRatios {
    #[must_use]
    pub const fn new(unlevered: f64, levered: f64) -> Self {
        Self { unlevered, levered }
    }

    /// Levered ratio expressed in unlevered percentage-move units.
    ///
    /// Rounded half to even.
    #[must_use]
    pub fn standardized_levered(&self, unlevered_spot: f64, levered_spot: f64) -> f64 {
        (self.levered * (levered_spot / unlevered_spot)).round_ties_even()
    }
}

/// Solve settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArbConfig {
    /// Option right both legs are drawn from.
    #[serde(default = "default_side")]
    pub side: Right,

    /// Multiplier on the standardized ratio in the safety-margin constraint.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,

    #[serde(default)]
    pub objective: ObjectiveMode,
}

const fn default_side() -> Right {
    Right::Call
}

const fn default_safety_margin() -> f64 {
    1.0
}

impl Default for ArbConfig {
    fn default() -> Self {
        Self {
            side: default_side(),
            safety_margin: default_safety_margin(),
            objective: ObjectiveMode::default(),
        }
    }
}

/// The selected leg pair for one expiry.
#[derive(Debug, Clone, Serialize)]
pub struct ArbSolution {
    pub side: Right,
    pub objective: ObjectiveMode,
    pub unlevered: GreekResult,
    pub levered: GreekResult,
    /// Maximized objective value.
    pub spread: f64,
    pub standardized_ratio: f64,
    pub ratios: PairRatios,
    pub unlevered_spot: f64,
    pub levered_spot: f64,
}

impl ArbSolution {
    /// Fractional move the unlevered underlying needs to touch its strike.
    #[must_use]
    pub fn unlevered_pct_to_touch(&self) -> f64 {
        self.unlevered.pct_to_strike(self.unlevered_spot)
    }

    /// Fractional move the levered underlying needs to touch its strike.
    #[must_use]
    pub fn levered_pct_to_touch(&self) -> f64 {
        self.levered.pct_to_strike(self.levered_spot)
    }
}

/// The declarative program built for one expiry, before solving.
#[derive(Debug, Clone)]
pub struct ArbModel {
    pub problem: IlpProblem,
    pub standardized_ratio: f64,
    pub unlevered_count: usize,
    pub levered_count: usize,
}

impl ArbModel {
    /// One-hot assignment selecting unlevered `u` and levered `l`.
    #[must_use]
    pub fn assignment(&self, u: usize, l: usize) -> Vec<f64> {
        let mut values = vec![0.0; self.unlevered_count + self.levered_count];
        values[u] = 1.0;
        values[self.unlevered_count + l] = 1.0;
        values
    }

    /// Maximization objective of an assignment.
    #[must_use]
    pub fn spread_at(&self, values: &[f64]) -> f64 {
        -self.problem.lp.objective_at(values)
    }

    /// Whether an assignment satisfies every constraint.
    #[must_use]
    pub fn is_feasible(&self, values: &[f64]) -> bool {
        self.problem
            .lp
            .constraints
            .iter()
            .all(|c| c.is_satisfied(values, CONSTRAINT_TOLERANCE))
    }
}

/// Filtered candidate sets ready to be formulated and solved.
#[derive(Debug, Clone)]
pub struct ArbSmile {
    config: ArbConfig,
    ratios: PairRatios,
    unlevered_spot: f64,
    levered_spot: f64,
    unlevered: Vec<GreekResult>,
    levered: Vec<GreekResult>,
}

impl ArbSmile {
    /// Filter both smiles down to OTM, priced candidates on the configured side.
    ///
    /// Fails with [`ArbError::EmptyCandidateSet`] when either side ends up
    /// empty, before any solver is involved.
    pub fn new(
        config: ArbConfig,
        ratios: PairRatios,
        unlevered: &Smile,
        levered: &Smile,
    ) -> Result<Self, ArbError> {
        let unlevered_candidates = candidates(unlevered, &config);
        let levered_candidates = candidates(levered, &config);

        debug!(
            unlevered = %unlevered.symbol,
            levered = %levered.symbol,
            expiry = %unlevered.expiry,
            side = %config.side,
            unlevered_candidates = unlevered_candidates.len(),
            levered_candidates = levered_candidates.len(),
            "Filtered candidates"
        );

        if unlevered_candidates.is_empty() {
            return Err(ArbError::EmptyCandidateSet {
                leg: LegKind::Unlevered,
            });
        }
        if levered_candidates.is_empty() {
            return Err(ArbError::EmptyCandidateSet {
                leg: LegKind::Levered,
            });
        }

        Ok(Self {
            config,
            ratios,
            unlevered_spot: unlevered.spot,
            levered_spot: levered.spot,
            unlevered: unlevered_candidates,
            levered: levered_candidates,
        })
    }

    #[must_use]
    pub fn unlevered_candidates(&self) -> &[GreekResult] {
        &self.unlevered
    }

    #[must_use]
    pub fn levered_candidates(&self) -> &[GreekResult] {
        &self.levered
    }

    /// Build the binary program.
    #[must_use]
    pub fn formulate(&self) -> ArbModel {
        let nu = self.unlevered.len();
        let nl = self.levered.len();
        let ratios = self.ratios;
        let standardized = ratios.standardized_levered(self.unlevered_spot, self.levered_spot);
        let mode = self.config.objective;

        let u_pct: Vec<f64> = self
            .unlevered
            .iter()
            .map(|g| g.pct_to_strike(self.unlevered_spot))
            .collect();
        let l_pct: Vec<f64> = self
            .levered
            .iter()
            .map(|g| g.pct_to_strike(self.levered_spot))
            .collect();

        let mut lp = LpProblem::new(nu + nl);

        // Minimize the negated spread.
        lp.objective = self
            .unlevered
            .iter()
            .map(|g| OBJECTIVE_SCALE * standardized * mode.value(g))
            .chain(
                self.levered
                    .iter()
                    .map(|g| -OBJECTIVE_SCALE * ratios.unlevered * mode.value(g)),
            )
            .collect();

        let one_hot = |first: bool| -> Vec<f64> {
            let (u, l) = if first { (1.0, 0.0) } else { (0.0, 1.0) };
            std::iter::repeat(u)
                .take(nu)
                .chain(std::iter::repeat(l).take(nl))
                .collect()
        };
        let ordering = |weight: f64| -> Vec<f64> {
            u_pct
                .iter()
                .map(|p| weight * p)
                .chain(l_pct.iter().map(|p| -ratios.unlevered * p))
                .collect()
        };

        lp.constraints = vec![
            Constraint::eq(one_hot(true), 1.0),
            Constraint::eq(one_hot(false), 1.0),
            Constraint::leq(ordering(ratios.levered), 0.0),
            Constraint::leq(ordering(self.config.safety_margin * standardized), 0.0),
        ];

        ArbModel {
            problem: IlpProblem::all_binary(lp),
            standardized_ratio: standardized,
            unlevered_count: nu,
            levered_count: nl,
        }
    }

    /// Formulate and solve, returning the selected legs.
    pub fn solve(&self, solver: &dyn Solver) -> Result<ArbSolution, ArbError> {
        let model = self.formulate();
        let solution = solver
            .solve_ilp(&model.problem)
            .map_err(|e| ArbError::solver(e.to_string()))?;

        match solution.status {
            SolutionStatus::Optimal => {}
            // Binary variables are bounded, so "unbounded" only ever means
            // the backend could not rule out infeasibility.
            SolutionStatus::Infeasible | SolutionStatus::Unbounded => {
                return Err(ArbError::Infeasible)
            }
            SolutionStatus::Error(reason) => return Err(ArbError::Solver(reason)),
        }

        if solution.values.len() != model.unlevered_count + model.levered_count {
            return Err(ArbError::solver(format!(
                "expected {} values, got {}",
                model.unlevered_count + model.levered_count,
                solution.values.len()
            )));
        }

        let (u_values, l_values) = solution.values.split_at(model.unlevered_count);
        let u = selected(u_values, LegKind::Unlevered)?;
        let l = selected(l_values, LegKind::Levered)?;

        let assignment = model.assignment(u, l);
        if !model.is_feasible(&assignment) {
            return Err(ArbError::solver(
                "selected legs violate the ordering constraints",
            ));
        }

        let spread = model.spread_at(&assignment);
        let unlevered = self.unlevered[u].clone();
        let levered = self.levered[l].clone();

        info!(
            solver = solver.name(),
            unlevered = %unlevered.contract,
            levered = %levered.contract,
            spread,
            standardized_ratio = model.standardized_ratio,
            "Selected leg pair"
        );

        Ok(ArbSolution {
            side: self.config.side,
            objective: self.config.objective,
            unlevered,
            levered,
            spread,
            standardized_ratio: model.standardized_ratio,
            ratios: self.ratios,
            unlevered_spot: self.unlevered_spot,
            levered_spot: self.levered_spot,
        })
    }
}

/// Side, moneyness and NaN filtering, sorted by strike.
fn candidates(smile: &Smile, config: &ArbConfig) -> Vec<GreekResult> {
    let mut kept: Vec<GreekResult> = smile
        .iter()
        .filter(|g| g.right == config.side && config.side.is_otm(g.strike, smile.spot))
        .filter(|g| !g.price.is_nan())
        .filter(|g| config.objective != ObjectiveMode::Theta || !g.theta.is_nan())
        .cloned()
        .collect();
    kept.sort_by(|a, b| a.strike.partial_cmp(&b.strike).unwrap_or(Ordering::Equal));
    kept
}

/// Index of the single selected variable on one side.
fn selected(values: &[f64], leg: LegKind) -> Result<usize, ArbError> {
    let chosen: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v > 0.5)
        .map(|(i, _)| i)
        .collect();
    match chosen.as_slice() {
        [index] => Ok(*index),
        other => Err(ArbError::solver(format!(
            "{} {leg} legs selected, expected exactly one",
            other.len()
        ))),
    }
}
