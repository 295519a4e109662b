//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is an open-source mixed-integer programming solver. good_lp wraps
//! it; this adapter translates the crate's declarative problem into a
//! good_lp model and back.

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, Expression, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::debug;

use super::{IlpProblem, LpProblem, LpSolution, SolutionStatus, Solver};
use crate::domain::constraint::ConstraintSense;
use crate::error::Result;

/// HiGHS-based ILP solver.
#[derive(Debug, Default, Clone)]
pub struct HiGHSSolver;

impl HiGHSSolver {
    /// Create a new HiGHS solver instance.
    pub fn new() -> Self {
        Self
    }
}

impl Solver for HiGHSSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve_ilp(&self, problem: &IlpProblem) -> Result<LpSolution> {
        Ok(solve_with_good_lp(&problem.lp, &problem.integer_vars))
    }
}

fn linear(vars: &[Variable], coefficients: &[f64]) -> Expression {
    vars.iter()
        .zip(coefficients)
        .map(|(v, c)| *c * *v)
        .sum()
}

fn solve_with_good_lp(problem: &LpProblem, integer_vars: &[usize]) -> LpSolution {
    let n = problem.num_vars();

    if n == 0 {
        return LpSolution {
            values: vec![],
            objective: 0.0,
            status: SolutionStatus::Optimal,
        };
    }

    let mut vars = variables!();
    let mut var_list = Vec::with_capacity(n);

    for (i, bounds) in problem.bounds.iter().enumerate() {
        let mut v = variable();
        if let Some(lb) = bounds.lower {
            v = v.min(lb);
        }
        if let Some(ub) = bounds.upper {
            v = v.max(ub);
        }
        if integer_vars.contains(&i) {
            v = v.integer();
        }
        var_list.push(vars.add(v));
    }

    let objective = linear(&var_list, &problem.objective);
    let mut model = vars.minimise(objective).using(highs);

    for constr in &problem.constraints {
        let lhs = linear(&var_list, &constr.coefficients);
        let rhs = constr.rhs;
        model = match constr.sense {
            ConstraintSense::GreaterEqual => model.with(constraint!(lhs >= rhs)),
            ConstraintSense::LessEqual => model.with(constraint!(lhs <= rhs)),
            ConstraintSense::Equal => model.with(constraint!(lhs == rhs)),
        };
    }

    match model.solve() {
        Ok(solution) => {
            let values: Vec<f64> = var_list.iter().map(|v| solution.value(*v)).collect();
            // Re-evaluate rather than trust the backend's offset handling.
            let objective = problem.objective_at(&values);
            LpSolution {
                values,
                objective,
                status: SolutionStatus::Optimal,
            }
        }
        Err(err) => {
            debug!(error = %err, "HiGHS returned no solution");
            let status = match err {
                ResolutionError::Infeasible => SolutionStatus::Infeasible,
                ResolutionError::Unbounded => SolutionStatus::Unbounded,
                other => SolutionStatus::Error(other.to_string()),
            };
            LpSolution::with_status(n, status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::constraint::{Constraint, VariableBounds};

    #[test]
    fn test_solver_name() {
        let solver = HiGHSSolver::new();
        assert_eq!(solver.name(), "highs");
    }

    #[test]
    fn test_cover_constraint() {
        // Minimize: x + y
        // Subject to: x + y >= 1
        let solver = HiGHSSolver::new();

        let mut lp = LpProblem::new(2);
        lp.objective = vec![1.0, 1.0];
        lp.constraints = vec![Constraint::geq(vec![1.0, 1.0], 1.0)];

        let solution = solver.solve_ilp(&IlpProblem::all_binary(lp)).unwrap();

        assert!(solution.is_optimal());
        let sum: f64 = solution.values.iter().sum();
        assert!((sum - 1.0).abs() < 0.01, "Sum should be 1, got {sum}");
    }

    #[test]
    fn test_binary_ilp() {
        // Maximize x + y with x + y <= 1, binary.
        let solver = HiGHSSolver::new();

        let lp = LpProblem {
            objective: vec![-1.0, -1.0],
            constraints: vec![Constraint::leq(vec![1.0, 1.0], 1.0)],
            bounds: vec![VariableBounds::binary(); 2],
        };

        let ilp = IlpProblem::all_binary(lp);
        let solution = solver.solve_ilp(&ilp).unwrap();

        assert!(solution.is_optimal());
        let sum: f64 = solution.values.iter().sum();
        assert!((sum - 1.0).abs() < 0.01, "Sum should be 1, got {sum}");
        assert!((solution.objective + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_hot_picks_cheapest() {
        let solver = HiGHSSolver::new();

        let lp = LpProblem {
            objective: vec![3.0, 1.0, 2.0],
            constraints: vec![Constraint::eq(vec![1.0, 1.0, 1.0], 1.0)],
            bounds: vec![VariableBounds::binary(); 3],
        };

        let solution = solver.solve_ilp(&IlpProblem::all_binary(lp)).unwrap();

        assert!(solution.is_optimal());
        assert!(solution.values[1] > 0.5);
        assert!(solution.values[0] < 0.5 && solution.values[2] < 0.5);
    }

    #[test]
    fn test_infeasible_ilp() {
        // x = 1 and x <= 0 cannot both hold.
        let solver = HiGHSSolver::new();

        let lp = LpProblem {
            objective: vec![1.0],
            constraints: vec![Constraint::eq(vec![1.0], 1.0), Constraint::leq(vec![1.0], 0.0)],
            bounds: vec![VariableBounds::binary()],
        };

        let solution = solver.solve_ilp(&IlpProblem::all_binary(lp)).unwrap();
        // HiGHS may only prove "unbounded or infeasible", which good_lp reports as unbounded.
        assert!(
            matches!(
                solution.status,
                SolutionStatus::Infeasible | SolutionStatus::Unbounded
            ),
            "got {:?}",
            solution.status
        );
        assert!(!solution.is_optimal());
    }

    #[test]
    fn test_empty_problem() {
        let solver = HiGHSSolver::new();
        let problem = IlpProblem::all_binary(LpProblem::new(0));
        let solution = solver.solve_ilp(&problem).unwrap();

        assert!(solution.is_optimal());
        assert!(solution.values.is_empty());
    }
}
