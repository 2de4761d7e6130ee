//!
//! `MilpSolver` backed by [good_lp](https://docs.rs/good_lp) with the pure-Rust `microlp` engine.
//!
//! Piecewise-linear constraints are lowered with the incremental (delta) formulation.
//! For the table `(x_0, y_0), ..., (x_{n-1}, y_{n-1})` it adds
//! * `d_s` in `[0, 1]` for each segment `s = 0..n-1`
//! * binary `z_s` for `s = 0..n-2` with `d_{s+1} <= z_s <= d_s`
//!
//! and sets `x = x_0 + sum_s d_s (x_{s+1} - x_s)`, `y = y_0 + sum_s d_s (y_{s+1} - y_s)`.
//! A segment can be entered only after all previous segments are filled.
//!
use super::milp::{
    Direction, LinExpr, MilpProblem, MilpSolver, PiecewiseConstraint, Sense, SolveOutcome,
    SolveStatus, VarKind,
};
use good_lp::{
    constraint, microlp, variable, Constraint, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use itertools::Itertools;
use log::{debug, info, warn};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SolverOptions {
    /// Log the size of each problem at info level instead of debug.
    /// microlp has no output of its own, so nothing else changes.
    #[serde(default)]
    pub verbose: bool,
}

/// Solver session. It keeps no state between `solve` calls.
#[derive(Debug, Clone, Default)]
pub struct MicroLpSolver {
    options: SolverOptions,
}

impl MicroLpSolver {
    pub fn new(options: SolverOptions) -> MicroLpSolver {
        MicroLpSolver { options }
    }
    pub fn options(&self) -> SolverOptions {
        self.options
    }
}

impl MilpSolver for MicroLpSolver {
    fn solve(&self, problem: &MilpProblem) -> SolveOutcome {
        if let Err(message) = problem.validate() {
            warn!("problem {} is malformed: {}", problem.name(), message);
            return SolveOutcome::failed(SolveStatus::Error, message);
        }

        let mut lowered = Lowered::new(problem);
        for pwl in problem.piecewise() {
            lowered.add_piecewise(pwl);
        }
        let Lowered {
            vars,
            columns,
            constraints,
            n_aux_binaries,
        } = lowered;

        if self.options.verbose {
            info!(
                "solving {}: {} variables ({} binaries, {} auxiliary binaries), {} constraints",
                problem.name(),
                problem.vars().len(),
                problem.n_binaries(),
                n_aux_binaries,
                constraints.len(),
            );
        } else {
            debug!(
                "solving {}: {} variables, {} constraints",
                problem.name(),
                problem.vars().len() + n_aux_binaries,
                constraints.len(),
            );
        }

        let objective = to_expression(problem.objective(), &columns);
        let unsolved = match problem.direction() {
            Direction::Minimize => vars.minimise(objective),
            Direction::Maximize => vars.maximise(objective),
        };
        let mut model = unsolved.using(microlp);
        for c in constraints {
            model.add_constraint(c);
        }

        match model.solve() {
            Ok(solution) => {
                SolveOutcome::optimal(columns.iter().map(|&v| solution.value(v)).collect())
            }
            Err(ResolutionError::Infeasible) => {
                SolveOutcome::failed(SolveStatus::Infeasible, "problem is infeasible")
            }
            Err(ResolutionError::Unbounded) => {
                SolveOutcome::failed(SolveStatus::Unbounded, "objective is unbounded")
            }
            Err(e) => SolveOutcome::failed(SolveStatus::Error, e.to_string()),
        }
    }
}

/// `MilpProblem` translated into good_lp objects
struct Lowered {
    vars: ProblemVariables,
    /// good_lp variable of each `Var`, by index
    columns: Vec<Variable>,
    constraints: Vec<Constraint>,
    n_aux_binaries: usize,
}

impl Lowered {
    fn new(problem: &MilpProblem) -> Lowered {
        let mut vars = ProblemVariables::new();
        let columns = problem
            .vars()
            .iter()
            .map(|def| {
                let mut v = variable().name(def.name.clone());
                if def.kind == VarKind::Binary {
                    v = v.integer();
                }
                if def.lower.is_finite() {
                    v = v.min(def.lower);
                }
                if def.upper.is_finite() {
                    v = v.max(def.upper);
                }
                vars.add(v)
            })
            .collect_vec();
        let constraints = problem
            .constraints()
            .iter()
            .map(|c| {
                let lhs = to_expression(&c.expr, &columns);
                match c.sense {
                    Sense::LessEq => constraint::leq(lhs, c.rhs),
                    Sense::GreaterEq => constraint::geq(lhs, c.rhs),
                    Sense::Equal => constraint::eq(lhs, c.rhs),
                }
            })
            .collect_vec();
        Lowered {
            vars,
            columns,
            constraints,
            n_aux_binaries: 0,
        }
    }

    fn add_piecewise(&mut self, pwl: &PiecewiseConstraint) {
        let (x0, y0) = pwl.points[0];
        let deltas = (0..pwl.points.len() - 1)
            .map(|s| {
                self.vars.add(
                    variable()
                        .name(format!("{}_d{}", pwl.name, s))
                        .min(0.0)
                        .max(1.0),
                )
            })
            .collect_vec();

        let mut x = Expression::from_other_affine(x0);
        let mut y = Expression::from_other_affine(y0);
        for (&d, (&(xa, ya), &(xb, yb))) in deltas.iter().zip(pwl.points.iter().tuple_windows()) {
            x += (xb - xa) * d;
            y += (yb - ya) * d;
        }
        self.constraints
            .push(constraint::eq(self.columns[pwl.x.index()], x));
        self.constraints
            .push(constraint::eq(self.columns[pwl.y.index()], y));

        for (s, (&d, &d_next)) in deltas.iter().tuple_windows().enumerate() {
            let z = self.vars.add(
                variable()
                    .name(format!("{}_z{}", pwl.name, s))
                    .integer()
                    .min(0.0)
                    .max(1.0),
            );
            self.constraints.push(constraint::leq(d_next, z));
            self.constraints.push(constraint::leq(z, d));
            self.n_aux_binaries += 1;
        }
    }
}

fn to_expression(expr: &LinExpr, columns: &[Variable]) -> Expression {
    let mut e = Expression::from_other_affine(expr.constant);
    for &(v, coef) in expr.terms.iter() {
        e += coef * columns[v.index()];
    }
    e
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(p: &MilpProblem) -> SolveOutcome {
        let solver = MicroLpSolver::new(SolverOptions { verbose: true });
        assert!(solver.options().verbose);
        solver.solve(p)
    }

    #[test]
    fn small_mixed_integer_problem() {
        // maximize 2a + 3b subject to 3a + 4b <= 5, a, b binary
        let mut p = MilpProblem::new("knapsack");
        let a = p.add_binary("a".to_string());
        let b = p.add_binary("b".to_string());
        p.add_constraint(
            "cap".to_string(),
            LinExpr::new().term(a, 3.0).term(b, 4.0),
            Sense::LessEq,
            5.0,
        );
        p.set_objective(LinExpr::new().term(a, 2.0).term(b, 3.0), Direction::Maximize);
        let o = solve(&p);
        assert_eq!(o.status, SolveStatus::Optimal);
        assert!((o.value(a).unwrap() - 0.0).abs() < 1e-6);
        assert!((o.value(b).unwrap() - 1.0).abs() < 1e-6);
        assert!(p.is_feasible(o.values.as_ref().unwrap(), 1e-6));
    }

    #[test]
    fn piecewise_nonconvex_minimum() {
        // y = pwl(x) has two local minima, at x=1 (y=2) and x=3 (y=1)
        let mut p = MilpProblem::new("pwl");
        let x = p.add_continuous("x".to_string(), 0.0, 4.0);
        let y = p.add_continuous("y".to_string(), -100.0, 100.0);
        p.add_piecewise(
            "f".to_string(),
            x,
            y,
            vec![(0.0, 5.0), (1.0, 2.0), (2.0, 6.0), (3.0, 1.0), (4.0, 4.0)],
        );
        p.set_objective(LinExpr::sum(vec![y]), Direction::Minimize);
        let o = solve(&p);
        assert_eq!(o.status, SolveStatus::Optimal);
        assert!((o.value(x).unwrap() - 3.0).abs() < 1e-6);
        assert!((o.value(y).unwrap() - 1.0).abs() < 1e-6);

        // forbid the global minimum
        p.add_constraint("x_max".to_string(), LinExpr::sum(vec![x]), Sense::LessEq, 2.0);
        let o = solve(&p);
        assert_eq!(o.status, SolveStatus::Optimal);
        assert!((o.value(x).unwrap() - 1.0).abs() < 1e-6);
        assert!((o.value(y).unwrap() - 2.0).abs() < 1e-6);
        assert!(p.is_feasible(o.values.as_ref().unwrap(), 1e-6));
    }

    #[test]
    fn infeasible_problem() {
        let mut p = MilpProblem::new("infeasible");
        let a = p.add_binary("a".to_string());
        p.add_constraint("ge".to_string(), LinExpr::sum(vec![a]), Sense::GreaterEq, 2.0);
        p.set_objective(LinExpr::sum(vec![a]), Direction::Minimize);
        let o = solve(&p);
        assert_eq!(o.status, SolveStatus::Infeasible);
        assert_eq!(o.values, None);
    }

    #[test]
    fn unbounded_problem() {
        let mut p = MilpProblem::new("unbounded");
        let x = p.add_continuous("x".to_string(), 0.0, f64::INFINITY);
        p.set_objective(LinExpr::sum(vec![x]), Direction::Maximize);
        let o = solve(&p);
        assert_eq!(o.status, SolveStatus::Unbounded);
    }

    #[test]
    fn malformed_problem_is_error() {
        let mut p = MilpProblem::new("malformed");
        let x = p.add_continuous("x".to_string(), 1.0, 0.0);
        p.set_objective(LinExpr::sum(vec![x]), Direction::Minimize);
        let o = solve(&p);
        assert_eq!(o.status, SolveStatus::Error);
        assert!(o.message.contains("invalid bounds"));
        assert_eq!(o.value(x), None);
    }
}
