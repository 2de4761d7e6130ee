//!
//! Mixed-integer linear program description, independent of the solver engine.
//!
//! - `MilpProblem`: variables, linear constraints, piecewise-linear constraints and an objective
//! - `MilpSolver`: anything that can solve a `MilpProblem`
//! - `SolveOutcome`: status and variable values reported by a solver
//!
//! Variables are addressed by their index `Var` in the owning problem,
//! so two problems never share identifiers.
//!
use itertools::Itertools;

/// Index of a variable in its `MilpProblem`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(usize);

impl Var {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VarKind {
    /// integer in {0, 1}
    Binary,
    Continuous,
}

/// Declaration of a variable: `lower <= x <= upper`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    /// `f64::INFINITY` if unbounded
    pub upper: f64,
}

/// `sum(coef * var) + constant`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    pub terms: Vec<(Var, f64)>,
    pub constant: f64,
}

impl LinExpr {
    pub fn new() -> LinExpr {
        LinExpr::default()
    }
    /// `1 * v` for each v in `vars`
    pub fn sum<I: IntoIterator<Item = Var>>(vars: I) -> LinExpr {
        LinExpr {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }
    pub fn term(mut self, var: Var, coef: f64) -> LinExpr {
        self.terms.push((var, coef));
        self
    }
    pub fn plus(mut self, constant: f64) -> LinExpr {
        self.constant += constant;
        self
    }
    /// `self - other`
    pub fn minus(mut self, other: LinExpr) -> LinExpr {
        self.terms
            .extend(other.terms.into_iter().map(|(v, c)| (v, -c)));
        self.constant -= other.constant;
        self
    }
    /// Value of the expression under the assignment `values[var.index()]`
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values[v.index()])
            .sum::<f64>()
            + self.constant
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sense {
    LessEq,
    GreaterEq,
    Equal,
}

impl std::fmt::Display for Sense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sense::LessEq => write!(f, "<="),
            Sense::GreaterEq => write!(f, ">="),
            Sense::Equal => write!(f, "=="),
        }
    }
}

/// `expr {<=, >=, ==} rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub expr: LinExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.eval(values);
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + tol,
            Sense::GreaterEq => lhs >= self.rhs - tol,
            Sense::Equal => (lhs - self.rhs).abs() <= tol,
        }
    }
}

///
/// `y = pwl(x)` where pwl linearly interpolates `points`.
/// `x` is confined to `[points[0].0, points[last].0]`.
///
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseConstraint {
    pub name: String,
    pub x: Var,
    pub y: Var,
    pub points: Vec<(f64, f64)>,
}

impl PiecewiseConstraint {
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(&(first, _)), Some(&(last, _))) if self.points.len() >= 2 => (first, last),
            _ => return false,
        };
        let x = values[self.x.index()];
        let y = values[self.y.index()];
        if x < first - tol || x > last + tol {
            return false;
        }
        let x = x.max(first).min(last);
        self.points
            .iter()
            .tuple_windows()
            .find(|&(_, &(x1, _))| x <= x1)
            .map_or(false, |(&(x0, y0), &(x1, y1))| {
                let y_pwl = y0 + (y1 - y0) * (x - x0) / (x1 - x0);
                (y - y_pwl).abs() <= tol
            })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone)]
pub struct MilpProblem {
    name: String,
    vars: Vec<VarDef>,
    constraints: Vec<LinearConstraint>,
    piecewise: Vec<PiecewiseConstraint>,
    objective: LinExpr,
    direction: Direction,
}

impl MilpProblem {
    pub fn new(name: &str) -> MilpProblem {
        MilpProblem {
            name: name.to_string(),
            vars: Vec::new(),
            constraints: Vec::new(),
            piecewise: Vec::new(),
            objective: LinExpr::new(),
            direction: Direction::Minimize,
        }
    }

    //
    // building
    //

    pub fn add_binary(&mut self, name: String) -> Var {
        self.add_var(VarDef {
            name,
            kind: VarKind::Binary,
            lower: 0.0,
            upper: 1.0,
        })
    }
    pub fn add_continuous(&mut self, name: String, lower: f64, upper: f64) -> Var {
        self.add_var(VarDef {
            name,
            kind: VarKind::Continuous,
            lower,
            upper,
        })
    }
    fn add_var(&mut self, def: VarDef) -> Var {
        self.vars.push(def);
        Var(self.vars.len() - 1)
    }
    pub fn add_constraint(&mut self, name: String, expr: LinExpr, sense: Sense, rhs: f64) {
        self.constraints.push(LinearConstraint {
            name,
            expr,
            sense,
            rhs,
        });
    }
    pub fn add_piecewise(&mut self, name: String, x: Var, y: Var, points: Vec<(f64, f64)>) {
        self.piecewise.push(PiecewiseConstraint { name, x, y, points });
    }
    pub fn set_objective(&mut self, objective: LinExpr, direction: Direction) {
        self.objective = objective;
        self.direction = direction;
    }

    //
    // accessors
    //

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }
    pub fn var(&self, var: Var) -> &VarDef {
        &self.vars[var.index()]
    }
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }
    pub fn piecewise(&self) -> &[PiecewiseConstraint] {
        &self.piecewise
    }
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }
    pub fn direction(&self) -> Direction {
        self.direction
    }
    pub fn n_binaries(&self) -> usize {
        self.vars
            .iter()
            .filter(|v| v.kind == VarKind::Binary)
            .count()
    }

    ///
    /// Check that the problem is well-formed:
    /// * bounds are ordered and not NaN
    /// * every referenced variable exists
    /// * piecewise tables have at least two points with strictly increasing x
    ///
    pub fn validate(&self) -> Result<(), String> {
        let n = self.vars.len();
        for def in self.vars.iter() {
            if def.lower.is_nan() || def.upper.is_nan() || def.lower > def.upper {
                return Err(format!(
                    "variable {} has invalid bounds [{}, {}]",
                    def.name, def.lower, def.upper
                ));
            }
        }
        let all_exprs = self
            .constraints
            .iter()
            .map(|c| (&c.name, &c.expr))
            .chain(std::iter::once((&self.name, &self.objective)));
        for (name, expr) in all_exprs {
            if expr.terms.iter().any(|(v, _)| v.index() >= n) {
                return Err(format!("{} refers to an unknown variable", name));
            }
        }
        for pwl in self.piecewise.iter() {
            if pwl.x.index() >= n || pwl.y.index() >= n {
                return Err(format!("{} refers to an unknown variable", pwl.name));
            }
            if pwl.points.len() < 2 {
                return Err(format!("{} has less than two points", pwl.name));
            }
            if !pwl.points.iter().tuple_windows().all(|(a, b)| a.0 < b.0) {
                return Err(format!("{} is not strictly increasing in x", pwl.name));
            }
        }
        Ok(())
    }

    ///
    /// Check if `values` is a feasible assignment within tolerance `tol`
    ///
    pub fn is_feasible(&self, values: &[f64], tol: f64) -> bool {
        values.len() == self.vars.len()
            && self.vars.iter().zip(values.iter()).all(|(def, &x)| {
                let in_bounds = def.lower - tol <= x && x <= def.upper + tol;
                let integral = match def.kind {
                    VarKind::Binary => (x - x.round()).abs() <= tol,
                    VarKind::Continuous => true,
                };
                in_bounds && integral
            })
            && self.constraints.iter().all(|c| c.is_satisfied(values, tol))
            && self.piecewise.iter().all(|p| p.is_satisfied(values, tol))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Error => write!(f, "error"),
        }
    }
}

/// Result of `MilpSolver::solve`
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// value of every variable, indexed by `Var::index`. Only for `Optimal`.
    pub values: Option<Vec<f64>>,
    pub message: String,
}

impl SolveOutcome {
    pub fn optimal(values: Vec<f64>) -> SolveOutcome {
        SolveOutcome {
            status: SolveStatus::Optimal,
            values: Some(values),
            message: String::from("optimal solution found"),
        }
    }
    pub fn failed(status: SolveStatus, message: impl Into<String>) -> SolveOutcome {
        SolveOutcome {
            status,
            values: None,
            message: message.into(),
        }
    }
    pub fn value(&self, var: Var) -> Option<f64> {
        self.values.as_ref().map(|vs| vs[var.index()])
    }
}

///
/// MILP engine
///
/// A solver never panics on a malformed or unsolvable problem; it reports
/// the failure through `SolveOutcome::status`.
///
pub trait MilpSolver {
    fn solve(&self, problem: &MilpProblem) -> SolveOutcome;
}

//
// tests
//
