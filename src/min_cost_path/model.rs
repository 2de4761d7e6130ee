//!
//! OptimizationModel: the budget-constrained minimum cost path as a MILP.
//!
//! For each edge `e` it has
//! * `x_e` binary: `e` is on the path
//! * `b_e` budget allocated to `e`, `0 <= b_e <= min(B, b_min + slack)`
//! * `c_e` approximated cost, `c_e = pwl_e(b_e)`
//! * `p_e = b_e * x_e` and `q_e = c_e * x_e`, linearized exactly with big-M bounds
//!
//! subject to
//! * flow conservation: `out(v) - in(v)` is `+1` on start, `-1` on target, `0` elsewhere
//! * budget: `sum p_e <= B`
//! * rank: `out(v) <= 1`
//!
//! and minimizes `sum q_e`.
//!
use super::approx::{PiecewiseLinear, DEFAULT_SLACK};
use super::cost_fn::EdgeCostFunction;
use super::error::{ConfigError, SolverFailure};
use super::graph::{CostGraph, GraphSnapshot};
use super::lp_backend::{MicroLpSolver, SolverOptions};
use super::milp::{Direction, LinExpr, MilpProblem, MilpSolver, Sense, SolveStatus, Var};
use super::path::{PathEdge, SolvedPath};
use super::{Budget, NodeId};
use log::{debug, info, warn};
use petgraph::graph::{EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef; // for EdgeReference.id()
use petgraph::Direction::{Incoming, Outgoing};
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_RESOLUTION: usize = 50;

/// `x_e` above this is regarded as selected
const ON_PATH_THRESHOLD: f64 = 0.5;

/// solver noise allowed on budget values
const BUDGET_EPS: Budget = 0.000001;

/// solver noise allowed on the cost of edges off the path
const COST_EPS: f64 = 0.000001;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ModelConfig {
    /// number of sample points per edge, at least 2
    #[serde(default = "default_resolution")]
    pub resolution: usize,
    /// sampling range of each edge is `[0, b_min + slack]`
    #[serde(default = "default_slack")]
    pub slack: Budget,
    /// forbid selecting an edge with a budget below its `b_init`.
    /// If false, `infeasible_cost` is paid instead.
    #[serde(default = "default_enforce_minimum_commitment")]
    pub enforce_minimum_commitment: bool,
    #[serde(default)]
    pub solver: SolverOptions,
}

fn default_resolution() -> usize {
    DEFAULT_RESOLUTION
}

fn default_slack() -> Budget {
    DEFAULT_SLACK
}

fn default_enforce_minimum_commitment() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            resolution: default_resolution(),
            slack: default_slack(),
            enforce_minimum_commitment: default_enforce_minimum_commitment(),
            solver: SolverOptions::default(),
        }
    }
}

impl ModelConfig {
    pub fn new(resolution: usize) -> ModelConfig {
        ModelConfig {
            resolution,
            ..ModelConfig::default()
        }
    }
    pub fn slack(self, slack: Budget) -> ModelConfig {
        ModelConfig { slack, ..self }
    }
    pub fn minimum_commitment(self, enforce: bool) -> ModelConfig {
        ModelConfig {
            enforce_minimum_commitment: enforce,
            ..self
        }
    }
    pub fn verbose(self, verbose: bool) -> ModelConfig {
        ModelConfig {
            solver: SolverOptions { verbose },
            ..self
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution < 2 {
            return Err(ConfigError::ResolutionTooSmall(self.resolution));
        }
        if !self.slack.is_finite() || self.slack < 0.0 {
            return Err(ConfigError::InvalidSlack(self.slack));
        }
        Ok(())
    }
}

/// Lifecycle of a model. A built model is never modified; solve it again or build a new one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModelState {
    /// constraints assembled, not solved yet
    Built,
    /// last solve ended with the status
    Solved(SolveStatus),
}

/// Solver variables of one edge
#[derive(Debug, Copy, Clone)]
struct ArcVars {
    on_path: Var,
    budget: Var,
    cost: Var,
    budget_on_path: Var,
    cost_on_path: Var,
}

///
/// Minimum cost path model of a CostGraph.
///
/// The model works on a snapshot of the graph taken at construction,
/// and owns its problem and solver session.
///
#[derive(Debug)]
pub struct OptimizationModel<N: NodeId, S: MilpSolver = MicroLpSolver> {
    graph: GraphSnapshot<N>,
    start: NodeIndex,
    target: NodeIndex,
    budget: Budget,
    config: ModelConfig,
    /// approximation of each edge, by edge index
    approximations: Vec<PiecewiseLinear>,
    /// variables of each edge, by edge index
    arcs: Vec<ArcVars>,
    problem: MilpProblem,
    solver: S,
    state: ModelState,
}

impl<N: NodeId> OptimizationModel<N, MicroLpSolver> {
    ///
    /// Build the model with the default solver configured by `config.solver`.
    ///
    pub fn new(
        graph: &CostGraph<N>,
        start: &N,
        target: &N,
        budget: Budget,
        config: ModelConfig,
    ) -> Result<Self, ConfigError> {
        let solver = MicroLpSolver::new(config.solver);
        OptimizationModel::with_solver(graph, start, target, budget, config, solver)
    }
}

impl<N: NodeId, S: MilpSolver> OptimizationModel<N, S> {
    ///
    /// Build the model to be solved by `solver`.
    ///
    /// Fails if the graph has an edge without cost function, start or target is not
    /// in the graph, the budget is negative, or `config` is invalid.
    ///
    pub fn with_solver(
        graph: &CostGraph<N>,
        start: &N,
        target: &N,
        budget: Budget,
        config: ModelConfig,
        solver: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !budget.is_finite() || budget < 0.0 {
            return Err(ConfigError::InvalidBudget(budget));
        }
        let graph = graph.snapshot()?;
        let start_ix = graph
            .node_index(start)
            .ok_or_else(|| ConfigError::UnknownNode(format!("{:?}", start)))?;
        let target_ix = graph
            .node_index(target)
            .ok_or_else(|| ConfigError::UnknownNode(format!("{:?}", target)))?;

        let approximations = graph
            .graph()
            .edge_weights()
            .map(|f| PiecewiseLinear::for_edge(f, config.slack, config.resolution))
            .collect::<Result<Vec<_>, _>>()?;

        let mut model = OptimizationModel {
            graph,
            start: start_ix,
            target: target_ix,
            budget,
            config,
            approximations,
            arcs: Vec::new(),
            problem: MilpProblem::new("min_cost_path"),
            solver,
            state: ModelState::Built,
        };
        model.build();
        Ok(model)
    }

    fn build(&mut self) {
        let g = self.graph.graph();
        let problem = &mut self.problem;

        // (1) variables and the piecewise-linear cost of each edge
        for er in g.edge_references() {
            let i = er.id().index();
            let f = er.weight();
            let pwl = &self.approximations[i];
            let (_, b_max) = pwl.domain();
            let b_upper = self.budget.min(b_max);
            let (c_lower, c_upper) = pwl.cost_range();
            debug!(
                "edge {:?} -> {:?}: {}, {} samples on [0, {}]",
                g[er.source()],
                g[er.target()],
                f,
                pwl.len(),
                b_max
            );

            let vars = ArcVars {
                on_path: problem.add_binary(format!("path_{}", i)),
                budget: problem.add_continuous(format!("budget_{}", i), 0.0, b_upper),
                cost: problem.add_continuous(format!("cost_{}", i), c_lower, c_upper),
                budget_on_path: problem.add_continuous(format!("budget_on_path_{}", i), 0.0, b_upper),
                cost_on_path: problem.add_continuous(
                    format!("cost_on_path_{}", i),
                    c_lower.min(0.0),
                    c_upper.max(0.0),
                ),
            };
            problem.add_piecewise(
                format!("pwl_{}", i),
                vars.budget,
                vars.cost,
                pwl.points().to_vec(),
            );
            add_product(
                problem,
                &format!("budget_on_path_{}", i),
                vars.budget_on_path,
                vars.budget,
                vars.on_path,
                (0.0, b_upper),
            );
            add_product(
                problem,
                &format!("cost_on_path_{}", i),
                vars.cost_on_path,
                vars.cost,
                vars.on_path,
                (c_lower, c_upper),
            );
            if self.config.enforce_minimum_commitment && f.b_init() > 0.0 {
                // p_e >= b_init * x_e
                problem.add_constraint(
                    format!("commitment_{}", i),
                    LinExpr::new()
                        .term(vars.budget_on_path, 1.0)
                        .term(vars.on_path, -f.b_init()),
                    Sense::GreaterEq,
                    0.0,
                );
            }
            self.arcs.push(vars);
        }

        // (2) flow conservation and rank
        let arcs = &self.arcs;
        for v in g.node_indices() {
            let outgoing = LinExpr::sum(
                g.edges_directed(v, Outgoing)
                    .map(|er| arcs[er.id().index()].on_path),
            );
            let incoming = LinExpr::sum(
                g.edges_directed(v, Incoming)
                    .map(|er| arcs[er.id().index()].on_path),
            );
            let rhs = if self.start == self.target {
                0.0
            } else if v == self.start {
                1.0
            } else if v == self.target {
                -1.0
            } else {
                0.0
            };
            problem.add_constraint(
                format!("flow_{}", v.index()),
                outgoing.clone().minus(incoming),
                Sense::Equal,
                rhs,
            );
            problem.add_constraint(
                format!("rank_{}", v.index()),
                outgoing,
                Sense::LessEq,
                1.0,
            );
        }

        // (3) budget
        problem.add_constraint(
            "budget".to_string(),
            LinExpr::sum(arcs.iter().map(|a| a.budget_on_path)),
            Sense::LessEq,
            self.budget,
        );

        // (4) objective
        problem.set_objective(
            LinExpr::sum(arcs.iter().map(|a| a.cost_on_path)),
            Direction::Minimize,
        );

        debug!(
            "built model: {} nodes, {} edges, {} variables, {} constraints",
            g.node_count(),
            g.edge_count(),
            problem.vars().len(),
            problem.constraints().len()
        );
    }

    ///
    /// Solve the model and decode the selected edges.
    ///
    /// Returns `SolverFailure` unless the solver proves optimality and the selected
    /// edges contain a walk from start to target (status `Error` otherwise).
    /// Solving again runs the same problem from scratch.
    ///
    pub fn solve(&mut self) -> Result<SolvedPath<N>, SolverFailure> {
        let outcome = self.solver.solve(&self.problem);
        let status = outcome.status;
        let values = match (status, outcome.values) {
            (SolveStatus::Optimal, Some(values)) if values.len() == self.problem.vars().len() => {
                values
            }
            (SolveStatus::Optimal, _) => {
                self.state = ModelState::Solved(SolveStatus::Error);
                warn!("solver reported an optimal solution without a complete assignment");
                return Err(SolverFailure::new(
                    SolveStatus::Error,
                    "optimal status without a complete assignment",
                ));
            }
            (status, _) => {
                self.state = ModelState::Solved(status);
                warn!(
                    "no path from {:?} to {:?} within budget {}: {} ({})",
                    self.graph.node(self.start),
                    self.graph.node(self.target),
                    self.budget,
                    status,
                    outcome.message
                );
                return Err(SolverFailure::new(status, outcome.message));
            }
        };
        let decoded = self.decode(&values);
        self.state = match &decoded {
            Ok(_) => ModelState::Solved(SolveStatus::Optimal),
            Err(e) => ModelState::Solved(e.status()),
        };
        decoded
    }

    ///
    /// Walk the selected edges from start to target.
    ///
    /// Selected edges off this walk form cycles detached from the path. They are
    /// dropped, unless their approximated cost is negative: the objective then
    /// counts edges that are not on the path, and the result is an error.
    ///
    fn decode(&self, values: &[f64]) -> Result<SolvedPath<N>, SolverFailure> {
        let g = self.graph.graph();
        let mut selected: HashMap<NodeIndex, EdgeReference<EdgeCostFunction>> = HashMap::new();
        for er in g.edge_references() {
            if values[self.arcs[er.id().index()].on_path.index()] <= ON_PATH_THRESHOLD {
                continue;
            }
            if selected.insert(er.source(), er).is_some() {
                let message = format!("{:?} has more than one selected outgoing edge", g[er.source()]);
                warn!("{}", message);
                return Err(SolverFailure::new(SolveStatus::Error, message));
            }
        }

        let mut walk: Vec<EdgeReference<EdgeCostFunction>> = Vec::new();
        let mut node = self.start;
        while node != self.target {
            match selected.remove(&node) {
                Some(er) => {
                    walk.push(er);
                    node = er.target();
                }
                None => {
                    let message = format!("selected edges stop at {:?} before the target", g[node]);
                    warn!("{}", message);
                    return Err(SolverFailure::new(SolveStatus::Error, message));
                }
            }
        }

        if !selected.is_empty() {
            let detached_cost: f64 = selected
                .values()
                .map(|er| values[self.arcs[er.id().index()].cost_on_path.index()])
                .sum();
            if detached_cost < -COST_EPS {
                warn!(
                    "{} selected edges form cycles detached from the path with cost {}",
                    selected.len(),
                    detached_cost
                );
                return Err(SolverFailure::new(
                    SolveStatus::Error,
                    format!("detached cycle of negative cost {}", detached_cost),
                ));
            }
            debug!("dropped {} edges detached from the path", selected.len());
        }

        let edges = walk
            .iter()
            .map(|er| {
                let f = er.weight();
                let mut b = values[self.arcs[er.id().index()].budget.index()].max(0.0);
                if b < f.b_init() && f.b_init() - b <= BUDGET_EPS {
                    b = f.b_init();
                }
                PathEdge::new(
                    g[er.source()].clone(),
                    g[er.target()].clone(),
                    b,
                    f.cost(b),
                )
            })
            .collect();
        let approx_cost = walk
            .iter()
            .map(|er| values[self.arcs[er.id().index()].cost_on_path.index()])
            .sum();
        let path = SolvedPath::new(
            self.graph.node(self.start).clone(),
            self.graph.node(self.target).clone(),
            edges,
            approx_cost,
        );
        info!(
            "shortest path found: {} edges, total budget {:.5}, total cost {:.5}",
            path.edges().len(),
            path.total_budget(),
            path.total_cost()
        );
        Ok(path)
    }

    //
    // accessors
    //

    pub fn state(&self) -> ModelState {
        self.state
    }
    pub fn problem(&self) -> &MilpProblem {
        &self.problem
    }
    pub fn graph(&self) -> &GraphSnapshot<N> {
        &self.graph
    }
    pub fn budget(&self) -> Budget {
        self.budget
    }
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
    pub fn start(&self) -> &N {
        self.graph.node(self.start)
    }
    pub fn target(&self) -> &N {
        self.graph.node(self.target)
    }
    /// Piecewise-linear table used for the edge `u -> v`
    pub fn approximation(&self, u: &N, v: &N) -> Option<&PiecewiseLinear> {
        let e = self.graph.edge_index(u, v)?;
        self.approximations.get(e.index())
    }
}

///
/// Add constraints making `z = y * x` for binary `x` and `y` in `[lower, upper]`.
///
/// ```text
/// z >= lower * x
/// z <= upper * x
/// z >= y - upper * (1 - x)
/// z <= y - lower * (1 - x)
/// ```
///
fn add_product(
    problem: &mut MilpProblem,
    name: &str,
    z: Var,
    y: Var,
    x: Var,
    (lower, upper): (f64, f64),
) {
    problem.add_constraint(
        format!("{}_lo_x", name),
        LinExpr::new().term(z, 1.0).term(x, -lower),
        Sense::GreaterEq,
        0.0,
    );
    problem.add_constraint(
        format!("{}_up_x", name),
        LinExpr::new().term(z, 1.0).term(x, -upper),
        Sense::LessEq,
        0.0,
    );
    problem.add_constraint(
        format!("{}_lo_y", name),
        LinExpr::new().term(z, 1.0).term(y, -1.0).term(x, -upper),
        Sense::GreaterEq,
        -upper,
    );
    problem.add_constraint(
        format!("{}_up_y", name),
        LinExpr::new().term(z, 1.0).term(y, -1.0).term(x, -lower),
        Sense::LessEq,
        -lower,
    );
}

//
// tests
//
