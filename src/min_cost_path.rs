pub mod approx;
pub mod cost_fn;
pub mod error;
pub mod graph;
pub mod lp_backend;
pub mod milp;
#[cfg(test)]
pub mod mocks;
pub mod model;
pub mod path;
pub mod problem;
pub mod utils;

pub use cost_fn::EdgeCostFunction;
pub use error::{ConfigError, LookupError, SolverFailure};
pub use graph::CostGraph;
pub use model::{ModelConfig, ModelState, OptimizationModel};
pub use path::{PathEdge, SolvedPath};

/// Cost of traversing an edge
pub type Cost = f64;

/// Amount of the shared resource allocated to an edge
pub type Budget = f64;

/// Node identifier of a `CostGraph`.
///
/// Any hashable value works, e.g. `&str`, `String` or integers.
pub trait NodeId: Clone + Eq + std::hash::Hash + std::fmt::Debug {}

impl<T: Clone + Eq + std::hash::Hash + std::fmt::Debug> NodeId for T {}

//
// public functions
//

///
/// Find the minimum cost path from `start` to `target` on the CostGraph
/// using at most `budget` in total.
///
/// Builds an `OptimizationModel` with the default solver and solves it once.
/// Use `OptimizationModel` directly to inspect the model or to keep the solved state.
///
pub fn min_cost_path<N: NodeId>(
    graph: &CostGraph<N>,
    start: &N,
    target: &N,
    budget: Budget,
    config: ModelConfig,
) -> Result<SolvedPath<N>, PathError> {
    let mut model = OptimizationModel::new(graph, start, target, budget, config)?;
    Ok(model.solve()?)
}

/// Failure of `min_cost_path`: either the model could not be built or the solver gave up.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Solver(#[from] SolverFailure),
}
