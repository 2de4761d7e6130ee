//!
//! Error types
//! - `ConfigError`: invalid construction parameters, raised before any solving happens
//! - `LookupError`: querying the cost function of an edge that has none
//! - `SolverFailure`: the solver finished without an optimal solution
//!
use super::milp::SolveStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("degenerate linear cost function: b_min ({b_min}) equals b_init ({b_init})")]
    DegenerateSlope { b_init: f64, b_min: f64 },
    #[error("b_min ({b_min}) must be greater than b_init ({b_init})")]
    InvalidBudgetRange { b_init: f64, b_min: f64 },
    #[error("decay rate alpha must be positive, got {0}")]
    NonPositiveDecay(f64),
    #[error("parameter {name} must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
    #[error("approximation resolution must be at least 2, got {0}")]
    ResolutionTooSmall(usize),
    #[error("slack must be finite and non-negative, got {0}")]
    InvalidSlack(f64),
    #[error("total budget must be finite and non-negative, got {0}")]
    InvalidBudget(f64),
    #[error("node {0} is not in the graph")]
    UnknownNode(String),
    #[error("{count} edge(s) have no cost function, e.g. {example}")]
    InvalidGraph { count: usize, example: String },
    #[error("sampling range [0, {upper}] is empty")]
    EmptySamplingRange { upper: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("no edge {0} -> {1}")]
    EdgeNotFound(String, String),
    #[error("edge {0} -> {1} has no cost function")]
    MissingCostFn(String, String),
}

/// Non-optimal end of a solve: status reported by the solver and a reason
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no solution ({status}): {message}")]
pub struct SolverFailure {
    status: SolveStatus,
    message: String,
}

impl SolverFailure {
    pub fn new(status: SolveStatus, message: impl Into<String>) -> SolverFailure {
        SolverFailure {
            status,
            message: message.into(),
        }
    }
    pub fn status(&self) -> SolveStatus {
        self.status
    }
    pub fn message(&self) -> &str {
        &self.message
    }
}
