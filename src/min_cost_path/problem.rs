//!
//! Problem file read by the `costpath` binary.
//!
//! ```yaml
//! start: A
//! target: C
//! budget: 9.0
//! config:
//!   resolution: 50
//! edges:
//!   - from: A
//!     to: B
//!     function: { type: linear, c_init: 10.0, c_min: 2.0, b_init: 0.0, b_min: 5.0 }
//!   - from: B
//!     to: C
//!     function: { type: exponential, c_init: 8.0, c_min: 1.0, b_init: 0.0, b_min: 4.0, alpha: 0.5 }
//! ```
//!
use super::cost_fn::EdgeCostFunction;
use super::error::ConfigError;
use super::graph::CostGraph;
use super::model::ModelConfig;
use super::{Budget, Cost};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProblemFileError {
    #[error("cannot read problem file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed problem file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid edge {from} -> {to}: {source}")]
    Edge {
        from: String,
        to: String,
        source: ConfigError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProblemFile {
    pub start: String,
    pub target: String,
    pub budget: Budget,
    #[serde(default)]
    pub config: ModelConfig,
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    /// edge without cost function if omitted
    #[serde(default)]
    pub function: Option<CostFnSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostFnSpec {
    Linear {
        c_init: Cost,
        c_min: Cost,
        b_init: Budget,
        b_min: Budget,
        #[serde(default)]
        infeasible_cost: Option<Cost>,
    },
    Exponential {
        c_init: Cost,
        c_min: Cost,
        b_init: Budget,
        b_min: Budget,
        alpha: f64,
        #[serde(default)]
        infeasible_cost: Option<Cost>,
    },
}

impl CostFnSpec {
    pub fn build(&self) -> Result<EdgeCostFunction, ConfigError> {
        let (f, infeasible_cost) = match *self {
            CostFnSpec::Linear {
                c_init,
                c_min,
                b_init,
                b_min,
                infeasible_cost,
            } => (
                EdgeCostFunction::linear(c_init, c_min, b_init, b_min)?,
                infeasible_cost,
            ),
            CostFnSpec::Exponential {
                c_init,
                c_min,
                b_init,
                b_min,
                alpha,
                infeasible_cost,
            } => (
                EdgeCostFunction::exponential(c_init, c_min, b_init, b_min, alpha)?,
                infeasible_cost,
            ),
        };
        match infeasible_cost {
            Some(c) => f.with_infeasible_cost(c),
            None => Ok(f),
        }
    }
}

impl ProblemFile {
    pub fn from_path(path: &Path) -> Result<ProblemFile, ProblemFileError> {
        let text = std::fs::read_to_string(path)?;
        ProblemFile::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<ProblemFile, ProblemFileError> {
        Ok(serde_yaml::from_str(text)?)
    }

    ///
    /// Build the CostGraph of the edges.
    /// Edges without `function` are added bare, so the graph may be invalid.
    ///
    pub fn to_graph(&self) -> Result<CostGraph<String>, ProblemFileError> {
        let mut graph = CostGraph::new();
        for edge in self.edges.iter() {
            match &edge.function {
                Some(spec) => {
                    let f = spec.build().map_err(|source| ProblemFileError::Edge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        source,
                    })?;
                    graph.add_edge(edge.from.clone(), edge.to.clone(), f);
                }
                None => {
                    graph.add_bare_edge(edge.from.clone(), edge.to.clone());
                }
            }
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = r#"
start: A
target: C
budget: 9.0
config:
  resolution: 50
edges:
  - from: A
    to: B
    function: { type: linear, c_init: 10.0, c_min: 2.0, b_init: 0.0, b_min: 5.0 }
  - from: B
    to: C
    function:
      type: exponential
      c_init: 8.0
      c_min: 1.0
      b_init: 0.0
      b_min: 4.0
      alpha: 0.5
      infeasible_cost: 1000.0
"#;

    #[test]
    fn parse_problem_file() {
        let p = ProblemFile::from_yaml(CHAIN).unwrap();
        assert_eq!(p.start, "A");
        assert_eq!(p.target, "C");
        assert_eq!(p.budget, 9.0);
        assert_eq!(p.config, ModelConfig::new(50));
        assert_eq!(p.edges.len(), 2);

        let g = p.to_graph().unwrap();
        assert!(g.is_valid());
        let ab = g.cost_fn(&"A".to_string(), &"B".to_string()).unwrap();
        assert_eq!(ab, &EdgeCostFunction::linear(10.0, 2.0, 0.0, 5.0).unwrap());
        let bc = g.cost_fn(&"B".to_string(), &"C".to_string()).unwrap();
        assert_eq!(bc.alpha(), Some(0.5));
        assert_eq!(bc.infeasible_cost(), 1000.0);
    }

    #[test]
    fn bare_edges_and_bad_functions() {
        let text = "start: A\ntarget: B\nbudget: 1.0\nedges:\n  - from: A\n    to: B\n";
        let p = ProblemFile::from_yaml(text).unwrap();
        assert_eq!(p.config, ModelConfig::default());
        assert!(!p.to_graph().unwrap().is_valid());

        let text = "start: A\ntarget: B\nbudget: 1.0\nedges:\n  - from: A\n    to: B\n    function: { type: linear, c_init: 1.0, c_min: 0.0, b_init: 2.0, b_min: 2.0 }\n";
        let p = ProblemFile::from_yaml(text).unwrap();
        match p.to_graph() {
            Err(ProblemFileError::Edge { source, .. }) => assert_eq!(
                source,
                ConfigError::DegenerateSlope {
                    b_init: 2.0,
                    b_min: 2.0
                }
            ),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }

        let text = "start: A\nbudget: 1.0\nedges: []\n";
        assert!(matches!(
            ProblemFile::from_yaml(text),
            Err(ProblemFileError::Yaml(_))
        ));
    }
}
