//!
//! utils
//!
use super::approx::linspace;
use super::cost_fn::EdgeCostFunction;
use super::Budget;
use log::debug;
use petgraph::dot::Dot;
use petgraph::graph::Graph;
use petgraph::EdgeType;

///
/// check if the cost function `f` is non-increasing
/// in the domain `[b_lower, b_upper]`, probed at `n` points
///
pub fn is_non_increasing(f: &EdgeCostFunction, b_lower: Budget, b_upper: Budget, n: usize) -> bool {
    let costs = f.costs(&linspace(b_lower, b_upper, n));
    costs.windows(2).all(|w| w[1] <= w[0])
}

pub fn draw<'a, N: 'a, E: 'a, Ty, Ix>(graph: &'a Graph<N, E, Ty, Ix>)
where
    E: std::fmt::Debug,
    N: std::fmt::Debug,
    Ty: EdgeType,
    Ix: petgraph::graph::IndexType,
{
    debug!("{:?}", Dot::with_config(graph, &[]));
}
