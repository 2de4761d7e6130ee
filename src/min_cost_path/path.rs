//!
//! Solved path definitions
//! - PathEdge: one selected edge with its allocated budget and realized cost
//! - SolvedPath: all selected edges of a solved model with totals
//!
use super::{Budget, Cost, NodeId};
use std::collections::HashMap;

///
/// A single edge of the solved path
///
/// `cost` is the true cost function evaluated at `budget`, not its approximation.
///
#[derive(Debug, Clone, PartialEq)]
pub struct PathEdge<N> {
    u: N,
    v: N,
    budget: Budget,
    cost: Cost,
}

impl<N> PathEdge<N> {
    pub fn new(u: N, v: N, budget: Budget, cost: Cost) -> PathEdge<N> {
        PathEdge { u, v, budget, cost }
    }
    pub fn u(&self) -> &N {
        &self.u
    }
    pub fn v(&self) -> &N {
        &self.v
    }
    pub fn budget(&self) -> Budget {
        self.budget
    }
    pub fn cost(&self) -> Cost {
        self.cost
    }
}

impl<N: std::fmt::Display> std::fmt::Display for PathEdge<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}: b={:.5} c={:.5}",
            self.u, self.v, self.budget, self.cost
        )
    }
}

///
/// Edges selected by the solver
///
/// `OptimizationModel` gives `edges` in path order. For edges given in any other
/// order, `ordered` walks them from `start` to `target`.
/// An empty `edges` means the empty path is optimal (`start == target`).
///
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedPath<N> {
    start: N,
    target: N,
    edges: Vec<PathEdge<N>>,
    total_budget: Budget,
    total_cost: Cost,
    approx_cost: Cost,
}

impl<N: NodeId> SolvedPath<N> {
    pub fn new(start: N, target: N, edges: Vec<PathEdge<N>>, approx_cost: Cost) -> SolvedPath<N> {
        let total_budget = edges.iter().map(|e| e.budget).sum();
        let total_cost = edges.iter().map(|e| e.cost).sum();
        SolvedPath {
            start,
            target,
            edges,
            total_budget,
            total_cost,
            approx_cost,
        }
    }
    pub fn start(&self) -> &N {
        &self.start
    }
    pub fn target(&self) -> &N {
        &self.target
    }
    pub fn edges(&self) -> &[PathEdge<N>] {
        &self.edges
    }
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
    /// sum of allocated budgets
    pub fn total_budget(&self) -> Budget {
        self.total_budget
    }
    /// sum of true costs
    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }
    /// objective value of the piecewise-linear model
    pub fn approx_cost(&self) -> Cost {
        self.approx_cost
    }

    ///
    /// Edges in path order from `start` to `target`.
    ///
    /// `None` if the edges do not form a single simple path from `start` to `target`.
    ///
    pub fn ordered(&self) -> Option<Vec<&PathEdge<N>>> {
        let mut outgoing: HashMap<&N, &PathEdge<N>> = HashMap::new();
        for e in self.edges.iter() {
            if outgoing.insert(&e.u, e).is_some() {
                return None;
            }
        }
        let mut path = Vec::with_capacity(self.edges.len());
        let mut node = &self.start;
        while node != &self.target {
            let e = outgoing.remove(node)?;
            path.push(e);
            node = &e.v;
        }
        if outgoing.is_empty() {
            Some(path)
        } else {
            None
        }
    }

    ///
    /// Nodes visited in path order, `start` and `target` included
    ///
    pub fn nodes(&self) -> Option<Vec<&N>> {
        let ordered = self.ordered()?;
        let mut nodes = vec![&self.start];
        nodes.extend(ordered.into_iter().map(|e| &e.v));
        Some(nodes)
    }

    ///
    /// Check the flow conservation of the selected edges:
    /// * every intermediate node has one incoming and one outgoing edge
    /// * `start` has no incoming and one outgoing edge
    /// * `target` has one incoming and no outgoing edge
    ///
    /// and that no node is visited twice.
    ///
    pub fn is_simple_path(&self) -> bool {
        if self.start == self.target {
            return self.edges.is_empty();
        }
        let mut degree: HashMap<&N, (usize, usize)> = HashMap::new();
        for e in self.edges.iter() {
            degree.entry(&e.u).or_default().1 += 1;
            degree.entry(&e.v).or_default().0 += 1;
        }
        let degree_ok = degree.iter().all(|(&n, &(n_in, n_out))| {
            if n == &self.start {
                (n_in, n_out) == (0, 1)
            } else if n == &self.target {
                (n_in, n_out) == (1, 0)
            } else {
                (n_in, n_out) == (1, 1)
            }
        });
        degree_ok && self.ordered().is_some()
    }
}

impl<N: NodeId + std::fmt::Display> std::fmt::Display for SolvedPath<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ordered() {
            Some(edges) => {
                for e in edges {
                    writeln!(f, "{}", e)?;
                }
            }
            None => {
                for e in self.edges.iter() {
                    writeln!(f, "{}", e)?;
                }
            }
        }
        writeln!(f, "Total budget used: {:.5}", self.total_budget)?;
        write!(f, "Total cost for path: {:.5}", self.total_cost)
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    fn e(u: &'static str, v: &'static str, b: f64, c: f64) -> PathEdge<&'static str> {
        PathEdge::new(u, v, b, c)
    }

    #[test]
    fn path_edge_display() {
        assert_eq!(
            e("A", "B", 5.0, 2.0).to_string(),
            "A -> B: b=5.00000 c=2.00000"
        );
    }

    #[test]
    fn order_is_reconstructed() {
        // edges given in non path order
        let p = SolvedPath::new(
            "S",
            "T",
            vec![e("B", "T", 1.0, 2.0), e("S", "A", 2.0, 1.0), e("A", "B", 0.5, 4.0)],
            7.1,
        );
        let ordered: Vec<(&str, &str)> = p
            .ordered()
            .unwrap()
            .into_iter()
            .map(|e| (*e.u(), *e.v()))
            .collect();
        assert_eq!(ordered, vec![("S", "A"), ("A", "B"), ("B", "T")]);
        assert_eq!(p.nodes().unwrap(), vec![&"S", &"A", &"B", &"T"]);
        assert!(p.is_simple_path());
        assert_eq!(p.total_budget(), 3.5);
        assert_eq!(p.total_cost(), 7.0);
        assert_eq!(p.approx_cost(), 7.1);
        assert_eq!(
            p.to_string(),
            "S -> A: b=2.00000 c=1.00000\n\
             A -> B: b=0.50000 c=4.00000\n\
             B -> T: b=1.00000 c=2.00000\n\
             Total budget used: 3.50000\n\
             Total cost for path: 7.00000"
        );
    }

    #[test]
    fn broken_paths() {
        // detached cycle next to the path
        let p = SolvedPath::new(
            "S",
            "T",
            vec![e("S", "T", 1.0, 1.0), e("X", "Y", 1.0, 1.0), e("Y", "X", 1.0, 1.0)],
            3.0,
        );
        assert!(p.ordered().is_none());
        assert!(!p.is_simple_path());

        // does not reach the target
        let p = SolvedPath::new("S", "T", vec![e("S", "A", 1.0, 1.0)], 1.0);
        assert!(p.ordered().is_none());
        assert!(!p.is_simple_path());

        // branching
        let p = SolvedPath::new(
            "S",
            "T",
            vec![e("S", "A", 1.0, 1.0), e("S", "T", 1.0, 1.0)],
            2.0,
        );
        assert!(p.ordered().is_none());
    }

    #[test]
    fn empty_path() {
        let p: SolvedPath<&str> = SolvedPath::new("S", "S", vec![], 0.0);
        assert!(p.is_empty());
        assert!(p.is_simple_path());
        assert_eq!(p.ordered(), Some(vec![]));
        assert_eq!(p.nodes(), Some(vec![&"S"]));
        assert_eq!(p.total_cost(), 0.0);
    }
}
