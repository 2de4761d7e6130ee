//!
//! CostGraph definitions
//! - CostGraph: directed graph whose edges carry an `EdgeCostFunction`
//! - GraphSnapshot: immutable copy of a valid CostGraph, handed to the optimizer
//!
use super::cost_fn::EdgeCostFunction;
use super::error::{ConfigError, LookupError};
use super::utils::draw;
use super::NodeId;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::HashMap;

///
/// Directed graph with a cost function on each edge.
///
/// Edges may be added without a function (`add_bare_edge`) and get one later.
/// A graph is valid only if every edge has a function; validity is checked
/// when an optimization model is built, not when edges are inserted.
///
/// Parallel edges are not allowed: adding `u -> v` twice replaces the function.
///
#[derive(Debug, Clone)]
pub struct CostGraph<N: NodeId> {
    graph: DiGraph<N, Option<EdgeCostFunction>>,
    nodes: HashMap<N, NodeIndex>,
}

impl<N: NodeId> Default for CostGraph<N> {
    fn default() -> Self {
        CostGraph::new()
    }
}

impl<N: NodeId> CostGraph<N> {
    pub fn new() -> CostGraph<N> {
        CostGraph {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
        }
    }

    /// Add the node if it is not in the graph yet
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        if let Some(&ix) = self.nodes.get(&node) {
            return ix;
        }
        let ix = self.graph.add_node(node.clone());
        self.nodes.insert(node, ix);
        ix
    }

    ///
    /// Add the edge `u -> v` with cost function `f`.
    /// If the edge already exists its function is replaced.
    ///
    pub fn add_edge(&mut self, u: N, v: N, f: EdgeCostFunction) -> EdgeIndex {
        let (a, b) = (self.add_node(u), self.add_node(v));
        match self.graph.find_edge(a, b) {
            Some(e) => {
                self.graph[e] = Some(f);
                e
            }
            None => self.graph.add_edge(a, b, Some(f)),
        }
    }

    ///
    /// Add the edge `u -> v` without a cost function.
    /// An existing edge keeps its function.
    ///
    pub fn add_bare_edge(&mut self, u: N, v: N) -> EdgeIndex {
        let (a, b) = (self.add_node(u), self.add_node(v));
        match self.graph.find_edge(a, b) {
            Some(e) => e,
            None => self.graph.add_edge(a, b, None),
        }
    }

    ///
    /// Attach a copy of `f` to every edge in `edges`, adding the missing ones.
    ///
    pub fn set_cost_fn_for_edges<I>(&mut self, edges: I, f: EdgeCostFunction)
    where
        I: IntoIterator<Item = (N, N)>,
    {
        for (u, v) in edges {
            self.add_edge(u, v, f);
        }
    }

    ///
    /// Cost function of the edge `u -> v`
    ///
    pub fn cost_fn(&self, u: &N, v: &N) -> Result<&EdgeCostFunction, LookupError> {
        let not_found = || LookupError::EdgeNotFound(format!("{:?}", u), format!("{:?}", v));
        let a = self.nodes.get(u).ok_or_else(not_found)?;
        let b = self.nodes.get(v).ok_or_else(not_found)?;
        let e = self.graph.find_edge(*a, *b).ok_or_else(not_found)?;
        self.graph[e]
            .as_ref()
            .ok_or_else(|| LookupError::MissingCostFn(format!("{:?}", u), format!("{:?}", v)))
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }
    pub fn contains_edge(&self, u: &N, v: &N) -> bool {
        match (self.nodes.get(u), self.nodes.get(v)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.graph.node_weights()
    }
    /// `(u, v)` of every edge, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.graph.edge_indices().filter_map(move |e| {
            self.graph
                .edge_endpoints(e)
                .map(|(a, b)| (&self.graph[a], &self.graph[b]))
        })
    }

    /// Edges that have no cost function yet
    pub fn edges_without_cost_fn(&self) -> Vec<(N, N)> {
        self.graph
            .edge_indices()
            .filter(|&e| self.graph[e].is_none())
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a].clone(), self.graph[b].clone()))
            .collect()
    }

    ///
    /// Check if every edge has a cost function
    ///
    pub fn is_valid(&self) -> bool {
        self.graph.edge_weights().all(|w| w.is_some())
    }

    ///
    /// Freeze the graph into a `GraphSnapshot`.
    /// Fails with `ConfigError::InvalidGraph` if some edge has no cost function.
    ///
    pub fn snapshot(&self) -> Result<GraphSnapshot<N>, ConfigError> {
        let missing = self.edges_without_cost_fn();
        if let Some((u, v)) = missing.first() {
            return Err(ConfigError::InvalidGraph {
                count: missing.len(),
                example: format!("{:?} -> {:?}", u, v),
            });
        }
        let graph = self.graph.filter_map(
            |_, n| Some(n.clone()),
            |_, f| f.as_ref().copied(),
        );
        Ok(GraphSnapshot {
            graph,
            nodes: self.nodes.clone(),
        })
    }

    /// Dump the graph in Dot format to the debug log
    pub fn draw(&self) {
        draw(&self.graph);
    }
}

///
/// Immutable arena of a valid CostGraph.
///
/// Node and edge indices are those of the source graph at the time of the snapshot.
/// Later changes to the source graph are not reflected.
///
#[derive(Debug, Clone)]
pub struct GraphSnapshot<N: NodeId> {
    graph: DiGraph<N, EdgeCostFunction>,
    nodes: HashMap<N, NodeIndex>,
}

impl<N: NodeId> GraphSnapshot<N> {
    pub fn graph(&self) -> &DiGraph<N, EdgeCostFunction> {
        &self.graph
    }
    pub fn node_index(&self, node: &N) -> Option<NodeIndex> {
        self.nodes.get(node).copied()
    }
    pub fn node(&self, ix: NodeIndex) -> &N {
        &self.graph[ix]
    }
    pub fn edge_index(&self, u: &N, v: &N) -> Option<EdgeIndex> {
        self.graph
            .find_edge(self.node_index(u)?, self.node_index(v)?)
    }
    pub fn cost_fn(&self, e: EdgeIndex) -> &EdgeCostFunction {
        &self.graph[e]
    }
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::super::mocks::{mock_chain, mock_chain_fns};
    use super::*;

    #[test]
    fn add_and_lookup() {
        let g = mock_chain();
        let (ab, bc) = mock_chain_fns();
        g.draw();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.cost_fn(&"A", &"B"), Ok(&ab));
        assert_eq!(g.cost_fn(&"B", &"C"), Ok(&bc));
        assert!(g.contains_edge(&"A", &"B"));
        assert!(!g.contains_edge(&"B", &"A"));
        let edges: Vec<(&&str, &&str)> = g.edges().collect();
        assert_eq!(edges, vec![(&"A", &"B"), (&"B", &"C")]);
    }

    #[test]
    fn lookup_failures() {
        let mut g = mock_chain();
        assert_eq!(
            g.cost_fn(&"B", &"A"),
            Err(LookupError::EdgeNotFound(
                "\"B\"".to_string(),
                "\"A\"".to_string()
            ))
        );
        assert!(matches!(
            g.cost_fn(&"X", &"A"),
            Err(LookupError::EdgeNotFound(_, _))
        ));
        g.add_bare_edge("C", "D");
        assert_eq!(
            g.cost_fn(&"C", &"D"),
            Err(LookupError::MissingCostFn(
                "\"C\"".to_string(),
                "\"D\"".to_string()
            ))
        );
    }

    #[test]
    fn last_write_wins() {
        let mut g = mock_chain();
        let f = EdgeCostFunction::exponential(3.0, 1.0, 0.0, 2.0, 1.0).unwrap();
        let e0 = g.graph.find_edge(NodeIndex::new(0), NodeIndex::new(1)).unwrap();
        let e1 = g.add_edge("A", "B", f);
        assert_eq!(e0, e1);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.cost_fn(&"A", &"B"), Ok(&f));

        // a bare edge does not erase the function
        g.add_bare_edge("A", "B");
        assert_eq!(g.cost_fn(&"A", &"B"), Ok(&f));
    }

    #[test]
    fn bulk_attach_and_validate() {
        let mut g: CostGraph<u32> = CostGraph::new();
        g.add_bare_edge(0, 1);
        g.add_bare_edge(1, 2);
        g.add_bare_edge(2, 3);
        assert!(!g.is_valid());
        assert_eq!(g.edges_without_cost_fn().len(), 3);
        assert!(matches!(
            g.snapshot(),
            Err(ConfigError::InvalidGraph { count: 3, .. })
        ));

        let f = EdgeCostFunction::linear(4.0, 1.0, 0.0, 2.0).unwrap();
        g.set_cost_fn_for_edges(vec![(0, 1), (1, 2)], f);
        assert!(!g.is_valid());
        assert_eq!(g.edges_without_cost_fn(), vec![(2, 3)]);

        g.set_cost_fn_for_edges(vec![(2, 3), (3, 4)], f);
        assert!(g.is_valid());
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.node_count(), 5);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut g = mock_chain();
        let s = g.snapshot().unwrap();
        g.add_edge("C", "D", mock_chain_fns().0);
        g.add_bare_edge("D", "E");
        assert_eq!(s.graph().edge_count(), 2);
        assert_eq!(s.node_index(&"D"), None);
        let e = s.edge_index(&"A", &"B").unwrap();
        assert_eq!(s.cost_fn(e), &mock_chain_fns().0);
        assert_eq!(s.node(s.node_index(&"B").unwrap()), &"B");
    }
}
