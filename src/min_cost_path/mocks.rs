use super::cost_fn::EdgeCostFunction;
use super::graph::CostGraph;

/// log to the test harness, at most once per process
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// cost functions of `mock_chain`: A->B and B->C
pub fn mock_chain_fns() -> (EdgeCostFunction, EdgeCostFunction) {
    (
        EdgeCostFunction::linear(10.0, 2.0, 0.0, 5.0).unwrap(),
        EdgeCostFunction::linear(8.0, 1.0, 0.0, 4.0).unwrap(),
    )
}

/// mock graph generation functions
///
/// A -> B -> C
pub fn mock_chain() -> CostGraph<&'static str> {
    let (ab, bc) = mock_chain_fns();
    let mut graph = CostGraph::new();
    graph.add_edge("A", "B", ab);
    graph.add_edge("B", "C", bc);
    graph
}

/// Two routes from A to D
///
/// A -> D is expensive at any budget.
/// A -> B -> D is cheap once both edges get budget 2.
/// A -> C is a dead end.
pub fn mock_diamond() -> CostGraph<&'static str> {
    let mut graph = CostGraph::new();
    graph.add_edge("A", "D", EdgeCostFunction::linear(20.0, 15.0, 0.0, 4.0).unwrap());
    let cheap = EdgeCostFunction::linear(10.0, 1.0, 0.0, 2.0).unwrap();
    graph.set_cost_fn_for_edges(vec![("A", "B"), ("B", "D")], cheap);
    graph.add_edge("A", "C", EdgeCostFunction::linear(1.0, 0.0, 0.0, 1.0).unwrap());
    graph
}

/// A -> B and C -> D, without any connection between them
pub fn mock_unreachable() -> CostGraph<&'static str> {
    let (ab, bc) = mock_chain_fns();
    let mut graph = CostGraph::new();
    graph.add_edge("A", "B", ab);
    graph.add_edge("C", "D", bc);
    graph
}

/// S -> T whose exponential cost needs at least budget 1
pub fn mock_min_commitment() -> CostGraph<&'static str> {
    let mut graph = CostGraph::new();
    graph.add_edge(
        "S",
        "T",
        EdgeCostFunction::exponential(5.0, 1.0, 1.0, 3.0, 1.0).unwrap(),
    );
    graph
}

/// 0 -> 1 -> 2 -> 0 and 2 -> 3, with integer nodes
pub fn mock_cycle() -> CostGraph<u32> {
    let mut graph = CostGraph::new();
    let f = EdgeCostFunction::exponential(4.0, 0.5, 0.0, 3.0, 0.8).unwrap();
    graph.set_cost_fn_for_edges(vec![(0, 1), (1, 2), (2, 0), (2, 3)], f);
    graph
}

/// S -> T, and X -> Y -> X away from it
///
/// Cycle edges cost `0` without budget and `cycle_min` from budget 1.
pub fn mock_detached_cycle(cycle_min: f64) -> CostGraph<&'static str> {
    let mut graph = CostGraph::new();
    graph.add_edge("S", "T", EdgeCostFunction::linear(5.0, 1.0, 0.0, 1.0).unwrap());
    let f = EdgeCostFunction::linear(0.0, cycle_min, 0.0, 1.0).unwrap();
    graph.set_cost_fn_for_edges(vec![("X", "Y"), ("Y", "X")], f);
    graph
}
