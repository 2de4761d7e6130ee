//!
//! costpath finds a [minimum cost path](https://en.wikipedia.org/wiki/Shortest_path_problem)
//! on a directed graph whose edge costs are nonlinear functions of a shared, finite budget.
//! The path and the budget of each edge are chosen jointly by a mixed-integer linear program.
//!
pub mod min_cost_path;
