//!
//! Piecewise-linear approximation of an `EdgeCostFunction`.
//!
//! The function is sampled at `resolution` evenly spaced budgets over `[0, b_min + slack]`.
//! The resulting `(budget, cost)` table is what the solver sees instead of the true function.
//!
use super::cost_fn::EdgeCostFunction;
use super::error::ConfigError;
use super::{Budget, Cost};
use itertools::Itertools; // for tuple_windows

/// Default extension of the sampling range past `b_min`
pub const DEFAULT_SLACK: Budget = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    /// sample points sorted by budget, at least two
    points: Vec<(Budget, Cost)>,
}

impl PiecewiseLinear {
    ///
    /// Sample `f` on `[0, b_min + slack]` with `resolution` points.
    ///
    pub fn for_edge(
        f: &EdgeCostFunction,
        slack: Budget,
        resolution: usize,
    ) -> Result<PiecewiseLinear, ConfigError> {
        let upper = f.b_min() + slack;
        if upper <= 0.0 {
            return Err(ConfigError::EmptySamplingRange { upper });
        }
        PiecewiseLinear::sample(f, 0.0, upper, resolution)
    }

    ///
    /// Sample `f` on `[lower, upper]` with `resolution` evenly spaced points.
    ///
    pub fn sample(
        f: &EdgeCostFunction,
        lower: Budget,
        upper: Budget,
        resolution: usize,
    ) -> Result<PiecewiseLinear, ConfigError> {
        if resolution < 2 {
            return Err(ConfigError::ResolutionTooSmall(resolution));
        }
        if !(upper > lower) {
            return Err(ConfigError::EmptySamplingRange { upper });
        }
        let budgets = linspace(lower, upper, resolution);
        let costs = f.costs(&budgets);
        Ok(PiecewiseLinear {
            points: budgets.into_iter().zip(costs).collect(),
        })
    }

    pub fn points(&self) -> &[(Budget, Cost)] {
        &self.points
    }
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `(first budget, last budget)` of the table
    pub fn domain(&self) -> (Budget, Budget) {
        (self.points[0].0, self.points[self.points.len() - 1].0)
    }

    /// `(min cost, max cost)` over the sample points
    pub fn cost_range(&self) -> (Cost, Cost) {
        self.points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, c)| {
                (lo.min(c), hi.max(c))
            })
    }

    ///
    /// Approximated cost at `b`, linear between the neighboring samples.
    /// `None` if `b` is outside of the domain.
    ///
    pub fn interpolate(&self, b: Budget) -> Option<Cost> {
        let (lower, upper) = self.domain();
        if b < lower || b > upper {
            return None;
        }
        self.points
            .iter()
            .tuple_windows()
            .find(|&(_, &(b1, _))| b <= b1)
            .map(|(&(b0, c0), &(b1, c1))| {
                if b == b1 {
                    c1
                } else {
                    c0 + (c1 - c0) * (b - b0) / (b1 - b0)
                }
            })
    }

    ///
    /// Largest `|approx(b) - f(b)|` over `probes` evenly spaced budgets of the domain.
    ///
    pub fn max_error(&self, f: &EdgeCostFunction, probes: usize) -> f64 {
        let (lower, upper) = self.domain();
        linspace(lower, upper, probes.max(2))
            .into_iter()
            .filter_map(|b| self.interpolate(b).map(|c| (c - f.cost(b)).abs()))
            .fold(0.0, f64::max)
    }
}

///
/// `n` evenly spaced values from `lower` to `upper` (both inclusive).
///
pub fn linspace(lower: f64, upper: f64, n: usize) -> Vec<f64> {
    match n {
        0 => return Vec::new(),
        1 => return vec![lower],
        _ => {}
    }
    let step = (upper - lower) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i == n - 1 {
                upper
            } else {
                lower + step * i as f64
            }
        })
        .collect()
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_endpoints() {
        let xs = linspace(0.0, 7.0, 50);
        assert_eq!(xs.len(), 50);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[49], 7.0);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(linspace(1.0, 2.0, 2), vec![1.0, 2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn for_edge_samples_up_to_b_min_plus_slack() {
        let f = EdgeCostFunction::linear(10.0, 2.0, 0.0, 5.0).unwrap();
        let pwl = PiecewiseLinear::for_edge(&f, DEFAULT_SLACK, 50).unwrap();
        assert_eq!(pwl.len(), 50);
        assert_eq!(pwl.domain(), (0.0, 7.0));
        assert_eq!(pwl.cost_range(), (2.0, 10.0));
    }

    #[test]
    fn exact_at_sample_points() {
        let f = EdgeCostFunction::exponential(5.0, 1.0, 1.0, 3.0, 0.7).unwrap();
        let pwl = PiecewiseLinear::for_edge(&f, DEFAULT_SLACK, 13).unwrap();
        for &(b, c) in pwl.points() {
            assert_eq!(c, f.cost(b));
            assert_eq!(pwl.interpolate(b), Some(c));
        }
    }

    #[test]
    fn interpolate_between_points() {
        let f = EdgeCostFunction::linear(10.0, 2.0, 0.0, 4.0).unwrap();
        let pwl = PiecewiseLinear::sample(&f, 0.0, 6.0, 4).unwrap();
        // samples at 0, 2, 4, 6
        assert_eq!(pwl.interpolate(1.0), Some(8.0));
        assert_eq!(pwl.interpolate(5.0), Some(2.0));
        assert_eq!(pwl.interpolate(-0.1), None);
        assert_eq!(pwl.interpolate(6.1), None);
    }

    #[test]
    fn error_shrinks_with_resolution() {
        let f = EdgeCostFunction::exponential(8.0, 1.0, 0.0, 4.0, 1.2).unwrap();
        let errors: Vec<f64> = [5, 10, 20, 40]
            .iter()
            .map(|&n| {
                PiecewiseLinear::for_edge(&f, DEFAULT_SLACK, n)
                    .unwrap()
                    .max_error(&f, 2000)
            })
            .collect();
        println!("{:?}", errors);
        assert!(errors[0] > 0.0);
        assert!(errors.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn invalid_sampling() {
        let f = EdgeCostFunction::linear(10.0, 2.0, -8.0, -5.0).unwrap();
        assert_eq!(
            PiecewiseLinear::for_edge(&f, DEFAULT_SLACK, 10),
            Err(ConfigError::EmptySamplingRange { upper: -3.0 })
        );
        let g = EdgeCostFunction::linear(10.0, 2.0, 0.0, 5.0).unwrap();
        assert_eq!(
            PiecewiseLinear::for_edge(&g, DEFAULT_SLACK, 1),
            Err(ConfigError::ResolutionTooSmall(1))
        );
    }
}
