//!
//! Edge cost functions.
//!
//! An `EdgeCostFunction` maps the budget allocated to an edge into the cost of traversing it.
//! Every function is defined by
//! * an initial point `(b_init, c_init)`: the least budget the edge can be used with
//! * a minimum point `(b_min, c_min)`: the budget where the cost saturates
//! * `infeasible_cost` returned for any budget below `b_init`
//!
//! and a shape (`CostShape`) that decides how the cost decreases between the two points.
//!
use super::error::ConfigError;
use super::{Budget, Cost};

/// Cost returned for a budget below `b_init` unless overridden
pub const DEFAULT_INFEASIBLE_COST: Cost = 100.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EdgeCostFunction {
    c_init: Cost,
    c_min: Cost,
    b_init: Budget,
    b_min: Budget,
    infeasible_cost: Cost,
    shape: CostShape,
}

/// Shape of the cost curve on `[b_init, inf)`
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CostShape {
    /// `c = slope * b + offset`, clamped to `c_min` for `b >= b_min`
    Linear { slope: f64, offset: f64 },
    /// `c = c_init * exp(-alpha * (b - b_init)) + c_min`
    Exponential { alpha: f64 },
}

/// Variant tag of a cost function, without its parameters
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CostKind {
    Linear,
    Exponential,
}

impl std::fmt::Display for CostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostKind::Linear => write!(f, "linear"),
            CostKind::Exponential => write!(f, "exponential"),
        }
    }
}

impl EdgeCostFunction {
    ///
    /// Linear cost going from `(b_init, c_init)` down to `(b_min, c_min)`.
    ///
    pub fn linear(
        c_init: Cost,
        c_min: Cost,
        b_init: Budget,
        b_min: Budget,
    ) -> Result<EdgeCostFunction, ConfigError> {
        check_finite(c_init, c_min, b_init, b_min)?;
        if b_min == b_init {
            return Err(ConfigError::DegenerateSlope { b_init, b_min });
        }
        if b_min < b_init {
            return Err(ConfigError::InvalidBudgetRange { b_init, b_min });
        }
        let slope = (c_min - c_init) / (b_min - b_init);
        let offset = c_init - slope * b_init;
        Ok(EdgeCostFunction {
            c_init,
            c_min,
            b_init,
            b_min,
            infeasible_cost: DEFAULT_INFEASIBLE_COST,
            shape: CostShape::Linear { slope, offset },
        })
    }

    ///
    /// Exponentially decaying cost with decay rate `alpha`.
    ///
    /// Note that the cost at `b_init` is `c_init + c_min`, and it approaches `c_min` as the budget grows.
    ///
    pub fn exponential(
        c_init: Cost,
        c_min: Cost,
        b_init: Budget,
        b_min: Budget,
        alpha: f64,
    ) -> Result<EdgeCostFunction, ConfigError> {
        check_finite(c_init, c_min, b_init, b_min)?;
        if !alpha.is_finite() {
            return Err(ConfigError::NonFiniteParameter {
                name: "alpha",
                value: alpha,
            });
        }
        if b_min <= b_init {
            return Err(ConfigError::InvalidBudgetRange { b_init, b_min });
        }
        if alpha <= 0.0 {
            return Err(ConfigError::NonPositiveDecay(alpha));
        }
        Ok(EdgeCostFunction {
            c_init,
            c_min,
            b_init,
            b_min,
            infeasible_cost: DEFAULT_INFEASIBLE_COST,
            shape: CostShape::Exponential { alpha },
        })
    }

    /// Replace the cost used for budgets below `b_init`
    pub fn with_infeasible_cost(mut self, infeasible_cost: Cost) -> Result<Self, ConfigError> {
        if !infeasible_cost.is_finite() {
            return Err(ConfigError::NonFiniteParameter {
                name: "infeasible_cost",
                value: infeasible_cost,
            });
        }
        self.infeasible_cost = infeasible_cost;
        Ok(self)
    }

    ///
    /// Cost of the edge when `b` is allocated to it
    ///
    pub fn cost(&self, b: Budget) -> Cost {
        if b < self.b_init {
            return self.infeasible_cost;
        }
        match self.shape {
            CostShape::Linear { slope, offset } => {
                if b >= self.b_min {
                    self.c_min
                } else {
                    slope * b + offset
                }
            }
            CostShape::Exponential { alpha } => {
                self.c_init * (-alpha * (b - self.b_init)).exp() + self.c_min
            }
        }
    }

    /// `cost` applied to each budget in `bs`
    pub fn costs(&self, bs: &[Budget]) -> Vec<Cost> {
        bs.iter().map(|&b| self.cost(b)).collect()
    }

    pub fn c_init(&self) -> Cost {
        self.c_init
    }
    pub fn c_min(&self) -> Cost {
        self.c_min
    }
    pub fn b_init(&self) -> Budget {
        self.b_init
    }
    pub fn b_min(&self) -> Budget {
        self.b_min
    }
    pub fn infeasible_cost(&self) -> Cost {
        self.infeasible_cost
    }
    pub fn shape(&self) -> CostShape {
        self.shape
    }
    pub fn kind(&self) -> CostKind {
        match self.shape {
            CostShape::Linear { .. } => CostKind::Linear,
            CostShape::Exponential { .. } => CostKind::Exponential,
        }
    }
    pub fn slope(&self) -> Option<f64> {
        match self.shape {
            CostShape::Linear { slope, .. } => Some(slope),
            _ => None,
        }
    }
    pub fn offset(&self) -> Option<f64> {
        match self.shape {
            CostShape::Linear { offset, .. } => Some(offset),
            _ => None,
        }
    }
    pub fn alpha(&self) -> Option<f64> {
        match self.shape {
            CostShape::Exponential { alpha } => Some(alpha),
            _ => None,
        }
    }

    ///
    /// Characteristic equation in LaTeX, used only for labeling.
    ///
    pub fn equation(&self) -> &'static str {
        match self.shape {
            CostShape::Linear { .. } => {
                r"$c = \frac{(c_{min}-c_{init})(b - b_{init})}{b_{min}-b_{init}} + c_{init}$"
            }
            CostShape::Exponential { .. } => r"$c = c_{init} e^{-\alpha(b-b_{init})} + c_{min}$",
        }
    }
}

impl std::fmt::Display for EdgeCostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({},{}) -> ({},{})",
            self.kind(),
            self.b_init,
            self.c_init,
            self.b_min,
            self.c_min
        )?;
        if let CostShape::Exponential { alpha } = self.shape {
            write!(f, " alpha={}", alpha)?;
        }
        Ok(())
    }
}

fn check_finite(c_init: Cost, c_min: Cost, b_init: Budget, b_min: Budget) -> Result<(), ConfigError> {
    let params = [
        ("c_init", c_init),
        ("c_min", c_min),
        ("b_init", b_init),
        ("b_min", b_min),
    ];
    match params.iter().find(|(_, v)| !v.is_finite()) {
        Some(&(name, value)) => Err(ConfigError::NonFiniteParameter { name, value }),
        None => Ok(()),
    }
}

//
// tests
//
