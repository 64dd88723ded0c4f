//! Outer design-optimization loop: variables, constraints, and the search
//! driver seam.

pub mod driver;
/// Pluggable finite-difference gradients.
pub mod gradient;
pub mod problem;
pub mod resilience;

pub use driver::{Convergence, OptimizationDriver, ProjectedGradientDriver};
pub use gradient::ForwardDifference;
pub use problem::{Bounds, DesignProblem, DesignVariable, Evaluation, OptimizationProblem};
pub use resilience::battery_duration_hours;
