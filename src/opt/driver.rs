//! Search driver seam and the built-in projected-gradient driver.

use tracing::{debug, trace};

use crate::config::OptimizerSection;
use crate::error::{Error, Result};

use super::gradient::ForwardDifference;
use super::problem::{Evaluation, OptimizationProblem};

/// Merit value standing in for a candidate whose evaluation failed.
///
/// Finite so backtracking arithmetic stays well-defined, large enough that
/// no real design competes with it.
const INFEASIBLE_MERIT: f64 = 1e12;

/// Smallest backtracking step before a line search gives up.
const MIN_STEP: f64 = 1e-6;

/// Converged output of one outer-loop run.
#[derive(Debug, Clone)]
pub struct Convergence {
    /// Final design point in physical units, in variable order.
    pub design_point: Vec<f64>,
    /// Metrics at the final point.
    pub evaluation: Evaluation,
    /// Outer iterations spent.
    pub iterations: usize,
    /// Whether the driver terminated on tolerance rather than the
    /// iteration cap.
    pub converged: bool,
}

/// A black-box search strategy the outer loop injects.
///
/// Given objective and constraint values per candidate (and gradients it
/// obtains however it likes), the driver walks to a converged point or
/// reports failure. Evaluation errors mark single points infeasible and
/// must not abort the run.
pub trait OptimizationDriver {
    /// Minimizes the problem's objective subject to its constraints.
    ///
    /// # Errors
    ///
    /// Returns an error only when no feasible progress is possible at all,
    /// e.g. the initial point cannot be evaluated.
    fn minimize(&self, problem: &dyn OptimizationProblem) -> Result<Convergence>;
}

/// Projected-gradient driver with a quadratic constraint penalty.
///
/// Works in normalized \[0, 1\] coordinates so variables spanning kW and
/// kWh scales condition equally; gradients come from the pluggable
/// forward-difference strategy; bounds are enforced by projection.
#[derive(Debug, Clone)]
pub struct ProjectedGradientDriver {
    /// Maximum outer iterations.
    pub max_iterations: usize,
    /// Relative merit improvement below which the search terminates.
    pub tolerance: f64,
    /// Quadratic penalty weight on constraint violations.
    pub penalty_weight: f64,
    /// Initial line-search step in normalized coordinates.
    pub initial_step: f64,
    /// Gradient strategy.
    pub gradient: ForwardDifference,
}

impl Default for ProjectedGradientDriver {
    fn default() -> Self {
        Self::from_section(&OptimizerSection::default())
    }
}

impl ProjectedGradientDriver {
    /// Builds the driver from its configuration section.
    pub fn from_section(section: &OptimizerSection) -> Self {
        Self {
            max_iterations: section.max_iterations,
            tolerance: section.tolerance,
            penalty_weight: section.penalty_weight,
            initial_step: 0.1,
            gradient: ForwardDifference {
                relative_step: section.fd_relative_step,
            },
        }
    }

    /// Penalized merit of one evaluation.
    fn merit_of(&self, eval: &Evaluation) -> f64 {
        let violation: f64 = eval
            .constraints
            .iter()
            .map(|g| g.max(0.0).powi(2))
            .sum();
        eval.objective + self.penalty_weight * violation
    }
}

impl OptimizationDriver for ProjectedGradientDriver {
    fn minimize(&self, problem: &dyn OptimizationProblem) -> Result<Convergence> {
        let vars = problem.variables();
        if vars.is_empty() {
            return Err(Error::configuration(
                "optimizer.variables",
                "problem registers no design variables",
            ));
        }

        let denormalize = |xn: &[f64]| -> Vec<f64> {
            vars.iter()
                .zip(xn)
                .map(|(v, t)| v.bounds.denormalize(*t))
                .collect()
        };

        // Evaluation failures become a large finite merit so the line
        // search backs away from infeasible regions instead of aborting.
        let mut merit = |xn: &[f64]| -> f64 {
            match problem.evaluate(&denormalize(xn)) {
                Ok(eval) => self.merit_of(&eval),
                Err(err) => {
                    trace!(%err, "candidate marked infeasible");
                    INFEASIBLE_MERIT
                }
            }
        };

        let mut x: Vec<f64> = vars
            .iter()
            .map(|v| v.bounds.normalize(v.init))
            .collect();
        let mut fx = merit(&x);
        if fx >= INFEASIBLE_MERIT {
            return Err(Error::InfeasibleScenario(
                "initial design point cannot be evaluated".to_string(),
            ));
        }

        let mut iterations = 0;
        let mut converged = false;
        for iter in 0..self.max_iterations {
            iterations = iter + 1;
            let grad = self.gradient.gradient(&mut merit, &x, fx);
            let gnorm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
            if gnorm < self.tolerance {
                converged = true;
                break;
            }

            let mut alpha = self.initial_step;
            let mut improved = false;
            while alpha >= MIN_STEP {
                let candidate: Vec<f64> = x
                    .iter()
                    .zip(&grad)
                    .map(|(xi, gi)| (xi - alpha * gi / gnorm).clamp(0.0, 1.0))
                    .collect();
                let fc = merit(&candidate);
                if fc < fx {
                    let delta = fx - fc;
                    x = candidate;
                    fx = fc;
                    improved = true;
                    debug!(iter, merit = fx, step = alpha, "accepted step");
                    if delta <= self.tolerance * fx.abs().max(1.0) {
                        converged = true;
                    }
                    break;
                }
                alpha *= 0.5;
            }

            if !improved {
                // No descent direction at any step length: stationary
                // within line-search resolution.
                converged = true;
                break;
            }
            if converged {
                break;
            }
        }

        let design_point = denormalize(&x);
        let evaluation = problem.evaluate(&design_point)?;
        Ok(Convergence {
            design_point,
            evaluation,
            iterations,
            converged,
        })
    }
}
