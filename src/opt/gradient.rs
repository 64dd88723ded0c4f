//! Forward-difference gradient strategy.
//!
//! Kept as an explicit, configurable strategy rather than a detail baked
//! into the driver, so a driver that can consume analytic gradients later
//! swaps this out without touching the objective contract.

/// Forward-difference gradient with a configurable relative step.
#[derive(Debug, Clone, Copy)]
pub struct ForwardDifference {
    /// Step size relative to `max(|x_i|, 1)`.
    pub relative_step: f64,
}

impl Default for ForwardDifference {
    fn default() -> Self {
        Self {
            relative_step: 1e-3,
        }
    }
}

impl ForwardDifference {
    /// Approximates the gradient of `f` at `x` given `fx = f(x)`.
    ///
    /// One extra evaluation per dimension; no central differencing.
    pub fn gradient(
        &self,
        f: &mut dyn FnMut(&[f64]) -> f64,
        x: &[f64],
        fx: f64,
    ) -> Vec<f64> {
        let mut grad = Vec::with_capacity(x.len());
        let mut probe = x.to_vec();
        for i in 0..x.len() {
            let h = self.relative_step * x[i].abs().max(1.0);
            probe[i] = x[i] + h;
            let fi = f(&probe);
            probe[i] = x[i];
            grad.push((fi - fx) / h);
        }
        grad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_of_quadratic_is_accurate() {
        let fd = ForwardDifference {
            relative_step: 1e-6,
        };
        let mut f = |x: &[f64]| x[0] * x[0] + 3.0 * x[1];
        let x = [2.0, -1.0];
        let fx = f(&x);
        let g = fd.gradient(&mut f, &x, fx);
        assert!((g[0] - 4.0).abs() < 1e-4);
        assert!((g[1] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn step_scales_with_coordinate_magnitude() {
        // A function sensitive to tiny absolute steps at large x still
        // differentiates cleanly with the relative step.
        let fd = ForwardDifference {
            relative_step: 1e-6,
        };
        let mut f = |x: &[f64]| 0.5 * x[0];
        let x = [1e6];
        let fx = f(&x);
        let g = fd.gradient(&mut f, &x, fx);
        assert!((g[0] - 0.5).abs() < 1e-6);
    }
}
