//! Heuristic peak-shaving dispatch.
//!
//! On hours where demand exceeds the threshold the battery covers the
//! portion of demand above the threshold not already met by generation; on
//! all other hours available generation is routed into the battery. The
//! battery is never charged from the grid: charging is capped by
//! instantaneous generation and discharging by remaining grid headroom.

use crate::error::{Error, Result};

use super::policy::{DispatchParams, DispatchPolicy};

/// Clamps a power fraction magnitude to the realizable range \[0, 1\].
///
/// Charge and discharge limits are expressed as non-negative magnitudes;
/// the sign is applied by the dispatch rule afterwards.
pub fn enforce_power_fraction_bounds(raw_fraction: f64) -> f64 {
    raw_fraction.clamp(0.0, 1.0)
}

/// Validates that generation never exceeds the grid limit at any hour.
///
/// Run once per evaluation before dispatch; the dispatch engine itself does
/// not re-validate on every call.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if the series differ in length, or
/// [`Error::InfeasibleScenario`] naming the first offending hour.
pub fn check_gen_grid_limit(generation_mw: &[f64], grid_limit_mw: &[f64]) -> Result<()> {
    if generation_mw.len() != grid_limit_mw.len() {
        return Err(Error::dimension_mismatch(
            "generation vs grid limit",
            generation_mw.len(),
            grid_limit_mw.len(),
        ));
    }
    for (t, (generation, limit)) in generation_mw.iter().zip(grid_limit_mw).enumerate() {
        if generation > limit {
            return Err(Error::InfeasibleScenario(format!(
                "generation {generation} MW exceeds grid limit {limit} MW at hour {t}"
            )));
        }
    }
    Ok(())
}

/// Rule-based peak-shaving dispatch policy.
///
/// Memoryless: each hour is decided independently with no lookahead and no
/// state carried between hours. State-of-charge accounting is the
/// responsibility of the plant simulation that consumes the schedule.
#[derive(Debug, Default, Clone, Copy)]
pub struct PeakShavingPolicy;

impl PeakShavingPolicy {
    /// Per-hour charge/discharge fraction limits.
    ///
    /// Charging is bounded by available generation (no charging from the
    /// grid); discharging by remaining grid headroom.
    fn power_fraction_limits(gen_mw: f64, grid_limit_mw: f64, battery_power_mw: f64) -> (f64, f64) {
        let max_charge = enforce_power_fraction_bounds(gen_mw / battery_power_mw);
        let max_discharge =
            enforce_power_fraction_bounds((grid_limit_mw - gen_mw) / battery_power_mw);
        (max_charge, max_discharge)
    }
}

impl DispatchPolicy for PeakShavingPolicy {
    fn compute(
        &self,
        generation_mw: &[f64],
        grid_limit_mw: &[f64],
        goal_power_mw: &[f64],
        params: &DispatchParams,
    ) -> Result<Vec<f64>> {
        let horizon = generation_mw.len();
        if grid_limit_mw.len() != horizon {
            return Err(Error::dimension_mismatch(
                "dispatch input series (grid limit)",
                horizon,
                grid_limit_mw.len(),
            ));
        }
        if goal_power_mw.len() != horizon {
            return Err(Error::dimension_mismatch(
                "dispatch input series (goal power)",
                horizon,
                goal_power_mw.len(),
            ));
        }

        let threshold_mw = params.threshold_mw();
        let power_mw = params.battery_power_mw();
        let mut fixed_dispatch = Vec::with_capacity(horizon);

        for t in 0..horizon {
            let generation = generation_mw[t];
            let (max_charge, max_discharge) =
                Self::power_fraction_limits(generation, grid_limit_mw[t], power_mw);

            // Peak hours use the battery as the marginal source; this can
            // still mean charging when generation exceeds the peak target.
            // The comparison is strictly `>`: a goal exactly at the
            // threshold charges opportunistically like any off-peak hour.
            let mut fd = if goal_power_mw[t] > threshold_mw {
                (goal_power_mw[t] - threshold_mw - generation) / power_mw
            } else {
                -generation / power_mw
            };

            if fd > 0.0 {
                // Discharging
                if fd > max_discharge {
                    fd = max_discharge;
                }
            } else if fd < 0.0 {
                // Charging
                if -fd > max_charge {
                    fd = -max_charge;
                }
            }
            fixed_dispatch.push(fd);
        }

        Ok(fixed_dispatch)
    }
}
