//! Candidate design points and the scalar metrics a simulation reduces to.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One candidate plant sizing proposed by the outer loop.
///
/// Battery energy over battery power defines the battery duration in hours;
/// the two are never optimized independently once both are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParameters {
    /// PV rating (kW).
    pub pv_rating_kw: f64,
    /// Wind rating (kW).
    pub wind_rating_kw: f64,
    /// Battery power rating (kW).
    pub battery_power_kw: f64,
    /// Battery energy capacity (kWh).
    pub battery_energy_kwh: f64,
}

impl DesignParameters {
    /// Validates that all ratings are finite and non-negative.
    ///
    /// Zero battery power is legal here; operations that divide by it
    /// (dispatch, duration) fail with their own [`Error::Configuration`].
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("design.pv_rating_kw", self.pv_rating_kw),
            ("design.wind_rating_kw", self.wind_rating_kw),
            ("design.battery_power_kw", self.battery_power_kw),
            ("design.battery_energy_kwh", self.battery_energy_kwh),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::configuration(
                    field,
                    format!("must be finite and >= 0, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Scalar metrics reduced from one full-horizon simulation.
///
/// Recomputed fresh on every evaluation; nothing is cached across design
/// points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Percentage (0–100) of total demand energy unserved.
    pub missed_load_perc: f64,
    /// Mean shortfall (kW) over hours where demand exceeds supply.
    pub avg_missed_peak_load: f64,
    /// Real levelized cost of energy (USD/kWh).
    pub lcoe_real: f64,
    /// Total curtailed generation, summed over hours (kW).
    pub curtailed: f64,
}

impl SimulationResult {
    /// True when every metric is finite.
    pub fn is_finite(&self) -> bool {
        self.missed_load_perc.is_finite()
            && self.avg_missed_peak_load.is_finite()
            && self.lcoe_real.is_finite()
            && self.curtailed.is_finite()
    }
}
