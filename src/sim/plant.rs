//! Hour-by-hour plant simulation.
//!
//! Consumes the fixed dispatch schedule produced by a policy and applies the
//! battery's energy constraints: the schedule says what the controller
//! wants, the state-of-charge walk says what the battery can deliver.

use crate::dispatch::{DispatchParams, DispatchPolicy};
use crate::error::Result;
use crate::scenario::{DT_HOURS, ScenarioContext};

/// Battery operating parameters independent of sizing.
#[derive(Debug, Clone, Copy)]
pub struct BatteryOperation {
    /// Charge efficiency (0.0–1.0].
    pub eta_charge: f64,
    /// Discharge efficiency (0.0–1.0].
    pub eta_discharge: f64,
    /// State of charge at hour zero (0.0–1.0).
    pub initial_soc: f64,
}

impl Default for BatteryOperation {
    fn default() -> Self {
        Self {
            eta_charge: 0.95,
            eta_discharge: 0.95,
            initial_soc: 0.5,
        }
    }
}

/// One simulated hour of the plant.
#[derive(Debug, Clone)]
pub struct HourRecord {
    /// Combined non-dispatchable generation (MW).
    pub generation_mw: f64,
    /// Demand/goal power (MW).
    pub goal_mw: f64,
    /// Scheduled dispatch fraction in \[-1, 1\] before energy clipping.
    pub dispatch_fraction: f64,
    /// Realized battery power after energy clipping (MW; positive =
    /// discharging, negative = charging).
    pub battery_mw: f64,
    /// State of charge after this hour (0.0–1.0).
    pub soc: f64,
    /// Demand not met by generation plus storage (MW).
    pub shortfall_mw: f64,
    /// Generation neither delivered nor stored (MW).
    pub curtailed_mw: f64,
}

/// Runs the dispatch policy over the full horizon and walks the battery
/// state of charge hour by hour.
///
/// `generation_mw` must be aligned with the scenario series; the caller is
/// responsible for the generation-vs-grid-limit check before dispatch.
///
/// # Errors
///
/// Propagates dispatch errors ([`crate::error::Error::DimensionMismatch`]).
pub fn run_horizon(
    generation_mw: &[f64],
    scenario: &ScenarioContext,
    policy: &dyn DispatchPolicy,
    params: &DispatchParams,
    battery_energy_mwh: f64,
    battery: &BatteryOperation,
) -> Result<Vec<HourRecord>> {
    let schedule = policy.compute(
        generation_mw,
        scenario.grid_limit_mw(),
        scenario.demand_mw(),
        params,
    )?;

    let power_mw = params.battery_power_mw();
    let mut soc = battery.initial_soc;
    let mut records = Vec::with_capacity(schedule.len());

    for (t, fraction) in schedule.iter().enumerate() {
        let generation = generation_mw[t];
        let goal = scenario.demand_mw()[t];
        let requested_mw = fraction * power_mw;

        let battery_mw = if battery_energy_mwh <= 0.0 {
            0.0
        } else if requested_mw > 0.0 {
            // Discharging, limited by stored energy
            let max_mw = (soc * battery_energy_mwh * battery.eta_discharge / DT_HOURS).max(0.0);
            let actual = requested_mw.min(max_mw);
            soc -= actual * DT_HOURS / (battery_energy_mwh * battery.eta_discharge);
            actual
        } else if requested_mw < 0.0 {
            // Charging, limited by remaining capacity
            let max_mw = ((1.0 - soc) * battery_energy_mwh / battery.eta_charge / DT_HOURS).max(0.0);
            let actual = (-requested_mw).min(max_mw);
            soc += actual * DT_HOURS * battery.eta_charge / battery_energy_mwh;
            -actual
        } else {
            0.0
        };
        soc = soc.clamp(0.0, 1.0);

        let supply_mw = generation + battery_mw;
        let shortfall_mw = (goal - supply_mw).max(0.0);
        let curtailed_mw = (supply_mw - goal).max(0.0);

        records.push(HourRecord {
            generation_mw: generation,
            goal_mw: goal,
            dispatch_fraction: *fraction,
            battery_mw,
            soc,
            shortfall_mw,
            curtailed_mw,
        });
    }

    Ok(records)
}
