//! Dispatch policy contract and shared per-run parameters.

use crate::error::{Error, Result};

/// Validated parameters shared by all dispatch policies for one horizon run.
///
/// The peak-shaving threshold is configured in kW but compared against
/// demand series expressed in MW, so the kW→MW conversion happens exactly
/// once, here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchParams {
    threshold_mw: f64,
    battery_power_mw: f64,
}

impl DispatchParams {
    /// Creates dispatch parameters from physical ratings in kW.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `threshold_kw` is negative or not
    /// finite, or if `battery_power_kw` is zero, negative, or not finite
    /// (the dispatch rule divides by battery power).
    pub fn new(threshold_kw: f64, battery_power_kw: f64) -> Result<Self> {
        if !threshold_kw.is_finite() || threshold_kw < 0.0 {
            return Err(Error::configuration(
                "dispatch.threshold_kw",
                format!("must be finite and >= 0, got {threshold_kw}"),
            ));
        }
        if !battery_power_kw.is_finite() || battery_power_kw <= 0.0 {
            return Err(Error::configuration(
                "dispatch.battery_power_kw",
                format!("must be finite and > 0, got {battery_power_kw}"),
            ));
        }
        Ok(Self {
            threshold_mw: threshold_kw / 1000.0,
            battery_power_mw: battery_power_kw / 1000.0,
        })
    }

    /// Peak-shaving threshold in MW.
    pub fn threshold_mw(&self) -> f64 {
        self.threshold_mw
    }

    /// Battery power rating in MW.
    pub fn battery_power_mw(&self) -> f64 {
        self.battery_power_mw
    }
}

/// A dispatch policy converts aligned hourly series into a fixed
/// charge/discharge schedule for the full horizon.
///
/// Returned values are signed power fractions in \[-1, 1\] relative to the
/// battery power rating: negative = charging, positive = discharging.
/// Implementations must not mutate their inputs and must not carry state
/// between calls.
pub trait DispatchPolicy {
    /// Computes the fixed dispatch schedule.
    ///
    /// # Arguments
    ///
    /// * `generation_mw` - Combined non-dispatchable generation per hour (MW)
    /// * `grid_limit_mw` - Grid interconnection limit per hour (MW)
    /// * `goal_power_mw` - Demand/goal power per hour (MW)
    /// * `params` - Validated threshold and battery rating
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the input series are not all
    /// the same length.
    fn compute(
        &self,
        generation_mw: &[f64],
        grid_limit_mw: &[f64],
        goal_power_mw: &[f64],
        params: &DispatchParams,
    ) -> Result<Vec<f64>>;
}
