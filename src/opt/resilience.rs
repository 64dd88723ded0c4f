//! Resilience metrics derived from sizing alone, with no simulation cost.

use crate::error::{Error, Result};

/// Battery duration in hours: energy capacity over power rating.
///
/// Cheap enough for the outer loop to evaluate as a constraint on every
/// iteration without a full-horizon run.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when `battery_power_kw` is zero (the
/// duration is undefined), rather than producing `inf` or `NaN`.
pub fn battery_duration_hours(battery_power_kw: f64, battery_energy_kwh: f64) -> Result<f64> {
    if battery_power_kw == 0.0 {
        return Err(Error::configuration(
            "battery.power_kw",
            "duration undefined for zero battery power",
        ));
    }
    Ok(battery_energy_kwh / battery_power_kw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_times_power_recovers_energy() {
        for (p, e) in [(100.0, 500.0), (250.0, 1000.0), (800.0, 4800.0)] {
            let hours = battery_duration_hours(p, e).expect("duration defined");
            assert!((hours * p - e).abs() < 1e-9);
        }
    }

    #[test]
    fn duration_is_idempotent() {
        let a = battery_duration_hours(200.0, 1500.0).expect("duration");
        let b = battery_duration_hours(200.0, 1500.0).expect("duration");
        assert_eq!(a, b);
    }

    #[test]
    fn zero_power_fails_without_producing_inf() {
        let err = battery_duration_hours(0.0, 500.0).expect_err("must fail");
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
