//! Human-readable summary of a completed case sweep.

use std::fmt;

use crate::cases::{select_best, CaseResult};

/// Aggregate view over every converged case, ready for printing.
#[derive(Debug, Clone)]
pub struct SweepReport {
    results: Vec<CaseResult>,
}

impl SweepReport {
    pub fn from_results(results: &[CaseResult]) -> Self {
        Self {
            results: results.to_vec(),
        }
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Sweep Report ---")?;
        if self.results.is_empty() {
            return write!(f, "no cases converged");
        }
        for r in &self.results {
            writeln!(
                f,
                "{:>6.0} kW threshold | PV {:>7.1} kW | wind {:>7.1} kW | battery {:>8.1} kWh | LCOE {:.4} USD/kWh | missed peak {:.2} kW",
                r.case.threshold_kw,
                r.technologies.pv_rating_kw,
                r.technologies.wind_rating_kw,
                r.technologies.battery_energy_kwh,
                r.lcoe_real,
                r.avg_missed_peak_load
            )?;
        }
        match select_best(&self.results) {
            Some(best) => write!(
                f,
                "best: {:.0} kW threshold at {:.4} USD/kWh",
                best.case.threshold_kw, best.lcoe_real
            ),
            None => write!(f, "no cases converged"),
        }
    }
}
