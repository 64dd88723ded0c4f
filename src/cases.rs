//! Case sweep: parameterized scenarios, persistence, and best-case selection.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{StudyConfig, SweepSection};
use crate::dispatch::PeakShavingPolicy;
use crate::error::{Error, Result};
use crate::opt::{DesignProblem, OptimizationDriver, ProjectedGradientDriver};
use crate::scenario::ScenarioContext;
use crate::sim::{AnnualSimulation, AnnualizedCostModel, BatteryOperation, DesignParameters};

/// Battery duration bounds for one case (hours).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryHours {
    /// Lower bound (hours).
    pub lower: f64,
    /// Upper bound (hours).
    pub upper: f64,
}

/// One scenario of the case sweep. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSpec {
    /// Peak-shaving threshold (kW).
    pub threshold_kw: f64,
    /// Fraction of the threshold that must be met on peak hours.
    pub peak_req: f64,
    /// Battery duration bounds (hours).
    pub battery_hrs: BatteryHours,
}

/// Converged outcome of one case, persisted as one JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// The originating case, echoed verbatim.
    pub case: CaseSpec,
    /// Resolved technology capacities.
    pub technologies: DesignParameters,
    /// Real LCOE at the converged design (USD/kWh).
    pub lcoe_real: f64,
    /// Mean missed peak load at the converged design (kW).
    pub avg_missed_peak_load: f64,
}

/// Builds the sweep's named cases, one per configured threshold, in
/// configuration order.
pub fn create_cases(sweep: &SweepSection) -> Vec<(String, CaseSpec)> {
    sweep
        .thresholds_kw
        .iter()
        .map(|&threshold_kw| {
            (
                format!("{}kw_threshold", threshold_kw as i64),
                CaseSpec {
                    threshold_kw,
                    peak_req: sweep.peak_req,
                    battery_hrs: BatteryHours {
                        lower: sweep.battery_hrs_lower,
                        upper: sweep.battery_hrs_upper,
                    },
                },
            )
        })
        .collect()
}

/// Runs every case to convergence and persists each result.
///
/// Results come back in input order. A case whose optimization fails is
/// logged at warn and skipped; sibling cases are unaffected.
///
/// # Errors
///
/// Returns [`Error::Persistence`] only when the output directory itself
/// cannot be created.
pub fn run_cases(
    cases: &[(String, CaseSpec)],
    scenario: &ScenarioContext,
    config: &StudyConfig,
    out_dir: &Path,
) -> Result<Vec<CaseResult>> {
    fs::create_dir_all(out_dir)
        .map_err(|e| Error::persistence(out_dir, format!("cannot create output directory: {e}")))?;

    let driver = ProjectedGradientDriver::from_section(&config.optimizer);
    let battery = BatteryOperation {
        eta_charge: config.plant.battery_eta_charge,
        eta_discharge: config.plant.battery_eta_discharge,
        initial_soc: config.plant.battery_initial_soc,
    };

    let mut results = Vec::with_capacity(cases.len());
    for (name, case) in cases {
        info!(case = %name, threshold_kw = case.threshold_kw, "running case");

        let simulation = AnnualSimulation::new(
            scenario,
            Box::new(PeakShavingPolicy),
            Box::new(AnnualizedCostModel::from_section(&config.financial)),
            case.threshold_kw,
            battery,
        );
        let problem = DesignProblem::new(&simulation, case, &config.plant, &config.optimizer);

        let convergence = match driver.minimize(&problem) {
            Ok(c) => c,
            Err(err) => {
                warn!(case = %name, %err, "case failed, skipping");
                continue;
            }
        };
        let technologies = match problem.design_from(&convergence.design_point) {
            Ok(d) => d,
            Err(err) => {
                warn!(case = %name, %err, "case produced an unusable design point, skipping");
                continue;
            }
        };

        let result = CaseResult {
            case: case.clone(),
            technologies,
            lcoe_real: convergence.evaluation.result.lcoe_real,
            avg_missed_peak_load: convergence.evaluation.result.avg_missed_peak_load,
        };

        let path = case_file_path(out_dir, name);
        if let Err(err) = write_result(&path, &result) {
            warn!(case = %name, %err, "case result could not be persisted, skipping");
            continue;
        }

        info!(
            case = %name,
            lcoe_real = result.lcoe_real,
            iterations = convergence.iterations,
            converged = convergence.converged,
            "case complete"
        );
        results.push(result);
    }
    Ok(results)
}

/// Returns the minimum-LCOE result; first-seen wins ties.
pub fn select_best(results: &[CaseResult]) -> Option<&CaseResult> {
    let mut best: Option<&CaseResult> = None;
    for result in results {
        match best {
            Some(b) if result.lcoe_real >= b.lcoe_real => {}
            _ => best = Some(result),
        }
    }
    best
}

/// Loads all persisted case results from a directory.
///
/// Order follows the directory listing, which is not guaranteed sorted.
///
/// # Errors
///
/// Returns [`Error::Persistence`] when the directory cannot be read or a
/// case file fails to deserialize.
pub fn load_results(dir: &Path) -> Result<Vec<CaseResult>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| Error::persistence(dir, format!("cannot read directory: {e}")))?;

    let mut results = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::persistence(dir, format!("cannot read entry: {e}")))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::persistence(&path, e.to_string()))?;
        let result: CaseResult = serde_json::from_str(&content)
            .map_err(|e| Error::persistence(&path, e.to_string()))?;
        results.push(result);
    }
    Ok(results)
}

/// File path for one case's persisted result.
fn case_file_path(out_dir: &Path, name: &str) -> std::path::PathBuf {
    out_dir.join(format!("{name}.json"))
}

fn write_result(path: &Path, result: &CaseResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| Error::persistence(path, e.to_string()))?;
    fs::write(path, json).map_err(|e| Error::persistence(path, e.to_string()))
}
