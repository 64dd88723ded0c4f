//! Shared test fixtures for integration tests.

use std::path::PathBuf;

use hpp_opt::config::StudyConfig;
use hpp_opt::dispatch::PeakShavingPolicy;
use hpp_opt::scenario::ScenarioContext;
use hpp_opt::sim::{AnnualSimulation, AnnualizedCostModel, BatteryOperation};

/// Small deterministic study: 72 hours, seed 42, two sweep thresholds,
/// a short optimizer budget.
pub fn small_config() -> StudyConfig {
    let mut cfg = StudyConfig::baseline();
    cfg.simulation.horizon_hours = 72;
    cfg.simulation.seed = 42;
    cfg.optimizer.max_iterations = 8;
    cfg.sweep.thresholds_kw = vec![200.0, 400.0];
    cfg
}

/// Scenario context built from [`small_config`].
pub fn small_scenario() -> ScenarioContext {
    ScenarioContext::from_config(&small_config()).expect("small scenario should build")
}

/// Annual simulation over `scenario` for one threshold, wired with the
/// config's financial model and battery parameters.
pub fn simulation<'a>(
    scenario: &'a ScenarioContext,
    config: &StudyConfig,
    threshold_kw: f64,
) -> AnnualSimulation<'a> {
    AnnualSimulation::new(
        scenario,
        Box::new(PeakShavingPolicy),
        Box::new(AnnualizedCostModel::from_section(&config.financial)),
        threshold_kw,
        BatteryOperation {
            eta_charge: config.plant.battery_eta_charge,
            eta_discharge: config.plant.battery_eta_discharge,
            initial_soc: config.plant.battery_initial_soc,
        },
    )
}

/// Per-process temporary directory for persistence tests.
pub fn temp_out_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("hpp-opt-{tag}-{}", std::process::id()))
}
