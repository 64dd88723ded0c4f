//! TOML-based study configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level study configuration parsed from TOML.
///
/// All fields have defaults matching the baseline study. Load from TOML with
/// [`StudyConfig::from_toml_file`] or use [`StudyConfig::baseline`] for the
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Horizon, seed, and grid interconnection parameters.
    #[serde(default)]
    pub simulation: SimulationSection,
    /// Demand profile source and synthetic-shape parameters.
    #[serde(default)]
    pub demand: DemandSection,
    /// Synthetic solar capacity-factor parameters.
    #[serde(default)]
    pub solar: SolarSection,
    /// Synthetic wind capacity-factor parameters.
    #[serde(default)]
    pub wind: WindSection,
    /// Plant sizing bounds, initial point, and battery operation parameters.
    #[serde(default)]
    pub plant: PlantSection,
    /// Annualized-cost financial model parameters.
    #[serde(default)]
    pub financial: FinancialSection,
    /// Outer-loop search parameters.
    #[serde(default)]
    pub optimizer: OptimizerSection,
    /// Case-sweep scenario grid.
    #[serde(default)]
    pub sweep: SweepSection,
}

/// Horizon, seed, and grid interconnection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Number of simulated hours (must be > 0; typically 8760).
    pub horizon_hours: usize,
    /// Master random seed for synthetic resource profiles.
    pub seed: u64,
    /// Grid interconnection limit (kW).
    pub interconnect_kw: f64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            horizon_hours: 8760,
            seed: 42,
            interconnect_kw: 20_000.0,
        }
    }
}

/// Demand profile source and synthetic-shape parameters.
///
/// When `csv_path` is set the demand series is read from a headerless
/// single-column CSV of hourly kW values; otherwise a seeded sinusoidal
/// profile is synthesized.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandSection {
    /// Optional path to a headerless single-column CSV of hourly kW values.
    pub csv_path: Option<String>,
    /// Synthetic baseline demand (kW).
    pub base_kw: f64,
    /// Synthetic daily sinusoidal amplitude (kW).
    pub amp_kw: f64,
    /// Gaussian noise standard deviation as a fraction of demand.
    pub noise_std: f64,
}

impl Default for DemandSection {
    fn default() -> Self {
        Self {
            csv_path: None,
            base_kw: 400.0,
            amp_kw: 250.0,
            noise_std: 0.02,
        }
    }
}

/// Synthetic solar capacity-factor parameters (half-cosine daylight shape).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarSection {
    /// Hour of day when sunrise occurs (inclusive).
    pub sunrise_hr: usize,
    /// Hour of day when sunset occurs (exclusive).
    pub sunset_hr: usize,
    /// Gaussian noise standard deviation applied to the clear-sky shape.
    pub noise_std: f64,
}

impl Default for SolarSection {
    fn default() -> Self {
        Self {
            sunrise_hr: 6,
            sunset_hr: 18,
            noise_std: 0.05,
        }
    }
}

/// Synthetic wind capacity-factor parameters (AR(1) process).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindSection {
    /// Long-run mean capacity factor (0.0–1.0).
    pub mean_cf: f64,
    /// AR(1) correlation coefficient (0.0 = uncorrelated, 1.0 = persistent).
    pub alpha: f64,
    /// Standard deviation of the AR(1) innovation noise.
    pub noise_std: f64,
}

impl Default for WindSection {
    fn default() -> Self {
        Self {
            mean_cf: 0.35,
            alpha: 0.9,
            noise_std: 0.1,
        }
    }
}

/// Plant sizing bounds, initial point, and battery operation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantSection {
    /// PV rating lower bound (kW).
    pub pv_min_kw: f64,
    /// PV rating upper bound (kW).
    pub pv_max_kw: f64,
    /// Initial PV rating proposed to the driver (kW).
    pub pv_init_kw: f64,
    /// Wind rating lower bound (kW).
    pub wind_min_kw: f64,
    /// Wind rating upper bound (kW).
    pub wind_max_kw: f64,
    /// Initial wind rating proposed to the driver (kW).
    pub wind_init_kw: f64,
    /// Battery charge efficiency (0.0–1.0).
    pub battery_eta_charge: f64,
    /// Battery discharge efficiency (0.0–1.0).
    pub battery_eta_discharge: f64,
    /// Battery initial state of charge (0.0–1.0).
    pub battery_initial_soc: f64,
}

impl Default for PlantSection {
    fn default() -> Self {
        Self {
            pv_min_kw: 100.0,
            pv_max_kw: 10_000.0,
            pv_init_kw: 2000.0,
            wind_min_kw: 100.0,
            wind_max_kw: 10_000.0,
            wind_init_kw: 1500.0,
            battery_eta_charge: 0.95,
            battery_eta_discharge: 0.95,
            battery_initial_soc: 0.5,
        }
    }
}

/// Annualized-cost financial model parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialSection {
    /// PV capital cost (USD per kW).
    pub pv_capex_per_kw: f64,
    /// Wind capital cost (USD per kW).
    pub wind_capex_per_kw: f64,
    /// Battery power capital cost (USD per kW).
    pub battery_capex_per_kw: f64,
    /// Battery energy capital cost (USD per kWh).
    pub battery_capex_per_kwh: f64,
    /// Fixed charge rate annualizing capital cost.
    pub fixed_charge_rate: f64,
    /// Annual O&M cost as a fraction of capital cost.
    pub om_fraction: f64,
}

impl Default for FinancialSection {
    fn default() -> Self {
        Self {
            pv_capex_per_kw: 1100.0,
            wind_capex_per_kw: 1500.0,
            battery_capex_per_kw: 300.0,
            battery_capex_per_kwh: 250.0,
            fixed_charge_rate: 0.071,
            om_fraction: 0.02,
        }
    }
}

/// Outer-loop search parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerSection {
    /// Maximum outer-loop iterations.
    pub max_iterations: usize,
    /// Relative merit improvement below which the search terminates.
    pub tolerance: f64,
    /// Quadratic penalty weight applied to constraint violations.
    pub penalty_weight: f64,
    /// Relative step for forward-difference gradients.
    pub fd_relative_step: f64,
    /// Reference value dividing the LCOE objective for conditioning.
    pub objective_ref: f64,
}

impl Default for OptimizerSection {
    fn default() -> Self {
        Self {
            max_iterations: 60,
            tolerance: 1e-4,
            penalty_weight: 1e3,
            fd_relative_step: 1e-3,
            objective_ref: 1e-2,
        }
    }
}

/// Case-sweep scenario grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSection {
    /// Peak-shaving thresholds to sweep (kW).
    pub thresholds_kw: Vec<f64>,
    /// Fraction of the threshold that must be met on peak hours (0.0–1.0).
    pub peak_req: f64,
    /// Battery duration lower bound (hours).
    pub battery_hrs_lower: f64,
    /// Battery duration upper bound (hours).
    pub battery_hrs_upper: f64,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            thresholds_kw: vec![200.0, 400.0, 600.0, 800.0],
            peak_req: 0.95,
            battery_hrs_lower: 5.0,
            battery_hrs_upper: 10.0,
        }
    }
}

impl StudyConfig {
    /// Returns the baseline study configuration.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationSection::default(),
            demand: DemandSection::default(),
            solar: SolarSection::default(),
            wind: WindSection::default(),
            plant: PlantSection::default(),
            financial: FinancialSection::default(),
            optimizer: OptimizerSection::default(),
            sweep: SweepSection::default(),
        }
    }

    /// Returns the high-renewables preset: longer daylight window, windier
    /// site, larger sizing headroom.
    pub fn high_renewables() -> Self {
        Self {
            solar: SolarSection {
                sunrise_hr: 5,
                sunset_hr: 19,
                ..SolarSection::default()
            },
            wind: WindSection {
                mean_cf: 0.45,
                noise_std: 0.12,
                ..WindSection::default()
            },
            plant: PlantSection {
                pv_max_kw: 20_000.0,
                wind_max_kw: 20_000.0,
                ..PlantSection::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "high_renewables"];

    /// Loads a study configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "high_renewables" => Ok(Self::high_renewables()),
            _ => Err(Error::configuration(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a study configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read or the
    /// TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::configuration("study", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a study configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the TOML is invalid or contains
    /// unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::configuration("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<Error> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.horizon_hours == 0 {
            errors.push(Error::configuration(
                "simulation.horizon_hours",
                "must be > 0",
            ));
        }
        if s.interconnect_kw <= 0.0 {
            errors.push(Error::configuration(
                "simulation.interconnect_kw",
                "must be > 0",
            ));
        }

        let sol = &self.solar;
        if sol.sunrise_hr >= sol.sunset_hr {
            errors.push(Error::configuration(
                "solar.sunrise_hr",
                "must be < solar.sunset_hr",
            ));
        }
        if sol.sunset_hr > 24 {
            errors.push(Error::configuration("solar.sunset_hr", "must be <= 24"));
        }

        let w = &self.wind;
        if !(0.0..=1.0).contains(&w.mean_cf) {
            errors.push(Error::configuration("wind.mean_cf", "must be in [0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&w.alpha) {
            errors.push(Error::configuration("wind.alpha", "must be in [0.0, 1.0]"));
        }

        let p = &self.plant;
        if p.pv_min_kw > p.pv_max_kw {
            errors.push(Error::configuration(
                "plant.pv_min_kw",
                "must be <= plant.pv_max_kw",
            ));
        }
        if p.wind_min_kw > p.wind_max_kw {
            errors.push(Error::configuration(
                "plant.wind_min_kw",
                "must be <= plant.wind_max_kw",
            ));
        }
        for (field, eta) in [
            ("plant.battery_eta_charge", p.battery_eta_charge),
            ("plant.battery_eta_discharge", p.battery_eta_discharge),
        ] {
            if !(eta > 0.0 && eta <= 1.0) {
                errors.push(Error::configuration(field, "must be in (0.0, 1.0]"));
            }
        }
        if !(0.0..=1.0).contains(&p.battery_initial_soc) {
            errors.push(Error::configuration(
                "plant.battery_initial_soc",
                "must be in [0.0, 1.0]",
            ));
        }

        let f = &self.financial;
        if f.fixed_charge_rate <= 0.0 {
            errors.push(Error::configuration(
                "financial.fixed_charge_rate",
                "must be > 0",
            ));
        }

        let o = &self.optimizer;
        if o.max_iterations == 0 {
            errors.push(Error::configuration(
                "optimizer.max_iterations",
                "must be > 0",
            ));
        }
        if o.fd_relative_step <= 0.0 {
            errors.push(Error::configuration(
                "optimizer.fd_relative_step",
                "must be > 0",
            ));
        }
        if o.objective_ref <= 0.0 {
            errors.push(Error::configuration(
                "optimizer.objective_ref",
                "must be > 0",
            ));
        }

        let sw = &self.sweep;
        if sw.thresholds_kw.is_empty() {
            errors.push(Error::configuration(
                "sweep.thresholds_kw",
                "must name at least one threshold",
            ));
        }
        if sw.thresholds_kw.iter().any(|t| *t <= 0.0) {
            errors.push(Error::configuration(
                "sweep.thresholds_kw",
                "thresholds must be > 0",
            ));
        }
        if !(0.0..=1.0).contains(&sw.peak_req) {
            errors.push(Error::configuration(
                "sweep.peak_req",
                "must be in [0.0, 1.0]",
            ));
        }
        if sw.battery_hrs_lower > sw.battery_hrs_upper {
            errors.push(Error::configuration(
                "sweep.battery_hrs_lower",
                "must be <= sweep.battery_hrs_upper",
            ));
        }

        errors
    }
}
