//! Immutable scenario context: the aligned hourly series one study runs on.
//!
//! Constructed once per process and read-only thereafter; every candidate
//! design evaluated by the outer loop shares the same context, so evaluations
//! never mutate shared state.

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::StudyConfig;
use crate::error::{Error, Result};
use crate::sim::DesignParameters;

/// Hours per simulated timestep. The horizon is hourly throughout.
pub const DT_HOURS: f64 = 1.0;

/// Seed offset for the wind RNG to avoid correlation with solar noise.
const WIND_SEED_OFFSET: u64 = 1;
/// Seed offset for the synthetic demand RNG.
const DEMAND_SEED_OFFSET: u64 = 2;

/// Aligned hourly series for one study site.
///
/// Capacity factors are per-unit of the respective rating; demand and the
/// grid limit are in MW. All series share the same length and hour
/// alignment, enforced at construction.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    solar_cf: Vec<f64>,
    wind_cf: Vec<f64>,
    demand_mw: Vec<f64>,
    grid_limit_mw: Vec<f64>,
}

impl ScenarioContext {
    /// Creates a context from pre-built series.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the series differ in length
    /// and [`Error::Configuration`] if they are empty.
    pub fn new(
        solar_cf: Vec<f64>,
        wind_cf: Vec<f64>,
        demand_mw: Vec<f64>,
        grid_limit_mw: Vec<f64>,
    ) -> Result<Self> {
        let horizon = solar_cf.len();
        if horizon == 0 {
            return Err(Error::configuration(
                "scenario.horizon",
                "series must not be empty",
            ));
        }
        for (name, len) in [
            ("wind capacity factors", wind_cf.len()),
            ("demand", demand_mw.len()),
            ("grid limit", grid_limit_mw.len()),
        ] {
            if len != horizon {
                return Err(Error::dimension_mismatch(name, horizon, len));
            }
        }
        Ok(Self {
            solar_cf,
            wind_cf,
            demand_mw,
            grid_limit_mw,
        })
    }

    /// Builds the context described by a study configuration.
    ///
    /// Demand comes from the configured CSV when present, otherwise from the
    /// seeded synthetic profile. Resource capacity factors are always
    /// synthetic, seeded from the master seed with per-series offsets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the demand CSV cannot be read or
    /// is shorter than the horizon.
    pub fn from_config(cfg: &StudyConfig) -> Result<Self> {
        let horizon = cfg.simulation.horizon_hours;
        let seed = cfg.simulation.seed;

        let solar_cf = solar_capacity_factors(
            horizon,
            cfg.solar.sunrise_hr,
            cfg.solar.sunset_hr,
            cfg.solar.noise_std,
            seed,
        );
        let wind_cf = wind_capacity_factors(
            horizon,
            cfg.wind.mean_cf,
            cfg.wind.alpha,
            cfg.wind.noise_std,
            seed.wrapping_add(WIND_SEED_OFFSET),
        );

        let demand_mw = match &cfg.demand.csv_path {
            Some(path) => load_demand_csv(Path::new(path), horizon)?,
            None => synthetic_demand_mw(
                horizon,
                cfg.demand.base_kw,
                cfg.demand.amp_kw,
                cfg.demand.noise_std,
                seed.wrapping_add(DEMAND_SEED_OFFSET),
            ),
        };

        let grid_limit_mw = vec![cfg.simulation.interconnect_kw / 1000.0; horizon];

        Self::new(solar_cf, wind_cf, demand_mw, grid_limit_mw)
    }

    /// Number of simulated hours.
    pub fn horizon(&self) -> usize {
        self.demand_mw.len()
    }

    /// Solar capacity factors, per-unit of PV rating.
    pub fn solar_cf(&self) -> &[f64] {
        &self.solar_cf
    }

    /// Wind capacity factors, per-unit of wind rating.
    pub fn wind_cf(&self) -> &[f64] {
        &self.wind_cf
    }

    /// Demand series (MW).
    pub fn demand_mw(&self) -> &[f64] {
        &self.demand_mw
    }

    /// Grid interconnection limit series (MW).
    pub fn grid_limit_mw(&self) -> &[f64] {
        &self.grid_limit_mw
    }

    /// Combined non-dispatchable generation for a candidate design (MW).
    pub fn generation_mw(&self, design: &DesignParameters) -> Vec<f64> {
        let pv_mw = design.pv_rating_kw / 1000.0;
        let wind_mw = design.wind_rating_kw / 1000.0;
        self.solar_cf
            .iter()
            .zip(&self.wind_cf)
            .map(|(s, w)| pv_mw * s + wind_mw * w)
            .collect()
    }
}

/// Standard-normal sample via Box-Muller.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Half-cosine daylight capacity-factor profile with seeded noise.
///
/// Zero outside the `[sunrise_hr, sunset_hr)` window of each 24-hour day;
/// values clamped to \[0, 1\].
pub fn solar_capacity_factors(
    horizon: usize,
    sunrise_hr: usize,
    sunset_hr: usize,
    noise_std: f64,
    seed: u64,
) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let daylight = (sunset_hr - sunrise_hr) as f64;
    (0..horizon)
        .map(|t| {
            let hour = t % 24;
            if hour < sunrise_hr || hour >= sunset_hr {
                return 0.0;
            }
            let frac = (hour - sunrise_hr) as f64 / daylight;
            let clear_sky = (std::f64::consts::PI * frac).sin();
            (clear_sky * (1.0 + gaussian_noise(&mut rng, noise_std))).clamp(0.0, 1.0)
        })
        .collect()
}

/// AR(1) wind capacity-factor profile around a long-run mean.
///
/// The state evolves as `x(t) = alpha * x(t-1) + (1 - alpha) * eps(t)`
/// and the capacity factor is `mean_cf + x`, clamped to \[0, 1\].
pub fn wind_capacity_factors(
    horizon: usize,
    mean_cf: f64,
    alpha: f64,
    noise_std: f64,
    seed: u64,
) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = 0.0_f64;
    (0..horizon)
        .map(|_| {
            state = alpha * state + (1.0 - alpha) * gaussian_noise(&mut rng, noise_std);
            (mean_cf + state).clamp(0.0, 1.0)
        })
        .collect()
}

/// Seeded sinusoidal demand profile (MW) peaking in the evening.
pub fn synthetic_demand_mw(
    horizon: usize,
    base_kw: f64,
    amp_kw: f64,
    noise_std: f64,
    seed: u64,
) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..horizon)
        .map(|t| {
            let hour = (t % 24) as f64;
            // Peak around hour 18.
            let shape = (std::f64::consts::TAU * (hour - 12.0) / 24.0).sin();
            let kw = base_kw + amp_kw * shape;
            (kw * (1.0 + gaussian_noise(&mut rng, noise_std))).max(0.0) / 1000.0
        })
        .collect()
}

/// Reads a demand series from a headerless single-column CSV of kW values
/// and converts it to MW.
///
/// The file must provide at least `horizon` rows; extra rows are ignored.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the file cannot be opened, a row
/// cannot be parsed as a number, or fewer than `horizon` rows are present.
pub fn load_demand_csv(path: &Path, horizon: usize) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| {
            Error::configuration(
                "demand.csv_path",
                format!("cannot open \"{}\": {e}", path.display()),
            )
        })?;

    let mut demand_mw = Vec::with_capacity(horizon);
    for (row, record) in reader.records().enumerate() {
        if demand_mw.len() == horizon {
            break;
        }
        let record = record.map_err(|e| {
            Error::configuration("demand.csv_path", format!("row {row}: {e}"))
        })?;
        let field = record.get(0).ok_or_else(|| {
            Error::configuration("demand.csv_path", format!("row {row}: empty record"))
        })?;
        let kw: f64 = field.trim().parse().map_err(|e| {
            Error::configuration("demand.csv_path", format!("row {row}: {e}"))
        })?;
        demand_mw.push(kw / 1000.0);
    }

    if demand_mw.len() < horizon {
        return Err(Error::configuration(
            "demand.csv_path",
            format!(
                "\"{}\" has {} rows, horizon needs {horizon}",
                path.display(),
                demand_mw.len()
            ),
        ));
    }
    Ok(demand_mw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudyConfig;

    #[test]
    fn context_rejects_misaligned_series() {
        let err = ScenarioContext::new(vec![0.5; 24], vec![0.3; 23], vec![0.4; 24], vec![2.0; 24])
            .expect_err("must fail");
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn context_rejects_empty_series() {
        let err =
            ScenarioContext::new(vec![], vec![], vec![], vec![]).expect_err("must fail");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn from_config_builds_aligned_series() {
        let mut cfg = StudyConfig::baseline();
        cfg.simulation.horizon_hours = 48;
        let ctx = ScenarioContext::from_config(&cfg).expect("baseline context");
        assert_eq!(ctx.horizon(), 48);
        assert_eq!(ctx.solar_cf().len(), 48);
        assert_eq!(ctx.wind_cf().len(), 48);
        assert_eq!(ctx.grid_limit_mw().len(), 48);
    }

    #[test]
    fn from_config_is_deterministic_for_fixed_seed() {
        let mut cfg = StudyConfig::baseline();
        cfg.simulation.horizon_hours = 72;
        let a = ScenarioContext::from_config(&cfg).expect("first context");
        let b = ScenarioContext::from_config(&cfg).expect("second context");
        assert_eq!(a.solar_cf(), b.solar_cf());
        assert_eq!(a.wind_cf(), b.wind_cf());
        assert_eq!(a.demand_mw(), b.demand_mw());
    }

    #[test]
    fn solar_profile_is_zero_at_night_and_bounded() {
        let cf = solar_capacity_factors(48, 6, 18, 0.05, 1);
        for (t, v) in cf.iter().enumerate() {
            let hour = t % 24;
            if hour < 6 || hour >= 18 {
                assert_eq!(*v, 0.0, "hour {hour} should be dark");
            }
            assert!((0.0..=1.0).contains(v), "cf {v} out of range at hour {t}");
        }
        // midday should generate
        assert!(cf[12] > 0.5);
    }

    #[test]
    fn wind_profile_stays_in_unit_interval() {
        let cf = wind_capacity_factors(500, 0.35, 0.9, 0.3, 7);
        assert!(cf.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn generation_scales_with_ratings() {
        let ctx = ScenarioContext::new(
            vec![0.5, 1.0],
            vec![0.2, 0.0],
            vec![0.4, 0.4],
            vec![10.0, 10.0],
        )
        .expect("context");
        let design = DesignParameters {
            pv_rating_kw: 2000.0,
            wind_rating_kw: 1000.0,
            battery_power_kw: 500.0,
            battery_energy_kwh: 2000.0,
        };
        let generation = ctx.generation_mw(&design);
        assert!((generation[0] - (2.0 * 0.5 + 1.0 * 0.2)).abs() < 1e-12);
        assert!((generation[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn demand_csv_loads_and_converts_to_mw() {
        let dir = std::env::temp_dir().join(format!("hpp-opt-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("demand.csv");
        std::fs::write(&path, "500\n750.5\n200\n").expect("write csv");

        let demand = load_demand_csv(&path, 2).expect("load");
        assert_eq!(demand.len(), 2);
        assert!((demand[0] - 0.5).abs() < 1e-12);
        assert!((demand[1] - 0.7505).abs() < 1e-12);

        let err = load_demand_csv(&path, 10).expect_err("too short");
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
