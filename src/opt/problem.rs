//! Design variables, bounds, and the sizing problem the driver minimizes.

use crate::cases::CaseSpec;
use crate::config::{OptimizerSection, PlantSection};
use crate::error::{Error, Result};
use crate::sim::{AnnualSimulation, DesignParameters, SimulationResult};

use super::resilience::battery_duration_hours;

/// Closed interval bounding one design variable, in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower bound (inclusive).
    pub lower: f64,
    /// Upper bound (inclusive).
    pub upper: f64,
}

impl Bounds {
    /// Maps a physical value into normalized \[0, 1\] coordinates.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.upper <= self.lower {
            return 0.0;
        }
        ((value - self.lower) / (self.upper - self.lower)).clamp(0.0, 1.0)
    }

    /// Maps a normalized coordinate back to physical units, projecting onto
    /// the interval.
    pub fn denormalize(&self, t: f64) -> f64 {
        self.lower + t.clamp(0.0, 1.0) * (self.upper - self.lower)
    }
}

/// One design variable registered with the outer loop.
#[derive(Debug, Clone)]
pub struct DesignVariable {
    /// Variable name, for logging and reports.
    pub name: &'static str,
    /// Physical bounds.
    pub bounds: Bounds,
    /// Initial value proposed to the driver.
    pub init: f64,
}

/// Objective and constraint values for one candidate point.
///
/// Constraints use the `g(x) <= 0` convention: positive values are
/// violations.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Scaled objective value (LCOE over the reference value).
    pub objective: f64,
    /// Inequality constraint values, `<= 0` when satisfied.
    pub constraints: Vec<f64>,
    /// Full simulation metrics behind the scalar values.
    pub result: SimulationResult,
}

impl Evaluation {
    /// True when every constraint is satisfied within `tol`.
    pub fn is_feasible(&self, tol: f64) -> bool {
        self.constraints.iter().all(|g| *g <= tol)
    }
}

/// Contract between the outer loop and an injected search driver.
pub trait OptimizationProblem {
    /// Registered design variables with bounds.
    fn variables(&self) -> &[DesignVariable];

    /// Evaluates one candidate point, given in physical units in variable
    /// order.
    ///
    /// # Errors
    ///
    /// Any error marks the point infeasible for the driver; it must not
    /// abort the search.
    fn evaluate(&self, x: &[f64]) -> Result<Evaluation>;
}

/// The hybrid-plant sizing problem for one case.
///
/// Design variables are PV rating, wind rating, and battery energy
/// capacity; battery power is pinned to the case threshold so the battery
/// can shave the full peak. Battery duration follows from energy over
/// power, keeping the duration invariant exact for every candidate.
pub struct DesignProblem<'a> {
    simulation: &'a AnnualSimulation<'a>,
    case: &'a CaseSpec,
    variables: Vec<DesignVariable>,
    objective_ref: f64,
}

impl<'a> DesignProblem<'a> {
    /// Registers variables and bounds for one case.
    pub fn new(
        simulation: &'a AnnualSimulation<'a>,
        case: &'a CaseSpec,
        plant: &PlantSection,
        optimizer: &OptimizerSection,
    ) -> Self {
        let energy_lower = case.threshold_kw * case.battery_hrs.lower;
        let energy_upper = case.threshold_kw * case.battery_hrs.upper;
        let variables = vec![
            DesignVariable {
                name: "pv_rating_kw",
                bounds: Bounds {
                    lower: plant.pv_min_kw,
                    upper: plant.pv_max_kw,
                },
                init: plant.pv_init_kw,
            },
            DesignVariable {
                name: "wind_rating_kw",
                bounds: Bounds {
                    lower: plant.wind_min_kw,
                    upper: plant.wind_max_kw,
                },
                init: plant.wind_init_kw,
            },
            DesignVariable {
                name: "battery_energy_kwh",
                bounds: Bounds {
                    lower: energy_lower,
                    upper: energy_upper,
                },
                init: 0.5 * (energy_lower + energy_upper),
            },
        ];
        Self {
            simulation,
            case,
            variables,
            objective_ref: optimizer.objective_ref,
        }
    }

    /// Resolves a variable vector into a full design point.
    pub fn design_from(&self, x: &[f64]) -> Result<DesignParameters> {
        if x.len() != self.variables.len() {
            return Err(Error::dimension_mismatch(
                "design variable vector",
                self.variables.len(),
                x.len(),
            ));
        }
        Ok(DesignParameters {
            pv_rating_kw: x[0],
            wind_rating_kw: x[1],
            battery_power_kw: self.case.threshold_kw,
            battery_energy_kwh: x[2],
        })
    }
}

impl OptimizationProblem for DesignProblem<'_> {
    fn variables(&self) -> &[DesignVariable] {
        &self.variables
    }

    fn evaluate(&self, x: &[f64]) -> Result<Evaluation> {
        let design = self.design_from(x)?;
        let duration_hrs =
            battery_duration_hours(design.battery_power_kw, design.battery_energy_kwh)?;
        let result = self.simulation.evaluate(&design)?;

        let missed_peak_limit_kw = (1.0 - self.case.peak_req) * self.case.threshold_kw;
        let constraints = vec![
            result.avg_missed_peak_load - missed_peak_limit_kw,
            self.case.battery_hrs.lower - duration_hrs,
            duration_hrs - self.case.battery_hrs.upper,
        ];

        let objective = result.lcoe_real / self.objective_ref;
        if !objective.is_finite() || constraints.iter().any(|g| !g.is_finite()) {
            return Err(Error::InfeasibleScenario(
                "non-finite objective or constraint value".to_string(),
            ));
        }
        Ok(Evaluation {
            objective,
            constraints,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::BatteryHours;
    use crate::dispatch::PeakShavingPolicy;
    use crate::scenario::ScenarioContext;
    use crate::sim::{AnnualizedCostModel, BatteryOperation};

    fn case() -> CaseSpec {
        CaseSpec {
            threshold_kw: 200.0,
            peak_req: 0.95,
            battery_hrs: BatteryHours {
                lower: 5.0,
                upper: 10.0,
            },
        }
    }

    fn scenario() -> ScenarioContext {
        let demand = vec![0.15, 0.35, 0.1, 0.25];
        ScenarioContext::new(
            vec![0.6, 0.2, 0.0, 0.4],
            vec![0.3, 0.3, 0.3, 0.3],
            demand,
            vec![50.0; 4],
        )
        .expect("scenario")
    }

    #[test]
    fn bounds_round_trip_between_physical_and_normalized() {
        let b = Bounds {
            lower: 100.0,
            upper: 500.0,
        };
        assert_eq!(b.normalize(100.0), 0.0);
        assert_eq!(b.normalize(500.0), 1.0);
        assert!((b.denormalize(b.normalize(300.0)) - 300.0).abs() < 1e-9);
        // projection outside the interval
        assert_eq!(b.denormalize(1.5), 500.0);
        assert_eq!(b.normalize(900.0), 1.0);
    }

    #[test]
    fn battery_energy_bounds_encode_duration_limits() {
        let ctx = scenario();
        let sim = AnnualSimulation::new(
            &ctx,
            Box::new(PeakShavingPolicy),
            Box::new(AnnualizedCostModel::default()),
            200.0,
            BatteryOperation::default(),
        );
        let c = case();
        let problem = DesignProblem::new(
            &sim,
            &c,
            &PlantSection::default(),
            &OptimizerSection::default(),
        );
        let energy = &problem.variables()[2];
        assert_eq!(energy.bounds.lower, 1000.0);
        assert_eq!(energy.bounds.upper, 2000.0);
    }

    #[test]
    fn evaluation_reports_duration_constraints() {
        let ctx = scenario();
        let sim = AnnualSimulation::new(
            &ctx,
            Box::new(PeakShavingPolicy),
            Box::new(AnnualizedCostModel::default()),
            200.0,
            BatteryOperation::default(),
        );
        let c = case();
        let problem = DesignProblem::new(
            &sim,
            &c,
            &PlantSection::default(),
            &OptimizerSection::default(),
        );

        // 1400 kWh at 200 kW is 7 hours, inside [5, 10]
        let eval = problem
            .evaluate(&[1000.0, 500.0, 1400.0])
            .expect("evaluate");
        assert!(eval.constraints[1] <= 0.0);
        assert!(eval.constraints[2] <= 0.0);
        assert!(eval.objective.is_finite());
    }

    #[test]
    fn duration_outside_bounds_violates_constraint() {
        let ctx = scenario();
        let sim = AnnualSimulation::new(
            &ctx,
            Box::new(PeakShavingPolicy),
            Box::new(AnnualizedCostModel::default()),
            200.0,
            BatteryOperation::default(),
        );
        let c = case();
        let problem = DesignProblem::new(
            &sim,
            &c,
            &PlantSection::default(),
            &OptimizerSection::default(),
        );

        // 400 kWh at 200 kW is 2 hours, below the 5-hour floor
        let eval = problem.evaluate(&[1000.0, 500.0, 400.0]).expect("evaluate");
        assert!(eval.constraints[1] > 0.0);
        assert!(!eval.is_feasible(1e-9));
    }

    #[test]
    fn wrong_variable_count_is_a_dimension_mismatch() {
        let ctx = scenario();
        let sim = AnnualSimulation::new(
            &ctx,
            Box::new(PeakShavingPolicy),
            Box::new(AnnualizedCostModel::default()),
            200.0,
            BatteryOperation::default(),
        );
        let c = case();
        let problem = DesignProblem::new(
            &sim,
            &c,
            &PlantSection::default(),
            &OptimizerSection::default(),
        );
        let err = problem.evaluate(&[1.0, 2.0]).expect_err("must fail");
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }
}
