//! Annual simulation adapter: one candidate design in, scalar metrics out.

use tracing::debug;

use crate::dispatch::{DispatchParams, DispatchPolicy, check_gen_grid_limit};
use crate::error::{Error, Result};
use crate::scenario::{DT_HOURS, ScenarioContext};

use super::financial::FinancialModel;
use super::plant::{BatteryOperation, HourRecord, run_horizon};
use super::types::{DesignParameters, SimulationResult};

/// Wraps a scenario, a dispatch policy, and a financial model into the
/// evaluation the outer loop calls once per candidate design.
///
/// Every call is a fresh full-horizon simulation; no state survives between
/// evaluations.
pub struct AnnualSimulation<'a> {
    scenario: &'a ScenarioContext,
    policy: Box<dyn DispatchPolicy + 'a>,
    financial: Box<dyn FinancialModel + 'a>,
    threshold_kw: f64,
    battery: BatteryOperation,
}

impl<'a> AnnualSimulation<'a> {
    /// Creates an adapter for one case's threshold.
    pub fn new(
        scenario: &'a ScenarioContext,
        policy: Box<dyn DispatchPolicy + 'a>,
        financial: Box<dyn FinancialModel + 'a>,
        threshold_kw: f64,
        battery: BatteryOperation,
    ) -> Self {
        Self {
            scenario,
            policy,
            financial,
            threshold_kw,
            battery,
        }
    }

    /// Peak-shaving threshold this adapter simulates against (kW).
    pub fn threshold_kw(&self) -> f64 {
        self.threshold_kw
    }

    /// Evaluates one candidate design.
    ///
    /// Validates the design and the generation-vs-grid-limit invariant, runs
    /// the full horizon, reduces the hourly trace, and converts the
    /// financial model's cents/kWh LCOE to USD/kWh.
    ///
    /// # Errors
    ///
    /// * [`Error::Configuration`] for invalid ratings or zero battery power
    /// * [`Error::InfeasibleScenario`] when generation exceeds the grid
    ///   limit, metrics come out non-finite, or no energy is delivered
    pub fn evaluate(&self, design: &DesignParameters) -> Result<SimulationResult> {
        design.validate()?;
        let params = DispatchParams::new(self.threshold_kw, design.battery_power_kw)?;

        let generation_mw = self.scenario.generation_mw(design);
        check_gen_grid_limit(&generation_mw, self.scenario.grid_limit_mw())?;

        let records = run_horizon(
            &generation_mw,
            self.scenario,
            self.policy.as_ref(),
            &params,
            design.battery_energy_kwh / 1000.0,
            &self.battery,
        )?;

        let result = self.reduce(design, &records)?;
        debug!(
            pv_kw = design.pv_rating_kw,
            wind_kw = design.wind_rating_kw,
            battery_kwh = design.battery_energy_kwh,
            lcoe_real = result.lcoe_real,
            avg_missed_peak_load = result.avg_missed_peak_load,
            "evaluated candidate design"
        );
        Ok(result)
    }

    /// Reduces the hourly trace to [`SimulationResult`].
    fn reduce(&self, design: &DesignParameters, records: &[HourRecord]) -> Result<SimulationResult> {
        let mut demand_mwh = 0.0;
        let mut missed_mwh = 0.0;
        let mut shortfall_sum_kw = 0.0;
        let mut shortfall_hours = 0usize;
        let mut curtailed_kw = 0.0;

        for r in records {
            demand_mwh += r.goal_mw * DT_HOURS;
            missed_mwh += r.shortfall_mw * DT_HOURS;
            if r.shortfall_mw > 0.0 {
                shortfall_sum_kw += r.shortfall_mw * 1000.0;
                shortfall_hours += 1;
            }
            curtailed_kw += r.curtailed_mw * 1000.0;
        }

        let missed_load_perc = if demand_mwh > 0.0 {
            100.0 * missed_mwh / demand_mwh
        } else {
            0.0
        };
        let avg_missed_peak_load = if shortfall_hours > 0 {
            shortfall_sum_kw / shortfall_hours as f64
        } else {
            0.0
        };

        let delivered_mwh = demand_mwh - missed_mwh;
        let lcoe_cents = self.financial.lcoe_cents_per_kwh(design, delivered_mwh)?;
        // Contract with the financial model: cents/kWh in, USD/kWh out.
        let lcoe_real = lcoe_cents / 100.0;

        let result = SimulationResult {
            missed_load_perc,
            avg_missed_peak_load,
            lcoe_real,
            curtailed: curtailed_kw,
        };
        if !result.is_finite() {
            return Err(Error::InfeasibleScenario(
                "simulation produced non-finite metrics".to_string(),
            ));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::PeakShavingPolicy;

    /// Financial stub reporting a constant cents/kWh value.
    struct ConstantLcoe(f64);

    impl FinancialModel for ConstantLcoe {
        fn lcoe_cents_per_kwh(&self, _: &DesignParameters, _: f64) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn scenario() -> ScenarioContext {
        // Two off-peak hours with generation, one peak hour without.
        ScenarioContext::new(
            vec![0.5, 0.0, 0.25],
            vec![0.0, 0.0, 0.0],
            vec![0.05, 0.15, 0.05],
            vec![5.0, 5.0, 5.0],
        )
        .expect("scenario")
    }

    fn design() -> DesignParameters {
        DesignParameters {
            pv_rating_kw: 200.0,
            wind_rating_kw: 0.0,
            battery_power_kw: 100.0,
            battery_energy_kwh: 500.0,
        }
    }

    fn adapter_with(
        scenario: &ScenarioContext,
        cents: f64,
        threshold_kw: f64,
    ) -> AnnualSimulation<'_> {
        AnnualSimulation::new(
            scenario,
            Box::new(PeakShavingPolicy),
            Box::new(ConstantLcoe(cents)),
            threshold_kw,
            BatteryOperation {
                eta_charge: 1.0,
                eta_discharge: 1.0,
                initial_soc: 0.5,
            },
        )
    }

    #[test]
    fn lcoe_is_converted_from_cents_to_usd() {
        let ctx = scenario();
        let sim = adapter_with(&ctx, 450.0, 100.0);
        let result = sim.evaluate(&design()).expect("evaluate");
        assert!((result.lcoe_real - 4.5).abs() < 1e-12);
    }

    #[test]
    fn generation_above_grid_limit_is_infeasible() {
        let ctx = ScenarioContext::new(
            vec![1.0],
            vec![0.0],
            vec![0.1],
            vec![0.05], // limit below generation
        )
        .expect("scenario");
        let sim = adapter_with(&ctx, 100.0, 100.0);
        let mut d = design();
        d.pv_rating_kw = 1000.0;
        let err = sim.evaluate(&d).expect_err("must fail");
        assert!(matches!(err, Error::InfeasibleScenario(_)));
    }

    #[test]
    fn zero_battery_power_is_a_configuration_error() {
        let ctx = scenario();
        let sim = adapter_with(&ctx, 100.0, 100.0);
        let mut d = design();
        d.battery_power_kw = 0.0;
        let err = sim.evaluate(&d).expect_err("must fail");
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn non_finite_lcoe_is_rejected() {
        struct NanLcoe;
        impl FinancialModel for NanLcoe {
            fn lcoe_cents_per_kwh(&self, _: &DesignParameters, _: f64) -> Result<f64> {
                Ok(f64::NAN)
            }
        }
        let ctx = scenario();
        let sim = AnnualSimulation::new(
            &ctx,
            Box::new(PeakShavingPolicy),
            Box::new(NanLcoe),
            100.0,
            BatteryOperation::default(),
        );
        let err = sim.evaluate(&design()).expect_err("must fail");
        assert!(matches!(err, Error::InfeasibleScenario(_)));
    }

    #[test]
    fn missed_load_percentage_reflects_unserved_energy() {
        // No generation, no stored energy: the peak hour is fully missed.
        let ctx = ScenarioContext::new(
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![0.1, 0.3],
            vec![5.0, 5.0],
        )
        .expect("scenario");
        let sim = AnnualSimulation::new(
            &ctx,
            Box::new(PeakShavingPolicy),
            Box::new(ConstantLcoe(100.0)),
            200.0,
            BatteryOperation {
                eta_charge: 1.0,
                eta_discharge: 1.0,
                initial_soc: 0.0,
            },
        );
        let mut d = design();
        d.pv_rating_kw = 0.0;
        let err_or_result = sim.evaluate(&d);
        // Demand 0.4 MWh, all missed: delivered energy is zero, so the
        // stub's constant LCOE still applies and metrics are reduced.
        let result = err_or_result.expect("constant-lcoe stub tolerates zero delivery");
        assert!((result.missed_load_perc - 100.0).abs() < 1e-9);
        assert!((result.avg_missed_peak_load - 200.0).abs() < 1e-9);
    }

    #[test]
    fn evaluations_are_independent() {
        let ctx = scenario();
        let sim = adapter_with(&ctx, 120.0, 100.0);
        let a = sim.evaluate(&design()).expect("first");
        let b = sim.evaluate(&design()).expect("second");
        assert_eq!(a, b);
    }
}
