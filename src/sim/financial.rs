//! Financial model seam.
//!
//! The financial collaborator reports LCOE in cents/kWh; converting to
//! USD/kWh is the adapter's job, not the model's.

use crate::config::FinancialSection;
use crate::error::{Error, Result};

use super::types::DesignParameters;

/// Computes a real LCOE, in cents/kWh, for a resolved design and the energy
/// it delivered over one simulated year.
pub trait FinancialModel {
    /// Real LCOE in cents/kWh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InfeasibleScenario`] when no LCOE is defined, e.g.
    /// a plant that delivered no energy.
    fn lcoe_cents_per_kwh(
        &self,
        design: &DesignParameters,
        annual_energy_mwh: f64,
    ) -> Result<f64>;
}

/// Annualized-cost LCOE: capital cost times a fixed charge rate plus O&M,
/// divided by delivered energy.
#[derive(Debug, Clone)]
pub struct AnnualizedCostModel {
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

impl Default for AnnualizedCostModel {
    fn default() -> Self {
        Self::from_section(&FinancialSection::default())
    }
}

impl AnnualizedCostModel {
    /// Builds the model from its configuration section.
    pub fn from_section(section: &FinancialSection) -> Self {
        Self {
            pv_capex_per_kw: section.pv_capex_per_kw,
            wind_capex_per_kw: section.wind_capex_per_kw,
            battery_capex_per_kw: section.battery_capex_per_kw,
            battery_capex_per_kwh: section.battery_capex_per_kwh,
            fixed_charge_rate: section.fixed_charge_rate,
            om_fraction: section.om_fraction,
        }
    }

    /// Total installed capital cost (USD).
    fn capital_cost(&self, design: &DesignParameters) -> f64 {
        design.pv_rating_kw * self.pv_capex_per_kw
            + design.wind_rating_kw * self.wind_capex_per_kw
            + design.battery_power_kw * self.battery_capex_per_kw
            + design.battery_energy_kwh * self.battery_capex_per_kwh
    }
}

impl FinancialModel for AnnualizedCostModel {
    fn lcoe_cents_per_kwh(
        &self,
        design: &DesignParameters,
        annual_energy_mwh: f64,
    ) -> Result<f64> {
        if !(annual_energy_mwh > 0.0) {
            return Err(Error::InfeasibleScenario(format!(
                "LCOE undefined: annual delivered energy is {annual_energy_mwh} MWh"
            )));
        }
        let annual_cost_usd =
            self.capital_cost(design) * (self.fixed_charge_rate + self.om_fraction);
        let usd_per_kwh = annual_cost_usd / (annual_energy_mwh * 1000.0);
        Ok(usd_per_kwh * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design() -> DesignParameters {
        DesignParameters {
            pv_rating_kw: 1000.0,
            wind_rating_kw: 0.0,
            battery_power_kw: 0.0,
            battery_energy_kwh: 0.0,
        }
    }

    #[test]
    fn lcoe_matches_hand_computation() {
        let model = AnnualizedCostModel {
            pv_capex_per_kw: 1000.0,
            wind_capex_per_kw: 0.0,
            battery_capex_per_kw: 0.0,
            battery_capex_per_kwh: 0.0,
            fixed_charge_rate: 0.08,
            om_fraction: 0.02,
        };
        // capital 1.0e6 USD, annual cost 1.0e5 USD, energy 2000 MWh
        // -> 0.05 USD/kWh -> 5.0 cents/kWh
        let cents = model
            .lcoe_cents_per_kwh(&design(), 2000.0)
            .expect("lcoe defined");
        assert!((cents - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_delivered_energy_is_infeasible() {
        let model = AnnualizedCostModel::default();
        let err = model.lcoe_cents_per_kwh(&design(), 0.0).expect_err("must fail");
        assert!(matches!(err, Error::InfeasibleScenario(_)));
    }

    #[test]
    fn battery_sizing_raises_lcoe() {
        let model = AnnualizedCostModel::default();
        let small = model.lcoe_cents_per_kwh(&design(), 2000.0).expect("lcoe");
        let mut bigger = design();
        bigger.battery_power_kw = 500.0;
        bigger.battery_energy_kwh = 2500.0;
        let large = model.lcoe_cents_per_kwh(&bigger, 2000.0).expect("lcoe");
        assert!(large > small);
    }
}
