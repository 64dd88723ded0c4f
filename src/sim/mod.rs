//! Full-horizon plant simulation and its reduction to design metrics.

pub mod adapter;
pub mod financial;
/// Hour-by-hour plant simulation with battery state-of-charge accounting.
pub mod plant;
pub mod types;

pub use adapter::AnnualSimulation;
pub use financial::{AnnualizedCostModel, FinancialModel};
pub use plant::{BatteryOperation, HourRecord, run_horizon};
pub use types::{DesignParameters, SimulationResult};
