//! Battery dispatch policies producing full-horizon charge/discharge schedules.

/// Rule-based peak-shaving dispatch.
pub mod peak_shaving;
pub mod policy;

pub use peak_shaving::{PeakShavingPolicy, check_gen_grid_limit, enforce_power_fraction_bounds};
pub use policy::{DispatchParams, DispatchPolicy};
