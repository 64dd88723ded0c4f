//! Hybrid power plant sizing and dispatch study.

pub mod cases;
pub mod cli;
pub mod config;
/// Heuristic peak-shaving battery dispatch.
pub mod dispatch;
pub mod error;
pub mod opt;
pub mod reporting;
pub mod scenario;
/// Annual plant simulation and its scalar metrics.
pub mod sim;
