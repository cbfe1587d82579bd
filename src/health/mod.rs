//! Per-dependency health derived from recent request outcomes.

pub mod state;

pub use state::{DependencyHealth, HealthRegistry, HealthState};
