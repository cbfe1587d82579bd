//! Aggregation core: fan-out, deadlines, outcomes, serialization.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → orchestrator.rs (build probes, concurrent fan-out)
//!     → guard.rs (per-branch deadline, outcome conversion)
//!     → outcome.rs (one slot per dependency, config order)
//!     → serializer.rs (deterministic JSON payload)
//! ```

pub mod guard;
pub mod orchestrator;
pub mod outcome;
pub mod serializer;

pub use guard::{TimeoutGuard, TimeoutPolicy};
pub use orchestrator::{Binding, Dependency, Orchestrator, OrchestratorError};
pub use outcome::{AggregatedResult, DependencyOutcome};
pub use serializer::serialize;
