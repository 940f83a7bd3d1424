//! Workspace root crate.
//!
//! Re-exports the engine, the threshold store and the synthetic feed so integration tests can depend on a single crate.

pub use engine::*;
pub use sim::*;
pub use thresholds::*;
