//! Functional units attached to the pipeline.

/// Branch prediction unit (branch target buffer + saturating counters).
pub mod bpu;

pub use bpu::Bpu;
