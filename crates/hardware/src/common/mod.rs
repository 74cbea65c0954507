//! Common utilities and types used throughout the pipeline simulator.
//!
//! This module provides the building blocks shared across all components:
//! 1. **Scalar Types:** Address and cycle aliases.
//! 2. **Error Handling:** The fatal error type surfaced to the CLI.

/// Fatal error definitions.
pub mod error;

/// Address and cycle type aliases.
pub mod types;

pub use error::SimError;
pub use types::{Addr, Cycle, INSTR_SIZE};
