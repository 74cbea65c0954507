//! Simulator error definitions.
//!
//! This module defines the failure modes of the simulator. It provides:
//! 1. **Configuration errors:** Invalid predictor or tag array geometry.
//! 2. **Fabric errors:** Mis-paired or dangling inter-stage ports.
//! 3. **Runtime errors:** Deadlock, checker divergence, and unknown encodings.
//!
//! Transient microarchitectural events (stalls, mispredictions) are not
//! errors; they are handled in-band by the pipeline. Everything here is
//! fatal: the driver stops and the CLI turns the value into a diagnostic
//! and a non-zero exit code.

use std::fmt;
use std::io;

use super::types::{Addr, Cycle};

/// Fatal simulator failures.
#[derive(Debug)]
pub enum SimError {
    /// A structural parameter is invalid (predictor geometry, tag array
    /// sizing). Raised during construction, never at runtime.
    Config(String),

    /// The port fabric failed validation: a port name with no reader, no
    /// writer, more than one of either, or mismatched element types.
    PortFabric(Vec<String>),

    /// The program image could not be read from disk.
    Image { path: String, source: io::Error },

    /// No instruction reached writeback for the watchdog interval.
    Deadlock { cycle: Cycle, threshold: Cycle },

    /// The pipeline retired an instruction whose trace disagrees with the
    /// reference functional simulator.
    CheckMismatch { checker: String, perf: String },

    /// An unrecognised encoding reached writeback. Wrong-path garbage is
    /// squashed before retirement, so this indicates a bad program image.
    UnknownInstr { raw: u32, pc: Addr },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(msg) => write!(f, "invalid configuration: {}", msg),
            SimError::PortFabric(problems) => {
                write!(f, "port fabric validation failed:")?;
                for p in problems {
                    write!(f, "\n  {}", p)?;
                }
                Ok(())
            }
            SimError::Image { path, source } => {
                write!(f, "cannot read program image '{}': {}", path, source)
            }
            SimError::Deadlock { cycle, threshold } => write!(
                f,
                "deadlock detected: no writeback for {} cycles (cycle {})",
                threshold, cycle
            ),
            SimError::CheckMismatch { checker, perf } => write!(
                f,
                "mismatch with the functional model:\n  checker: {}  pipeline: {}",
                checker, perf
            ),
            SimError::UnknownInstr { raw, pc } => {
                write!(f, "unknown instruction {:#010x} at {:#x}", raw, pc)
            }
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Image { source, .. } => Some(source),
            _ => None,
        }
    }
}
