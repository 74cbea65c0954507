//! Cycle-accurate MIPS pipeline simulator library.
//!
//! This crate implements a performance simulator for a MIPS-like processor
//! with a classic five-stage in-order pipeline:
//! 1. **Core:** Fetch, Decode, Execute, Memory, and Writeback stages wired
//!    through a latency-buffered port fabric, with a scoreboarded register
//!    file and a set-associative branch prediction unit.
//! 2. **ISA:** Decoding, execution, and disassembly of a MIPS-I integer
//!    subset.
//! 3. **Checking:** A reference functional simulator stepped in lock-step
//!    with retirement; any divergence aborts the run.
//! 4. **Simulation:** Loader, configuration, statistics, and trace output.
//!
//! Hazards are handled exclusively by stalling in decode, and branch
//! mispredictions by a flush broadcast from the memory stage; the headline
//! output of a run is the achieved instructions-per-cycle figure.

/// Common types and the fatal error enum.
pub mod common;
/// Simulator configuration (defaults, hierarchical structures).
pub mod config;
/// The simulated core (pipeline, register file, branch prediction).
pub mod core;
/// Reference functional simulator.
pub mod func;
/// Instruction set support (decode, execute, disassembly).
pub mod isa;
/// Flat program memory.
pub mod mem;
/// Latency-buffered inter-stage ports.
pub mod ports;
/// Drivers and program loading.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;
/// Colourised per-stage trace output.
pub mod trace;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Fatal error type surfaced to the CLI.
pub use crate::common::SimError;
/// Reference functional simulator.
pub use crate::func::FuncSim;
/// Cycle-accurate pipeline simulator; construct with `PerfSim::new`.
pub use crate::sim::PerfSim;
