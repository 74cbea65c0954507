//! Five-stage in-order instruction pipeline.
//!
//! This module contains:
//! 1. **Latches:** Payload types and port names for inter-stage channels.
//! 2. **Stages:** Fetch, Decode, Execute, Memory, and Writeback, plus the
//!    trait and context the driver clocks them through.
//!
//! Hazards are resolved purely by stalling; there is no forwarding network.
//! Mispredictions are resolved by a flush broadcast from the memory stage.

/// Inter-stage payloads and port names.
pub mod latches;

/// Stage trait and the five stage implementations.
pub mod stages;
