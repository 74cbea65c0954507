//! Inter-stage payload types and the port naming scheme.
//!
//! Every channel between stages is declared under a fixed name so the port
//! fabric can pair writers with readers and reject bad wiring before the
//! first cycle. All pipeline ports share the same latency, bandwidth, and
//! fanout; the clock-edge discipline comes from the latency being at least
//! one.

use crate::common::{Addr, Cycle};

/// Cycles between a write and its visibility, for every pipeline port.
pub const PORT_LATENCY: Cycle = 1;

/// Writes accepted per cycle on every pipeline port.
pub const PORT_BW: u32 = 1;

/// Readers per pipeline port.
pub const PORT_FANOUT: u32 = 1;

/// Channel names, one writer and one reader each.
pub mod names {
    pub const FETCH_2_DECODE: &str = "FETCH_2_DECODE";
    pub const DECODE_2_EXECUTE: &str = "DECODE_2_EXECUTE";
    pub const EXECUTE_2_MEMORY: &str = "EXECUTE_2_MEMORY";
    pub const MEMORY_2_WRITEBACK: &str = "MEMORY_2_WRITEBACK";

    pub const DECODE_2_FETCH_STALL: &str = "DECODE_2_FETCH_STALL";
    pub const EXECUTE_2_DECODE_STALL: &str = "EXECUTE_2_DECODE_STALL";
    pub const MEMORY_2_EXECUTE_STALL: &str = "MEMORY_2_EXECUTE_STALL";
    pub const WRITEBACK_2_MEMORY_STALL: &str = "WRITEBACK_2_MEMORY_STALL";

    pub const MEMORY_2_FETCH_FLUSH: &str = "MEMORY_2_FETCH_FLUSH";
    pub const MEMORY_2_DECODE_FLUSH: &str = "MEMORY_2_DECODE_FLUSH";
    pub const MEMORY_2_EXECUTE_FLUSH: &str = "MEMORY_2_EXECUTE_FLUSH";
    pub const MEMORY_2_MEMORY_FLUSH: &str = "MEMORY_2_MEMORY_FLUSH";

    pub const MEMORY_2_FETCH_TARGET: &str = "MEMORY_2_FETCH_TARGET";
}

/// Fetch output: the raw word plus the prediction made for it.
///
/// Decode holds one of these across stalled cycles, which is how an
/// instruction keeps its position while the pipeline ahead of it drains.
#[derive(Clone, Copy, Debug)]
pub struct IfIdEntry {
    /// Program counter of the fetched word.
    pub pc: Addr,
    /// Raw instruction encoding.
    pub raw: u32,
    /// Whether the predictor said this word redirects control flow.
    pub predicted_taken: bool,
    /// Next PC the fetch stage committed to.
    pub predicted_target: Addr,
}
