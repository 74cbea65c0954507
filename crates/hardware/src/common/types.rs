//! Fundamental scalar types shared by all simulator components.

/// A program address. MIPS32 addresses fit in 32 bits, but the wider type
/// keeps address arithmetic free of incidental truncation.
pub type Addr = u64;

/// A simulation cycle number, starting at 0 and monotonically increasing.
pub type Cycle = u64;

/// Size of one word-sized instruction fetch in bytes.
pub const INSTR_SIZE: Addr = 4;
