//! MIPS ABI register numbering and names.

/// Hardwired zero register.
pub const REG_ZERO: usize = 0;

/// Return address register.
pub const REG_RA: usize = 31;

/// Scoreboard index of the HI multiply/divide result register.
pub const REG_HI: usize = 32;

/// Scoreboard index of the LO multiply/divide result register.
pub const REG_LO: usize = 33;

/// Pseudo-index naming the HI:LO pair as a single destination.
/// `mult`/`div` write both halves in one retirement.
pub const REG_HI_LO: usize = 34;

/// Number of individually tracked scoreboard entries (32 GPRs + HI + LO).
pub const SCOREBOARD_REGS: usize = 34;

/// Conventional assembler names for the 32 general-purpose registers.
pub const REG_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

/// Assembler name for a scoreboard index, including HI and LO.
pub fn reg_name(reg: usize) -> &'static str {
    match reg {
        REG_HI => "hi",
        REG_LO => "lo",
        r if r < 32 => REG_NAMES[r],
        _ => "?",
    }
}
