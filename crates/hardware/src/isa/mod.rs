//! Instruction set support for the simulated MIPS-I integer subset.
//!
//! This module owns everything that interprets raw instruction words:
//! 1. **ABI:** Register numbering, the HI:LO pair, assembler names.
//! 2. **Decode:** Field extraction and opcode/function tables.
//! 3. **Instruction:** The executable instruction object carried through
//!    the pipeline and the reference model.

/// Register numbering and assembler names.
pub mod abi;

/// Encoding field extraction and opcode tables.
pub mod decode;

/// Decoded, executable instruction objects.
pub mod instruction;

pub use instruction::{Instruction, Op};
