//! Reference functional simulator.
//!
//! A plain fetch-execute interpreter over the same instruction objects and
//! memory model the pipeline uses. It serves two roles:
//! 1. **Checker:** The pipeline steps it once per retirement and compares
//!    trace lines byte-for-byte.
//! 2. **Standalone model:** Functional-only runs drive it directly,
//!    bypassing the pipeline.

use crate::common::{Addr, INSTR_SIZE, SimError};
use crate::core::arch::RegisterFile;
use crate::isa::Instruction;
use crate::mem::ProgramMemory;
use crate::trace::Tracer;

/// Architectural-level simulator: one instruction per step, no timing.
pub struct FuncSim {
    memory: ProgramMemory,
    rf: RegisterFile,
    pc: Addr,
}

impl FuncSim {
    /// Creates a simulator positioned at the memory's entry point.
    pub fn new(memory: ProgramMemory) -> Self {
        let pc = memory.start_pc();
        Self {
            memory,
            rf: RegisterFile::new(),
            pc,
        }
    }

    /// Executes one instruction and returns its rendered trace line.
    pub fn step(&mut self) -> Result<String, SimError> {
        let raw = self.memory.read_word(self.pc);
        let mut instr = Instruction::new(raw, self.pc, false, self.pc.wrapping_add(INSTR_SIZE));
        if instr.is_invalid() {
            return Err(SimError::UnknownInstr { raw, pc: self.pc });
        }

        self.rf.read_src1(&mut instr);
        self.rf.read_src2(&mut instr);
        instr.execute();

        if instr.is_load() {
            instr.set_v_dst(self.memory.read(instr.mem_addr(), instr.mem_size()));
        } else if instr.is_store() {
            self.memory
                .write(instr.v_src2(), instr.mem_addr(), instr.mem_size());
        }

        self.rf.write_dst(&instr);
        self.pc = instr.new_pc();

        Ok(format!("{}\n", instr))
    }

    /// Runs `num_steps` instructions, tracing each when enabled.
    pub fn run(&mut self, num_steps: u64, tracer: &Tracer) -> Result<(), SimError> {
        for _ in 0..num_steps {
            let line = self.step()?;
            tracer.info(&line.trim_end());
        }
        Ok(())
    }

    /// PC of the next instruction to execute.
    pub fn pc(&self) -> Addr {
        self.pc
    }

    /// Committed value of a register, for inspection in tests.
    pub fn reg(&self, reg: usize) -> u32 {
        self.rf.read(reg)
    }
}
