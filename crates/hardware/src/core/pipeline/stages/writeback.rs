//! Writeback (WB) stage.
//!
//! Commits results to the register file and retires the instruction. Every
//! retirement steps the reference functional model one instruction and
//! compares the two renderings byte-for-byte. Squashed instructions never
//! get here; the checker silently re-synchronises past them. A divergence
//! is fatal.

use crate::common::SimError;
use crate::core::pipeline::latches::{self, names};
use crate::core::pipeline::stages::{Stage, StageContext};
use crate::isa::Instruction;
use crate::ports::{PortMap, ReadPort, WritePort};

/// Catch-up steps the checker may take per retirement before the gap is
/// declared a divergence. Mispredictions can chain back to back, one
/// squashed instruction each, but never anywhere near this many without an
/// intervening retirement.
const CHECKER_RESYNC_LIMIT: u32 = 64;

pub struct Writeback {
    from_memory: ReadPort<Instruction>,
    stall_out: WritePort<bool>,
}

impl Writeback {
    pub fn new(ports: &mut PortMap) -> Self {
        Self {
            from_memory: ports.read_port(names::MEMORY_2_WRITEBACK, latches::PORT_LATENCY),
            stall_out: ports.write_port(names::WRITEBACK_2_MEMORY_STALL, latches::PORT_BW, latches::PORT_FANOUT),
        }
    }
}

impl Stage for Writeback {
    fn name(&self) -> &'static str {
        "writeback"
    }

    fn stall_out(&self) -> Option<&WritePort<bool>> {
        Some(&self.stall_out)
    }

    fn operate(&mut self, ctx: &mut StageContext<'_>) -> Result<(), SimError> {
        let Some(instr) = self.from_memory.read(ctx.cycle) else {
            ctx.tracer.event(self.name(), ctx.cycle, "bubble");
            return Ok(());
        };

        if instr.is_invalid() {
            return Err(SimError::UnknownInstr {
                raw: instr.raw(),
                pc: instr.pc(),
            });
        }

        ctx.rf.write_dst(&instr);
        ctx.tracer.working(self.name(), ctx.cycle, &instr);

        // Squashed control flow never retires, so the reference model can
        // trail by the mispredicting instruction(s); let it catch up before
        // comparing. A gap the catch-up cannot close is a real divergence.
        let mut resync = 0;
        while ctx.checker.pc() != instr.pc() {
            if resync >= CHECKER_RESYNC_LIMIT {
                return Err(SimError::CheckMismatch {
                    checker: format!("functional model at {:#010x}\n", ctx.checker.pc()),
                    perf: format!("{}\n", instr),
                });
            }
            ctx.checker.step()?;
            resync += 1;
        }

        let perf_dump = format!("{}\n", instr);
        let checker_dump = ctx.checker.step()?;
        if checker_dump != perf_dump {
            return Err(SimError::CheckMismatch {
                checker: checker_dump,
                perf: perf_dump,
            });
        }

        ctx.stats.instructions_retired += 1;
        ctx.stats.last_writeback_cycle = ctx.cycle;
        Ok(())
    }
}
