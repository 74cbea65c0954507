//! Memory Access (MEM) stage, the misprediction point.
//!
//! Trains the branch predictor with every resolved instruction, then tests
//! the prediction attached at fetch against the executed outcome. On a
//! misprediction it broadcasts the flush to fetch, decode, execute, and its
//! own input, redirects fetch to the real target, and un-marks the squashed
//! destination so the scoreboard balances. Surviving instructions perform
//! their load or store here and move on to writeback.

use crate::common::{Addr, SimError};
use crate::core::pipeline::latches::{self, names};
use crate::core::pipeline::stages::{Stage, StageContext};
use crate::isa::Instruction;
use crate::ports::{PortMap, ReadPort, WritePort};

pub struct MemoryAccess {
    /// A self-flush from the previous cycle clears this stage's own input.
    flush_in: ReadPort<bool>,
    from_execute: ReadPort<Instruction>,
    to_writeback: WritePort<Instruction>,
    flush_fetch: WritePort<bool>,
    flush_decode: WritePort<bool>,
    flush_execute: WritePort<bool>,
    flush_self: WritePort<bool>,
    target_out: WritePort<Addr>,
    stall_out: WritePort<bool>,
    stall_in: ReadPort<bool>,
}

impl MemoryAccess {
    pub fn new(ports: &mut PortMap) -> Self {
        Self {
            flush_in: ports.read_port(names::MEMORY_2_MEMORY_FLUSH, latches::PORT_LATENCY),
            from_execute: ports.read_port(names::EXECUTE_2_MEMORY, latches::PORT_LATENCY),
            to_writeback: ports.write_port(names::MEMORY_2_WRITEBACK, latches::PORT_BW, latches::PORT_FANOUT),
            flush_fetch: ports.write_port(names::MEMORY_2_FETCH_FLUSH, latches::PORT_BW, latches::PORT_FANOUT),
            flush_decode: ports.write_port(names::MEMORY_2_DECODE_FLUSH, latches::PORT_BW, latches::PORT_FANOUT),
            flush_execute: ports.write_port(names::MEMORY_2_EXECUTE_FLUSH, latches::PORT_BW, latches::PORT_FANOUT),
            flush_self: ports.write_port(names::MEMORY_2_MEMORY_FLUSH, latches::PORT_BW, latches::PORT_FANOUT),
            target_out: ports.write_port(names::MEMORY_2_FETCH_TARGET, latches::PORT_BW, latches::PORT_FANOUT),
            stall_out: ports.write_port(names::MEMORY_2_EXECUTE_STALL, latches::PORT_BW, latches::PORT_FANOUT),
            stall_in: ports.read_port(names::WRITEBACK_2_MEMORY_STALL, latches::PORT_LATENCY),
        }
    }
}

impl Stage for MemoryAccess {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn stall_in(&self) -> Option<&ReadPort<bool>> {
        Some(&self.stall_in)
    }

    fn stall_out(&self) -> Option<&WritePort<bool>> {
        Some(&self.stall_out)
    }

    fn operate(&mut self, ctx: &mut StageContext<'_>) -> Result<(), SimError> {
        if self.flush_in.read(ctx.cycle).unwrap_or(false) {
            // The drained instruction already claimed its destination in
            // decode and will never retire; release the scoreboard bit.
            if let Some(instr) = self.from_execute.read(ctx.cycle) {
                ctx.rf.validate(instr.dst_num());
            }
            ctx.tracer.event(self.name(), ctx.cycle, "flush");
            return Ok(());
        }

        let Some(mut instr) = self.from_execute.read(ctx.cycle) else {
            ctx.tracer.event(self.name(), ctx.cycle, "bubble");
            return Ok(());
        };

        let actually_taken = instr.is_jump() && instr.jump_executed();
        let real_target = instr.new_pc();

        ctx.bpu.update(actually_taken, instr.pc(), real_target);

        if instr.misprediction() {
            self.flush_fetch.write(true, ctx.cycle);
            self.flush_decode.write(true, ctx.cycle);
            self.flush_execute.write(true, ctx.cycle);
            self.flush_self.write(true, ctx.cycle);

            self.target_out.write(real_target, ctx.cycle);

            // Decode marked the destination busy; the instruction will not
            // retire, so the scoreboard must be rebalanced here.
            ctx.rf.validate(instr.dst_num());

            ctx.stats.branch_mispredictions += 1;
            ctx.tracer.event(self.name(), ctx.cycle, "misprediction");
            return Ok(());
        }

        if instr.is_jump() {
            ctx.stats.branch_predictions += 1;
        }

        if instr.is_load() {
            instr.set_v_dst(ctx.memory.read(instr.mem_addr(), instr.mem_size()));
        } else if instr.is_store() {
            ctx.memory.write(instr.v_src2(), instr.mem_addr(), instr.mem_size());
        }

        ctx.tracer.working(self.name(), ctx.cycle, &instr);
        self.to_writeback.write(instr, ctx.cycle);
        Ok(())
    }
}
