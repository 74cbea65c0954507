//! Execute (EX) stage.
//!
//! Runs the instruction's arithmetic: result values, branch resolution, and
//! memory address generation all happen here, delegated to the instruction
//! object itself.

use crate::common::SimError;
use crate::core::pipeline::latches::{self, names};
use crate::core::pipeline::stages::{Stage, StageContext};
use crate::isa::Instruction;
use crate::ports::{PortMap, ReadPort, WritePort};

pub struct Execute {
    flush_in: ReadPort<bool>,
    from_decode: ReadPort<Instruction>,
    to_memory: WritePort<Instruction>,
    stall_out: WritePort<bool>,
    stall_in: ReadPort<bool>,
}

impl Execute {
    pub fn new(ports: &mut PortMap) -> Self {
        Self {
            flush_in: ports.read_port(names::MEMORY_2_EXECUTE_FLUSH, latches::PORT_LATENCY),
            from_decode: ports.read_port(names::DECODE_2_EXECUTE, latches::PORT_LATENCY),
            to_memory: ports.write_port(names::EXECUTE_2_MEMORY, latches::PORT_BW, latches::PORT_FANOUT),
            stall_out: ports.write_port(names::EXECUTE_2_DECODE_STALL, latches::PORT_BW, latches::PORT_FANOUT),
            stall_in: ports.read_port(names::MEMORY_2_EXECUTE_STALL, latches::PORT_LATENCY),
        }
    }
}

impl Stage for Execute {
    fn name(&self) -> &'static str {
        "execute"
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
            if let Some(instr) = self.from_decode.read(ctx.cycle) {
                ctx.rf.validate(instr.dst_num());
            }
            ctx.tracer.event(self.name(), ctx.cycle, "flush");
            return Ok(());
        }

        let Some(mut instr) = self.from_decode.read(ctx.cycle) else {
            ctx.tracer.event(self.name(), ctx.cycle, "bubble");
            return Ok(());
        };

        instr.execute();

        ctx.tracer.working(self.name(), ctx.cycle, &instr);
        self.to_memory.write(instr, ctx.cycle);
        Ok(())
    }
}
