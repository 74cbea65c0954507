//! Instruction Decode (ID) stage.
//!
//! Turns a fetch packet into an executable instruction, reads source
//! operands, and enforces the scoreboard: an instruction only leaves decode
//! once all of its sources and its destination are free of in-flight
//! writers. On a hazard it raises the stall signal towards fetch and keeps
//! the packet buffered; checking the destination too is what guarantees at
//! most one in-flight writer per register.

use crate::common::SimError;
use crate::core::pipeline::latches::{self, IfIdEntry, names};
use crate::core::pipeline::stages::{Stage, StageContext};
use crate::isa::Instruction;
use crate::ports::{PortMap, ReadPort, WritePort};

pub struct Decode {
    /// Packet retained across stalled cycles.
    buffer: Option<IfIdEntry>,
    flush_in: ReadPort<bool>,
    from_fetch: ReadPort<IfIdEntry>,
    to_execute: WritePort<Instruction>,
    stall_out: WritePort<bool>,
    stall_in: ReadPort<bool>,
}

impl Decode {
    pub fn new(ports: &mut PortMap) -> Self {
        Self {
            buffer: None,
            flush_in: ports.read_port(names::MEMORY_2_DECODE_FLUSH, latches::PORT_LATENCY),
            from_fetch: ports.read_port(names::FETCH_2_DECODE, latches::PORT_LATENCY),
            to_execute: ports.write_port(names::DECODE_2_EXECUTE, latches::PORT_BW, latches::PORT_FANOUT),
            stall_out: ports.write_port(names::DECODE_2_FETCH_STALL, latches::PORT_BW, latches::PORT_FANOUT),
            stall_in: ports.read_port(names::EXECUTE_2_DECODE_STALL, latches::PORT_LATENCY),
        }
    }
}

impl Stage for Decode {
    fn name(&self) -> &'static str {
        "decode"
    }

    fn stall_in(&self) -> Option<&ReadPort<bool>> {
        Some(&self.stall_in)
    }

    fn stall_out(&self) -> Option<&WritePort<bool>> {
        Some(&self.stall_out)
    }

    fn operate(&mut self, ctx: &mut StageContext<'_>) -> Result<(), SimError> {
        if self.flush_in.read(ctx.cycle).unwrap_or(false) {
            // The in-flight packet is wrong-path; drop it with the buffer.
            let _ = self.from_fetch.read(ctx.cycle);
            self.buffer = None;
            ctx.tracer.event(self.name(), ctx.cycle, "flush");
            return Ok(());
        }

        if self.buffer.is_none() {
            self.buffer = self.from_fetch.read(ctx.cycle);
        }
        let Some(data) = self.buffer else {
            ctx.tracer.event(self.name(), ctx.cycle, "bubble");
            return Ok(());
        };

        let mut instr = Instruction::new(data.raw, data.pc, data.predicted_taken, data.predicted_target);

        let no_hazard = ctx.rf.check(instr.src1_num())
            && ctx.rf.check(instr.src2_num())
            && ctx.rf.check(instr.dst_num());

        if no_hazard {
            ctx.rf.read_src1(&mut instr);
            ctx.rf.read_src2(&mut instr);
            ctx.rf.invalidate(instr.dst_num());
            self.buffer = None;

            ctx.tracer.working(self.name(), ctx.cycle, &instr);
            self.to_execute.write(instr, ctx.cycle);
        } else {
            self.send_stall(ctx.cycle);
            ctx.stats.data_hazard_stalls += 1;
            ctx.tracer.event(self.name(), ctx.cycle, "bubble (data hazard)");
        }
        Ok(())
    }
}
