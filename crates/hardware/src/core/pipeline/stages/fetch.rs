//! Instruction Fetch (IF) stage.
//!
//! Owns the program counter. Each cycle it honours a pending misprediction
//! redirect, fetches the raw word at the PC, asks the branch predictor for
//! the next PC, and sends the packet down to decode. While the decode stage
//! holds it stalled, the clock wrapper keeps the PC frozen, so the same
//! packet is produced again on the next unstalled cycle.

use crate::common::{Addr, INSTR_SIZE, SimError};
use crate::core::pipeline::latches::{self, IfIdEntry, names};
use crate::core::pipeline::stages::{Stage, StageContext};
use crate::ports::{PortMap, ReadPort, WritePort};

pub struct Fetch {
    pc: Addr,
    flush_in: ReadPort<bool>,
    target_in: ReadPort<Addr>,
    to_decode: WritePort<IfIdEntry>,
    stall_in: ReadPort<bool>,
}

impl Fetch {
    pub fn new(ports: &mut PortMap, start_pc: Addr) -> Self {
        Self {
            pc: start_pc,
            flush_in: ports.read_port(names::MEMORY_2_FETCH_FLUSH, latches::PORT_LATENCY),
            target_in: ports.read_port(names::MEMORY_2_FETCH_TARGET, latches::PORT_LATENCY),
            to_decode: ports.write_port(names::FETCH_2_DECODE, latches::PORT_BW, latches::PORT_FANOUT),
            stall_in: ports.read_port(names::DECODE_2_FETCH_STALL, latches::PORT_LATENCY),
        }
    }
}

impl Stage for Fetch {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn stall_in(&self) -> Option<&ReadPort<bool>> {
        Some(&self.stall_in)
    }

    fn operate(&mut self, ctx: &mut StageContext<'_>) -> Result<(), SimError> {
        if self.flush_in.read(ctx.cycle).unwrap_or(false) {
            if let Some(target) = self.target_in.read(ctx.cycle) {
                self.pc = target;
            }
        }

        let raw = ctx.memory.read_word(self.pc);

        let predicted_taken = ctx.bpu.predict_taken(self.pc);
        let predicted_target = if predicted_taken {
            ctx.bpu.target(self.pc)
        } else {
            self.pc.wrapping_add(INSTR_SIZE)
        };

        self.to_decode.write(
            IfIdEntry {
                pc: self.pc,
                raw,
                predicted_taken,
                predicted_target,
            },
            ctx.cycle,
        );

        ctx.tracer
            .working(self.name(), ctx.cycle, &format!("{:#010x}", raw));

        self.pc = predicted_target;
        Ok(())
    }
}
