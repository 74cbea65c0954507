//! Pipeline stage interface and implementations.
//!
//! Each stage is a value owning exactly the port endpoints it talks
//! through, constructed against the simulator's port map. The driver holds
//! the stages in program order and clocks each once per cycle through the
//! [`Stage`] trait; shared units (register file, predictor, memory, checker,
//! statistics, tracer) are threaded in via a per-cycle [`StageContext`]
//! borrow rather than back-references.

/// Instruction fetch.
pub mod fetch;

/// Instruction decode and hazard detection.
pub mod decode;

/// Execution.
pub mod execute;

/// Memory access and misprediction recovery.
pub mod memory;

/// Writeback, retirement, and checker coupling.
pub mod writeback;

pub use self::decode::Decode;
pub use self::execute::Execute;
pub use self::fetch::Fetch;
pub use self::memory::MemoryAccess;
pub use self::writeback::Writeback;

use crate::common::{Cycle, SimError};
use crate::core::arch::RegisterFile;
use crate::core::units::Bpu;
use crate::func::FuncSim;
use crate::mem::ProgramMemory;
use crate::ports::{ReadPort, WritePort};
use crate::stats::SimStats;
use crate::trace::Tracer;

/// Shared units a stage may touch during one cycle.
pub struct StageContext<'a> {
    pub cycle: Cycle,
    pub rf: &'a mut RegisterFile,
    pub bpu: &'a mut Bpu,
    pub memory: &'a mut ProgramMemory,
    pub checker: &'a mut FuncSim,
    pub stats: &'a mut SimStats,
    pub tracer: &'a Tracer,
}

/// One pipeline stage, clocked once per cycle in program order.
pub trait Stage {
    /// Name used in trace lines.
    fn name(&self) -> &'static str;

    /// Stall signal raised by the downstream stage, if this stage can be
    /// held.
    fn stall_in(&self) -> Option<&ReadPort<bool>> {
        None
    }

    /// Stall signal towards the upstream stage, if this stage can hold it.
    fn stall_out(&self) -> Option<&WritePort<bool>> {
        None
    }

    /// One unit of work. Flush handling comes first, before any input is
    /// consumed.
    fn operate(&mut self, ctx: &mut StageContext<'_>) -> Result<(), SimError>;

    /// Clocks the stage: a raised downstream stall short-circuits the whole
    /// cycle into a bubble, consuming the signal, and the stage neither
    /// reads its input nor writes its output.
    fn clock(&mut self, ctx: &mut StageContext<'_>) -> Result<(), SimError> {
        if let Some(port) = self.stall_in() {
            if port.read(ctx.cycle).unwrap_or(false) {
                ctx.tracer.event(self.name(), ctx.cycle, "bubble (stall)");
                return Ok(());
            }
        }
        self.operate(ctx)
    }

    /// Raises the stall signal towards the upstream stage.
    fn send_stall(&self, cycle: Cycle) {
        if let Some(port) = self.stall_out() {
            port.write(true, cycle);
        }
    }
}
