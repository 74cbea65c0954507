//! Simulator driver.
//!
//! Owns everything: the five stages in program order, the shared units they
//! borrow each cycle, the validated-then-frozen port fabric wiring them
//! together, and the global cycle counter. The per-cycle traversal in
//! program order, combined with every port having latency of at least one,
//! gives clock-edge semantics: the order stages run within a cycle is
//! unobservable.

use crate::common::{Cycle, SimError};
use crate::config::Config;
use crate::core::arch::RegisterFile;
use crate::core::pipeline::stages::{
    Decode, Execute, Fetch, MemoryAccess, Stage, StageContext, Writeback,
};
use crate::core::units::Bpu;
use crate::func::FuncSim;
use crate::mem::ProgramMemory;
use crate::ports::PortMap;
use crate::sim::loader;
use crate::stats::SimStats;
use crate::trace::Tracer;

/// Cycles without a writeback after which the run is declared dead.
pub const DEADLOCK_THRESHOLD: Cycle = 1000;

/// Cycle-accurate pipeline simulator.
pub struct PerfSim {
    cycle: Cycle,
    num_steps: u64,
    stages: Vec<Box<dyn Stage>>,
    rf: RegisterFile,
    bpu: Bpu,
    memory: ProgramMemory,
    checker: FuncSim,
    stats: SimStats,
    tracer: Tracer,
}

impl PerfSim {
    /// Builds the simulator: loads the image twice (pipeline memory and
    /// checker memory), constructs the predictor, wires the stages through
    /// the port map, and validates the fabric before the first cycle.
    pub fn new(config: &Config) -> Result<Self, SimError> {
        let path = config
            .run
            .binary
            .as_deref()
            .ok_or_else(|| SimError::Config("no program image configured".into()))?;
        let image = loader::load_image(path)?;
        let base = config.machine.text_base;
        let memory = ProgramMemory::new(&image, base);
        let checker = FuncSim::new(ProgramMemory::new(&image, base));
        let bpu = Bpu::new(&config.bpu)?;

        let mut ports = PortMap::new();
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(Fetch::new(&mut ports, memory.start_pc())),
            Box::new(Decode::new(&mut ports)),
            Box::new(Execute::new(&mut ports)),
            Box::new(MemoryAccess::new(&mut ports)),
            Box::new(Writeback::new(&mut ports)),
        ];
        ports.validate()?;

        Ok(Self {
            cycle: 0,
            num_steps: config.run.num_steps,
            stages,
            rf: RegisterFile::new(),
            bpu,
            memory,
            checker,
            stats: SimStats::default(),
            tracer: Tracer::new(config.run.disassembly),
        })
    }

    /// Runs until the retirement budget is met.
    pub fn run(&mut self) -> Result<(), SimError> {
        while self.stats.instructions_retired < self.num_steps {
            {
                let mut ctx = StageContext {
                    cycle: self.cycle,
                    rf: &mut self.rf,
                    bpu: &mut self.bpu,
                    memory: &mut self.memory,
                    checker: &mut self.checker,
                    stats: &mut self.stats,
                    tracer: &self.tracer,
                };
                for stage in &mut self.stages {
                    stage.clock(&mut ctx)?;
                }
            }

            self.cycle += 1;
            self.stats.cycles = self.cycle;

            if self.cycle - self.stats.last_writeback_cycle >= DEADLOCK_THRESHOLD {
                return Err(SimError::Deadlock {
                    cycle: self.cycle,
                    threshold: DEADLOCK_THRESHOLD,
                });
            }

            self.tracer.info(&format!(
                "Executed instructions: {}\n",
                self.stats.instructions_retired
            ));
        }
        Ok(())
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Current cycle number.
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// Committed value of a register, for inspection in tests.
    pub fn reg(&self, reg: usize) -> u32 {
        self.rf.read(reg)
    }
}
