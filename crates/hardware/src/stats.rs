//! Simulation statistics collection and reporting.
//!
//! This module tracks performance counters for a run. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and the derived
//!    instructions-per-cycle figure.
//! 2. **Branch prediction:** Resolved control-flow outcomes and accuracy.
//! 3. **Stalls:** Data-hazard stall cycles raised by decode.

/// Counters accumulated over one simulation run.
#[derive(Clone, Default)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired at writeback.
    pub instructions_retired: u64,
    /// Cycle of the most recent writeback; drives the deadlock watchdog.
    pub last_writeback_cycle: u64,

    /// Control-flow instructions whose prediction matched the outcome.
    pub branch_predictions: u64,
    /// Control-flow instructions that flushed the pipeline.
    pub branch_mispredictions: u64,

    /// Cycles decode spent stalled on a read-after-write hazard.
    pub data_hazard_stalls: u64,
}

impl SimStats {
    /// Retired instructions per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Prints the summary banner to stdout.
    pub fn print(&self) {
        let bp_total = self.branch_predictions + self.branch_mispredictions;
        let bp_acc = if bp_total > 0 {
            100.0 * (self.branch_predictions as f64 / bp_total as f64)
        } else {
            0.0
        };
        println!("\n==========================================================");
        println!("MIPS PIPELINE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("sim_cycles               {}", self.cycles);
        println!("sim_insts                {}", self.instructions_retired);
        println!("sim_ipc                  {:.4}", self.ipc());
        println!("----------------------------------------------------------");
        println!("BRANCH PREDICTION");
        println!("  bp.resolved            {}", bp_total);
        println!("  bp.mispredicts         {}", self.branch_mispredictions);
        println!("  bp.accuracy            {:.2}%", bp_acc);
        println!("----------------------------------------------------------");
        println!("STALLS");
        println!("  stalls.data            {}", self.data_hazard_stalls);
        println!("==========================================================");
    }
}
