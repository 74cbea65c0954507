//! End-to-end pipeline tests.
//!
//! Small hand-assembled programs run through the full simulator, with the
//! reference model checking every retirement. Cycle counts are exact: the
//! pipeline fills in four cycles, independent instructions then retire one
//! per cycle, a read-after-write hazard costs three stall cycles, and a
//! misprediction costs the flush plus refill.

use std::io::Write;

use tempfile::NamedTempFile;

use mips_core::common::SimError;
use mips_core::{Config, PerfSim};

use crate::common::asm;
use crate::common::asm::{T0, T1, T2, T3, T4, ZERO};

const BASE: u64 = 0x0040_0000;

fn build_sim(words: &[u32], num_steps: u64) -> PerfSim {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&asm::assemble(words)).expect("write image");

    let mut config = Config::default();
    config.run.binary = Some(file.path().to_str().expect("utf8 path").to_string());
    config.run.num_steps = num_steps;
    PerfSim::new(&config).expect("construct")
}

fn run_program(words: &[u32], num_steps: u64) -> PerfSim {
    let mut sim = build_sim(words, num_steps);
    sim.run().expect("run to completion");
    sim
}

// ══════════════════════════════════════════════════════════
// 1. Straight-line throughput
// ══════════════════════════════════════════════════════════

#[test]
fn independent_instructions_retire_one_per_cycle() {
    let sim = run_program(
        &[
            asm::addiu(T0, ZERO, 1),
            asm::addiu(T1, ZERO, 2),
            asm::addiu(T2, ZERO, 3),
            asm::addiu(T3, ZERO, 4),
            asm::addiu(T4, ZERO, 5),
        ],
        5,
    );

    let stats = sim.stats();
    assert_eq!(stats.instructions_retired, 5);
    // Four fill cycles, then one retirement per cycle.
    assert_eq!(stats.cycles, 9);
    assert_eq!(stats.data_hazard_stalls, 0);
    assert!((stats.ipc() - 5.0 / 9.0).abs() < 1e-9);

    for (reg, value) in [(T0, 1), (T1, 2), (T2, 3), (T3, 4), (T4, 5)] {
        assert_eq!(sim.reg(reg as usize), value);
    }
}

#[test]
fn ipc_stays_within_the_unit_interval() {
    let sim = run_program(&[asm::addiu(T0, ZERO, 1), asm::nop(), asm::nop()], 3);
    let ipc = sim.stats().ipc();
    assert!(ipc > 0.0 && ipc <= 1.0);
}

// ══════════════════════════════════════════════════════════
// 2. Read-after-write hazards
// ══════════════════════════════════════════════════════════

#[test]
fn raw_hazard_stalls_until_the_writer_retires() {
    let sim = run_program(
        &[asm::addiu(T0, ZERO, 7), asm::addiu(T1, T0, 5)],
        2,
    );

    let stats = sim.stats();
    assert_eq!(stats.instructions_retired, 2);
    // The consumer waits in decode while the producer walks to writeback.
    assert_eq!(stats.data_hazard_stalls, 3);
    assert_eq!(stats.cycles, 9);
    assert_eq!(sim.reg(T0 as usize), 7);
    assert_eq!(sim.reg(T1 as usize), 12);
}

#[test]
fn hi_lo_results_flow_through_the_pair() {
    let sim = run_program(
        &[
            asm::ori(T0, ZERO, 6),
            asm::ori(T1, ZERO, 7),
            asm::mult(T0, T1),
            asm::mflo(T2),
            asm::addu(T3, T2, T2),
        ],
        5,
    );

    assert_eq!(sim.reg(T2 as usize), 42);
    assert_eq!(sim.reg(T3 as usize), 84);
    assert!(sim.stats().data_hazard_stalls > 0, "mflo must wait for mult");
}

// ══════════════════════════════════════════════════════════
// 3. Branch misprediction and recovery
// ══════════════════════════════════════════════════════════

#[test]
fn taken_branch_flushes_the_wrong_path() {
    let sim = run_program(
        &[
            asm::addiu(T0, ZERO, 1),
            asm::beq(ZERO, ZERO, 2),
            asm::addiu(T1, ZERO, 99),
            asm::addiu(T1, ZERO, 99),
            asm::addiu(T2, ZERO, 7),
        ],
        2,
    );

    let stats = sim.stats();
    // The squashed branch itself never retires; the budget covers the
    // instruction before it and the one at its target.
    assert_eq!(stats.instructions_retired, 2);
    assert_eq!(stats.branch_mispredictions, 1);
    // One wrong-path instruction reached decode and stalled on another.
    assert_eq!(stats.data_hazard_stalls, 1);
    assert_eq!(stats.cycles, 11);

    assert_eq!(sim.reg(T0 as usize), 1);
    assert_eq!(sim.reg(T1 as usize), 0, "wrong path must leave no trace");
    assert_eq!(sim.reg(T2 as usize), 7);
}

#[test]
fn squashed_writer_releases_its_scoreboard_claim() {
    // The wrong-path instruction behind the branch claims t1 in decode and
    // is then squashed in flight. The correct-path instruction at the
    // target writes t1 as well; if the claim leaked, decode would stall on
    // it forever and the watchdog would fire.
    let sim = run_program(
        &[
            asm::beq(ZERO, ZERO, 1),
            asm::addiu(T1, ZERO, 99),
            asm::addiu(T1, ZERO, 5),
        ],
        2,
    );
    assert_eq!(sim.reg(T1 as usize), 5);
}

#[test]
fn loop_branch_trains_and_untrains() {
    // A three-iteration counted loop: the backward branch mispredicts cold,
    // predicts correctly once trained, and mispredicts again on exit.
    let sim = run_program(
        &[
            asm::addiu(T0, ZERO, 3),
            asm::addiu(T0, T0, -1),
            asm::bne(T0, ZERO, -2),
            asm::addiu(T1, ZERO, 5),
        ],
        6,
    );

    let stats = sim.stats();
    // Three decrements, one surviving branch (the trained middle
    // iteration), the initialisation, and the epilogue; the two
    // mispredicted branch executions are squashed, not retired.
    assert_eq!(stats.instructions_retired, 6);
    assert_eq!(stats.branch_mispredictions, 2, "cold miss and loop exit");
    assert_eq!(stats.branch_predictions, 1, "the middle iteration hits");
    assert_eq!(sim.reg(T0 as usize), 0);
    assert_eq!(sim.reg(T1 as usize), 5);
}

// ══════════════════════════════════════════════════════════
// 4. Memory operations
// ══════════════════════════════════════════════════════════

#[test]
fn stores_are_visible_to_later_loads() {
    let sim = run_program(
        &[
            asm::lui(T0, 0x0004),
            asm::ori(T1, ZERO, 0x1234),
            asm::sw(T1, T0, 8),
            asm::lw(T2, T0, 8),
            asm::addu(T3, T2, T1),
        ],
        5,
    );

    assert_eq!(sim.reg(T2 as usize), 0x1234);
    assert_eq!(sim.reg(T3 as usize), 0x2468);
}

#[test]
fn byte_loads_sign_extend() {
    let sim = run_program(
        &[
            asm::ori(T0, ZERO, 0x80),
            asm::sb(T0, ZERO, 0x100),
            asm::lb(T1, ZERO, 0x100),
        ],
        3,
    );
    assert_eq!(sim.reg(T1 as usize), 0xffff_ff80);
}

// ══════════════════════════════════════════════════════════
// 5. Fatal conditions
// ══════════════════════════════════════════════════════════

#[test]
fn retiring_an_unknown_encoding_is_fatal() {
    let mut sim = build_sim(&[0xffff_ffff], 1);
    assert!(matches!(
        sim.run(),
        Err(SimError::UnknownInstr { pc: p, .. }) if p == BASE
    ));
}

#[test]
fn bad_predictor_geometry_fails_construction() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(&asm::assemble(&[asm::nop()]))
        .expect("write image");

    let mut config = Config::default();
    config.run.binary = Some(file.path().to_str().expect("utf8 path").to_string());
    config.run.num_steps = 1;
    config.bpu.size_in_entries = 100;
    config.bpu.ways = 20;
    assert!(matches!(PerfSim::new(&config), Err(SimError::Config(_))));
}

#[test]
fn missing_binary_fails_construction() {
    let config = Config::default();
    assert!(matches!(PerfSim::new(&config), Err(SimError::Config(_))));
}
