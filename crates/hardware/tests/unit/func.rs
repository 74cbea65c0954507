//! Reference functional simulator tests.

use mips_core::FuncSim;
use mips_core::mem::ProgramMemory;

use crate::common::asm;

const BASE: u64 = 0x0040_0000;

fn func_sim(words: &[u32]) -> FuncSim {
    FuncSim::new(ProgramMemory::new(&asm::assemble(words), BASE))
}

#[test]
fn steps_execute_in_program_order() {
    let mut sim = func_sim(&[
        asm::ori(asm::T0, asm::ZERO, 5),
        asm::addiu(asm::T1, asm::T0, 3),
    ]);

    assert_eq!(sim.pc(), BASE);
    sim.step().expect("ori");
    assert_eq!(sim.pc(), BASE + 4);
    assert_eq!(sim.reg(asm::T0 as usize), 5);

    sim.step().expect("addiu");
    assert_eq!(sim.reg(asm::T1 as usize), 8);
}

#[test]
fn step_returns_the_rendered_trace_line() {
    let mut sim = func_sim(&[asm::ori(asm::T0, asm::ZERO, 5)]);
    let line = sim.step().expect("ori");
    assert_eq!(line, "0x00400000: ori $t0, $zero, 0x5\t[ 0x5 ]\n");
}

#[test]
fn branches_redirect_the_pc() {
    let mut sim = func_sim(&[
        asm::beq(asm::ZERO, asm::ZERO, 1),
        asm::ori(asm::T0, asm::ZERO, 99),
        asm::ori(asm::T1, asm::ZERO, 7),
    ]);

    sim.step().expect("beq");
    assert_eq!(sim.pc(), BASE + 8, "taken branch skips one instruction");
    sim.step().expect("target");
    assert_eq!(sim.reg(asm::T0 as usize), 0, "skipped instruction never ran");
    assert_eq!(sim.reg(asm::T1 as usize), 7);
}

#[test]
fn absolute_jump_redirects() {
    let mut sim = func_sim(&[
        asm::j(0x0040_000c),
        asm::ori(asm::T0, asm::ZERO, 99),
        asm::ori(asm::T0, asm::ZERO, 99),
        asm::ori(asm::T0, asm::ZERO, 7),
    ]);
    sim.step().expect("j");
    assert_eq!(sim.pc(), BASE + 12);
    sim.step().expect("target");
    assert_eq!(sim.reg(asm::T0 as usize), 7);
}

#[test]
fn jal_and_jr_round_trip() {
    let mut sim = func_sim(&[
        asm::jal(0x0040_000c),
        asm::ori(asm::T1, asm::ZERO, 3),
        asm::nop(),
        asm::ori(asm::T0, asm::ZERO, 9),
        asm::jr(asm::RA),
    ]);

    sim.step().expect("jal");
    assert_eq!(sim.reg(asm::RA as usize) as u64, BASE + 4, "link register");
    sim.step().expect("callee body");
    sim.step().expect("jr");
    assert_eq!(sim.pc(), BASE + 4, "returned to the link address");
    sim.step().expect("after return");
    assert_eq!(sim.reg(asm::T0 as usize), 9);
    assert_eq!(sim.reg(asm::T1 as usize), 3);
}

#[test]
fn loads_and_stores_round_trip() {
    let mut sim = func_sim(&[
        asm::lui(asm::T0, 0x0010),
        asm::ori(asm::T1, asm::ZERO, 0xbeef),
        asm::sw(asm::T1, asm::T0, 12),
        asm::lw(asm::T2, asm::T0, 12),
    ]);
    for _ in 0..4 {
        sim.step().expect("step");
    }
    assert_eq!(sim.reg(asm::T2 as usize), 0xbeef);
}

#[test]
fn unknown_encoding_is_fatal() {
    let mut sim = func_sim(&[0xffff_ffff]);
    assert!(sim.step().is_err());
}
