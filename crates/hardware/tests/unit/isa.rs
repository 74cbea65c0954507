//! Instruction decode, execution, and disassembly tests.

use mips_core::isa::Instruction;
use mips_core::isa::abi::{REG_HI, REG_HI_LO, REG_RA};

use crate::common::asm;

const PC: u64 = 0x0040_0000;

/// Decodes `raw` at the fixed PC with a fall-through prediction.
fn instr(raw: u32) -> Instruction {
    Instruction::new(raw, PC, false, PC + 4)
}

/// Decodes, feeds operand values, executes.
fn executed(raw: u32, v1: u32, v2: u32) -> Instruction {
    let mut i = instr(raw);
    i.set_v_src1(v1);
    i.set_v_src2(v2);
    i.execute();
    i
}

// ══════════════════════════════════════════════════════════
// 1. Arithmetic and logic
// ══════════════════════════════════════════════════════════

#[test]
fn addu_adds_and_names_registers() {
    let i = executed(asm::addu(asm::T0, asm::T1, asm::T2), 7, 8);
    assert_eq!(i.v_dst(), 15);
    assert_eq!(i.dst_num(), 8);
    assert_eq!(i.src1_num(), 9);
    assert_eq!(i.src2_num(), 10);
    assert_eq!(i.new_pc(), PC + 4);
    assert!(!i.is_jump());
}

#[test]
fn addu_wraps_on_overflow() {
    let i = executed(asm::addu(asm::T0, asm::T1, asm::T2), u32::MAX, 2);
    assert_eq!(i.v_dst(), 1);
}

#[test]
fn subu_subtracts() {
    let i = executed(asm::subu(asm::T0, asm::T1, asm::T2), 5, 9);
    assert_eq!(i.v_dst(), 5u32.wrapping_sub(9));
}

#[test]
fn sra_extends_the_sign() {
    // Shift-by-immediate reads its operand from rt.
    let i = executed(asm::sra(asm::T0, asm::T1, 4), 0xffff_ff00, 0);
    assert_eq!(i.v_dst(), 0xffff_fff0);
}

#[test]
fn sll_is_logical() {
    let i = executed(asm::sll(asm::T0, asm::T1, 3), 1, 0);
    assert_eq!(i.v_dst(), 8);
}

#[test]
fn slt_compares_signed_sltu_unsigned() {
    let minus_one = -1i32 as u32;
    let slt = executed(asm::slt(asm::T0, asm::T1, asm::T2), minus_one, 1);
    assert_eq!(slt.v_dst(), 1, "-1 < 1 signed");
    let sltu = executed(asm::sltu(asm::T0, asm::T1, asm::T2), minus_one, 1);
    assert_eq!(sltu.v_dst(), 0, "0xffffffff > 1 unsigned");
}

#[test]
fn addiu_sign_extends_the_immediate() {
    let i = executed(asm::addiu(asm::T0, asm::T1, -4), 10, 0);
    assert_eq!(i.v_dst(), 6);
}

#[test]
fn ori_zero_extends_the_immediate() {
    let i = executed(asm::ori(asm::T0, asm::T1, 0xff00), 0x0f, 0);
    assert_eq!(i.v_dst(), 0xff0f);
}

#[test]
fn lui_builds_the_upper_half() {
    let i = executed(asm::lui(asm::T0, 0x1234), 0, 0);
    assert_eq!(i.v_dst(), 0x1234_0000);
}

// ══════════════════════════════════════════════════════════
// 2. Multiply and divide
// ══════════════════════════════════════════════════════════

#[test]
fn mult_produces_the_full_product() {
    let i = executed(asm::mult(asm::T0, asm::T1), 0x10000, 0x10000);
    assert_eq!(i.dst_num(), REG_HI_LO);
    assert_eq!(i.v_dst(), 0, "low half");
    assert_eq!(i.v_dst_hi(), 1, "high half");
}

#[test]
fn mult_is_signed() {
    let i = executed(asm::mult(asm::T0, asm::T1), -2i32 as u32, 3);
    assert_eq!(i.v_dst(), -6i32 as u32);
    assert_eq!(i.v_dst_hi(), u32::MAX, "sign extension into the high half");
}

#[test]
fn mfhi_reads_the_high_register() {
    let i = executed(asm::mfhi(asm::T0), 0xdead, 0);
    assert_eq!(i.src1_num(), REG_HI);
    assert_eq!(i.dst_num(), asm::T0 as usize);
    assert_eq!(i.v_dst(), 0xdead);
}

#[test]
fn div_splits_quotient_and_remainder() {
    let i = executed(asm::div(asm::T0, asm::T1), 7, 2);
    assert_eq!(i.v_dst(), 3, "quotient in lo");
    assert_eq!(i.v_dst_hi(), 1, "remainder in hi");
}

#[test]
fn div_by_zero_is_deterministic() {
    let i = executed(asm::div(asm::T0, asm::T1), 7, 0);
    assert_eq!(i.v_dst(), u32::MAX);
    assert_eq!(i.v_dst_hi(), 7);
}

// ══════════════════════════════════════════════════════════
// 3. Control flow
// ══════════════════════════════════════════════════════════

#[test]
fn taken_beq_redirects_and_mispredicts_a_fall_through_guess() {
    let i = executed(asm::beq(asm::T0, asm::T1, 2), 5, 5);
    assert!(i.is_jump());
    assert!(i.jump_executed());
    assert_eq!(i.new_pc(), PC + 4 + 8);
    assert!(i.misprediction(), "predicted not-taken, actually taken");
}

#[test]
fn not_taken_beq_matches_a_fall_through_guess() {
    let i = executed(asm::beq(asm::T0, asm::T1, 2), 5, 6);
    assert!(i.is_jump());
    assert!(!i.jump_executed());
    assert_eq!(i.new_pc(), PC + 4);
    assert!(!i.misprediction());
}

#[test]
fn correct_direction_with_wrong_target_still_mispredicts() {
    let mut i = Instruction::new(asm::beq(asm::T0, asm::T1, 2), PC, true, PC + 100);
    i.set_v_src1(5);
    i.set_v_src2(5);
    i.execute();
    assert!(i.jump_executed());
    assert!(i.misprediction(), "target disagrees");
}

#[test]
fn backward_branch_offset_is_signed() {
    let i = executed(asm::bne(asm::T0, asm::T1, -2), 1, 0);
    assert!(i.jump_executed());
    assert_eq!(i.new_pc(), PC - 4);
}

#[test]
fn jal_links_the_return_address() {
    let i = executed(asm::jal(0x0040_0100), 0, 0);
    assert!(i.jump_executed());
    assert_eq!(i.new_pc(), 0x0040_0100);
    assert_eq!(i.dst_num(), REG_RA);
    assert_eq!(i.v_dst(), (PC + 4) as u32);
}

#[test]
fn jr_jumps_through_the_register() {
    let i = executed(asm::jr(asm::T0), 0x0040_0200, 0);
    assert!(i.jump_executed());
    assert_eq!(i.new_pc(), 0x0040_0200);
    assert_eq!(i.dst_num(), 0);
}

// ══════════════════════════════════════════════════════════
// 4. Memory operations
// ══════════════════════════════════════════════════════════

#[test]
fn lw_computes_the_address_in_execute() {
    let i = executed(asm::lw(asm::T0, asm::T1, -8), 0x1000, 0);
    assert!(i.is_load());
    assert_eq!(i.mem_addr(), 0xff8);
    assert_eq!(i.mem_size(), 4);
}

#[test]
fn lb_sign_extends_the_loaded_byte() {
    let mut i = executed(asm::lb(asm::T0, asm::T1, 0), 0x1000, 0);
    i.set_v_dst(0x80);
    assert_eq!(i.v_dst(), 0xffff_ff80);
}

#[test]
fn sw_carries_the_store_value_in_src2() {
    let i = executed(asm::sw(asm::T0, asm::T1, 4), 0x1000, 0xdead);
    assert!(i.is_store());
    assert_eq!(i.mem_addr(), 0x1004);
    assert_eq!(i.v_src2(), 0xdead);
    assert_eq!(i.dst_num(), 0, "stores write no register");
}

// ══════════════════════════════════════════════════════════
// 5. Rendering and degenerate encodings
// ══════════════════════════════════════════════════════════

#[test]
fn display_renders_pc_operands_and_result() {
    let i = executed(asm::addu(asm::T0, asm::T1, asm::T2), 7, 8);
    assert_eq!(format!("{}", i), "0x00400000: addu $t0, $t1, $t2\t[ 0xf ]");
}

#[test]
fn display_renders_nop_for_the_zero_word() {
    let i = executed(asm::nop(), 0, 0);
    assert_eq!(format!("{}", i), "0x00400000: nop");
}

#[test]
fn unknown_encoding_is_inert() {
    let i = executed(0xffff_ffff, 0, 0);
    assert!(i.is_invalid());
    assert_eq!(i.new_pc(), PC + 4);
    assert_eq!(i.dst_num(), 0);
    assert!(!i.misprediction());
}
