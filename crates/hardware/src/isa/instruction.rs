//! Decoded, executable instruction objects.
//!
//! An [`Instruction`] is created from a raw word and a PC, optionally carrying
//! the branch prediction made at fetch time. It performs:
//! 1. **Operand Mapping:** Encoding fields to scoreboard source/destination
//!    indices, including the HI:LO pair.
//! 2. **Execution:** ALU results, branch resolution, and memory address
//!    generation via [`Instruction::execute`].
//! 3. **Rendering:** A disassembly `Display` shared by the pipeline and the
//!    reference model, which is what makes their traces comparable
//!    byte-for-byte.

use std::fmt;

use crate::common::{Addr, INSTR_SIZE};
use crate::isa::abi::{self, REG_HI, REG_HI_LO, REG_LO, REG_RA, REG_ZERO};
use crate::isa::decode::{Decoded, decode, funct, opcodes, regimm};

/// Operations of the supported MIPS-I integer subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Jr,
    Jalr,
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Mult,
    Multu,
    Div,
    Divu,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Bltz,
    Bgez,
    J,
    Jal,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    /// Unrecognised encoding. Inert when executed; wrong-path fetches of
    /// data or zeroed memory must flow through the pipeline harmlessly
    /// until the misprediction that produced them is resolved.
    Invalid,
}

/// One in-flight instruction, from decode through writeback.
#[derive(Clone, Debug)]
pub struct Instruction {
    d: Decoded,
    op: Op,
    pc: Addr,
    new_pc: Addr,

    src1: usize,
    src2: usize,
    dst: usize,

    v_src1: u32,
    v_src2: u32,
    v_dst: u32,
    /// HI half of the result when the destination is the HI:LO pair.
    v_dst_hi: u32,

    mem_addr: Addr,
    mem_size: u32,
    sign_extend_load: bool,
    is_load: bool,
    is_store: bool,

    is_jump: bool,
    jump_executed: bool,

    predicted_taken: bool,
    predicted_target: Addr,
}

impl Instruction {
    /// Decodes `raw` fetched from `pc`, attaching the fetch-time prediction.
    pub fn new(raw: u32, pc: Addr, predicted_taken: bool, predicted_target: Addr) -> Self {
        let d = decode(raw);
        let mut instr = Self {
            d,
            op: Op::Invalid,
            pc,
            new_pc: pc.wrapping_add(INSTR_SIZE),
            src1: REG_ZERO,
            src2: REG_ZERO,
            dst: REG_ZERO,
            v_src1: 0,
            v_src2: 0,
            v_dst: 0,
            v_dst_hi: 0,
            mem_addr: 0,
            mem_size: 0,
            sign_extend_load: false,
            is_load: false,
            is_store: false,
            is_jump: false,
            jump_executed: false,
            predicted_taken,
            predicted_target,
        };
        instr.map_operands();
        instr
    }

    /// Assigns the operation and its scoreboard operand indices.
    fn map_operands(&mut self) {
        let d = self.d;
        match d.opcode {
            opcodes::SPECIAL => match d.funct {
                funct::SLL => self.r_shift_imm(Op::Sll),
                funct::SRL => self.r_shift_imm(Op::Srl),
                funct::SRA => self.r_shift_imm(Op::Sra),
                funct::SLLV => self.r_type(Op::Sllv),
                funct::SRLV => self.r_type(Op::Srlv),
                funct::SRAV => self.r_type(Op::Srav),
                funct::JR => {
                    self.op = Op::Jr;
                    self.src1 = d.rs;
                    self.is_jump = true;
                }
                funct::JALR => {
                    self.op = Op::Jalr;
                    self.src1 = d.rs;
                    self.dst = d.rd;
                    self.is_jump = true;
                }
                funct::MFHI => {
                    self.op = Op::Mfhi;
                    self.src1 = REG_HI;
                    self.dst = d.rd;
                }
                funct::MTHI => {
                    self.op = Op::Mthi;
                    self.src1 = d.rs;
                    self.dst = REG_HI;
                }
                funct::MFLO => {
                    self.op = Op::Mflo;
                    self.src1 = REG_LO;
                    self.dst = d.rd;
                }
                funct::MTLO => {
                    self.op = Op::Mtlo;
                    self.src1 = d.rs;
                    self.dst = REG_LO;
                }
                funct::MULT => self.mul_div(Op::Mult),
                funct::MULTU => self.mul_div(Op::Multu),
                funct::DIV => self.mul_div(Op::Div),
                funct::DIVU => self.mul_div(Op::Divu),
                funct::ADD => self.r_type(Op::Add),
                funct::ADDU => self.r_type(Op::Addu),
                funct::SUB => self.r_type(Op::Sub),
                funct::SUBU => self.r_type(Op::Subu),
                funct::AND => self.r_type(Op::And),
                funct::OR => self.r_type(Op::Or),
                funct::XOR => self.r_type(Op::Xor),
                funct::NOR => self.r_type(Op::Nor),
                funct::SLT => self.r_type(Op::Slt),
                funct::SLTU => self.r_type(Op::Sltu),
                _ => {}
            },
            opcodes::REGIMM => match d.rt as u32 {
                regimm::BLTZ => self.branch_one(Op::Bltz),
                regimm::BGEZ => self.branch_one(Op::Bgez),
                _ => {}
            },
            opcodes::J => {
                self.op = Op::J;
                self.is_jump = true;
            }
            opcodes::JAL => {
                self.op = Op::Jal;
                self.dst = REG_RA;
                self.is_jump = true;
            }
            opcodes::BEQ => self.branch_two(Op::Beq),
            opcodes::BNE => self.branch_two(Op::Bne),
            opcodes::BLEZ => self.branch_one(Op::Blez),
            opcodes::BGTZ => self.branch_one(Op::Bgtz),
            opcodes::ADDI => self.i_type(Op::Addi),
            opcodes::ADDIU => self.i_type(Op::Addiu),
            opcodes::SLTI => self.i_type(Op::Slti),
            opcodes::SLTIU => self.i_type(Op::Sltiu),
            opcodes::ANDI => self.i_type(Op::Andi),
            opcodes::ORI => self.i_type(Op::Ori),
            opcodes::XORI => self.i_type(Op::Xori),
            opcodes::LUI => {
                self.op = Op::Lui;
                self.dst = d.rt;
            }
            opcodes::LB => self.load(Op::Lb, 1, true),
            opcodes::LH => self.load(Op::Lh, 2, true),
            opcodes::LW => self.load(Op::Lw, 4, true),
            opcodes::LBU => self.load(Op::Lbu, 1, false),
            opcodes::LHU => self.load(Op::Lhu, 2, false),
            opcodes::SB => self.store(Op::Sb, 1),
            opcodes::SH => self.store(Op::Sh, 2),
            opcodes::SW => self.store(Op::Sw, 4),
            _ => {}
        }
    }

    fn r_type(&mut self, op: Op) {
        self.op = op;
        self.src1 = self.d.rs;
        self.src2 = self.d.rt;
        self.dst = self.d.rd;
    }

    fn r_shift_imm(&mut self, op: Op) {
        self.op = op;
        self.src1 = self.d.rt;
        self.dst = self.d.rd;
    }

    fn mul_div(&mut self, op: Op) {
        self.op = op;
        self.src1 = self.d.rs;
        self.src2 = self.d.rt;
        self.dst = REG_HI_LO;
    }

    fn i_type(&mut self, op: Op) {
        self.op = op;
        self.src1 = self.d.rs;
        self.dst = self.d.rt;
    }

    fn branch_two(&mut self, op: Op) {
        self.op = op;
        self.src1 = self.d.rs;
        self.src2 = self.d.rt;
        self.is_jump = true;
    }

    fn branch_one(&mut self, op: Op) {
        self.op = op;
        self.src1 = self.d.rs;
        self.is_jump = true;
    }

    fn load(&mut self, op: Op, size: u32, sign: bool) {
        self.op = op;
        self.src1 = self.d.rs;
        self.dst = self.d.rt;
        self.mem_size = size;
        self.sign_extend_load = sign;
        self.is_load = true;
    }

    fn store(&mut self, op: Op, size: u32) {
        self.op = op;
        self.src1 = self.d.rs;
        self.src2 = self.d.rt;
        self.mem_size = size;
        self.is_store = true;
    }

    /// Sign-extended 16-bit immediate.
    fn sext_imm(&self) -> u32 {
        self.d.imm as i16 as i32 as u32
    }

    /// Resolved PC-relative branch target.
    fn branch_target(&self) -> Addr {
        let offset = (self.d.imm as i16 as i64) << 2;
        self.pc
            .wrapping_add(INSTR_SIZE)
            .wrapping_add(offset as u64)
            & 0xffff_ffff
    }

    /// Resolved J-format absolute target.
    fn jump_target(&self) -> Addr {
        let base = (self.pc as u32).wrapping_add(INSTR_SIZE as u32) & 0xf000_0000;
        (base | (self.d.target << 2)) as Addr
    }

    /// Computes the result value, branch outcome, and memory address.
    /// Loads receive their value later, at the memory stage.
    pub fn execute(&mut self) {
        let a = self.v_src1;
        let b = self.v_src2;
        match self.op {
            Op::Sll => self.v_dst = a << self.d.shamt,
            Op::Srl => self.v_dst = a >> self.d.shamt,
            Op::Sra => self.v_dst = ((a as i32) >> self.d.shamt) as u32,
            Op::Sllv => self.v_dst = b << (a & 0x1f),
            Op::Srlv => self.v_dst = b >> (a & 0x1f),
            Op::Srav => self.v_dst = ((b as i32) >> (a & 0x1f)) as u32,
            Op::Jr => {
                self.jump_executed = true;
                self.new_pc = a as Addr;
            }
            Op::Jalr => {
                self.jump_executed = true;
                self.new_pc = a as Addr;
                self.v_dst = (self.pc.wrapping_add(INSTR_SIZE)) as u32;
            }
            Op::Mfhi | Op::Mflo | Op::Mthi | Op::Mtlo => self.v_dst = a,
            Op::Mult => {
                let prod = (a as i32 as i64).wrapping_mul(b as i32 as i64);
                self.v_dst = prod as u32;
                self.v_dst_hi = (prod >> 32) as u32;
            }
            Op::Multu => {
                let prod = (a as u64) * (b as u64);
                self.v_dst = prod as u32;
                self.v_dst_hi = (prod >> 32) as u32;
            }
            Op::Div => {
                let (lhs, rhs) = (a as i32, b as i32);
                if rhs == 0 {
                    self.v_dst = !0;
                    self.v_dst_hi = a;
                } else {
                    self.v_dst = lhs.wrapping_div(rhs) as u32;
                    self.v_dst_hi = lhs.wrapping_rem(rhs) as u32;
                }
            }
            Op::Divu => {
                if b == 0 {
                    self.v_dst = !0;
                    self.v_dst_hi = a;
                } else {
                    self.v_dst = a / b;
                    self.v_dst_hi = a % b;
                }
            }
            Op::Add | Op::Addu => self.v_dst = a.wrapping_add(b),
            Op::Sub | Op::Subu => self.v_dst = a.wrapping_sub(b),
            Op::And => self.v_dst = a & b,
            Op::Or => self.v_dst = a | b,
            Op::Xor => self.v_dst = a ^ b,
            Op::Nor => self.v_dst = !(a | b),
            Op::Slt => self.v_dst = ((a as i32) < (b as i32)) as u32,
            Op::Sltu => self.v_dst = (a < b) as u32,
            Op::Bltz => self.resolve_branch((a as i32) < 0),
            Op::Bgez => self.resolve_branch((a as i32) >= 0),
            Op::Beq => self.resolve_branch(a == b),
            Op::Bne => self.resolve_branch(a != b),
            Op::Blez => self.resolve_branch((a as i32) <= 0),
            Op::Bgtz => self.resolve_branch((a as i32) > 0),
            Op::J => {
                self.jump_executed = true;
                self.new_pc = self.jump_target();
            }
            Op::Jal => {
                self.jump_executed = true;
                self.new_pc = self.jump_target();
                self.v_dst = (self.pc.wrapping_add(INSTR_SIZE)) as u32;
            }
            Op::Addi | Op::Addiu => self.v_dst = a.wrapping_add(self.sext_imm()),
            Op::Slti => self.v_dst = ((a as i32) < (self.sext_imm() as i32)) as u32,
            Op::Sltiu => self.v_dst = (a < self.sext_imm()) as u32,
            Op::Andi => self.v_dst = a & (self.d.imm as u32),
            Op::Ori => self.v_dst = a | (self.d.imm as u32),
            Op::Xori => self.v_dst = a ^ (self.d.imm as u32),
            Op::Lui => self.v_dst = (self.d.imm as u32) << 16,
            Op::Lb | Op::Lh | Op::Lw | Op::Lbu | Op::Lhu | Op::Sb | Op::Sh | Op::Sw => {
                self.mem_addr = (a.wrapping_add(self.sext_imm())) as Addr;
            }
            Op::Invalid => {}
        }
    }

    fn resolve_branch(&mut self, taken: bool) {
        self.jump_executed = taken;
        if taken {
            self.new_pc = self.branch_target();
        }
    }

    /// First source register (scoreboard index).
    pub fn src1_num(&self) -> usize {
        self.src1
    }

    /// Second source register (scoreboard index).
    pub fn src2_num(&self) -> usize {
        self.src2
    }

    /// Destination register, [`REG_HI_LO`] for multiply/divide,
    /// [`REG_ZERO`] when the instruction writes nothing.
    pub fn dst_num(&self) -> usize {
        self.dst
    }

    pub fn pc(&self) -> Addr {
        self.pc
    }

    /// Architecturally correct next PC, valid after [`Instruction::execute`].
    pub fn new_pc(&self) -> Addr {
        self.new_pc
    }

    pub fn is_load(&self) -> bool {
        self.is_load
    }

    pub fn is_store(&self) -> bool {
        self.is_store
    }

    pub fn is_jump(&self) -> bool {
        self.is_jump
    }

    /// Whether a control-flow instruction actually redirected the PC.
    pub fn jump_executed(&self) -> bool {
        self.jump_executed
    }

    pub fn is_invalid(&self) -> bool {
        self.op == Op::Invalid
    }

    pub fn raw(&self) -> u32 {
        self.d.raw
    }

    pub fn mem_addr(&self) -> Addr {
        self.mem_addr
    }

    /// Access width in bytes; 0 for non-memory operations.
    pub fn mem_size(&self) -> u32 {
        self.mem_size
    }

    /// Value to be stored (second source operand).
    pub fn v_src2(&self) -> u32 {
        self.v_src2
    }

    pub fn set_v_src1(&mut self, value: u32) {
        self.v_src1 = value;
    }

    pub fn set_v_src2(&mut self, value: u32) {
        self.v_src2 = value;
    }

    /// Result value; the LO half for the HI:LO pair.
    pub fn v_dst(&self) -> u32 {
        self.v_dst
    }

    /// HI half of a multiply/divide result.
    pub fn v_dst_hi(&self) -> u32 {
        self.v_dst_hi
    }

    /// Installs a value read from memory, applying the load's extension.
    pub fn set_v_dst(&mut self, raw: u32) {
        self.v_dst = if self.sign_extend_load {
            match self.mem_size {
                1 => raw as u8 as i8 as i32 as u32,
                2 => raw as u16 as i16 as i32 as u32,
                _ => raw,
            }
        } else {
            raw
        };
    }

    /// Whether the fetch-time prediction disagrees with the executed
    /// outcome, in direction or in target.
    pub fn misprediction(&self) -> bool {
        let actually_taken = self.is_jump && self.jump_executed;
        self.predicted_taken != actually_taken || self.predicted_target != self.new_pc
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}: ", self.pc)?;
        self.fmt_disasm(f)?;
        if self.dst == REG_HI_LO {
            write!(f, "\t[ hi = {:#x}, lo = {:#x} ]", self.v_dst_hi, self.v_dst)?;
        } else if self.dst != REG_ZERO {
            write!(f, "\t[ {:#x} ]", self.v_dst)?;
        }
        Ok(())
    }
}

impl Instruction {
    fn fmt_disasm(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.d;
        let m = self.mnemonic();
        let (rs, rt, rd) = (
            abi::reg_name(d.rs),
            abi::reg_name(d.rt),
            abi::reg_name(d.rd),
        );
        if d.raw == 0 {
            return write!(f, "nop");
        }
        match self.op {
            Op::Sll | Op::Srl | Op::Sra => write!(f, "{} ${}, ${}, {}", m, rd, rt, d.shamt),
            Op::Sllv | Op::Srlv | Op::Srav => write!(f, "{} ${}, ${}, ${}", m, rd, rt, rs),
            Op::Jr => write!(f, "jr ${}", rs),
            Op::Jalr => write!(f, "jalr ${}, ${}", rd, rs),
            Op::Mfhi | Op::Mflo => write!(f, "{} ${}", m, rd),
            Op::Mthi | Op::Mtlo => write!(f, "{} ${}", m, rs),
            Op::Mult | Op::Multu | Op::Div | Op::Divu => write!(f, "{} ${}, ${}", m, rs, rt),
            Op::Add
            | Op::Addu
            | Op::Sub
            | Op::Subu
            | Op::And
            | Op::Or
            | Op::Xor
            | Op::Nor
            | Op::Slt
            | Op::Sltu => write!(f, "{} ${}, ${}, ${}", m, rd, rs, rt),
            Op::Bltz | Op::Bgez | Op::Blez | Op::Bgtz => {
                write!(f, "{} ${}, {:#x}", m, rs, self.branch_target())
            }
            Op::Beq | Op::Bne => write!(f, "{} ${}, ${}, {:#x}", m, rs, rt, self.branch_target()),
            Op::J | Op::Jal => write!(f, "{} {:#x}", m, self.jump_target()),
            Op::Addi | Op::Addiu | Op::Slti | Op::Sltiu => {
                write!(f, "{} ${}, ${}, {}", m, rt, rs, d.imm as i16)
            }
            Op::Andi | Op::Ori | Op::Xori => {
                write!(f, "{} ${}, ${}, {:#x}", m, rt, rs, d.imm)
            }
            Op::Lui => write!(f, "lui ${}, {:#x}", rt, d.imm),
            Op::Lb | Op::Lh | Op::Lw | Op::Lbu | Op::Lhu | Op::Sb | Op::Sh | Op::Sw => {
                write!(f, "{} ${}, {}(${})", m, rt, d.imm as i16, rs)
            }
            Op::Invalid => write!(f, ".word {:#010x}", d.raw),
        }
    }

    fn mnemonic(&self) -> &'static str {
        match self.op {
            Op::Sll => "sll",
            Op::Srl => "srl",
            Op::Sra => "sra",
            Op::Sllv => "sllv",
            Op::Srlv => "srlv",
            Op::Srav => "srav",
            Op::Jr => "jr",
            Op::Jalr => "jalr",
            Op::Mfhi => "mfhi",
            Op::Mthi => "mthi",
            Op::Mflo => "mflo",
            Op::Mtlo => "mtlo",
            Op::Mult => "mult",
            Op::Multu => "multu",
            Op::Div => "div",
            Op::Divu => "divu",
            Op::Add => "add",
            Op::Addu => "addu",
            Op::Sub => "sub",
            Op::Subu => "subu",
            Op::And => "and",
            Op::Or => "or",
            Op::Xor => "xor",
            Op::Nor => "nor",
            Op::Slt => "slt",
            Op::Sltu => "sltu",
            Op::Bltz => "bltz",
            Op::Bgez => "bgez",
            Op::J => "j",
            Op::Jal => "jal",
            Op::Beq => "beq",
            Op::Bne => "bne",
            Op::Blez => "blez",
            Op::Bgtz => "bgtz",
            Op::Addi => "addi",
            Op::Addiu => "addiu",
            Op::Slti => "slti",
            Op::Sltiu => "sltiu",
            Op::Andi => "andi",
            Op::Ori => "ori",
            Op::Xori => "xori",
            Op::Lui => "lui",
            Op::Lb => "lb",
            Op::Lh => "lh",
            Op::Lw => "lw",
            Op::Lbu => "lbu",
            Op::Lhu => "lhu",
            Op::Sb => "sb",
            Op::Sh => "sh",
            Op::Sw => "sw",
            Op::Invalid => ".word",
        }
    }
}
