use crate::{constants, Immediate, JumpOffset, Word};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use util::EnumFromStr;
use util_derive::EnumFromStr;

// Instruction Formats
//
//          +------+-----+-----+-----+----------+
//          |31  26|25 21|20 16|15 11|10       0|
//          +------+-----+-----+-----+----------+
// R-Format |opcode| Rd  | Rs1 | Rs2 |  unused  |
//          +------+-----+-----+-----+----------+
// I-Format |opcode| Rd  | Rs1 |    immediate   |
//          +------+-----+-----+-----+----------+
// J-Format |opcode|          address           |
//          +------+-----+-----+-----+----------+
// V-Format |opcode| Vd  | Vs1 | Vs2 |  unused  |
//          +------+-----+-----+-----+----------+
//
// Stores carry the value register in the Rd slot; branches carry their
// first compare register in the Rd slot and the second in the Rs1 slot.

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, EnumFromStr)]
pub enum Opcode {
    //  Mnemonic       | Format | Effect
    //-----------------+--------+--------------------------------------------------
    // Integer ALU     |        |
    ADD        = 0x00, // R     | Rd = Rs1 + Rs2
    SUB        = 0x01, // R     | Rd = Rs1 - Rs2
    MUL        = 0x02, // R     | Rd = Rs1 * Rs2
    MULH       = 0x03, // R     | Rd = high 64 bits of signed 128-bit product
    DIV        = 0x04, // R     | Rd = Rs1 / Rs2 (signed)
    MOD        = 0x05, // R     | Rd = Rs1 % Rs2 (signed)
    AND        = 0x06, // R     | Rd = Rs1 & Rs2
    OR         = 0x07, // R     | Rd = Rs1 | Rs2
    XOR        = 0x08, // R     | Rd = Rs1 ^ Rs2
    NOT        = 0x09, // R     | Rd = !Rs1
    SHL        = 0x0A, // R     | Rd = Rs1 << (Rs2 & 63)
    SHR        = 0x0B, // R     | Rd = Rs1 >> (Rs2 & 63), inserting zeros
    SAR        = 0x0C, // R     | Rd = Rs1 >> (Rs2 & 63), inserting sign bit
    ROL        = 0x0D, // R     | Rd = Rs1 rotated left by Rs2 & 63
    ROR        = 0x0E, // R     | Rd = Rs1 rotated right by Rs2 & 63
    //-----------------+--------+--------------------------------------------------
    // Memory          |        |
    LD         = 0x0F, // I     | Rd = MEM64[Rs1 + extend(imm)]
    LW         = 0x10, // I     | Rd = MEM32[Rs1 + extend(imm)], zero-extended
    LH         = 0x11, // I     | Rd = MEM16[Rs1 + extend(imm)], zero-extended
    LB         = 0x12, // I     | Rd = MEM8[Rs1 + extend(imm)], zero-extended
    ST         = 0x13, // I     | MEM64[Rs1 + extend(imm)] = Rd
    SW         = 0x14, // I     | MEM32[Rs1 + extend(imm)] = Rd, truncated
    SH         = 0x15, // I     | MEM16[Rs1 + extend(imm)] = Rd, truncated
    SB         = 0x16, // I     | MEM8[Rs1 + extend(imm)] = Rd, truncated
    //-----------------+--------+--------------------------------------------------
    // Branches        |        |
    BEQ        = 0x17, // I     | if Rd == Rs1: PC += 4 + extend(imm) * 4
    BNE        = 0x18, // I     | if Rd != Rs1: PC += 4 + extend(imm) * 4
    BLT        = 0x19, // I     | signed less-than branch
    BGE        = 0x1A, // I     | signed greater-or-equal branch
    BLTU       = 0x1B, // I     | unsigned less-than branch
    BGEU       = 0x1C, // I     | unsigned greater-or-equal branch
    //-----------------+--------+--------------------------------------------------
    // Jumps           |        |
    JMP        = 0x1D, // J     | PC += 4 + extend(address) * 4
    CALL       = 0x1E, // J     | LR = PC + 4; PC += 4 + extend(address) * 4
    RET        = 0x1F, // J     | PC = LR
    SYSCALL    = 0x20, // J     | raises a syscall event with the address field
    //-----------------+--------+--------------------------------------------------
    // System          |        |
    HALT       = 0x21, // J     | sets the Halted flag and stops the run
    NOP        = 0x22, // J     | does nothing
    CPUID      = 0x23, // I     | Rd = implementation identifier
    RDCYCLE    = 0x24, // I     | Rd = cycle counter
    RDPERF     = 0x25, // I     | Rd = performance counter imm % 8
    PREFETCH   = 0x26, // I     | hint, no architectural effect
    CLFLUSH    = 0x27, // I     | hint, no architectural effect
    FENCE      = 0x28, // J     | no-op in the sequential model
    //-----------------+--------+--------------------------------------------------
    // Atomics         |        |
    LR         = 0x29, // R     | Rd = MEM64[Rs1]; record reservation
    SC         = 0x2A, // R     | store Rs2 if reservation holds; Rd = 0/1
    AMOSWAP    = 0x2B, // R     | Rd = MEM64[Rs1]; MEM64[Rs1] = Rs2
    AMOADD     = 0x2C, // R     | Rd = old; MEM64[Rs1] = old + Rs2
    AMOAND     = 0x2D, // R     | Rd = old; MEM64[Rs1] = old & Rs2
    AMOOR      = 0x2E, // R     | Rd = old; MEM64[Rs1] = old | Rs2
    AMOXOR     = 0x2F, // R     | Rd = old; MEM64[Rs1] = old ^ Rs2
    //-----------------+--------+--------------------------------------------------
    // Vector          |        |
    VADD_F64   = 0x30, // V     | Vd[i] = Vs1[i] + Vs2[i]
    VSUB_F64   = 0x31, // V     | Vd[i] = Vs1[i] - Vs2[i]
    VMUL_F64   = 0x32, // V     | Vd[i] = Vs1[i] * Vs2[i]
    VFMA_F64   = 0x33, // V     | Vd[i] += Vs1[i] * Vs2[i]
    VLOAD      = 0x34, // V     | Vd = MEM256[Rs1], scalar base in the Vs1 slot
    VSTORE     = 0x35, // V     | MEM256[Rs1] = Vd, scalar base in the Vs1 slot
    VBROADCAST = 0x36, // V     | Vd[i] = Rs1, scalar source in the Vs1 slot
}

/// Operand layout of an [`Opcode`](enum.Opcode.html).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InstructionFormat {
    R,
    I,
    J,
    V,
}

impl Opcode {
    pub fn format(self) -> InstructionFormat {
        use Opcode::*;
        match self {
            ADD | SUB | MUL | MULH | DIV | MOD | AND | OR | XOR | NOT | SHL | SHR | SAR | ROL
            | ROR | LR | SC | AMOSWAP | AMOADD | AMOAND | AMOOR | AMOXOR => InstructionFormat::R,
            LD | LW | LH | LB | ST | SW | SH | SB | BEQ | BNE | BLT | BGE | BLTU | BGEU | CPUID
            | RDCYCLE | RDPERF | PREFETCH | CLFLUSH => InstructionFormat::I,
            JMP | CALL | RET | SYSCALL | HALT | NOP | FENCE => InstructionFormat::J,
            VADD_F64 | VSUB_F64 | VMUL_F64 | VFMA_F64 | VLOAD | VSTORE | VBROADCAST => {
                InstructionFormat::V
            }
        }
    }

    /// The textual mnemonic, with `_` rendered as `.` (`VADD.F64`).
    pub fn mnemonic(self) -> String {
        format!("{:?}", self).replace('_', ".")
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.mnemonic())
    }
}

#[inline]
pub fn enum_to_u32<T: ToPrimitive + Copy>(val: T) -> u32 {
    val.to_u32().unwrap()
}

/// Decodes the opcode field, if it names a known instruction.
#[inline]
pub fn decode_opcode(word: Word) -> Option<Opcode> {
    Opcode::from_u32((word & constants::OPCODE_MASK) >> constants::OPCODE_OFFSET)
}

#[inline]
pub fn decode_rd(word: Word) -> u8 {
    ((word & constants::RD_MASK) >> constants::RD_OFFSET) as u8
}

#[inline]
pub fn decode_rs1(word: Word) -> u8 {
    ((word & constants::RS1_MASK) >> constants::RS1_OFFSET) as u8
}

#[inline]
pub fn decode_rs2(word: Word) -> u8 {
    ((word & constants::RS2_MASK) >> constants::RS2_OFFSET) as u8
}

#[inline]
pub fn decode_imm16(word: Word) -> Immediate {
    ((word & constants::IMMEDIATE_MASK) >> constants::IMMEDIATE_OFFSET) as u16 as i16
}

/// Sign-extended 26-bit address field.
#[inline]
pub fn decode_imm26(word: Word) -> JumpOffset {
    let mut address = (word & constants::ADDRESS_MASK) >> constants::ADDRESS_OFFSET;

    if (address & constants::ADDRESS_SIGN_MASK) != 0 {
        address |= constants::ADDRESS_EXTENSION;
    }

    address as i32
}

/// Constructs an R-format instruction.
#[inline]
pub fn make_r_instruction(oc: Opcode, rd: u8, rs1: u8, rs2: u8) -> Word {
    ((enum_to_u32(oc) << constants::OPCODE_OFFSET) & constants::OPCODE_MASK)
        | ((u32::from(rd) << constants::RD_OFFSET) & constants::RD_MASK)
        | ((u32::from(rs1) << constants::RS1_OFFSET) & constants::RS1_MASK)
        | ((u32::from(rs2) << constants::RS2_OFFSET) & constants::RS2_MASK)
}

/// Constructs an I-format instruction.
#[inline]
pub fn make_i_instruction(oc: Opcode, rd: u8, rs1: u8, immediate: Immediate) -> Word {
    ((enum_to_u32(oc) << constants::OPCODE_OFFSET) & constants::OPCODE_MASK)
        | ((u32::from(rd) << constants::RD_OFFSET) & constants::RD_MASK)
        | ((u32::from(rs1) << constants::RS1_OFFSET) & constants::RS1_MASK)
        | (((immediate as u16 as u32) << constants::IMMEDIATE_OFFSET) & constants::IMMEDIATE_MASK)
}

/// Constructs a J-format instruction.
#[inline]
pub fn make_j_instruction(oc: Opcode, offset: JumpOffset) -> Word {
    ((enum_to_u32(oc) << constants::OPCODE_OFFSET) & constants::OPCODE_MASK)
        | (((offset as u32) << constants::ADDRESS_OFFSET) & constants::ADDRESS_MASK)
}

/// Constructs a V-format instruction.
#[inline]
pub fn make_v_instruction(oc: Opcode, vd: u8, vs1: u8, vs2: u8) -> Word {
    make_r_instruction(oc, vd, vs1, vs2)
}

/// Constructs an R-format instruction.
#[macro_export]
macro_rules! instr_r {
    ($opcode:ident, $rd:expr, $rs1:expr, $rs2:expr) => {
        make_r_instruction(Opcode::$opcode, $rd, $rs1, $rs2)
    };
}

/// Constructs an I-format instruction.
#[macro_export]
macro_rules! instr_i {
    ($opcode:ident, $rd:expr, $rs1:expr, $imm:expr) => {
        make_i_instruction(Opcode::$opcode, $rd, $rs1, $imm)
    };
}

/// Constructs a J-format instruction.
#[macro_export]
macro_rules! instr_j {
    ($opcode:ident, $offset:expr) => {
        make_j_instruction(Opcode::$opcode, $offset)
    };
}

/// Constructs a V-format instruction.
#[macro_export]
macro_rules! instr_v {
    ($opcode:ident, $vd:expr, $vs1:expr, $vs2:expr) => {
        make_v_instruction(Opcode::$opcode, $vd, $vs1, $vs2)
    };
}

/// Constructs a [`Opcode::NOP`](enum.Opcode.html#variant.NOP) instruction.
#[macro_export]
macro_rules! nop {
    () => {
        instr_j!(NOP, 0)
    };
}

/// Constructs a [`Opcode::HALT`](enum.Opcode.html#variant.HALT) instruction.
#[macro_export]
macro_rules! halt {
    () => {
        instr_j!(HALT, 0)
    };
}
