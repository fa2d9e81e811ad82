use byteorder::ByteOrder;
use nanocore::constants::{ADDRESS_MASK, VREGISTER_COUNT};
use nanocore::{
    decode_imm16, decode_imm26, decode_opcode, decode_rd, decode_rs1, decode_rs2,
    make_i_instruction, make_j_instruction, make_r_instruction, make_v_instruction, Endian,
    Opcode, Word,
};

fn reg(id: u8) -> String {
    format!("R{}", id)
}

fn vreg(id: u8) -> Option<String> {
    if (id as usize) < VREGISTER_COUNT {
        Some(format!("V{}", id))
    } else {
        None
    }
}

/// Renders one word as an instruction along with its canonical
/// re-encoding. Words whose re-encoding differs (stray bits in unused
/// fields, out-of-range vector registers) are not instructions.
fn render(word: Word) -> Option<(String, Word)> {
    let opcode = decode_opcode(word)?;
    let rd = decode_rd(word);
    let rs1 = decode_rs1(word);
    let rs2 = decode_rs2(word);
    let imm = decode_imm16(word);
    let offset = decode_imm26(word);

    use Opcode::*;
    let rendered = match opcode {
        ADD | SUB | MUL | MULH | DIV | MOD | AND | OR | XOR | SHL | SHR | SAR | ROL | ROR => (
            format!("{} {}, {}, {}", opcode, reg(rd), reg(rs1), reg(rs2)),
            make_r_instruction(opcode, rd, rs1, rs2),
        ),

        NOT => (
            format!("NOT {}, {}", reg(rd), reg(rs1)),
            make_r_instruction(opcode, rd, rs1, 0),
        ),

        LD | LW | LH | LB | ST | SW | SH | SB => (
            format!("{} {}, {}({})", opcode, reg(rd), imm, reg(rs1)),
            make_i_instruction(opcode, rd, rs1, imm),
        ),

        BEQ | BNE | BLT | BGE | BLTU | BGEU => (
            format!("{} {}, {}, {}", opcode, reg(rd), reg(rs1), imm),
            make_i_instruction(opcode, rd, rs1, imm),
        ),

        JMP | CALL => (
            format!("{} {}", opcode, offset),
            make_j_instruction(opcode, offset),
        ),

        RET | HALT | NOP | FENCE => (opcode.to_string(), make_j_instruction(opcode, 0)),

        SYSCALL => {
            let code = word & ADDRESS_MASK;
            (
                format!("SYSCALL {}", code),
                make_j_instruction(opcode, code as i32),
            )
        }

        CPUID | RDCYCLE => (
            format!("{} {}", opcode, reg(rd)),
            make_i_instruction(opcode, rd, 0, 0),
        ),

        RDPERF => (
            format!("RDPERF {}, {}", reg(rd), imm),
            make_i_instruction(opcode, rd, 0, imm),
        ),

        PREFETCH | CLFLUSH => (
            format!("{} {}({})", opcode, imm, reg(rs1)),
            make_i_instruction(opcode, 0, rs1, imm),
        ),

        LR => (
            format!("LR {}, ({})", reg(rd), reg(rs1)),
            make_r_instruction(opcode, rd, rs1, 0),
        ),

        SC | AMOSWAP | AMOADD | AMOAND | AMOOR | AMOXOR => (
            format!("{} {}, {}, ({})", opcode, reg(rd), reg(rs2), reg(rs1)),
            make_r_instruction(opcode, rd, rs1, rs2),
        ),

        VADD_F64 | VSUB_F64 | VMUL_F64 | VFMA_F64 => (
            format!(
                "{} {}, {}, {}",
                opcode,
                vreg(rd)?,
                vreg(rs1)?,
                vreg(rs2)?
            ),
            make_v_instruction(opcode, rd, rs1, rs2),
        ),

        VLOAD | VSTORE => (
            format!("{} {}, ({})", opcode, vreg(rd)?, reg(rs1)),
            make_v_instruction(opcode, rd, rs1, 0),
        ),

        VBROADCAST => (
            format!("VBROADCAST {}, {}", vreg(rd)?, reg(rs1)),
            make_v_instruction(opcode, rd, rs1, 0),
        ),
    };

    Some(rendered)
}

/// Renders one word in re-assemblable form; words that do not decode to a
/// canonical instruction become `.word` directives.
pub fn disassemble_word(word: Word) -> String {
    match render(word) {
        Some((text, reencoded)) if reencoded == word => text,
        _ => format!(".word {:#010x}", word),
    }
}

/// Renders a flat word stream as source text that assembles back to the
/// identical bytes. Trailing bytes that do not fill a word are ignored.
pub fn disassemble(bytes: &[u8]) -> String {
    let mut output = String::new();
    for chunk in bytes.chunks_exact(4) {
        output.push_str(&disassemble_word(Endian::read_u32(chunk)));
        output.push('\n');
    }
    output
}

/// Console listing form: address, raw word, then the rendered instruction.
pub fn disassemble_listing(bytes: &[u8], base_address: u64) -> String {
    let mut output = String::new();
    for (index, chunk) in bytes.chunks_exact(4).enumerate() {
        let word = Endian::read_u32(chunk);
        let address = base_address + index as u64 * 4;
        output.push_str(&format!(
            "{:08x}: {:08x}  {}\n",
            address,
            word,
            disassemble_word(word)
        ));
    }
    output
}
