use byteorder::ByteOrder;
use nanocore::{
    make_i_instruction, make_j_instruction, make_r_instruction, make_v_instruction, Endian,
    Opcode, Word,
};

use nanocore::constants::*;

use crate::error::{AsmError, AsmErrorKind, Result};
use crate::int_util::{check_field, check_signed_field};
use crate::labels::LabelMap;
use crate::parser::Operand;
use crate::INSTRUCTION_BYTES;

/// An emitted word, possibly still referencing a label. Label references
/// are patched in a final fixup pass once every address is known.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedWord<'i> {
    Complete(Word),

    Branch {
        opcode: Opcode,
        rd: u8,
        rs1: u8,
        label: &'i str,
        line: usize,
    },

    Jump {
        opcode: Opcode,
        label: &'i str,
        line: usize,
    },
}

/// Number of instruction words a mnemonic expands to. Needed by the
/// layout pass before any encoding happens.
pub fn expansion_count(mnemonic: &str) -> u32 {
    match mnemonic.to_ascii_uppercase().as_str() {
        "PUSH" | "POP" => 2,
        _ => 1,
    }
}

fn lookup_opcode(mnemonic: &str) -> Option<Opcode> {
    mnemonic.to_ascii_uppercase().replace('.', "_").parse().ok()
}

/// Parses a scalar register name: `R0`-`R31`, `ZERO`, `SP`, `LR`, `RA`.
pub fn parse_register(text: &str) -> Option<u8> {
    let upper = text.to_ascii_uppercase();
    match upper.as_str() {
        "ZERO" => return Some(REG_ZERO),
        "SP" => return Some(REG_SP),
        "LR" | "RA" => return Some(REG_LR),
        _ => {}
    }

    let number = upper.strip_prefix('R')?.parse::<u32>().ok()?;
    if number < REGISTER_COUNT as u32 {
        Some(number as u8)
    } else {
        None
    }
}

/// Parses a vector register name: `V0`-`V15`.
pub fn parse_vector_register(text: &str) -> Option<u8> {
    let number = text
        .to_ascii_uppercase()
        .strip_prefix('V')?
        .parse::<u32>()
        .ok()?;
    if number < VREGISTER_COUNT as u32 {
        Some(number as u8)
    } else {
        None
    }
}

fn arity(line: usize, mnemonic: &str, operands: &[Operand], expected: usize) -> Result<()> {
    if operands.len() == expected {
        Ok(())
    } else {
        Err(AsmError::new(
            line,
            AsmErrorKind::BadOperandCount {
                mnemonic: mnemonic.to_ascii_uppercase(),
                expected,
                got: operands.len(),
            },
        ))
    }
}

fn register(line: usize, operand: &Operand) -> Result<u8> {
    match operand {
        Operand::Ident(name) => parse_register(name)
            .ok_or_else(|| AsmError::new(line, AsmErrorKind::BadRegister(name.to_string()))),
        other => Err(AsmError::new(
            line,
            AsmErrorKind::Syntax(format!("expected a register, got '{:?}'", other)),
        )),
    }
}

fn vector_register(line: usize, operand: &Operand) -> Result<u8> {
    match operand {
        Operand::Ident(name) => parse_vector_register(name)
            .ok_or_else(|| AsmError::new(line, AsmErrorKind::BadRegister(name.to_string()))),
        other => Err(AsmError::new(
            line,
            AsmErrorKind::Syntax(format!("expected a vector register, got '{:?}'", other)),
        )),
    }
}

fn integer(line: usize, operand: &Operand) -> Result<i64> {
    match operand {
        Operand::Int(value) => Ok(*value),
        other => Err(AsmError::new(
            line,
            AsmErrorKind::Syntax(format!("expected an integer, got '{:?}'", other)),
        )),
    }
}

/// `offset(base)` operand, or a bare integer treated as `imm(R0)`.
fn memory_operand(line: usize, operand: &Operand) -> Result<(i64, u8)> {
    match operand {
        Operand::Memory { offset, base } => {
            let base = parse_register(base)
                .ok_or_else(|| AsmError::new(line, AsmErrorKind::BadRegister(base.to_string())))?;
            Ok((*offset, base))
        }
        Operand::Int(value) => Ok((*value, REG_ZERO)),
        other => Err(AsmError::new(
            line,
            AsmErrorKind::Syntax(format!("expected offset(base), got '{:?}'", other)),
        )),
    }
}

/// `(base)` operand of the atomic and vector transfer instructions.
fn bare_memory_operand(line: usize, operand: &Operand) -> Result<u8> {
    match memory_operand(line, operand)? {
        (0, base) => Ok(base),
        (offset, _) => Err(AsmError::new(
            line,
            AsmErrorKind::Syntax(format!(
                "operand takes no offset, got {}",
                offset
            )),
        )),
    }
}

fn immediate_field(line: usize, value: i64) -> Result<i16> {
    Ok(check_field(line, value, 16)? as u16 as i16)
}

pub fn process_instruction<'i>(
    line: usize,
    mnemonic: &str,
    operands: &[Operand<'i>],
    items: &mut Vec<ParsedWord<'i>>,
) -> Result<()> {
    let upper = mnemonic.to_ascii_uppercase();

    // Pseudo-instructions expand to real ones before encoding.
    match upper.as_str() {
        "MOVE" => {
            arity(line, mnemonic, operands, 2)?;
            let rd = register(line, &operands[0])?;
            let rs = register(line, &operands[1])?;
            items.push(ParsedWord::Complete(make_r_instruction(
                Opcode::ADD,
                rd,
                rs,
                REG_ZERO,
            )));
            return Ok(());
        }
        "ZERO" => {
            arity(line, mnemonic, operands, 1)?;
            let rd = register(line, &operands[0])?;
            items.push(ParsedWord::Complete(make_r_instruction(
                Opcode::XOR,
                rd,
                rd,
                rd,
            )));
            return Ok(());
        }
        "PUSH" => {
            arity(line, mnemonic, operands, 1)?;
            let rs = register(line, &operands[0])?;
            items.push(ParsedWord::Complete(make_r_instruction(
                Opcode::SUB,
                REG_SP,
                REG_SP,
                REG_WORDSIZE,
            )));
            items.push(ParsedWord::Complete(make_i_instruction(
                Opcode::ST,
                rs,
                REG_SP,
                0,
            )));
            return Ok(());
        }
        "POP" => {
            arity(line, mnemonic, operands, 1)?;
            let rd = register(line, &operands[0])?;
            items.push(ParsedWord::Complete(make_i_instruction(
                Opcode::LD,
                rd,
                REG_SP,
                0,
            )));
            items.push(ParsedWord::Complete(make_r_instruction(
                Opcode::ADD,
                REG_SP,
                REG_SP,
                REG_WORDSIZE,
            )));
            return Ok(());
        }
        "LOAD" => {
            arity(line, mnemonic, operands, 2)?;
            let rd = register(line, &operands[0])?;
            let imm = immediate_field(line, integer(line, &operands[1])?)?;
            items.push(ParsedWord::Complete(make_i_instruction(
                Opcode::LD,
                rd,
                REG_ZERO,
                imm,
            )));
            return Ok(());
        }
        _ => {}
    }

    let opcode = lookup_opcode(mnemonic)
        .ok_or_else(|| AsmError::new(line, AsmErrorKind::UnknownMnemonic(upper.clone())))?;

    match opcode {
        // Three-register ALU operations.
        Opcode::ADD
        | Opcode::SUB
        | Opcode::MUL
        | Opcode::MULH
        | Opcode::DIV
        | Opcode::MOD
        | Opcode::AND
        | Opcode::OR
        | Opcode::XOR
        | Opcode::SHL
        | Opcode::SHR
        | Opcode::SAR
        | Opcode::ROL
        | Opcode::ROR => {
            arity(line, mnemonic, operands, 3)?;
            let rd = register(line, &operands[0])?;
            let rs1 = register(line, &operands[1])?;
            let rs2 = register(line, &operands[2])?;
            items.push(ParsedWord::Complete(make_r_instruction(opcode, rd, rs1, rs2)));
        }

        Opcode::NOT => {
            arity(line, mnemonic, operands, 2)?;
            let rd = register(line, &operands[0])?;
            let rs1 = register(line, &operands[1])?;
            items.push(ParsedWord::Complete(make_r_instruction(opcode, rd, rs1, 0)));
        }

        // Loads and stores share the offset(base) form; the store value
        // register is carried in the rd slot.
        Opcode::LD
        | Opcode::LW
        | Opcode::LH
        | Opcode::LB
        | Opcode::ST
        | Opcode::SW
        | Opcode::SH
        | Opcode::SB => {
            arity(line, mnemonic, operands, 2)?;
            let reg = register(line, &operands[0])?;
            let (offset, base) = memory_operand(line, &operands[1])?;
            let imm = immediate_field(line, offset)?;
            items.push(ParsedWord::Complete(make_i_instruction(
                opcode, reg, base, imm,
            )));
        }

        // Branches: first compare register in the rd slot, second in the
        // rs1 slot. The target is a label or a raw displacement in
        // instruction units.
        Opcode::BEQ | Opcode::BNE | Opcode::BLT | Opcode::BGE | Opcode::BLTU | Opcode::BGEU => {
            arity(line, mnemonic, operands, 3)?;
            let rd = register(line, &operands[0])?;
            let rs1 = register(line, &operands[1])?;
            match &operands[2] {
                Operand::Ident(label) => items.push(ParsedWord::Branch {
                    opcode,
                    rd,
                    rs1,
                    label,
                    line,
                }),
                Operand::Int(value) => {
                    let imm = check_signed_field(line, *value, 16)? as u16 as i16;
                    items.push(ParsedWord::Complete(make_i_instruction(
                        opcode, rd, rs1, imm,
                    )));
                }
                other => {
                    return Err(AsmError::new(
                        line,
                        AsmErrorKind::Syntax(format!(
                            "expected a branch target, got '{:?}'",
                            other
                        )),
                    ));
                }
            }
        }

        Opcode::JMP | Opcode::CALL => {
            arity(line, mnemonic, operands, 1)?;
            match &operands[0] {
                Operand::Ident(label) => items.push(ParsedWord::Jump {
                    opcode,
                    label,
                    line,
                }),
                Operand::Int(value) => {
                    let offset = check_signed_field(line, *value, ADDRESS_WIDTH)? as i32;
                    items.push(ParsedWord::Complete(make_j_instruction(opcode, offset)));
                }
                other => {
                    return Err(AsmError::new(
                        line,
                        AsmErrorKind::Syntax(format!(
                            "expected a jump target, got '{:?}'",
                            other
                        )),
                    ));
                }
            }
        }

        Opcode::RET | Opcode::HALT | Opcode::NOP | Opcode::FENCE => {
            arity(line, mnemonic, operands, 0)?;
            items.push(ParsedWord::Complete(make_j_instruction(opcode, 0)));
        }

        // SYSCALL takes an optional immediate code.
        Opcode::SYSCALL => {
            let code = match operands {
                [] => 0,
                [operand] => check_field(line, integer(line, operand)?, ADDRESS_WIDTH)? as i32,
                _ => return arity(line, mnemonic, operands, 1),
            };
            items.push(ParsedWord::Complete(make_j_instruction(opcode, code)));
        }

        Opcode::CPUID | Opcode::RDCYCLE => {
            arity(line, mnemonic, operands, 1)?;
            let rd = register(line, &operands[0])?;
            items.push(ParsedWord::Complete(make_i_instruction(opcode, rd, 0, 0)));
        }

        Opcode::RDPERF => {
            arity(line, mnemonic, operands, 2)?;
            let rd = register(line, &operands[0])?;
            let imm = immediate_field(line, integer(line, &operands[1])?)?;
            items.push(ParsedWord::Complete(make_i_instruction(opcode, rd, 0, imm)));
        }

        Opcode::PREFETCH | Opcode::CLFLUSH => {
            arity(line, mnemonic, operands, 1)?;
            let (offset, base) = memory_operand(line, &operands[0])?;
            let imm = immediate_field(line, offset)?;
            items.push(ParsedWord::Complete(make_i_instruction(
                opcode, 0, base, imm,
            )));
        }

        Opcode::LR => {
            arity(line, mnemonic, operands, 2)?;
            let rd = register(line, &operands[0])?;
            let base = bare_memory_operand(line, &operands[1])?;
            items.push(ParsedWord::Complete(make_r_instruction(opcode, rd, base, 0)));
        }

        Opcode::SC
        | Opcode::AMOSWAP
        | Opcode::AMOADD
        | Opcode::AMOAND
        | Opcode::AMOOR
        | Opcode::AMOXOR => {
            arity(line, mnemonic, operands, 3)?;
            let rd = register(line, &operands[0])?;
            let rs2 = register(line, &operands[1])?;
            let base = bare_memory_operand(line, &operands[2])?;
            items.push(ParsedWord::Complete(make_r_instruction(
                opcode, rd, base, rs2,
            )));
        }

        Opcode::VADD_F64 | Opcode::VSUB_F64 | Opcode::VMUL_F64 | Opcode::VFMA_F64 => {
            arity(line, mnemonic, operands, 3)?;
            let vd = vector_register(line, &operands[0])?;
            let vs1 = vector_register(line, &operands[1])?;
            let vs2 = vector_register(line, &operands[2])?;
            items.push(ParsedWord::Complete(make_v_instruction(opcode, vd, vs1, vs2)));
        }

        Opcode::VLOAD | Opcode::VSTORE => {
            arity(line, mnemonic, operands, 2)?;
            let vd = vector_register(line, &operands[0])?;
            let base = bare_memory_operand(line, &operands[1])?;
            items.push(ParsedWord::Complete(make_v_instruction(opcode, vd, base, 0)));
        }

        Opcode::VBROADCAST => {
            arity(line, mnemonic, operands, 2)?;
            let vd = vector_register(line, &operands[0])?;
            let rs = register(line, &operands[1])?;
            items.push(ParsedWord::Complete(make_v_instruction(opcode, vd, rs, 0)));
        }
    }

    Ok(())
}

fn resolve<'i>(
    labels: &LabelMap<'i>,
    label: &'i str,
    word_index: usize,
    bits: u32,
    line: usize,
) -> Result<u32> {
    let target = *labels
        .get(label)
        .ok_or_else(|| AsmError::new(line, AsmErrorKind::UndefinedLabel(label.to_string())))?;

    // Displacements are in instruction units, relative to the word after
    // the transfer instruction.
    let current = word_index as i64 * INSTRUCTION_BYTES as i64;
    let displacement = (i64::from(target) - current - i64::from(INSTRUCTION_BYTES))
        / i64::from(INSTRUCTION_BYTES);

    check_signed_field(line, displacement, bits)
}

/// Final fixup pass: patches label references and serializes every word
/// little-endian.
pub fn apply_fixups<'i>(
    items: &[ParsedWord<'i>],
    labels: &LabelMap<'i>,
    errors: &mut Vec<AsmError>,
) -> Vec<u8> {
    let mut output = vec![0u8; items.len() * INSTRUCTION_BYTES as usize];

    for (index, item) in items.iter().enumerate() {
        let word = match item {
            ParsedWord::Complete(word) => *word,
            ParsedWord::Branch {
                opcode,
                rd,
                rs1,
                label,
                line,
            } => match resolve(labels, label, index, 16, *line) {
                Ok(field) => make_i_instruction(*opcode, *rd, *rs1, field as u16 as i16),
                Err(error) => {
                    errors.push(error);
                    continue;
                }
            },
            ParsedWord::Jump {
                opcode,
                label,
                line,
            } => match resolve(labels, label, index, ADDRESS_WIDTH, *line) {
                Ok(field) => make_j_instruction(*opcode, field as i32),
                Err(error) => {
                    errors.push(error);
                    continue;
                }
            },
        };

        let start = index * INSTRUCTION_BYTES as usize;
        Endian::write_u32(&mut output[start..start + INSTRUCTION_BYTES as usize], word);
    }

    output
}
