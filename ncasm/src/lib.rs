//! Assembler for the [nanocore](../nanocore/index.html) virtual machine.
//!
//! The entry points are [`assemble`](fn.assemble.html) and
//! [`assemble_with_symbols`](fn.assemble_with_symbols.html), which translate
//! a program written in the NanoCore assembly language into a flat stream of
//! little-endian 32-bit words, ready for
//! [`Machine::load_program`](../nanocore/struct.Machine.html#method.load_program).
//! [`disassemble`](fn.disassemble.html) renders such a stream back into
//! source text that re-assembles to the identical bytes.
//!
//! Source lines are parsed with a [pest] grammar; translation then runs in
//! two passes. The first pass lays out addresses and collects labels, the
//! second emits instruction and data words, recording a patch record for
//! every label reference. A final fixup pass resolves the records against
//! the symbol table. All errors from both passes are collected with their
//! 1-based line numbers; if any were recorded, no bytes are produced.
//!
//! # Assembly language
//!
//! One statement per line. Mnemonics, register names and directives are
//! case-insensitive; operands are separated by whitespace and/or commas.
//! Comments start with `;` and run to the end of the line. A `label:`
//! prefix defines a symbol at the current address and may stand alone or
//! precede a statement.
//!
//! ## Registers
//!
//! `R0`-`R31` name the scalar registers, with the aliases `ZERO` (R0),
//! `SP` (R30) and `LR`/`RA` (R31). R0 always reads as zero. `V0`-`V15`
//! name the vector registers.
//!
//! ## Operands
//!
//! Integer literals are `0x…` hexadecimal, `0b…` binary, or signed
//! decimal. Memory operands use the `offset(base)` form, e.g.
//! `LD R1, -8(SP)`; atomics and vector transfers take a bare `(base)`.
//! Branch and jump targets are labels or raw displacements counted in
//! instructions from the following instruction.
//!
//! ## Directives
//!
//!  Directive | Effect
//! -----------|----------------------------------------------------------
//! `.word v`  | emit `v` as one 32-bit little-endian word
//! `.byte v, …` | emit bytes, packed four per word, zero-padded
//! `.string "…"` | emit the ASCII bytes plus a NUL terminator, packed
//!
//! ## Pseudo-instructions
//!
//!  Mnemonic | Expansion
//! ----------|-------------------------------------------
//! `MOVE rd, rs` | `ADD rd, rs, R0`
//! `ZERO rd` | `XOR rd, rd, rd`
//! `PUSH r`  | `SUB SP, SP, R1` then `ST r, 0(SP)`
//! `POP r`   | `LD r, 0(SP)` then `ADD SP, SP, R1`
//! `LOAD rd, imm` | `LD rd, imm(R0)`
//!
//! The stack grows toward lower addresses, one word is eight bytes, and
//! the `PUSH`/`POP` expansions assume `R1` holds the word size.
//!
//! [pest]: https://docs.rs/pest/

mod data;
mod disasm;
mod error;
mod instructions;
mod int_util;
mod labels;
mod parser;


use std::collections::BTreeMap;

use log::debug;

pub use crate::disasm::{disassemble, disassemble_listing, disassemble_word};
pub use crate::error::{AsmError, AsmErrorKind, AsmErrors};
pub use crate::instructions::{parse_register, parse_vector_register};

use crate::labels::LabelMap;
use crate::parser::Item;

pub(crate) const INSTRUCTION_BYTES: u32 = nanocore::constants::WORD_BYTES as u32;

/// Assembles `input` into a flat little-endian word stream.
pub fn assemble(input: &str) -> Result<Vec<u8>, AsmErrors> {
    Ok(assemble_with_symbols(input)?.0)
}

/// Like [`assemble`](fn.assemble.html), additionally returning the symbol
/// table (label name to byte offset from the start of the output).
pub fn assemble_with_symbols(input: &str) -> Result<(Vec<u8>, BTreeMap<String, u32>), AsmErrors> {
    let mut errors = Vec::new();

    // Parse every line up front; both passes walk the parsed statements.
    let mut statements = Vec::new();
    for (index, text) in input.lines().enumerate() {
        let number = index + 1;
        match parser::parse_line(text) {
            Ok(statement) => statements.push((number, statement)),
            Err(kind) => errors.push(AsmError::new(number, kind)),
        }
    }

    // Pass 1: assign addresses to labels.
    let mut labels = LabelMap::new();
    let mut address = 0u32;
    for (number, statement) in &statements {
        if let Some(name) = statement.label {
            if labels.insert(name, address).is_some() {
                errors.push(AsmError::new(
                    *number,
                    AsmErrorKind::DuplicateLabel(name.to_string()),
                ));
            }
        }
        match &statement.item {
            Some(Item::Instruction { mnemonic, .. }) => {
                address += INSTRUCTION_BYTES * instructions::expansion_count(mnemonic);
            }
            Some(Item::Directive { name, args }) => {
                address += data::directive_size(name, args);
            }
            None => {}
        }
    }

    // Pass 2: emit words, leaving patch records for label references.
    let mut items = Vec::new();
    for (number, statement) in &statements {
        let result = match &statement.item {
            Some(Item::Instruction { mnemonic, operands }) => {
                instructions::process_instruction(*number, mnemonic, operands, &mut items)
            }
            Some(Item::Directive { name, args }) => {
                data::process_directive(*number, name, args, &mut items)
            }
            None => Ok(()),
        };
        if let Err(error) = result {
            errors.push(error);
        }
    }

    // Fixup pass: resolve labels and serialize.
    let output = instructions::apply_fixups(&items, &labels, &mut errors);

    if errors.is_empty() {
        debug!("assembled {} bytes, {} symbols", output.len(), labels.len());
        let symbols = labels
            .iter()
            .map(|(name, address)| (name.to_string(), *address))
            .collect();
        Ok((output, symbols))
    } else {
        errors.sort_by_key(|error| error.line);
        Err(AsmErrors(errors))
    }
}
