use nanocore::Word;

use crate::error::{AsmError, AsmErrorKind, Result};
use crate::instructions::ParsedWord;
use crate::int_util::check_field;
use crate::parser::DirectiveArg;

const WORD_SIZE: u32 = 4;

fn padded(bytes: u32) -> u32 {
    (bytes + WORD_SIZE - 1) / WORD_SIZE * WORD_SIZE
}

/// Size contribution of a directive, as used by the layout pass. Matches
/// the emitted size exactly, including the zero padding of the last word.
pub fn directive_size(name: &str, args: &[DirectiveArg]) -> u32 {
    match name.to_ascii_lowercase().as_str() {
        ".word" => WORD_SIZE,
        ".byte" => padded(args.len() as u32),
        ".string" => match args.first() {
            Some(DirectiveArg::Str(text)) => padded(text.len() as u32 + 1),
            _ => 0,
        },
        _ => 0,
    }
}

/// Packs bytes into 32-bit words, little-endian lane order, zero-padding
/// the final word.
fn pack_bytes(bytes: &[u8], items: &mut Vec<ParsedWord>) {
    for chunk in bytes.chunks(WORD_SIZE as usize) {
        let mut word: Word = 0;
        for (lane, byte) in chunk.iter().enumerate() {
            word |= Word::from(*byte) << (lane * 8);
        }
        items.push(ParsedWord::Complete(word));
    }
}

pub fn process_directive<'i>(
    line: usize,
    name: &str,
    args: &[DirectiveArg<'i>],
    items: &mut Vec<ParsedWord<'i>>,
) -> Result<()> {
    match name.to_ascii_lowercase().as_str() {
        ".word" => match args {
            [DirectiveArg::Int(value)] => {
                let word = check_field(line, *value, 32)?;
                items.push(ParsedWord::Complete(word));
                Ok(())
            }
            _ => Err(AsmError::new(
                line,
                AsmErrorKind::BadDirective(".word expects one integer".to_string()),
            )),
        },

        ".byte" => {
            if args.is_empty() {
                return Err(AsmError::new(
                    line,
                    AsmErrorKind::BadDirective(".byte expects at least one integer".to_string()),
                ));
            }
            let mut bytes = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    DirectiveArg::Int(value) => bytes.push(check_field(line, *value, 8)? as u8),
                    DirectiveArg::Str(_) => {
                        return Err(AsmError::new(
                            line,
                            AsmErrorKind::BadDirective(
                                ".byte expects integer values".to_string(),
                            ),
                        ));
                    }
                }
            }
            pack_bytes(&bytes, items);
            Ok(())
        }

        ".string" => match args {
            [DirectiveArg::Str(text)] => {
                let mut bytes = text.as_bytes().to_vec();
                bytes.push(0);
                pack_bytes(&bytes, items);
                Ok(())
            }
            _ => Err(AsmError::new(
                line,
                AsmErrorKind::BadDirective(".string expects one quoted string".to_string()),
            )),
        },

        other => Err(AsmError::new(
            line,
            AsmErrorKind::BadDirective(format!("unknown directive '{}'", other)),
        )),
    }
}
