use std::fmt;
use thiserror::Error;

/// One translation error, with a short reason.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AsmErrorKind {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),
    #[error("'{mnemonic}' expects {expected} operand(s), got {got}")]
    BadOperandCount {
        mnemonic: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid register '{0}'")]
    BadRegister(String),
    #[error("immediate {0} does not fit in {1} bits")]
    BadImmediate(i64, u32),
    #[error("undefined label '{0}'")]
    UndefinedLabel(String),
    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),
    #[error("bad directive: {0}")]
    BadDirective(String),
}

/// An [`AsmErrorKind`](enum.AsmErrorKind.html) tied to its 1-based source line.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("line {line}: {kind}")]
pub struct AsmError {
    pub line: usize,
    pub kind: AsmErrorKind,
}

impl AsmError {
    pub fn new(line: usize, kind: AsmErrorKind) -> AsmError {
        AsmError { line, kind }
    }
}

/// Every error collected over both passes. The assembler emits no bytes
/// when this list is non-empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AsmErrors(pub Vec<AsmError>);

impl fmt::Display for AsmErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AsmErrors {}

pub type Result<T> = std::result::Result<T, AsmError>;
