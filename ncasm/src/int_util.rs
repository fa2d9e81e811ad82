use crate::error::{AsmError, AsmErrorKind, Result};

/// Parses a literal integer: `0x…` hexadecimal, `0b…` binary, otherwise
/// signed decimal.
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let magnitude = if let Some(hex) = strip_radix_prefix(body, "0x") {
        u64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = strip_radix_prefix(body, "0b") {
        u64::from_str_radix(bin, 2).ok()?
    } else {
        body.parse::<u64>().ok()?
    };

    if negative {
        if magnitude > i64::max_value() as u64 + 1 {
            return None;
        }
        Some((magnitude as i64).wrapping_neg())
    } else {
        if magnitude > i64::max_value() as u64 {
            return None;
        }
        Some(magnitude as i64)
    }
}

fn strip_radix_prefix<'a>(body: &'a str, prefix: &str) -> Option<&'a str> {
    if body.len() > 2 && body[..2].eq_ignore_ascii_case(prefix) {
        Some(&body[2..])
    } else {
        None
    }
}

/// Checks that `value` fits a `bits`-wide field, interpreted either as
/// signed or unsigned as the source demands, and returns its
/// two's-complement bit pattern.
pub fn check_field(line: usize, value: i64, bits: u32) -> Result<u32> {
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << bits) - 1;

    if value < min || value > max {
        Err(AsmError::new(line, AsmErrorKind::BadImmediate(value, bits)))
    } else {
        Ok((value as u32) & (((1u64 << bits) - 1) as u32))
    }
}

/// Like [`check_field`](fn.check_field.html) but strictly signed, for
/// PC-relative displacements.
pub fn check_signed_field(line: usize, value: i64, bits: u32) -> Result<u32> {
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << (bits - 1)) - 1;

    if value < min || value > max {
        Err(AsmError::new(line, AsmErrorKind::BadImmediate(value, bits)))
    } else {
        Ok((value as u32) & (((1u64 << bits) - 1) as u32))
    }
}
