use super::*;
use super::beq::branch_taken;

#[test]
fn unsigned_comparison() {
    // -1 is the largest unsigned value.
    assert!(!branch_taken(instr_i!(BLTU, 1, 2, 1), (-1i64) as u64, 0));
    assert!(branch_taken(instr_i!(BLTU, 1, 2, 1), 0, (-1i64) as u64));
}
