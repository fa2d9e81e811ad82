use super::*;
use super::beq::branch_taken;

#[test]
fn signed_comparison() {
    assert!(branch_taken(instr_i!(BLT, 1, 2, 1), (-1i64) as u64, 0));
    assert!(!branch_taken(instr_i!(BLT, 1, 2, 1), 0, (-1i64) as u64));
    assert!(!branch_taken(instr_i!(BLT, 1, 2, 1), 3, 3));
}
