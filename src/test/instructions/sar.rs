use super::*;

#[test]
fn preserves_sign() {
    instruction_runs! {
        instr_r!(SAR, 3, 1, 2),
        [1 = -16i64, 2 = 2u64] => [3 = -4i64]
    };
}

#[test]
fn positive_value_matches_logical_shift() {
    instruction_runs! {
        instr_r!(SAR, 3, 1, 2),
        [1 = 64u64, 2 = 3u64] => [3 = 8u64]
    };
}
