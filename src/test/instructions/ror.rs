use super::*;

#[test]
fn rotates_right() {
    instruction_runs! {
        instr_r!(ROR, 3, 1, 2),
        [1 = 3u64, 2 = 1u64] => [3 = 0x8000_0000_0000_0001u64]
    };
}

#[test]
fn amount_64_is_identity() {
    instruction_runs! {
        instr_r!(ROR, 3, 1, 2),
        [1 = 0x1234u64, 2 = 64u64] => [3 = 0x1234u64]
    };
}
