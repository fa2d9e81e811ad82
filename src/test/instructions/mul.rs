use super::*;

#[test]
fn positive() {
    instruction_runs! {
        instr_r!(MUL, 3, 1, 2),
        [1 = 123, 2 = 456] => [3 = 56088]
    };
}

#[test]
fn wraps_on_overflow() {
    instruction_runs! {
        instr_r!(MUL, 3, 1, 2),
        [1 = 1u64 << 63, 2 = 2u64] => [3 = 0u64]
    };
}
