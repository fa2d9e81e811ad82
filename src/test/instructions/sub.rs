use super::*;

#[test]
fn positive() {
    instruction_runs! {
        instr_r!(SUB, 3, 1, 2),
        [1 = 5678, 2 = 1234] => [3 = 4444]
    };
}

#[test]
fn wraps_below_zero() {
    instruction_runs! {
        instr_r!(SUB, 3, 1, 2),
        [1 = 1u64, 2 = 2u64] => [3 = u64::max_value()]
    };
}
