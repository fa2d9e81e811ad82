use super::*;

#[test]
fn bitwise_and() {
    instruction_runs! {
        instr_r!(AND, 3, 1, 2),
        [1 = 0b1100u64, 2 = 0b1010u64] => [3 = 0b1000u64]
    };
}
