use super::*;

#[test]
fn positive() {
    instruction_runs! {
        instr_r!(ADD, 3, 1, 2),
        [1 = 1234, 2 = 5678] => [3 = 6912]
    };
}

#[test]
fn wraps_modulo_64_bits() {
    instruction_runs! {
        instr_r!(ADD, 3, 1, 2),
        [1 = u64::max_value(), 2 = 2u64] => [3 = 1u64]
    };
}

#[test]
fn carry_flag_on_wrap() {
    let machine = instruction_runs! {
        instr_r!(ADD, 3, 1, 2),
        [1 = u64::max_value(), 2 = 1u64] => [3 = 0u64]
    };
    assert!(machine.flag(crate::constants::FLAG_CARRY));
    assert!(machine.flag(crate::constants::FLAG_ZERO));
}
