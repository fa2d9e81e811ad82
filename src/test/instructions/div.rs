use super::*;

#[test]
fn signed_quotient() {
    instruction_runs! {
        instr_r!(DIV, 3, 1, 2),
        [1 = -12i64, 2 = 4i64] => [3 = -3i64]
    };
}

#[test]
fn truncates_toward_zero() {
    instruction_runs! {
        instr_r!(DIV, 3, 1, 2),
        [1 = 7u64, 2 = 2u64] => [3 = 3u64]
    };
}

#[test]
fn divide_by_zero_leaves_rd_unchanged() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[instr_r!(DIV, 3, 1, 2), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 10);
    machine.set_register(3, 77);

    assert_eq!(machine.run(0), RunResult::Fault(Fault::DivideByZero));
    assert_eq!(machine.register(3), 77);
}

#[test]
fn min_over_minus_one_wraps() {
    instruction_runs! {
        instr_r!(DIV, 3, 1, 2),
        [1 = i64::min_value(), 2 = -1i64] => [3 = i64::min_value()]
    };
}
