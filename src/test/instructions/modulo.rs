use super::*;

#[test]
fn remainder() {
    instruction_runs! {
        instr_r!(MOD, 3, 1, 2),
        [1 = 7u64, 2 = 3u64] => [3 = 1u64]
    };
}

#[test]
fn sign_follows_dividend() {
    instruction_runs! {
        instr_r!(MOD, 3, 1, 2),
        [1 = -7i64, 2 = 3i64] => [3 = -1i64]
    };
}

#[test]
fn modulo_by_zero_faults() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[instr_r!(MOD, 3, 1, 2), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 10);

    assert_eq!(machine.run(0), RunResult::Fault(Fault::DivideByZero));
}
