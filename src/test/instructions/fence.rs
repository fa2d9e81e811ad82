use super::*;

#[test]
fn is_a_no_op() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[instr_j!(FENCE, 0), halt!()]);
    machine.load_program(&program, 0).unwrap();
    machine.set_register(1, 7);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(1), 7);
    assert_eq!(machine.perf_counter(PerfCounter::InstCount), 2);
}
