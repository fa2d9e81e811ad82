use super::*;

#[test]
fn reads_selected_counter() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[
        instr_i!(LD, 1, 0, 0x40),
        instr_i!(LD, 1, 0, 0x40),
        // MemOps is counter index 6.
        instr_i!(RDPERF, 2, 0, 6),
        halt!(),
    ]);
    machine.load_program(&program, 0).unwrap();

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(2), 2);
}

#[test]
fn index_wraps_modulo_eight() {
    let mut machine = Machine::new(4096);
    // Index 9 aliases CycleCount (1).
    let program = program_from_words(&[instr_i!(RDPERF, 2, 0, 9), halt!()]);
    machine.load_program(&program, 0).unwrap();

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(2), 1);
}
