use super::*;

#[test]
fn reads_cycle_counter() {
    // RDCYCLE executes as the third instruction; its own cycle counts.
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[nop!(), nop!(), instr_i!(RDCYCLE, 1, 0, 0), halt!()]);
    machine.load_program(&program, 0).unwrap();

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(1), 3);
}
