use super::*;

#[test]
fn raises_event_and_continues() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[instr_j!(SYSCALL, 42), halt!()]);
    machine.load_program(&program, 0).unwrap();

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(
        machine.poll_event(),
        Some(Event::Exception(Fault::Syscall(42)))
    );
    // The syscall itself does not halt; the HALT after it does.
    assert_eq!(machine.poll_event(), Some(Event::Halted));
}
