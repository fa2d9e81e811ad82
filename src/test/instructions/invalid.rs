use super::*;

#[test]
fn unknown_opcode_faults() {
    let mut machine = Machine::new(4096);
    // 0x3F is above the last defined opcode.
    let word = 0xFFu32 << 24;
    machine
        .load_program(&program_from_words(&[word, halt!()]), 0)
        .unwrap();

    assert_eq!(
        machine.run(0),
        RunResult::Fault(Fault::IllegalOpcode(0x3F))
    );
    assert_eq!(
        machine.poll_event(),
        Some(Event::Exception(Fault::IllegalOpcode(0x3F)))
    );
    assert!(machine.halted());
}
