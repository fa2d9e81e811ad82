use super::*;

#[test]
fn zero_extends() {
    let mut machine = Machine::new(4096);
    machine.write_memory(0x40, &[0xFE]).unwrap();
    machine
        .load_program(&program_from_words(&[instr_i!(LB, 1, 0, 0x40), halt!()]), 0)
        .unwrap();

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(1), 0xFE);
}

#[test]
fn any_alignment_is_legal() {
    let mut machine = Machine::new(4096);
    machine.write_memory(0x41, &[0x7F]).unwrap();
    machine
        .load_program(&program_from_words(&[instr_i!(LB, 1, 0, 0x41), halt!()]), 0)
        .unwrap();

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(1), 0x7F);
}
