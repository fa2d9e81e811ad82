use super::*;

#[test]
fn loads_doubleword() {
    let mut machine = Machine::new(4096);
    machine
        .write_memory(0x20, &0x1122_3344_5566_7788u64.to_le_bytes())
        .unwrap();
    machine
        .load_program(&program_from_words(&[instr_i!(LD, 1, 2, 0x10), halt!()]), 0)
        .unwrap();
    machine.set_register(2, 0x10);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(1), 0x1122_3344_5566_7788);
}

#[test]
fn negative_offset() {
    let mut machine = Machine::new(4096);
    machine.write_memory(0x18, &42u64.to_le_bytes()).unwrap();
    machine
        .load_program(&program_from_words(&[instr_i!(LD, 1, 2, -8), halt!()]), 0)
        .unwrap();
    machine.set_register(2, 0x20);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(1), 42);
}

#[test]
fn misaligned_address_faults() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[instr_i!(LD, 1, 0, 0x21), halt!()]), 0)
        .unwrap();

    assert_eq!(
        machine.run(0),
        RunResult::Fault(Fault::MisalignedAccess(0x21))
    );
}

#[test]
fn out_of_bounds_faults() {
    let mut machine = Machine::new(64);
    machine
        .load_program(&program_from_words(&[instr_i!(LD, 1, 0, 64), halt!()]), 0)
        .unwrap();

    assert_eq!(machine.run(0), RunResult::Fault(Fault::OutOfBounds(64)));
}
