use super::*;

#[test]
fn store_conditional_succeeds_with_live_reservation() {
    let mut machine = Machine::new(4096);
    machine.write_memory(0x40, &10u64.to_le_bytes()).unwrap();
    let program = program_from_words(&[
        instr_r!(LR, 2, 1, 0),
        instr_r!(SC, 3, 1, 4),
        halt!(),
    ]);
    machine.load_program(&program, 0).unwrap();
    machine.set_register(1, 0x40);
    machine.set_register(4, 99);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(2), 10);
    assert_eq!(machine.register(3), 0);
    assert_eq!(machine.read_memory(0x40, 8).unwrap(), &99u64.to_le_bytes());
}

#[test]
fn intervening_store_breaks_reservation() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[
        instr_r!(LR, 2, 1, 0),
        instr_i!(ST, 5, 1, 0),
        instr_r!(SC, 3, 1, 4),
        halt!(),
    ]);
    machine.load_program(&program, 0).unwrap();
    machine.set_register(1, 0x40);
    machine.set_register(4, 99);
    machine.set_register(5, 7);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(3), 1);
    // The conditional store must not land.
    assert_eq!(machine.read_memory(0x40, 8).unwrap(), &7u64.to_le_bytes());
}

#[test]
fn store_conditional_without_reservation_fails() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[instr_r!(SC, 3, 1, 4), halt!()]);
    machine.set_register(1, 0x40);
    machine.set_register(4, 99);

    machine.load_program(&program, 0).unwrap();
    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(3), 1);
}

#[test]
fn store_conditional_to_other_address_fails() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[
        instr_r!(LR, 2, 1, 0),
        instr_r!(SC, 3, 6, 4),
        halt!(),
    ]);
    machine.load_program(&program, 0).unwrap();
    machine.set_register(1, 0x40);
    machine.set_register(6, 0x80);
    machine.set_register(4, 99);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(3), 1);
}

#[test]
fn misaligned_reservation_faults() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[instr_r!(LR, 2, 1, 0), halt!()]);
    machine.load_program(&program, 0).unwrap();
    machine.set_register(1, 0x41);

    assert_eq!(
        machine.run(0),
        RunResult::Fault(Fault::MisalignedAccess(0x41))
    );
}
