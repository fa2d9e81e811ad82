use super::*;

#[test]
fn stores_doubleword() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[instr_i!(ST, 1, 2, 8), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 0xAABB_CCDD_EEFF_0011);
    machine.set_register(2, 0x100);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(
        machine.read_memory(0x108, 8).unwrap(),
        &0xAABB_CCDD_EEFF_0011u64.to_le_bytes()
    );
}

#[test]
fn store_then_load_round_trips() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(
            &program_from_words(&[
                instr_i!(ST, 1, 0, 0x80),
                instr_i!(LD, 3, 0, 0x80),
                halt!(),
            ]),
            0,
        )
        .unwrap();
    machine.set_register(1, 0x0123_4567_89AB_CDEF);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.register(3), 0x0123_4567_89AB_CDEF);
}

#[test]
fn out_of_bounds_faults() {
    let mut machine = Machine::new(64);
    machine
        .load_program(&program_from_words(&[instr_i!(ST, 1, 0, 64), halt!()]), 0)
        .unwrap();

    assert_eq!(machine.run(0), RunResult::Fault(Fault::OutOfBounds(64)));
}
