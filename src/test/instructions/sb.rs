use super::*;

#[test]
fn truncates_to_8_bits() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[instr_i!(SB, 1, 0, 0x41), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 0xFFFF_FFFF_FFFF_FFFF);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.read_memory(0x40, 3).unwrap(), &[0, 0xFF, 0]);
}
