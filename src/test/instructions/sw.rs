use super::*;

#[test]
fn truncates_to_32_bits() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[instr_i!(SW, 1, 0, 0x40), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 0x1122_3344_5566_7788);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.read_memory(0x40, 4).unwrap(), &[0x88, 0x77, 0x66, 0x55]);
    // Bytes past the store width are untouched.
    assert_eq!(machine.read_memory(0x44, 4).unwrap(), &[0, 0, 0, 0]);
}
