use super::*;
use super::vadd::doubles;

#[test]
fn accumulates_into_destination() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(
            &program_from_words(&[instr_v!(VFMA_F64, 3, 1, 2), halt!()]),
            0,
        )
        .unwrap();
    machine.set_vector_register(1, doubles([1.0, 2.0, 3.0, 4.0]));
    machine.set_vector_register(2, doubles([10.0, 10.0, 10.0, 10.0]));
    machine.set_vector_register(3, doubles([0.5, 0.5, 0.5, 0.5]));

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(
        machine.vector_register(3),
        doubles([10.5, 20.5, 30.5, 40.5])
    );
}
