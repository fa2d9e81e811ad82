use super::*;

#[test]
fn replicates_scalar_into_all_lanes() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(
            &program_from_words(&[instr_v!(VBROADCAST, 2, 1, 0), halt!()]),
            0,
        )
        .unwrap();
    machine.set_register(1, 3.5f64.to_bits());

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.vector_register(2), [3.5f64.to_bits(); 4]);
}
