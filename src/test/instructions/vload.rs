use super::*;

#[test]
fn loads_four_lanes_lowest_first() {
    let mut machine = Machine::new(4096);
    for lane in 0..4u64 {
        machine
            .write_memory(0x40 + lane * 8, &(lane + 1).to_le_bytes())
            .unwrap();
    }
    machine
        .load_program(&program_from_words(&[instr_v!(VLOAD, 2, 1, 0), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 0x40);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.vector_register(2), [1, 2, 3, 4]);
    assert_eq!(machine.perf_counter(PerfCounter::SimdOps), 1);
    assert_eq!(machine.perf_counter(PerfCounter::MemOps), 1);
}

#[test]
fn misaligned_base_faults() {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[instr_v!(VLOAD, 2, 1, 0), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 0x44);

    assert_eq!(
        machine.run(0),
        RunResult::Fault(Fault::MisalignedAccess(0x44))
    );
}

#[test]
fn transfer_past_end_of_memory_faults() {
    let mut machine = Machine::new(64);
    machine
        .load_program(&program_from_words(&[instr_v!(VLOAD, 2, 1, 0), halt!()]), 0)
        .unwrap();
    machine.set_register(1, 40);

    assert_eq!(machine.run(0), RunResult::Fault(Fault::OutOfBounds(40)));
}
