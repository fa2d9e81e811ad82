use super::*;

pub fn doubles(values: [f64; 4]) -> Vector {
    [
        values[0].to_bits(),
        values[1].to_bits(),
        values[2].to_bits(),
        values[3].to_bits(),
    ]
}

pub fn run_vector_op(word: Word, a: [f64; 4], b: [f64; 4]) -> Machine {
    let mut machine = Machine::new(4096);
    machine
        .load_program(&program_from_words(&[word, halt!()]), 0)
        .unwrap();
    machine.set_vector_register(1, doubles(a));
    machine.set_vector_register(2, doubles(b));

    assert_eq!(machine.run(0), RunResult::Halted);
    machine
}

#[test]
fn lane_wise_sum() {
    let machine = run_vector_op(
        instr_v!(VADD_F64, 3, 1, 2),
        [1.0, 2.0, 3.0, 4.0],
        [10.0, 20.0, 30.0, 40.0],
    );

    assert_eq!(
        machine.vector_register(3),
        doubles([11.0, 22.0, 33.0, 44.0])
    );
    assert_eq!(machine.perf_counter(PerfCounter::SimdOps), 1);
}
