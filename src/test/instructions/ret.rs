use super::*;
use crate::constants::REG_LR;

#[test]
fn jumps_to_link_register() {
    let mut machine = Machine::new(4096);
    let program = program_from_words(&[
        instr_j!(RET, 0),
        nop!(),
        halt!(),
    ]);
    machine.load_program(&program, 0).unwrap();
    machine.set_register(REG_LR as usize, 8);

    assert_eq!(machine.run(0), RunResult::Halted);
    assert_eq!(machine.perf_counter(PerfCounter::InstCount), 2);
}
