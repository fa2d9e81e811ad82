use super::*;
use super::vadd::{doubles, run_vector_op};

#[test]
fn lane_wise_difference() {
    let machine = run_vector_op(
        instr_v!(VSUB_F64, 3, 1, 2),
        [10.0, 20.0, 30.0, 40.0],
        [1.0, 2.0, 3.0, 4.0],
    );

    assert_eq!(machine.vector_register(3), doubles([9.0, 18.0, 27.0, 36.0]));
}
