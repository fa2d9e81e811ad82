use super::*;
use super::vadd::{doubles, run_vector_op};

#[test]
fn lane_wise_product() {
    let machine = run_vector_op(
        instr_v!(VMUL_F64, 3, 1, 2),
        [1.0, 2.0, 3.0, 4.0],
        [2.0, 2.0, 2.0, 2.0],
    );

    assert_eq!(machine.vector_register(3), doubles([2.0, 4.0, 6.0, 8.0]));
}
