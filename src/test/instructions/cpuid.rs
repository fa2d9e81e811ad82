use super::*;
use crate::constants::CPUID_VALUE;

#[test]
fn reports_identifier() {
    instruction_runs! {
        instr_i!(CPUID, 4, 0, 0),
        [] => [4 = CPUID_VALUE]
    };
}
