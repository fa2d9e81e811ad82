use super::{Event, Fault, Machine, PerfCounter, Reservation};
use crate::constants::*;
use crate::instructions::*;
use crate::register::{lane_f64, zip_f64, Vector};
use crate::Word;

/// State transition produced by one executed instruction.
pub(super) enum Step {
    Next,
    Halt,
    Fault(Fault),
}

pub(super) fn execute(machine: &mut Machine, word: Word, pc: u64) -> Step {
    let opcode = match decode_opcode(word) {
        Some(opcode) => opcode,
        None => {
            let raw = ((word & OPCODE_MASK) >> OPCODE_OFFSET) as u8;
            return machine.raise(Fault::IllegalOpcode(raw));
        }
    };

    let rdid = decode_rd(word) as usize;
    let rs1id = decode_rs1(word) as usize;
    let rs2id = decode_rs2(word) as usize;

    let rd = machine.registers.read(rdid);
    let rs1 = machine.registers.read(rs1id);
    let rs2 = machine.registers.read(rs2id);

    let imm = decode_imm16(word);
    let offset = decode_imm26(word);

    match opcode {
        Opcode::ADD => {
            let (value, carry) = rs1.overflowing_add(rs2);
            let overflow = ((rs1 ^ value) & (rs2 ^ value)) >> 63 != 0;
            write_alu(machine, rdid, value);
            set_carry_overflow(machine, carry, overflow);
        }

        Opcode::SUB => {
            let (value, borrow) = rs1.overflowing_sub(rs2);
            let overflow = ((rs1 ^ rs2) & (rs1 ^ value)) >> 63 != 0;
            write_alu(machine, rdid, value);
            set_carry_overflow(machine, borrow, overflow);
        }

        Opcode::MUL => {
            write_alu(machine, rdid, rs1.wrapping_mul(rs2));
        }

        Opcode::MULH => {
            let product = (rs1 as i64 as i128).wrapping_mul(rs2 as i64 as i128);
            write_alu(machine, rdid, (product >> 64) as u64);
        }

        Opcode::DIV => {
            if rs2 == 0 {
                return machine.raise(Fault::DivideByZero);
            }
            write_alu(machine, rdid, (rs1 as i64).wrapping_div(rs2 as i64) as u64);
        }

        Opcode::MOD => {
            if rs2 == 0 {
                return machine.raise(Fault::DivideByZero);
            }
            write_alu(machine, rdid, (rs1 as i64).wrapping_rem(rs2 as i64) as u64);
        }

        Opcode::AND => write_alu(machine, rdid, rs1 & rs2),
        Opcode::OR => write_alu(machine, rdid, rs1 | rs2),
        Opcode::XOR => write_alu(machine, rdid, rs1 ^ rs2),
        Opcode::NOT => write_alu(machine, rdid, !rs1),

        Opcode::SHL => write_alu(machine, rdid, rs1 << shift_amount(rs2)),
        Opcode::SHR => write_alu(machine, rdid, rs1 >> shift_amount(rs2)),
        Opcode::SAR => write_alu(machine, rdid, ((rs1 as i64) >> shift_amount(rs2)) as u64),
        Opcode::ROL => write_alu(machine, rdid, rs1.rotate_left(shift_amount(rs2))),
        Opcode::ROR => write_alu(machine, rdid, rs1.rotate_right(shift_amount(rs2))),

        Opcode::LD | Opcode::LW | Opcode::LH | Opcode::LB => {
            let width = operand_width(opcode);
            let address = effective_address(rs1, imm);
            match checked_load(machine, address, width) {
                Ok(value) => machine.registers.write(rdid, value),
                Err(fault) => return machine.raise(fault),
            }
            machine.bump(PerfCounter::MemOps);
        }

        Opcode::ST | Opcode::SW | Opcode::SH | Opcode::SB => {
            let width = operand_width(opcode);
            let address = effective_address(rs1, imm);
            // The value register travels in the rd slot.
            if let Err(fault) = checked_store(machine, address, width, rd) {
                return machine.raise(fault);
            }
            machine.bump(PerfCounter::MemOps);
        }

        // Branches compare the rd-slot and rs1-slot registers.
        Opcode::BEQ => branch(machine, pc, imm, rd == rs1),
        Opcode::BNE => branch(machine, pc, imm, rd != rs1),
        Opcode::BLT => branch(machine, pc, imm, (rd as i64) < (rs1 as i64)),
        Opcode::BGE => branch(machine, pc, imm, (rd as i64) >= (rs1 as i64)),
        Opcode::BLTU => branch(machine, pc, imm, rd < rs1),
        Opcode::BGEU => branch(machine, pc, imm, rd >= rs1),

        Opcode::JMP => {
            machine.program_counter = jump_target(pc, offset);
        }

        Opcode::CALL => {
            let link = pc.wrapping_add(WORD_BYTES);
            machine.registers.write(REG_LR as usize, link);
            machine.program_counter = jump_target(pc, offset);
        }

        Opcode::RET => {
            machine.program_counter = machine.registers.read(REG_LR as usize);
        }

        Opcode::SYSCALL => {
            let code = u64::from(word & ADDRESS_MASK);
            machine
                .events
                .push_back(Event::Exception(Fault::Syscall(code)));
        }

        Opcode::HALT => {
            machine.flags |= FLAG_HALTED;
            machine.events.push_back(Event::Halted);
            return Step::Halt;
        }

        Opcode::NOP | Opcode::FENCE => {}

        Opcode::CPUID => machine.registers.write(rdid, CPUID_VALUE),

        Opcode::RDCYCLE => {
            let cycles = machine.perf_counter(PerfCounter::CycleCount);
            machine.registers.write(rdid, cycles);
        }

        Opcode::RDPERF => {
            let index = imm as u16 as usize % PERF_COUNTER_COUNT;
            machine.registers.write(rdid, machine.counters[index]);
        }

        Opcode::PREFETCH | Opcode::CLFLUSH => {
            machine.bump(PerfCounter::MemOps);
        }

        Opcode::LR => {
            let address = rs1;
            match checked_load(machine, address, DWORD_BYTES) {
                Ok(value) => {
                    machine.registers.write(rdid, value);
                    machine.reservation = Some(Reservation { address, value });
                }
                Err(fault) => return machine.raise(fault),
            }
            machine.bump(PerfCounter::MemOps);
        }

        Opcode::SC => {
            let address = rs1;
            let current = match checked_load(machine, address, DWORD_BYTES) {
                Ok(value) => value,
                Err(fault) => return machine.raise(fault),
            };
            let valid = machine
                .reservation
                .map_or(false, |r| r.address == address && r.value == current);
            if valid {
                machine.memory.write_uint(address, DWORD_BYTES, rs2);
            }
            machine.reservation = None;
            machine.registers.write(rdid, if valid { 0 } else { 1 });
            machine.bump(PerfCounter::MemOps);
        }

        Opcode::AMOSWAP | Opcode::AMOADD | Opcode::AMOAND | Opcode::AMOOR | Opcode::AMOXOR => {
            let address = rs1;
            let old = match checked_load(machine, address, DWORD_BYTES) {
                Ok(value) => value,
                Err(fault) => return machine.raise(fault),
            };
            let new = match opcode {
                Opcode::AMOSWAP => rs2,
                Opcode::AMOADD => old.wrapping_add(rs2),
                Opcode::AMOAND => old & rs2,
                Opcode::AMOOR => old | rs2,
                Opcode::AMOXOR => old ^ rs2,
                _ => unreachable!(),
            };
            machine.memory.write_uint(address, DWORD_BYTES, new);
            machine.invalidate_reservation(address, DWORD_BYTES);
            machine.registers.write(rdid, old);
            machine.bump(PerfCounter::MemOps);
        }

        Opcode::VADD_F64 => vector_binop(machine, word, |a, b| a + b),
        Opcode::VSUB_F64 => vector_binop(machine, word, |a, b| a - b),
        Opcode::VMUL_F64 => vector_binop(machine, word, |a, b| a * b),

        Opcode::VFMA_F64 => {
            let vd = vector_index(rdid);
            let a = machine.vectors.read(vector_index(rs1id));
            let b = machine.vectors.read(vector_index(rs2id));
            let mut acc = machine.vectors.read(vd);
            for lane in 0..VECTOR_LANES {
                let value = lane_f64(acc, lane) + lane_f64(a, lane) * lane_f64(b, lane);
                acc[lane] = value.to_bits();
            }
            machine.vectors.write(vd, acc);
            machine.bump(PerfCounter::SimdOps);
        }

        Opcode::VLOAD => {
            // Scalar base register index travels in the vs1 slot.
            let address = machine.registers.read(rs1id);
            if let Err(fault) = check_vector_access(machine, address) {
                return machine.raise(fault);
            }
            let mut lanes: Vector = [0; VECTOR_LANES];
            for (lane, slot) in lanes.iter_mut().enumerate() {
                let offset = address + lane as u64 * DWORD_BYTES;
                *slot = match machine.memory.read_uint(offset, DWORD_BYTES) {
                    Some(value) => value,
                    None => return machine.raise(Fault::OutOfBounds(offset)),
                };
            }
            machine.vectors.write(vector_index(rdid), lanes);
            machine.bump(PerfCounter::SimdOps);
            machine.bump(PerfCounter::MemOps);
        }

        Opcode::VSTORE => {
            let address = machine.registers.read(rs1id);
            if let Err(fault) = check_vector_access(machine, address) {
                return machine.raise(fault);
            }
            let lanes = machine.vectors.read(vector_index(rdid));
            for (lane, value) in lanes.iter().enumerate() {
                machine
                    .memory
                    .write_uint(address + lane as u64 * DWORD_BYTES, DWORD_BYTES, *value);
            }
            machine.invalidate_reservation(address, VECTOR_BYTES);
            machine.bump(PerfCounter::SimdOps);
            machine.bump(PerfCounter::MemOps);
        }

        Opcode::VBROADCAST => {
            // Scalar source register index travels in the vs1 slot.
            let value = machine.registers.read(rs1id);
            machine
                .vectors
                .write(vector_index(rdid), [value; VECTOR_LANES]);
            machine.bump(PerfCounter::SimdOps);
        }
    }

    Step::Next
}

#[inline]
fn shift_amount(value: u64) -> u32 {
    (value & SHIFT_AMOUNT_MASK) as u32
}

#[inline]
fn operand_width(opcode: Opcode) -> u64 {
    match opcode {
        Opcode::LD | Opcode::ST => DWORD_BYTES,
        Opcode::LW | Opcode::SW => WORD_BYTES,
        Opcode::LH | Opcode::SH => HALF_BYTES,
        Opcode::LB | Opcode::SB => BYTE_BYTES,
        _ => unreachable!(),
    }
}

#[inline]
fn effective_address(base: u64, immediate: i16) -> u64 {
    base.wrapping_add(immediate as i64 as u64)
}

#[inline]
fn vector_index(id: usize) -> usize {
    id % VREGISTER_COUNT
}

fn write_alu(machine: &mut Machine, id: usize, value: u64) {
    machine.registers.write(id, value);
    machine.flags &= !(FLAG_ZERO | FLAG_NEGATIVE);
    if value == 0 {
        machine.flags |= FLAG_ZERO;
    }
    if value >> 63 != 0 {
        machine.flags |= FLAG_NEGATIVE;
    }
}

fn set_carry_overflow(machine: &mut Machine, carry: bool, overflow: bool) {
    machine.flags &= !(FLAG_CARRY | FLAG_OVERFLOW);
    if carry {
        machine.flags |= FLAG_CARRY;
    }
    if overflow {
        machine.flags |= FLAG_OVERFLOW;
    }
}

fn checked_load(machine: &Machine, address: u64, width: u64) -> Result<u64, Fault> {
    if width > 1 && address % width != 0 {
        return Err(Fault::MisalignedAccess(address));
    }
    machine
        .memory
        .read_uint(address, width)
        .ok_or(Fault::OutOfBounds(address))
}

fn checked_store(machine: &mut Machine, address: u64, width: u64, value: u64) -> Result<(), Fault> {
    if width > 1 && address % width != 0 {
        return Err(Fault::MisalignedAccess(address));
    }
    if !machine.memory.write_uint(address, width, value) {
        return Err(Fault::OutOfBounds(address));
    }
    machine.invalidate_reservation(address, width);
    Ok(())
}

fn check_vector_access(machine: &Machine, address: u64) -> Result<(), Fault> {
    if address % DWORD_BYTES != 0 {
        Err(Fault::MisalignedAccess(address))
    } else if !machine.memory.check_range(address, VECTOR_BYTES) {
        Err(Fault::OutOfBounds(address))
    } else {
        Ok(())
    }
}

/// Taken branches are counted as mispredictions of a static
/// predict-not-taken model.
fn branch(machine: &mut Machine, pc: u64, immediate: i16, taken: bool) {
    if taken {
        machine.program_counter = jump_target(pc, i32::from(immediate));
        machine.bump(PerfCounter::BranchMiss);
    }
}

/// Displacements are in instruction units, relative to the instruction
/// after the transfer.
#[inline]
fn jump_target(pc: u64, offset: i32) -> u64 {
    pc.wrapping_add(WORD_BYTES)
        .wrapping_add((i64::from(offset) * WORD_BYTES as i64) as u64)
}

fn vector_binop<F: Fn(f64, f64) -> f64>(machine: &mut Machine, word: Word, op: F) {
    let a = machine.vectors.read(vector_index(decode_rs1(word) as usize));
    let b = machine.vectors.read(vector_index(decode_rs2(word) as usize));
    machine
        .vectors
        .write(vector_index(decode_rd(word) as usize), zip_f64(a, b, op));
    machine.bump(PerfCounter::SimdOps);
}
