mod exec;

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};
use num_derive::{FromPrimitive, ToPrimitive};
use thiserror::Error;

use self::exec::Step;
use crate::constants::*;
use crate::memory::Memory;
use crate::register::{RegisterFile, Vector, VectorRegisterFile};

/// Machine-level fault raised during execution or by a host operation.
///
/// `Syscall` is the only fault that does not halt the machine; the outer
/// driver interprets it from the event queue.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum Fault {
    #[error("illegal opcode {0:#04x}")]
    IllegalOpcode(u8),
    #[error("misaligned instruction fetch at {0:#018x}")]
    MisalignedFetch(u64),
    #[error("misaligned memory access at {0:#018x}")]
    MisalignedAccess(u64),
    #[error("memory access out of bounds at {0:#018x}")]
    OutOfBounds(u64),
    #[error("integer division by zero")]
    DivideByZero,
    #[error("syscall {0}")]
    Syscall(u64),
}

/// Entry of the machine's event queue, drained with
/// [`poll_event`](struct.Machine.html#method.poll_event).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
    Halted,
    Breakpoint(u64),
    Exception(Fault),
    DeviceInterrupt(u64),
}

/// Outcome of [`run`](struct.Machine.html#method.run) and
/// [`step`](struct.Machine.html#method.step).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunResult {
    /// The instruction budget was exhausted after this many steps.
    Completed(u64),
    Halted,
    Breakpoint(u64),
    Fault(Fault),
}

/// Performance counter slots, in their fixed index order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum PerfCounter {
    InstCount,
    CycleCount,
    L1Miss,
    L2Miss,
    BranchMiss,
    PipelineStall,
    MemOps,
    SimdOps,
}

impl PerfCounter {
    pub const ALL: [PerfCounter; PERF_COUNTER_COUNT] = [
        PerfCounter::InstCount,
        PerfCounter::CycleCount,
        PerfCounter::L1Miss,
        PerfCounter::L2Miss,
        PerfCounter::BranchMiss,
        PerfCounter::PipelineStall,
        PerfCounter::MemOps,
        PerfCounter::SimdOps,
    ];
}

/// Consistent snapshot of the architectural state.
#[derive(Clone, Debug)]
pub struct MachineState {
    pub pc: u64,
    pub sp: u64,
    pub flags: u64,
    pub registers: [u64; REGISTER_COUNT],
    pub vectors: [Vector; VREGISTER_COUNT],
    pub counters: [u64; PERF_COUNTER_COUNT],
}

/// Load-reserved record consumed by store-conditional.
#[derive(Clone, Copy)]
struct Reservation {
    address: u64,
    value: u64,
}

/// The NanoCore execution engine.
///
/// A `Machine` is a plain value owned by the caller; independent machines
/// share no state. All operations are serialized by the single owner.
pub struct Machine {
    registers: RegisterFile,
    vectors: VectorRegisterFile,
    program_counter: u64,
    flags: u64,
    memory: Memory,
    counters: [u64; PERF_COUNTER_COUNT],
    breakpoints: HashSet<u64>,
    events: VecDeque<Event>,
    reservation: Option<Reservation>,
}

impl Machine {
    /// Constructs a machine with `memory_size` bytes of zeroed memory.
    pub fn new(memory_size: u64) -> Machine {
        Machine {
            registers: RegisterFile::default(),
            vectors: VectorRegisterFile::default(),
            program_counter: 0,
            flags: 0,
            memory: Memory::new(memory_size),
            counters: [0; PERF_COUNTER_COUNT],
            breakpoints: HashSet::new(),
            events: VecDeque::new(),
            reservation: None,
        }
    }

    /// Restores the freshly-created state while keeping the memory size.
    pub fn reset(&mut self) {
        self.registers.clear();
        self.vectors.clear();
        self.program_counter = 0;
        self.flags = 0;
        self.memory.clear();
        self.counters = [0; PERF_COUNTER_COUNT];
        self.breakpoints.clear();
        self.events.clear();
        self.reservation = None;
    }

    /// Copies `program` into memory at `address` and points the PC at it.
    pub fn load_program(&mut self, program: &[u8], address: u64) -> Result<(), Fault> {
        self.write_memory(address, program)?;
        self.program_counter = address;
        debug!(
            "loaded {} byte program at {:#x}",
            program.len(),
            address
        );
        Ok(())
    }

    pub fn program_counter(&self) -> u64 {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, address: u64) {
        self.program_counter = address;
    }

    pub fn register(&self, id: usize) -> u64 {
        self.registers.read(id)
    }

    /// Writes a register. Writes to register 0 are silently discarded.
    pub fn set_register(&mut self, id: usize, value: u64) {
        self.registers.write(id, value);
    }

    pub fn vector_register(&self, id: usize) -> Vector {
        self.vectors.read(id)
    }

    pub fn set_vector_register(&mut self, id: usize, value: Vector) {
        self.vectors.write(id, value);
    }

    pub fn flags(&self) -> u64 {
        self.flags
    }

    pub fn flag(&self, mask: u64) -> bool {
        self.flags & mask != 0
    }

    pub fn halted(&self) -> bool {
        self.flag(FLAG_HALTED)
    }

    pub fn memory_size(&self) -> u64 {
        self.memory.len()
    }

    pub fn read_memory(&self, address: u64, length: u64) -> Result<&[u8], Fault> {
        self.memory
            .slice(address, length)
            .ok_or(Fault::OutOfBounds(address))
    }

    pub fn write_memory(&mut self, address: u64, bytes: &[u8]) -> Result<(), Fault> {
        let length = bytes.len() as u64;
        match self.memory.slice_mut(address, length) {
            Some(target) => {
                target.copy_from_slice(bytes);
                self.invalidate_reservation(address, length);
                Ok(())
            }
            None => Err(Fault::OutOfBounds(address)),
        }
    }

    /// Idempotent: setting an existing breakpoint is a no-op.
    pub fn set_breakpoint(&mut self, address: u64) {
        self.breakpoints.insert(address);
    }

    pub fn clear_breakpoint(&mut self, address: u64) {
        self.breakpoints.remove(&address);
    }

    pub fn perf_counter(&self, counter: PerfCounter) -> u64 {
        self.counters[counter as usize]
    }

    /// Dequeues the oldest pending event, if any.
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn state(&self) -> MachineState {
        MachineState {
            pc: self.program_counter,
            sp: self.registers.read(REG_SP as usize),
            flags: self.flags,
            registers: *self.registers.raw(),
            vectors: *self.vectors.raw(),
            counters: self.counters,
        }
    }

    /// Executes instructions until the machine halts, faults, hits a
    /// breakpoint, or `max_instructions` steps were taken (0 = unlimited).
    ///
    /// The breakpoint set is consulted on every fetch except the first of
    /// this call, so a run resumed at a breakpoint address executes past it.
    pub fn run(&mut self, max_instructions: u64) -> RunResult {
        let mut steps = 0u64;

        loop {
            if self.halted() {
                return RunResult::Halted;
            }

            if max_instructions != 0 && steps == max_instructions {
                return RunResult::Completed(steps);
            }

            if steps > 0 && self.breakpoints.contains(&self.program_counter) {
                let pc = self.program_counter;
                debug!("breakpoint hit at {:#x}", pc);
                self.events.push_back(Event::Breakpoint(pc));
                return RunResult::Breakpoint(pc);
            }

            match self.fetch_execute() {
                Step::Next => steps += 1,
                Step::Halt => return RunResult::Halted,
                Step::Fault(fault) => return RunResult::Fault(fault),
            }
        }
    }

    /// Executes a single instruction, ignoring breakpoints.
    pub fn step(&mut self) -> RunResult {
        if self.halted() {
            return RunResult::Halted;
        }

        match self.fetch_execute() {
            Step::Next => RunResult::Completed(1),
            Step::Halt => RunResult::Halted,
            Step::Fault(fault) => RunResult::Fault(fault),
        }
    }

    fn fetch_execute(&mut self) -> Step {
        let pc = self.program_counter;

        if pc % WORD_BYTES != 0 {
            return self.raise(Fault::MisalignedFetch(pc));
        }

        let word = match self.memory.read_uint(pc, WORD_BYTES) {
            Some(word) => word as u32,
            None => return self.raise(Fault::OutOfBounds(pc)),
        };

        trace!("fetch {:#x}: {:#010x}", pc, word);

        self.program_counter = pc.wrapping_add(WORD_BYTES);
        self.bump(PerfCounter::InstCount);
        self.bump(PerfCounter::CycleCount);

        exec::execute(self, word, pc)
    }

    /// Records a halting fault: Halted flag, exception event, ended run.
    fn raise(&mut self, fault: Fault) -> Step {
        debug!("fault: {}", fault);
        self.flags |= FLAG_HALTED;
        self.events.push_back(Event::Exception(fault));
        Step::Fault(fault)
    }

    fn bump(&mut self, counter: PerfCounter) {
        self.counters[counter as usize] += 1;
    }

    /// Drops the reservation if `[address..address + length)` touches the
    /// reserved doubleword.
    fn invalidate_reservation(&mut self, address: u64, length: u64) {
        if let Some(reservation) = self.reservation {
            let end = address.saturating_add(length);
            if address < reservation.address + DWORD_BYTES && reservation.address < end {
                self.reservation = None;
            }
        }
    }
}

impl Default for Machine {
    fn default() -> Machine {
        Machine::new(DEFAULT_MEMORY_SIZE)
    }
}
