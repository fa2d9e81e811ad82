#[macro_use]
extern crate clap;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use log::debug;

use nanocore::constants::DEFAULT_LOAD_ADDRESS;
use nanocore::{Event, Fault, Machine, PerfCounter, RunResult};

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Io(std::io::Error, IOErrorContext, PathBuf),
    Asm(ncasm::AsmErrors),
    Machine(Fault),
    BadInput(String),
    Clap(clap::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "Reading input",
                    IOErrorContext::WriteOutput => "Writing output",
                },
                path.display(),
                err
            ),
            Error::Asm(errors) => {
                writeln!(f, "Assembly failed:")?;
                write!(f, "{}", errors)
            }
            Error::Machine(fault) => write!(f, "Execution fault: {}", fault),
            Error::BadInput(reason) => write!(f, "{}", reason),
            Error::Clap(err) => write!(f, "{}", err),
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|err| Error::Io(err, IOErrorContext::ReadInput, path.to_owned()))
}

fn read_string(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, path.to_owned()))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    fs::write(path, bytes).map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, path.to_owned()))
}

fn main() {
    env_logger::init();

    let matches = app_from_crate!()
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("assemble")
                .about("Assembles source to a flat binary")
                .arg(
                    Arg::with_name("INPUT")
                        .help("Sets the input assembly file to use")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .value_name("OUTPUT")
                        .help("Sets the output file to write to"),
                )
                .arg(
                    Arg::with_name("verbose")
                        .short("v")
                        .long("verbose")
                        .help("Prints byte count and symbol table"),
                ),
        )
        .subcommand(
            SubCommand::with_name("disasm")
                .about("Disassembles a flat binary")
                .arg(
                    Arg::with_name("INPUT")
                        .help("Sets the input binary file to use")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .value_name("OUTPUT")
                        .help("Writes re-assemblable source instead of a listing"),
                )
                .arg(
                    Arg::with_name("address")
                        .short("a")
                        .long("address")
                        .takes_value(true)
                        .value_name("ADDRESS")
                        .default_value("0")
                        .help("Start address for the listing (hex)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("Runs a program")
                .arg(
                    Arg::with_name("PROGRAM")
                        .help("Sets the program file to use")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("debug")
                        .short("d")
                        .long("debug")
                        .help("Single-steps, printing each fetch"),
                )
                .arg(
                    Arg::with_name("cycles")
                        .short("c")
                        .long("cycles")
                        .takes_value(true)
                        .value_name("CYCLES")
                        .default_value("0")
                        .help("Maximum instructions to execute (0 = unlimited)"),
                )
                .arg(
                    Arg::with_name("memory")
                        .short("m")
                        .long("memory")
                        .takes_value(true)
                        .value_name("MEMORY")
                        .default_value("67108864")
                        .help("Sets the size of the memory in bytes"),
                ),
        )
        .subcommand(
            SubCommand::with_name("profile")
                .about("Runs a program and reports performance counters")
                .arg(
                    Arg::with_name("PROGRAM")
                        .help("Sets the program file to use")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("cycles")
                        .short("c")
                        .long("cycles")
                        .takes_value(true)
                        .value_name("CYCLES")
                        .default_value("1000000")
                        .help("Instruction budget for the profile run"),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("assemble", Some(sub)) => cmd_assemble(sub),
        ("disasm", Some(sub)) => cmd_disasm(sub),
        ("run", Some(sub)) => cmd_run(sub),
        ("profile", Some(sub)) => cmd_profile(sub),
        _ => unreachable!(),
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn cmd_assemble(matches: &ArgMatches) -> Result<(), Error> {
    let input_path = Path::new(matches.value_of("INPUT").unwrap());
    let source = read_string(input_path)?;

    let (bytes, symbols) = ncasm::assemble_with_symbols(&source).map_err(Error::Asm)?;

    let output_path = matches
        .value_of("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| input_path.with_extension("bin"));
    write_bytes(&output_path, &bytes)?;

    if matches.is_present("verbose") {
        println!("Assembled {} bytes", bytes.len());
        println!("Output written to: {}", output_path.display());

        if !symbols.is_empty() {
            println!();
            println!("Symbol Table:");
            for (name, address) in &symbols {
                println!("  {:20} {:#010x}", name, address);
            }
        }
    }

    Ok(())
}

fn cmd_disasm(matches: &ArgMatches) -> Result<(), Error> {
    let input_path = Path::new(matches.value_of("INPUT").unwrap());
    let bytes = read_bytes(input_path)?;

    if bytes.len() % 4 != 0 {
        return Err(Error::BadInput(format!(
            "program size {} is not a multiple of 4 bytes",
            bytes.len()
        )));
    }

    let address_text = matches.value_of("address").unwrap();
    let address = u64::from_str_radix(address_text.trim_start_matches("0x"), 16)
        .map_err(|_| Error::BadInput(format!("invalid start address '{}'", address_text)))?;

    match matches.value_of("output") {
        Some(path) => write_bytes(Path::new(path), ncasm::disassemble(&bytes).as_bytes())?,
        None => print!("{}", ncasm::disassemble_listing(&bytes, address)),
    }

    Ok(())
}

fn load_machine(matches: &ArgMatches, mem_size: u64) -> Result<Machine, Error> {
    let program_path = Path::new(matches.value_of("PROGRAM").unwrap());
    let program = read_bytes(program_path)?;

    debug!("loading {} bytes at {:#x}", program.len(), DEFAULT_LOAD_ADDRESS);

    let mut machine = Machine::new(mem_size);
    machine
        .load_program(&program, DEFAULT_LOAD_ADDRESS)
        .map_err(Error::Machine)?;
    Ok(machine)
}

fn cmd_run(matches: &ArgMatches) -> Result<(), Error> {
    let cycles = value_t!(matches.value_of("cycles"), u64).map_err(Error::Clap)?;
    let mem_size = value_t!(matches.value_of("memory"), u64).map_err(Error::Clap)?;

    let mut machine = load_machine(matches, mem_size)?;

    let result = if matches.is_present("debug") {
        run_stepping(&mut machine, cycles)
    } else {
        machine.run(cycles)
    };

    report_events(&mut machine);

    match result {
        RunResult::Halted => println!("Program halted normally."),
        RunResult::Completed(steps) => {
            println!("Instruction budget reached after {} steps.", steps)
        }
        RunResult::Breakpoint(address) => println!("Stopped at breakpoint {:#x}.", address),
        RunResult::Fault(fault) => {
            print_final_state(&machine);
            return Err(Error::Machine(fault));
        }
    }

    print_final_state(&machine);
    Ok(())
}

fn run_stepping(machine: &mut Machine, max_instructions: u64) -> RunResult {
    let mut steps = 0u64;

    loop {
        if max_instructions != 0 && steps == max_instructions {
            return RunResult::Completed(steps);
        }

        let pc = machine.program_counter();
        if let Ok(bytes) = machine.read_memory(pc, 4) {
            let mut word = [0u8; 4];
            word.copy_from_slice(bytes);
            println!("{:#018x}: {:#010x}", pc, u32::from_le_bytes(word));
        }

        match machine.step() {
            RunResult::Completed(_) => steps += 1,
            other => return other,
        }
    }
}

fn report_events(machine: &mut Machine) {
    while let Some(event) = machine.poll_event() {
        match event {
            Event::Exception(Fault::Syscall(code)) => println!("Syscall: {}", code),
            Event::Exception(fault) => println!("Exception: {}", fault),
            Event::Breakpoint(address) => println!("Breakpoint: {:#x}", address),
            Event::DeviceInterrupt(payload) => println!("Device interrupt: {}", payload),
            Event::Halted => {}
        }
    }
}

fn print_final_state(machine: &Machine) {
    let state = machine.state();

    println!();
    println!("Final State:");
    println!(
        "  Instructions executed: {}",
        machine.perf_counter(PerfCounter::InstCount)
    );
    println!(
        "  Cycles: {}",
        machine.perf_counter(PerfCounter::CycleCount)
    );

    println!("  Non-zero registers:");
    for (index, value) in state.registers.iter().enumerate() {
        if *value != 0 {
            println!("    R{:02} = {:#018x} ({})", index, value, value);
        }
    }
}

fn cmd_profile(matches: &ArgMatches) -> Result<(), Error> {
    let cycles = value_t!(matches.value_of("cycles"), u64).map_err(Error::Clap)?;

    let mut machine = load_machine(matches, nanocore::constants::DEFAULT_MEMORY_SIZE)?;
    let result = machine.run(cycles);

    let instructions = machine.perf_counter(PerfCounter::InstCount);
    let cycle_count = machine.perf_counter(PerfCounter::CycleCount);

    println!("Profile Results:");
    for counter in PerfCounter::ALL.iter() {
        println!("  {:?}: {}", counter, machine.perf_counter(*counter));
    }
    println!(
        "  IPC: {:.2}",
        instructions as f64 / cycle_count.max(1) as f64
    );

    match result {
        RunResult::Fault(fault) => Err(Error::Machine(fault)),
        _ => Ok(()),
    }
}
