//! MIPS pipeline simulator CLI.
//!
//! Single entry point for both simulation modes:
//! 1. **Performance run (default):** Drive the five-stage pipeline with the
//!    reference functional model checking every retirement; print the
//!    statistics banner with the achieved IPC.
//! 2. **Functional-only run:** Bypass the pipeline and execute the program
//!    on the reference model alone.
//!
//! Configuration starts from built-in defaults or an optional JSON file;
//! explicit flags override either. Errors go to stderr and exit non-zero.

use std::fs;
use std::process;

use clap::Parser;

use mips_core::sim::loader;
use mips_core::trace::Tracer;
use mips_core::{Config, FuncSim, PerfSim, SimError};

#[derive(Parser, Debug)]
#[command(
    name = "mipsim",
    version,
    about = "Functional and performance simulators for a MIPS-based CPU",
    long_about = "Run a flat program image through a cycle-accurate five-stage \
pipeline model, or through the reference functional model alone.\n\n\
Examples:\n  mipsim prog.bin 10000\n  mipsim -b prog.bin -n 10000 -s 256 -w 8 -d\n  \
mipsim -c machine.json prog.bin 10000"
)]
struct Cli {
    /// Input binary file.
    #[arg(short, long, value_name = "PATH")]
    binary: Option<String>,

    /// Number of instructions to run.
    #[arg(short, long, value_name = "N")]
    numsteps: Option<u64>,

    /// JSON configuration file; explicit flags take precedence.
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Size of the BTB cache in entries.
    #[arg(short = 's', long, value_name = "K")]
    btb_size: Option<usize>,

    /// Number of ways in the BTB cache (defines associativity).
    #[arg(short = 'w', long, value_name = "W")]
    btb_ways: Option<usize>,

    /// Print the per-stage disassembly trace.
    #[arg(short, long)]
    disassembly: bool,

    /// Run the functional simulation only.
    #[arg(short, long)]
    functional_only: bool,

    /// Positional form of --binary.
    #[arg(value_name = "BINARY")]
    binary_pos: Option<String>,

    /// Positional form of --numsteps.
    #[arg(value_name = "NUMSTEPS")]
    numsteps_pos: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("mipsim: {}", message);
            process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("mipsim: {}", e);
        process::exit(1);
    }
}

/// Merges the optional JSON file and the command line into one config.
fn build_config(cli: &Cli) -> Result<Config, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read config '{}': {}", path, e))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("cannot parse config '{}': {}", path, e))?
        }
        None => Config::default(),
    };

    if let Some(binary) = cli.binary.clone().or_else(|| cli.binary_pos.clone()) {
        config.run.binary = Some(binary);
    }
    if let Some(numsteps) = cli.numsteps.or(cli.numsteps_pos) {
        config.run.num_steps = numsteps;
    }
    if let Some(size) = cli.btb_size {
        config.bpu.size_in_entries = size;
    }
    if let Some(ways) = cli.btb_ways {
        config.bpu.ways = ways;
    }
    config.run.disassembly |= cli.disassembly;
    config.run.functional_only |= cli.functional_only;

    if config.run.binary.is_none() {
        return Err(
            "an input binary is required (-b/--binary or the first positional argument)".into(),
        );
    }
    if config.run.num_steps == 0 {
        return Err(
            "a positive instruction count is required (-n/--numsteps or the second positional argument)"
                .into(),
        );
    }
    Ok(config)
}

fn run(config: &Config) -> Result<(), SimError> {
    if config.run.functional_only {
        let path = config
            .run
            .binary
            .as_deref()
            .ok_or_else(|| SimError::Config("no program image configured".into()))?;
        let memory = loader::load_memory(path, config.machine.text_base)?;
        let mut sim = FuncSim::new(memory);
        let tracer = Tracer::new(config.run.disassembly);
        sim.run(config.run.num_steps, &tracer)?;
        println!("Executed {} instructions", config.run.num_steps);
    } else {
        let mut sim = PerfSim::new(config)?;
        sim.run()?;
        sim.stats().print();
    }
    Ok(())
}
