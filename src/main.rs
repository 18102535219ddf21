use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use laddersim::batch::truth_table;
use laddersim::demos::Demo;
use laddersim::dump::render_engine;
use laddersim::engine::{EngineConfig, ScanEngine, ToggleMode};
use laddersim::memory::{BoundsPolicy, DEFAULT_BANK_SIZE};
use laddersim::program::Program;
use laddersim::stimulus::Stimulus;

#[derive(Parser)]
#[command(name = "laddersim", about = "Relay ladder logic scan-cycle simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan repeatedly, dumping memory after every scan.
    Run(RunArgs),
    /// Print the truth table of a program over a set of input cells.
    Table(TableArgs),
}

#[derive(Args)]
struct ProgramArgs {
    /// Mnemonic source file.
    #[arg(required_unless_present = "demo", conflicts_with = "demo")]
    file: Option<PathBuf>,

    /// Use a built-in demonstration program.
    #[arg(long, value_enum)]
    demo: Option<DemoName>,
}

#[derive(Args)]
struct EngineArgs {
    /// Cells per memory bank.
    #[arg(long, default_value_t = DEFAULT_BANK_SIZE)]
    bank_size: usize,

    /// Reject address == bank size (default accepts it).
    #[arg(long)]
    strict_bounds: bool,

    /// When the read and write banks swap.
    #[arg(long, value_enum, default_value_t = ToggleArg::PerInstruction)]
    toggle: ToggleArg,

    /// Abort a scan that takes more than this many steps.
    #[arg(long)]
    step_limit: Option<usize>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    program: ProgramArgs,

    #[command(flatten)]
    engine: EngineArgs,

    /// Number of scans to run (default: run until interrupted).
    #[arg(long)]
    scans: Option<u64>,

    /// Delay between scans in milliseconds.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Force an input cell before the first scan, e.g. `--input 010=1`.
    #[arg(long = "input", value_parser = parse_input)]
    inputs: Vec<(usize, bool)>,

    /// Input cells to toggle randomly between scans, e.g. `000,001,010`.
    #[arg(long, value_delimiter = ',', value_parser = parse_address)]
    stimulus: Vec<usize>,

    /// Per-scan flip probability for each stimulus cell.
    #[arg(long, default_value_t = 0.1)]
    stimulus_rate: f64,

    /// Random seed for the stimulus.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Args)]
struct TableArgs {
    #[command(flatten)]
    program: ProgramArgs,

    #[command(flatten)]
    engine: EngineArgs,

    /// Input cells to enumerate, e.g. `000,001`.
    #[arg(long, required = true, value_delimiter = ',', value_parser = parse_address)]
    inputs: Vec<usize>,

    /// Cells to report, e.g. `100`.
    #[arg(long, required = true, value_delimiter = ',', value_parser = parse_address)]
    outputs: Vec<usize>,

    /// Scans to run per row before reading outputs.
    #[arg(long, default_value_t = 1)]
    scans: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DemoName {
    SelfToggle,
    LogicChain,
}

impl From<DemoName> for Demo {
    fn from(name: DemoName) -> Self {
        match name {
            DemoName::SelfToggle => Demo::SelfToggle,
            DemoName::LogicChain => Demo::LogicChain,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ToggleArg {
    PerInstruction,
    PerScan,
}

impl EngineArgs {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            bank_size: self.bank_size,
            bounds: if self.strict_bounds {
                BoundsPolicy::Strict
            } else {
                BoundsPolicy::Inclusive
            },
            toggle: match self.toggle {
                ToggleArg::PerInstruction => ToggleMode::PerInstruction,
                ToggleArg::PerScan => ToggleMode::PerScan,
            },
            step_limit: self.step_limit,
        }
    }
}

/// Parse a hex cell address, with or without the `M` bank prefix.
fn parse_address(s: &str) -> Result<usize, String> {
    let digits = s.strip_prefix('M').unwrap_or(s);
    usize::from_str_radix(digits, 16).map_err(|e| format!("Invalid address '{s}': {e}"))
}

/// Parse an `ADDR=VALUE` input assignment.
fn parse_input(s: &str) -> Result<(usize, bool), String> {
    let (addr, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid input '{s}', expected ADDR=0|1"))?;
    let value = match value {
        "0" | "false" => false,
        "1" | "true" => true,
        other => return Err(format!("Invalid input value '{other}', expected 0 or 1")),
    };
    Ok((parse_address(addr)?, value))
}

fn setup_tracing() -> Result<(), Box<dyn Error>> {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_writer(std::io::stderr);
    let sub = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer);
    set_global_default(sub)?;
    Ok(())
}

fn load_program(args: &ProgramArgs) -> Result<Program, Box<dyn Error>> {
    let program = match (args.demo, &args.file) {
        (Some(demo), _) => Demo::from(demo).program()?,
        (None, Some(path)) => std::fs::read_to_string(path)?.parse::<Program>()?,
        (None, None) => return Err("no program given".into()),
    };
    tracing::info!(instructions = program.len(), "program loaded");
    Ok(program)
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let program = load_program(&args.program)?;
    let mut engine = ScanEngine::with_config(program, args.engine.config());
    for &(address, value) in &args.inputs {
        engine.set_input(address, value)?;
    }

    let mut stimulus = (!args.stimulus.is_empty())
        .then(|| Stimulus::new(args.stimulus.clone(), args.stimulus_rate, args.seed));
    let interval = Duration::from_millis(args.interval_ms);

    let mut completed: u64 = 0;
    while args.scans.is_none_or(|n| completed < n) {
        if let Some(stimulus) = stimulus.as_mut() {
            stimulus.apply(&mut engine)?;
        }
        engine.scan()?;
        completed += 1;

        print!("{}", render_engine(&engine));
        println!("{}", "-".repeat(30));

        if args.scans.is_none_or(|n| completed < n) {
            thread::sleep(interval);
        }
    }
    tracing::info!(scans = completed, steps = engine.step_count(), "run finished");
    Ok(())
}

fn table(args: TableArgs) -> Result<(), Box<dyn Error>> {
    let program = load_program(&args.program)?;
    let rows = truth_table(
        &program,
        args.engine.config(),
        &args.inputs,
        &args.outputs,
        args.scans,
    )?;

    let label = |address: &usize| format!("M{address:03X}");
    let inputs: Vec<String> = args.inputs.iter().map(label).collect();
    let outputs: Vec<String> = args.outputs.iter().map(label).collect();
    println!("{} | {}", inputs.join(" "), outputs.join(" "));

    let cells = |labels: &[String], values: &[bool]| -> String {
        labels
            .iter()
            .zip(values)
            .map(|(l, &v)| format!("{:<width$}", u8::from(v), width = l.len()))
            .collect::<Vec<_>>()
            .join(" ")
    };
    for row in &rows {
        println!(
            "{} | {}",
            cells(&inputs[..], &row.inputs[..]),
            cells(&outputs[..], &row.outputs[..])
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_tracing()?;

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Table(args) => table(args),
    }
}
