//! Command-line interface for the graft demo driver.

use clap::{Args, Parser, Subcommand, ValueEnum};
use graft_ir::BinaryOp;
use graft_passes::MutationOutcome;

#[derive(Parser)]
#[command(name = "graft")]
#[command(about = "Run IR mutation passes over a sample module", long_about = None)]
pub struct Cli {
    /// Raise log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` overrides it.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the sample module, run a pipeline over it and print the result
    Run(RunArgs),
    /// List the registered passes and plugins
    Passes,
}

#[derive(Args)]
pub struct RunArgs {
    /// Comma-separated pipeline, e.g. `rewrite-binop,fixpoint(instrument-binop)`.
    /// Defaults to the plugins' pipeline-start passes.
    #[arg(long)]
    pub passes: Option<String>,

    /// Wrap every pass in a fixpoint driver
    #[arg(long)]
    pub fixpoint: bool,

    /// Iteration limit for fixpoint drivers (0 means the default)
    #[arg(long, default_value_t = 0)]
    pub max_iterations: usize,

    /// What a pass does after its first mutation
    #[arg(long, value_enum, default_value_t = ScanMode::First)]
    pub scan: ScanMode,

    /// Binary operators chained in the sample body
    #[arg(long, value_delimiter = ',', default_value = "add", value_parser = parse_binary_op)]
    pub ops: Vec<BinaryOp>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScanMode {
    /// Stop after the first mutation
    First,
    /// Keep scanning after each mutation
    Exhaustive,
}

impl From<ScanMode> for MutationOutcome {
    fn from(mode: ScanMode) -> Self {
        match mode {
            ScanMode::First => MutationOutcome::Stop,
            ScanMode::Exhaustive => MutationOutcome::ContinueScan,
        }
    }
}

fn parse_binary_op(text: &str) -> Result<BinaryOp, String> {
    BinaryOp::from_mnemonic(text.trim()).ok_or_else(|| format!("unknown binary operator `{text}`"))
}
