use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{analyze::AnalyzeArg, solve::SolveArg};

mod analyze;
mod solve;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log search internals (cell switches, rejected moves)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Solve a level with feature space search
    Solve(#[clap(flatten)] SolveArg),
    /// Print the static analysis and initial features of a level
    Analyze(#[clap(flatten)] AnalyzeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(&args);
    match &args.mode {
        Mode::Solve(arg) => solve::run(arg)?,
        Mode::Analyze(arg) => analyze::run(arg)?,
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &CommandArgs) {
    let default_directive = match (args.verbose, args.quiet) {
        (true, _) => "debug",
        (false, true) => "warn",
        (false, false) => "info",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
