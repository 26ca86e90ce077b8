use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
    pub json: bool,     // global --json
}

#[derive(Parser, Debug)]
#[command(name = "sortpack")]
#[command(
    about = "Group a project's source files by path rules and pack them into balanced text batches"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub pack: PackArgs,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show the batch plan without writing any artifact
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Emit the run summary (or the plan, with --dry-run) as one JSON line
    #[arg(long, global = true)]
    pub json: bool,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Args, Debug, Clone)]
pub struct PackArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory that receives the .txt artifacts
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl Cli {
    /// Build the context passed to every stage
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            dry_run: self.dry_run,
            json: self.json,
        }
    }

    /// Default tracing directive for the requested verbosity
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
