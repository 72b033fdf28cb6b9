//! shadow: publish static sites addressed on-chain.
//!
//! # Usage
//!
//! ```text
//! shadow init <name> [--network devnet|mainnet] [--storage ipfs|arweave]
//! shadow deploy [--path DIR] [--network ..] [--storage ..] [--domain D] [--mint-token] [--json]
//! shadow convert [PATH] [--network ..] [--storage ..] [--no-mint] [--domain D]
//! shadow status [--path DIR] [--json] [--check-chain]
//! ```
//!
//! `-v` / `-vv` raise log output to info / debug; `RUST_LOG` is honoured
//! otherwise.

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{convert::ConvertArgs, deploy::DeployArgs, init::InitArgs, status::StatusArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "shadow",
    version,
    about = "Publish static sites to IPFS/Arweave with on-chain addresses",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new project directory with a site and program skeleton.
    Init(InitArgs),

    /// Upload the site, deploy the program, optionally mint and register a domain.
    Deploy(DeployArgs),

    /// Publish an existing static site without a program workspace.
    Convert(ConvertArgs),

    /// Show the recorded deployment state of a project.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Deploy(args) => args.run(),
        Commands::Convert(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
