//! Tribunal CLI - inspect persona accuracy and debate history
//!
//! # Usage
//!
//! ```bash
//! # Persona weights, most accurate first
//! tribunal weights
//!
//! # Recent debates and one debate in full
//! tribunal debates --limit 5
//! tribunal show 42
//!
//! # Record what the market actually did
//! tribunal outcome 42 BUY --notes "beat on guidance"
//!
//! # Preview the protocol for a trade
//! tribunal mode 1d scalping
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::{debates, info, mode, weights};

/// Tribunal - weighted multi-persona debate adjudication
#[derive(Parser)]
#[command(
    name = "tribunal",
    version,
    about = "Tribunal CLI - persona accuracy and debate history",
    long_about = "Tribunal adjudicates trading debates between analyst personas.\n\n\
                  Each persona's vote is weighted by its historical accuracy,\n\
                  which this tool lets you inspect and update."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// SQLite database URL
    #[arg(
        long,
        global = true,
        env = "TRIBUNAL_DATABASE_URL",
        default_value = "sqlite:tribunal.db?mode=rwc"
    )]
    database: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show persona accuracy and vote weights
    #[command(name = "weights")]
    Weights(weights::WeightsArgs),

    /// List recent debates
    #[command(name = "debates")]
    Debates(debates::DebatesArgs),

    /// Show one debate with its challenges and votes
    #[command(name = "show")]
    Show(debates::ShowArgs),

    /// Record the realized outcome of a debate
    #[command(name = "outcome")]
    Outcome(debates::OutcomeArgs),

    /// Preview the debate protocol for a timeframe and model
    #[command(name = "mode")]
    Mode(mode::ModeArgs),

    /// Recompute every persona's accuracy score
    #[command(name = "recompute")]
    Recompute,

    /// Show version and configuration
    #[command(name = "info")]
    Info(info::InfoArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Weights(args) => weights::run(&cli.database, args).await,
        Commands::Debates(args) => debates::list(&cli.database, args).await,
        Commands::Show(args) => debates::show(&cli.database, args).await,
        Commands::Outcome(args) => debates::outcome(&cli.database, args).await,
        Commands::Mode(args) => mode::run(args),
        Commands::Recompute => weights::recompute(&cli.database).await,
        Commands::Info(args) => info::run(&cli.database, args),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// Print a success message with a checkmark
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an info message
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}
