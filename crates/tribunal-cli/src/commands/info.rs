//! Info command - Show version and configuration
//!
//! Usage:
//! ```bash
//! tribunal info
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use tribunal_core::EngineConfig;

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs;

/// Run the info command
pub fn run(database: &str, _args: InfoArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let config = EngineConfig::from_env();

    println!("{}", "Tribunal - persona debate adjudication".bold().cyan());
    println!("{}", "═".repeat(50).cyan());
    println!();

    println!("{}", "Version:".bold());
    println!("  {} {}", "CLI Version:".dimmed(), version.green());
    println!("  {} {}", "Database:".dimmed(), database);
    println!();

    println!("{}", "Convergence:".bold());
    println!("  {} {:.2}", "Threshold:".dimmed(), config.convergence.threshold);
    println!(
        "  {} {} to {}",
        "Rounds:".dimmed(),
        config.convergence.min_rounds,
        config.convergence.max_rounds
    );
    println!("  {} {:.2}", "Stagnation delta:".dimmed(), config.convergence.stagnation_delta);
    println!();

    println!("{}", "Weighting:".bold());
    println!("  {} {}", "Min debates:".dimmed(), config.weighting.min_debates);
    println!(
        "  {} {:.2} (range {:.2} to {:.2})",
        "Cold-start weight:".dimmed(),
        config.weighting.cold_start_weight,
        config.weighting.floor,
        config.weighting.ceiling
    );
    println!(
        "  {} below {:.2} after {} challenges",
        "Muting:".dimmed(),
        config.muting.mute_threshold,
        config.muting.min_challenges
    );
    println!();

    println!("{}", "Modes:".bold());
    println!(
        "  {} up to {} days with {}",
        "Fast:".dimmed(),
        config.modes.fast_max_days,
        config.modes.scalping_models.join(", ")
    );
    println!("  {} {}", "Fast roster:".dimmed(), config.modes.fast_roster.join(", "));
    println!("  {} {}", "Full roster:".dimmed(), config.modes.full_roster.join(", "));
    println!();

    println!("{}", "Configuration:".bold());
    println!("  {} Override with TRIBUNAL_* environment variables", "ℹ".blue());
    println!();

    Ok(())
}
