//! Mode command - preview the debate protocol
//!
//! Usage:
//! ```bash
//! tribunal mode 1d scalping
//! tribunal mode 3m growth --audit
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tribunal_core::{EngineConfig, Timeframe};
use tribunal_runtime::ModeSelector;

/// Arguments for the mode command
#[derive(Args)]
pub struct ModeArgs {
    /// Holding period (1d, 3d, 2w, 3m, 1y, intraday, swing)
    timeframe: String,

    /// Trading model (scalping, day_trading, growth, value, ...)
    model: String,

    /// Require turn-order auditability (sequential challenges)
    #[arg(long)]
    audit: bool,

    /// Output raw JSON
    #[arg(long)]
    json: bool,
}

/// Run the mode command
pub fn run(args: ModeArgs) -> Result<()> {
    let timeframe: Timeframe = args
        .timeframe
        .parse()
        .with_context(|| format!("Cannot parse timeframe '{}'", args.timeframe))?;
    let selector = ModeSelector::from_config(&EngineConfig::from_env());
    let plan = selector.select(&timeframe, &args.model, args.audit);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let flag = |on: bool| if on { "on".green() } else { "off".dimmed() };

    println!(
        "{} {} / {} ({} days)",
        "Protocol for".bold().cyan(),
        timeframe.label,
        args.model,
        timeframe.days
    );
    println!();
    println!("  {} {}", "Mode:".dimmed(), plan.mode.to_string().green().bold());
    println!("  {} {}", "Max rounds:".dimmed(), plan.max_rounds);
    println!("  {} {}", "Batched challenges:".dimmed(), flag(plan.batched));
    println!("  {} {}", "Muting:".dimmed(), flag(plan.muting_enabled));
    println!("  {} {}", "Voting:".dimmed(), flag(plan.voting_enabled));
    println!("  {} {}", "Convergence stop:".dimmed(), flag(plan.convergence_enabled));
    println!();
    println!("{}", "Roster:".bold());
    for persona in &plan.roster {
        println!("  {} {}", "•".cyan(), persona.green());
    }

    Ok(())
}
