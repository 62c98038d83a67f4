//! Debate commands - history, detail and outcome recording
//!
//! Usage:
//! ```bash
//! tribunal debates --limit 10
//! tribunal show 42
//! tribunal show 42 --json
//! tribunal outcome 42 STRONG_BUY --notes "gapped up on earnings"
//! ```

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use tracing::info;

use tribunal_core::{ChallengeOutcome, DebateId, Recommendation};
use tribunal_persist::AccuracyStore;

use super::open_store;
use crate::print_success;

/// Arguments for the debates command
#[derive(Args)]
pub struct DebatesArgs {
    /// Number of debates to show
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

/// Arguments for the show command
#[derive(Args)]
pub struct ShowArgs {
    /// Debate id
    id: DebateId,

    /// Output raw JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the outcome command
#[derive(Args)]
pub struct OutcomeArgs {
    /// Debate id
    id: DebateId,

    /// Realized outcome (STRONG_BUY, BUY, WATCH, HOLD, AVOID, SELL, STRONG_SELL)
    outcome: String,

    /// Free-form notes stored with the outcome
    #[arg(long)]
    notes: Option<String>,
}

fn verdict_color(verdict: Recommendation) -> Color {
    match verdict.preference() {
        p if p > 0.0 => Color::Green,
        p if p < 0.0 => Color::Red,
        _ => Color::Yellow,
    }
}

fn outcome_color(outcome: ChallengeOutcome) -> Color {
    match outcome {
        ChallengeOutcome::Conceded => Color::Green,
        ChallengeOutcome::WeaklyDefended => Color::Yellow,
        ChallengeOutcome::StronglyDefended => Color::Blue,
        ChallengeOutcome::Irrelevant => Color::DarkGrey,
    }
}

fn optional_verdict(verdict: Option<Recommendation>) -> Cell {
    match verdict {
        Some(v) => Cell::new(v).fg(verdict_color(v)),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}

/// Run the debates command
pub async fn list(database: &str, args: DebatesArgs) -> Result<()> {
    let store = open_store(database).await?;
    let debates = store.recent_debates(args.limit).await?;

    println!("{}", "Recent Debates".bold().cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Id").fg(Color::Cyan),
            Cell::new("Date").fg(Color::Cyan),
            Cell::new("Ticker").fg(Color::Cyan),
            Cell::new("Timeframe").fg(Color::Cyan),
            Cell::new("Mode").fg(Color::Cyan),
            Cell::new("Verdict").fg(Color::Cyan),
            Cell::new("Conviction").fg(Color::Cyan),
            Cell::new("Rounds").fg(Color::Cyan),
            Cell::new("Outcome").fg(Color::Cyan),
        ]);

    for debate in &debates {
        table.add_row(vec![
            Cell::new(debate.id),
            Cell::new(debate.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(&debate.ticker).fg(Color::Green),
            Cell::new(&debate.timeframe),
            Cell::new(debate.mode),
            optional_verdict(debate.verdict),
            Cell::new(
                debate
                    .conviction
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(debate.rounds_completed),
            optional_verdict(debate.actual_outcome),
        ]);
    }

    println!("{table}");
    println!();
    println!("Show one debate: {}", "tribunal show <id>".green());

    Ok(())
}

/// Run the show command
pub async fn show(database: &str, args: ShowArgs) -> Result<()> {
    let store = open_store(database).await?;
    let debate = store
        .get_debate(args.id)
        .await
        .with_context(|| format!("Cannot load debate {}", args.id))?;
    let challenges = store.debate_challenges(args.id).await?;
    let votes = store.debate_votes(args.id).await?;

    if args.json {
        let value = serde_json::json!({
            "debate": debate,
            "challenges": challenges,
            "votes": votes,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} #{} {} ({}, {}, {})",
        "Debate".bold().cyan(),
        debate.id,
        debate.ticker.green().bold(),
        debate.timeframe,
        debate.model,
        debate.mode
    );
    println!();
    println!("  {} {}", "Personas:".dimmed(), debate.personas.join(", "));
    match (debate.verdict, debate.conviction) {
        (Some(verdict), Some(conviction)) => println!(
            "  {} {} ({} conviction, confidence {:.2}, {} rounds)",
            "Verdict:".dimmed(),
            verdict.to_string().bold(),
            conviction,
            debate.final_confidence.unwrap_or(0.0),
            debate.rounds_completed
        ),
        _ => println!("  {} {}", "Verdict:".dimmed(), "not finalized".yellow()),
    }
    println!(
        "  {} {} total, {} successful, {} conceded",
        "Challenges:".dimmed(),
        debate.total_challenges,
        debate.successful_challenges,
        debate.concessions
    );
    if let Some(actual) = debate.actual_outcome {
        println!("  {} {}", "Outcome:".dimmed(), actual.to_string().bold());
    }
    if let Some(notes) = &debate.notes {
        println!("  {} {}", "Notes:".dimmed(), notes);
    }
    println!();

    if !challenges.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Round").fg(Color::Cyan),
                Cell::new("Challenger").fg(Color::Cyan),
                Cell::new("Target").fg(Color::Cyan),
                Cell::new("Outcome").fg(Color::Cyan),
                Cell::new("Quality").fg(Color::Cyan),
                Cell::new("Challenge").fg(Color::Cyan),
            ]);
        for challenge in &challenges {
            table.add_row(vec![
                Cell::new(challenge.round),
                Cell::new(&challenge.challenger).fg(Color::Green),
                Cell::new(&challenge.target),
                Cell::new(challenge.outcome).fg(outcome_color(challenge.outcome)),
                Cell::new(format!("{:+.2}", challenge.quality_score)),
                Cell::new(&challenge.challenge_summary),
            ]);
        }
        println!("{table}");
        println!();
    }

    if !votes.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Persona").fg(Color::Cyan),
                Cell::new("Vote").fg(Color::Cyan),
                Cell::new("Weight").fg(Color::Cyan),
                Cell::new("Correct").fg(Color::Cyan),
            ]);
        for vote in &votes {
            let correct = match vote.was_correct {
                Some(true) => Cell::new("yes").fg(Color::Green),
                Some(false) => Cell::new("no").fg(Color::Red),
                None => Cell::new("pending").fg(Color::DarkGrey),
            };
            table.add_row(vec![
                Cell::new(&vote.persona),
                Cell::new(&vote.vote),
                Cell::new(format!("{:.3}", vote.weight)),
                correct,
            ]);
        }
        println!("{table}");
    }

    Ok(())
}

/// Run the outcome command
pub async fn outcome(database: &str, args: OutcomeArgs) -> Result<()> {
    let actual: Recommendation = args
        .outcome
        .parse()
        .with_context(|| format!("'{}' is not a recommendation", args.outcome))?;

    let store = open_store(database).await?;
    let scored = store
        .record_outcome(args.id, actual, args.notes.as_deref())
        .await
        .with_context(|| format!("Cannot record outcome for debate {}", args.id))?;
    info!(debate_id = args.id, outcome = %actual, scored, "Outcome recorded");

    print_success(&format!(
        "Recorded {} for debate {} ({} vote(s) scored)",
        actual.to_string().bold(),
        args.id,
        scored
    ));
    Ok(())
}
