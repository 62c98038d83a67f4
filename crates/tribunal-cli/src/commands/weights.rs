//! Weights command - persona accuracy table
//!
//! Usage:
//! ```bash
//! tribunal weights
//! tribunal weights --persona contrarian
//! tribunal recompute
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use tribunal_core::{EngineConfig, PersonaAccuracyRecord};
use tribunal_persist::AccuracyStore;

use super::open_store;
use crate::{print_info, print_success};

/// Arguments for the weights command
#[derive(Args)]
pub struct WeightsArgs {
    /// Only show this persona
    #[arg(long)]
    persona: Option<String>,
}

/// Run the weights command
pub async fn run(database: &str, args: WeightsArgs) -> Result<()> {
    let config = EngineConfig::from_env();
    let store = open_store(database).await?.with_weighting(config.weighting.clone());

    let records: Vec<PersonaAccuracyRecord> = match &args.persona {
        Some(name) => store.get_persona_record(name).await?.into_iter().collect(),
        None => store.list_persona_records().await?,
    };

    if records.is_empty() {
        match args.persona {
            Some(name) => print_info(&format!(
                "No history for '{}'; it votes at the cold-start weight {:.2}",
                name, config.weighting.cold_start_weight
            )),
            None => print_info("No persona history yet"),
        }
        return Ok(());
    }

    println!("{}", "Persona Weights".bold().cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Persona").fg(Color::Cyan),
            Cell::new("Debates").fg(Color::Cyan),
            Cell::new("Challenges won/lost").fg(Color::Cyan),
            Cell::new("Conceded").fg(Color::Cyan),
            Cell::new("Votes correct").fg(Color::Cyan),
            Cell::new("Accuracy").fg(Color::Cyan),
            Cell::new("Weight").fg(Color::Cyan),
            Cell::new("Mute risk").fg(Color::Cyan),
        ]);

    for record in &records {
        let weight = store
            .get_persona_weight(&record.persona, config.weighting.min_debates)
            .await?;
        let muted = store.should_mute_persona(&record.persona, &config.muting).await?;

        let weight_color = if record.debates_participated < config.weighting.min_debates {
            Color::DarkGrey
        } else if weight >= 0.5 {
            Color::Green
        } else {
            Color::Yellow
        };

        table.add_row(vec![
            Cell::new(&record.persona).fg(Color::Green),
            Cell::new(record.debates_participated),
            Cell::new(format!(
                "{}/{}",
                record.successful_challenges, record.failed_challenges
            )),
            Cell::new(record.concessions_made),
            Cell::new(format!("{}/{}", record.votes_correct, record.votes_total)),
            Cell::new(format!("{:.3}", record.accuracy_score)),
            Cell::new(format!("{:.3}", weight)).fg(weight_color),
            if muted {
                Cell::new("muted").fg(Color::Red)
            } else {
                Cell::new("-")
            },
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "{} below {} debates vote at the cold-start weight {:.2}",
        "Personas".dimmed(),
        config.weighting.min_debates,
        config.weighting.cold_start_weight
    );

    Ok(())
}

/// Run the recompute command
pub async fn recompute(database: &str) -> Result<()> {
    let store = open_store(database).await?;
    let updated = store.recompute_accuracy().await?;
    print_success(&format!("Recomputed accuracy for {} persona(s)", updated));
    Ok(())
}
