use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use golfvalue_terminal::analysis;
use golfvalue_terminal::export;
use golfvalue_terminal::ingest::{self, BookmakerSourceConfig};
use golfvalue_terminal::mappings;
use golfvalue_terminal::predictions_fetch::{self, PredictionsFetchConfig};
use golfvalue_terminal::rankings;

// Headless one-shot run over the same environment configuration the
// terminal uses. An optional argument names an xlsx file to export to.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let sources = BookmakerSourceConfig::from_env();
    if sources.is_empty() {
        return Err(anyhow!(
            "no bookmaker sources configured; set BOOKMAKER1_FILE (and friends)"
        ));
    }

    let mut entries = Vec::new();
    for cfg in &sources {
        let rows = ingest::load_bookmaker_csv(cfg)?;
        println!("{}: {} rows", cfg.name, rows.len());
        entries.extend(rows);
    }

    let fetch_cfg = PredictionsFetchConfig::from_env();
    let predictions =
        predictions_fetch::fetch_predictions(&fetch_cfg).context("predictions load failed")?;
    println!(
        "Predictions: {} ({} players)",
        predictions.event_name,
        predictions.entries.len()
    );

    let saved_mappings = match mappings::resolve_db_path() {
        Some(path) => {
            let conn = mappings::open_db(&path)?;
            mappings::load_mappings(&conn)?
        }
        None => Default::default(),
    };

    let report = analysis::run_analysis(&entries, &predictions, &saved_mappings);

    if !report.unresolved.is_empty() {
        println!();
        println!(
            "{} player(s) could not be matched automatically:",
            report.unresolved.len()
        );
        for name in &report.unresolved {
            println!("  {name}");
        }
    }

    if report.is_empty_join() {
        println!();
        println!("No matching players found");
        return Ok(());
    }

    println!();
    println!("Each Way Value Analysis");
    println!(
        "{:<28} {:<16} {:>9} {:>11}",
        "Player", "Bookmaker", "Odds", "EW Value %"
    );
    let labels = rankings::occurrence_labels(&report.each_way);
    for (record, label) in report.each_way.iter().zip(&labels) {
        println!(
            "{:<28} {:<16} {:>9.2} {:>+11.2}",
            label, record.bookmaker, record.bookmaker_odds, record.each_way_value_percent
        );
    }

    for (title, edges) in [
        ("Win Market Analysis", &report.win),
        ("Positional Market Analysis", &report.positional),
    ] {
        println!();
        println!("{title}");
        println!(
            "{:<28} {:<16} {:>9} {:>10} {:>9}",
            "Player", "Bookmaker", "Book", "Model", "Edge %"
        );
        for edge in edges.iter() {
            println!(
                "{:<28} {:<16} {:>9.2} {:>10.2} {:>+9.2}",
                edge.player, edge.bookmaker, edge.bookmaker_odds, edge.model_odds, edge.edge_percent
            );
        }
    }

    if let Some(path) = std::env::args().nth(1).map(PathBuf::from) {
        let summary = export::export_analysis(&path, &report)?;
        println!();
        println!("Exported {} rows to {}", summary.rows, summary.path.display());
    }

    Ok(())
}
