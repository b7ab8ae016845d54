use std::collections::HashMap;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use golfvalue_terminal::analysis::run_analysis;
use golfvalue_terminal::ingest::{BookmakerEntry, PredictionEntry, PredictionSet};
use golfvalue_terminal::odds::{OddsQuote, PlaceTerm};
use golfvalue_terminal::reconcile::similarity;

const FIRST_NAMES: &[&str] = &[
    "Scottie", "Rory", "Xander", "Ludvig", "Collin", "Viktor", "Tommy", "Shane", "Justin",
    "Tyrrell", "Sepp", "Corey", "Wyndham", "Patrick", "Brian", "Russell", "Sahith", "Akshay",
    "Cameron", "Adam",
];
const LAST_NAMES: &[&str] = &[
    "Scheffler", "McIlroy", "Schauffele", "Aberg", "Morikawa", "Hovland", "Fleetwood", "Lowry",
    "Thomas", "Hatton",
];

fn field(size: usize) -> Vec<String> {
    (0..size)
        .map(|i| {
            format!(
                "{} {}",
                FIRST_NAMES[i % FIRST_NAMES.len()],
                LAST_NAMES[(i / FIRST_NAMES.len()) % LAST_NAMES.len()]
            )
        })
        .collect()
}

fn prediction_set(names: &[String]) -> PredictionSet {
    let entries = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let win = 5.0 + i as f64 * 0.8;
            let mut top_n_odds = HashMap::new();
            top_n_odds.insert(5, 1.0 + win / 5.0);
            top_n_odds.insert(8, 1.0 + win / 8.0);
            PredictionEntry {
                player_name: name.clone(),
                win_odds: Some(win),
                top_n_odds,
            }
        })
        .collect();
    PredictionSet {
        event_name: "Bench Open".to_string(),
        event_country: None,
        entries,
        fetched_at: None,
    }
}

fn bookmaker_entries(names: &[String]) -> Vec<BookmakerEntry> {
    let mut entries = Vec::new();
    for (i, name) in names.iter().enumerate() {
        // Half the rows drop the last character to exercise fuzzy matching.
        let raw = if i % 2 == 0 {
            name.clone()
        } else {
            name[..name.len() - 1].to_string()
        };
        entries.push(BookmakerEntry {
            player_name_raw: raw,
            odds: OddsQuote::new(format!("{}/1", 4 + i)),
            bookmaker: "Alpha".to_string(),
            place_count: 5,
            place_term: PlaceTerm::Quarter,
        });
        entries.push(BookmakerEntry {
            player_name_raw: name.clone(),
            odds: OddsQuote::new(format!("{:.1}", 5.5 + i as f64)),
            bookmaker: "Beta".to_string(),
            place_count: 8,
            place_term: PlaceTerm::Fifth,
        });
    }
    entries
}

fn bench_similarity(c: &mut Criterion) {
    c.bench_function("similarity", |b| {
        b.iter(|| {
            black_box(similarity(
                black_box("Scottie Scheffler"),
                black_box("Scheffler, Scottie"),
            ))
        })
    });
}

fn bench_full_analysis(c: &mut Criterion) {
    let names = field(150);
    let predictions = prediction_set(&names);
    let entries = bookmaker_entries(&names);
    let mappings = HashMap::new();

    c.bench_function("run_analysis_150_players_2_books", |b| {
        b.iter(|| {
            let report = run_analysis(black_box(&entries), black_box(&predictions), &mappings);
            black_box(report.each_way.len());
        })
    });
}

criterion_group!(benches, bench_similarity, bench_full_analysis);
criterion_main!(benches);
