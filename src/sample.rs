//! Built-in demo data so the terminal renders without configured sources.
//!
//! Quotes get a small jitter per load; one spelling is deliberately off and
//! one player is absent from the model so the matching flow has something
//! to show.

use std::collections::HashMap;

use rand::Rng;

use crate::ingest::{BookmakerEntry, PredictionEntry, PredictionSet};
use crate::odds::{OddsQuote, PlaceTerm};

const FIELD: &[(&str, f64, f64, f64)] = &[
    // (player, win odds, top-5 odds, top-8 odds)
    ("Scottie Scheffler", 5.4, 1.7, 1.4),
    ("Rory McIlroy", 9.0, 2.2, 1.7),
    ("Xander Schauffele", 13.0, 2.8, 2.0),
    ("Ludvig Aberg", 16.0, 3.2, 2.3),
    ("Collin Morikawa", 19.0, 3.6, 2.5),
    ("Viktor Hovland", 23.0, 4.1, 2.8),
    ("Tommy Fleetwood", 27.0, 4.6, 3.0),
    ("Shane Lowry", 34.0, 5.4, 3.4),
    ("Justin Thomas", 34.0, 5.4, 3.4),
    ("Tyrrell Hatton", 41.0, 6.2, 3.8),
    ("Sepp Straka", 51.0, 7.4, 4.4),
    ("Corey Conners", 67.0, 9.2, 5.2),
];

const BOOK_ALPHA_QUOTES: &[(&str, &str)] = &[
    ("Scottie Scheffler", "9/2"),
    ("Rory Mcllroy", "8/1"), // common bookmaker misspelling
    ("Xander Schauffele", "12/1"),
    ("Ludvig Aberg", "16/1"),
    ("Collin Morikawa", "20/1"),
    ("Viktor Hovland", "22/1"),
    ("Tommy Fleetwood", "28/1"),
    ("Shane Lowry", "33/1"),
    ("Justin Thomas", "33/1"),
    ("Tyrrell Hatton", "40/1"),
    ("Sepp Straka", "50/1"),
    ("Jordan Smith", "80/1"), // not in the model field
];

pub fn demo_predictions() -> PredictionSet {
    let entries = FIELD
        .iter()
        .map(|(name, win, top5, top8)| {
            let mut top_n_odds = HashMap::new();
            top_n_odds.insert(5, *top5);
            top_n_odds.insert(8, *top8);
            PredictionEntry {
                player_name: name.to_string(),
                win_odds: Some(*win),
                top_n_odds,
            }
        })
        .collect();

    PredictionSet {
        event_name: "Demo Open".to_string(),
        event_country: Some("USA".to_string()),
        entries,
        fetched_at: None,
    }
}

pub fn demo_entries() -> Vec<BookmakerEntry> {
    let mut rng = rand::thread_rng();
    let mut entries = Vec::new();

    for (name, quote) in BOOK_ALPHA_QUOTES {
        entries.push(BookmakerEntry {
            player_name_raw: name.to_string(),
            odds: OddsQuote::new(quote.to_string()),
            bookmaker: "Alpha Book".to_string(),
            place_count: 5,
            place_term: PlaceTerm::Quarter,
        });
    }

    // A second source quoting in decimals, derived from the field with a
    // little noise so the two books disagree.
    for (name, win, _, _) in FIELD {
        let jitter: f64 = rng.gen_range(0.92..1.10);
        let decimal = 1.0 + (win - 1.0) * jitter;
        entries.push(BookmakerEntry {
            player_name_raw: name.to_string(),
            odds: OddsQuote::new(format!("{decimal:.1}")),
            bookmaker: "Beta Book".to_string(),
            place_count: 8,
            place_term: PlaceTerm::Fifth,
        });
    }

    entries
}
