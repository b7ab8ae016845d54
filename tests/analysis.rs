use std::collections::HashMap;

use golfvalue_terminal::analysis::run_analysis;
use golfvalue_terminal::ingest::{BookmakerEntry, PredictionEntry, PredictionSet};
use golfvalue_terminal::odds::{OddsQuote, PlaceTerm};
use golfvalue_terminal::sample;

fn entry(name: &str, quote: &str, bookmaker: &str, places: u32, term: PlaceTerm) -> BookmakerEntry {
    BookmakerEntry {
        player_name_raw: name.to_string(),
        odds: OddsQuote::new(quote.to_string()),
        bookmaker: bookmaker.to_string(),
        place_count: places,
        place_term: term,
    }
}

fn prediction(name: &str, win: f64, top_n: &[(u32, f64)]) -> PredictionEntry {
    PredictionEntry {
        player_name: name.to_string(),
        win_odds: Some(win),
        top_n_odds: top_n.iter().copied().collect(),
    }
}

fn prediction_set(entries: Vec<PredictionEntry>) -> PredictionSet {
    PredictionSet {
        event_name: "Test Event".to_string(),
        event_country: None,
        entries,
        fetched_at: None,
    }
}

#[test]
fn end_to_end_two_player_scenario() {
    let entries = vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Rory McIlroy", "7/1", "Alpha", 5, PlaceTerm::Fifth),
    ];
    let predictions = prediction_set(vec![
        prediction("Tiger Woods", 9.0, &[(5, 2.0)]),
        prediction("Rory McIlroy", 8.5, &[(5, 1.9)]),
    ]);

    let report = run_analysis(&entries, &predictions, &HashMap::new());

    assert!(report.unresolved.is_empty());
    assert_eq!(report.matched, 2);
    assert_eq!(report.each_way.len(), 2);

    // Tiger: win (11/9 - 1) = +22.22%, place 1 + 10/5 = 3.0 vs 2.0 = +50%.
    let tiger = &report.each_way[0];
    assert_eq!(tiger.player, "Tiger Woods");
    assert_eq!(tiger.bookmaker_odds, 11.0);
    let tiger_expected = ((11.0 / 9.0 - 1.0) * 100.0 + (3.0 / 2.0 - 1.0) * 100.0) / 2.0;
    assert!((tiger.each_way_value_percent - tiger_expected).abs() < 1e-9);

    // Rory: win edge is negative, the place leg carries the value.
    let rory = &report.each_way[1];
    assert_eq!(rory.player, "Rory McIlroy");
    let rory_expected = ((8.0 / 8.5 - 1.0) * 100.0 + (2.4 / 1.9 - 1.0) * 100.0) / 2.0;
    assert!((rory.each_way_value_percent - rory_expected).abs() < 1e-9);

    // Ranked descending by each-way value, both positive.
    assert!(tiger.each_way_value_percent > rory.each_way_value_percent);
    assert!(rory.each_way_value_percent > 0.0);
}

#[test]
fn misspelled_name_resolves_through_fuzzy_matching() {
    let entries = vec![entry(
        "Rory Mcllroy",
        "7/1",
        "Alpha",
        5,
        PlaceTerm::Fifth,
    )];
    let predictions = prediction_set(vec![prediction("Rory McIlroy", 8.5, &[(5, 1.9)])]);

    let report = run_analysis(&entries, &predictions, &HashMap::new());
    assert!(report.unresolved.is_empty());
    assert_eq!(report.matched, 1);
    assert_eq!(report.win[0].player, "Rory McIlroy");
}

#[test]
fn unknown_names_are_reported_once_and_do_not_stop_the_run() {
    let entries = vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Mystery Player", "66/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Mystery Player", "50/1", "Beta", 5, PlaceTerm::Fifth),
    ];
    let predictions = prediction_set(vec![prediction("Tiger Woods", 9.0, &[(5, 2.0)])]);

    let report = run_analysis(&entries, &predictions, &HashMap::new());
    assert_eq!(report.unresolved, vec!["Mystery Player".to_string()]);
    assert_eq!(report.matched, 1);
    assert_eq!(report.each_way.len(), 1);
}

#[test]
fn saved_mapping_feeds_the_join() {
    let entries = vec![entry("T.W. (USA)", "10/1", "Alpha", 5, PlaceTerm::Fifth)];
    let predictions = prediction_set(vec![prediction("Tiger Woods", 9.0, &[(5, 2.0)])]);

    let mut mappings = HashMap::new();
    mappings.insert("T.W. (USA)".to_string(), "Tiger Woods".to_string());

    let report = run_analysis(&entries, &predictions, &mappings);
    assert!(report.unresolved.is_empty());
    assert_eq!(report.each_way.len(), 1);
    assert_eq!(report.each_way[0].player, "Tiger Woods");
}

#[test]
fn disjoint_tables_are_an_empty_join_not_an_error() {
    let entries = vec![entry("Nobody Q. Parker", "10/1", "Alpha", 5, PlaceTerm::Fifth)];
    let predictions = prediction_set(vec![prediction("Tiger Woods", 9.0, &[(5, 2.0)])]);

    let report = run_analysis(&entries, &predictions, &HashMap::new());
    assert!(report.is_empty_join());
    assert!(report.each_way.is_empty());
    assert_eq!(report.unresolved.len(), 1);
}

#[test]
fn demo_data_produces_a_full_report() {
    let entries = sample::demo_entries();
    let predictions = sample::demo_predictions();

    let report = run_analysis(&entries, &predictions, &HashMap::new());
    assert!(report.matched > 0);
    assert!(!report.each_way.is_empty());
    // The demo deliberately carries one name the model does not know.
    assert_eq!(report.unresolved, vec!["Jordan Smith".to_string()]);
}
