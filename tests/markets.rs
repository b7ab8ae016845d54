use golfvalue_terminal::ingest::{BookmakerEntry, PredictionEntry, PredictionSet};
use golfvalue_terminal::market::{
    MarketKind, compute_positional_market, compute_win_market, join_entries,
};
use golfvalue_terminal::odds::{OddsQuote, PlaceTerm};
use golfvalue_terminal::rankings::{merge_each_way, occurrence_labels};

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

fn resolved(entries: Vec<BookmakerEntry>) -> Vec<(BookmakerEntry, String)> {
    entries
        .into_iter()
        .map(|e| {
            let name = e.player_name_raw.clone();
            (e, name)
        })
        .collect()
}

#[test]
fn win_edge_direction_is_bookmaker_over_model() {
    let predictions = prediction_set(vec![prediction("Tiger Woods", 10.0, &[])]);
    let rows = resolved(vec![entry(
        "Tiger Woods",
        "12.0",
        "Alpha",
        5,
        PlaceTerm::Fifth,
    )]);
    let joined = join_entries(&rows, &predictions);
    let win = compute_win_market(&joined);

    assert_eq!(win.len(), 1);
    assert_eq!(win[0].market, MarketKind::Win);
    assert_eq!(win[0].bookmaker_odds, 12.0);
    assert_eq!(win[0].model_odds, 10.0);
    assert!((win[0].edge_percent - 20.0).abs() < 1e-9);
}

#[test]
fn unparseable_bookmaker_quote_drops_the_row() {
    let predictions = prediction_set(vec![
        prediction("Tiger Woods", 9.0, &[(5, 2.0)]),
        prediction("Rory McIlroy", 8.5, &[(5, 1.9)]),
    ]);
    let rows = resolved(vec![
        entry("Tiger Woods", "no price", "Alpha", 5, PlaceTerm::Fifth),
        entry("Rory McIlroy", "7/1", "Alpha", 5, PlaceTerm::Fifth),
    ]);
    let joined = join_entries(&rows, &predictions);

    let win = compute_win_market(&joined);
    assert_eq!(win.len(), 1);
    assert_eq!(win[0].player, "Rory McIlroy");

    let positional = compute_positional_market(&joined);
    assert_eq!(positional.len(), 1);
    assert_eq!(positional[0].player, "Rory McIlroy");
}

#[test]
fn positional_market_uses_each_rows_own_place_terms() {
    let predictions = prediction_set(vec![prediction(
        "Tiger Woods",
        9.0,
        &[(5, 2.0), (8, 1.5)],
    )]);
    let rows = resolved(vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Quarter),
        entry("Tiger Woods", "10/1", "Beta", 8, PlaceTerm::Fifth),
    ]);
    let joined = join_entries(&rows, &predictions);
    let positional = compute_positional_market(&joined);

    assert_eq!(positional.len(), 2);
    // Alpha: 1 + 10/4 = 3.5 against top-5 odds of 2.0.
    assert_eq!(positional[0].bookmaker, "Alpha");
    assert!((positional[0].bookmaker_odds - 3.5).abs() < 1e-9);
    assert_eq!(positional[0].model_odds, 2.0);
    // Beta: 1 + 10/5 = 3.0 against top-8 odds of 1.5.
    assert_eq!(positional[1].bookmaker, "Beta");
    assert!((positional[1].bookmaker_odds - 3.0).abs() < 1e-9);
    assert_eq!(positional[1].model_odds, 1.5);
}

#[test]
fn missing_top_n_column_drops_only_the_positional_row() {
    let predictions = prediction_set(vec![prediction("Tiger Woods", 9.0, &[(5, 2.0)])]);
    // Six places paid, but the model publishes no top_6 odds.
    let rows = resolved(vec![entry(
        "Tiger Woods",
        "10/1",
        "Alpha",
        6,
        PlaceTerm::Fifth,
    )]);
    let joined = join_entries(&rows, &predictions);

    assert_eq!(compute_win_market(&joined).len(), 1);
    assert!(compute_positional_market(&joined).is_empty());

    // And without a positional edge the pair is excluded from the merge.
    let merged = merge_each_way(
        &compute_win_market(&joined),
        &compute_positional_market(&joined),
    );
    assert!(merged.is_empty());
}

#[test]
fn each_way_value_is_the_exact_mean_of_both_edges() {
    let predictions = prediction_set(vec![
        prediction("Tiger Woods", 9.0, &[(5, 2.0)]),
        prediction("Rory McIlroy", 8.5, &[(5, 1.9)]),
        prediction("Shane Lowry", 34.0, &[(5, 5.4)]),
    ]);
    let rows = resolved(vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Rory McIlroy", "7/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Shane Lowry", "40/1", "Beta", 5, PlaceTerm::Quarter),
    ]);
    let joined = join_entries(&rows, &predictions);
    let win = compute_win_market(&joined);
    let positional = compute_positional_market(&joined);
    let merged = merge_each_way(&win, &positional);

    assert_eq!(merged.len(), 3);
    for record in &merged {
        let key = (record.player.as_str(), record.bookmaker.as_str());
        let w = win
            .iter()
            .find(|e| (e.player.as_str(), e.bookmaker.as_str()) == key)
            .expect("win edge should exist");
        let p = positional
            .iter()
            .find(|e| (e.player.as_str(), e.bookmaker.as_str()) == key)
            .expect("positional edge should exist");
        let mean = (w.edge_percent + p.edge_percent) / 2.0;
        assert!((record.each_way_value_percent - mean).abs() < 1e-12);
        assert_eq!(record.bookmaker_odds, w.bookmaker_odds);
    }

    // Ranked descending.
    for pair in merged.windows(2) {
        assert!(pair[0].each_way_value_percent >= pair[1].each_way_value_percent);
    }
}

#[test]
fn pair_missing_from_one_market_is_excluded() {
    let predictions = prediction_set(vec![
        prediction("Tiger Woods", 9.0, &[(5, 2.0)]),
        prediction("Rory McIlroy", 8.5, &[]),
    ]);
    let rows = resolved(vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Rory McIlroy", "7/1", "Alpha", 5, PlaceTerm::Fifth),
    ]);
    let joined = join_entries(&rows, &predictions);
    let merged = merge_each_way(
        &compute_win_market(&joined),
        &compute_positional_market(&joined),
    );

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].player, "Tiger Woods");
}

#[test]
fn repeated_players_get_occurrence_labels() {
    let predictions = prediction_set(vec![prediction("Tiger Woods", 9.0, &[(5, 2.0)])]);
    let rows = resolved(vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Tiger Woods", "12/1", "Beta", 5, PlaceTerm::Fifth),
    ]);
    let joined = join_entries(&rows, &predictions);
    let merged = merge_each_way(
        &compute_win_market(&joined),
        &compute_positional_market(&joined),
    );
    let labels = occurrence_labels(&merged);

    assert_eq!(labels.len(), 2);
    assert_eq!(labels[0], "Tiger Woods");
    assert_eq!(labels[1], "Tiger Woods (2)");
    // Cosmetic only: the records keep the plain canonical name.
    assert!(merged.iter().all(|r| r.player == "Tiger Woods"));
}

#[test]
fn join_drops_rows_without_a_prediction() {
    let predictions = prediction_set(vec![prediction("Tiger Woods", 9.0, &[])]);
    let rows = resolved(vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Jordan Smith", "80/1", "Alpha", 5, PlaceTerm::Fifth),
    ]);
    let joined = join_entries(&rows, &predictions);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].canonical, "Tiger Woods");
}

#[test]
fn model_win_odds_absent_drops_the_win_row() {
    let mut p = prediction("Tiger Woods", 9.0, &[(5, 2.0)]);
    p.win_odds = None;
    let predictions = prediction_set(vec![p]);
    let rows = resolved(vec![entry(
        "Tiger Woods",
        "10/1",
        "Alpha",
        5,
        PlaceTerm::Fifth,
    )]);
    let joined = join_entries(&rows, &predictions);

    assert!(compute_win_market(&joined).is_empty());
    assert_eq!(compute_positional_market(&joined).len(), 1);
}

#[test]
fn occurrence_labels_ignore_distinct_players() {
    let predictions = prediction_set(vec![
        prediction("Tiger Woods", 9.0, &[(5, 2.0)]),
        prediction("Rory McIlroy", 8.5, &[(5, 1.9)]),
    ]);
    let rows = resolved(vec![
        entry("Tiger Woods", "10/1", "Alpha", 5, PlaceTerm::Fifth),
        entry("Rory McIlroy", "7/1", "Alpha", 5, PlaceTerm::Fifth),
    ]);
    let joined = join_entries(&rows, &predictions);
    let merged = merge_each_way(
        &compute_win_market(&joined),
        &compute_positional_market(&joined),
    );
    let labels = occurrence_labels(&merged);
    assert!(labels.iter().all(|l| !l.ends_with(')')));
}
