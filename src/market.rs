//! Win and positional market edges for reconciled bookmaker rows.

use std::collections::HashMap;

use crate::ingest::{BookmakerEntry, PredictionEntry, PredictionSet};
use crate::odds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketKind {
    Win,
    Positional,
}

impl MarketKind {
    pub fn label(self) -> &'static str {
        match self {
            MarketKind::Win => "Win",
            MarketKind::Positional => "Positional",
        }
    }
}

/// A bookmaker row joined with its matched prediction row.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub canonical: String,
    pub entry: BookmakerEntry,
    pub prediction: PredictionEntry,
}

/// One computed edge, for either market.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub player: String,
    pub bookmaker: String,
    pub bookmaker_odds: f64,
    pub model_odds: f64,
    pub edge_percent: f64,
    pub market: MarketKind,
}

/// Inner join of resolved bookmaker rows with prediction rows, keyed on the
/// canonical name. Rows without a prediction are dropped; input order is
/// preserved.
pub fn join_entries(
    resolved: &[(BookmakerEntry, String)],
    predictions: &PredictionSet,
) -> Vec<JoinedRow> {
    let by_name: HashMap<&str, &PredictionEntry> = predictions
        .entries
        .iter()
        .map(|p| (p.player_name.as_str(), p))
        .collect();

    resolved
        .iter()
        .filter_map(|(entry, canonical)| {
            let prediction = by_name.get(canonical.as_str())?;
            Some(JoinedRow {
                canonical: canonical.clone(),
                entry: entry.clone(),
                prediction: (*prediction).clone(),
            })
        })
        .collect()
}

fn edge_percent(bookmaker_odds: f64, model_odds: f64) -> f64 {
    (bookmaker_odds / model_odds - 1.0) * 100.0
}

/// Win-market edges. Rows where either side fails to convert are dropped
/// silently, per the ingestion contract.
pub fn compute_win_market(joined: &[JoinedRow]) -> Vec<EdgeRecord> {
    joined
        .iter()
        .filter_map(|row| {
            let bookmaker_odds = row.entry.odds.decimal?;
            // A non-positive model quote would blow up the ratio.
            let model_odds = row.prediction.win_odds.filter(|v| *v > 0.0)?;
            Some(EdgeRecord {
                player: row.canonical.clone(),
                bookmaker: row.entry.bookmaker.clone(),
                bookmaker_odds,
                model_odds,
                edge_percent: edge_percent(bookmaker_odds, model_odds),
                market: MarketKind::Win,
            })
        })
        .collect()
}

/// Positional-market edges. The bookmaker side is the each-way place quote
/// derived from the win quote under the row's own place term; the model
/// side is the top-N odds matching the row's own place count, so sources
/// with different place counts each compare against the right threshold.
pub fn compute_positional_market(joined: &[JoinedRow]) -> Vec<EdgeRecord> {
    joined
        .iter()
        .filter_map(|row| {
            let win_decimal = row.entry.odds.decimal?;
            let bookmaker_odds = odds::place_decimal(win_decimal, row.entry.place_term);
            let model_odds = row
                .prediction
                .top_n_odds
                .get(&row.entry.place_count)
                .copied()
                .filter(|v| *v > 0.0)?;
            Some(EdgeRecord {
                player: row.canonical.clone(),
                bookmaker: row.entry.bookmaker.clone(),
                bookmaker_odds,
                model_odds,
                edge_percent: edge_percent(bookmaker_odds, model_odds),
                market: MarketKind::Positional,
            })
        })
        .collect()
}
