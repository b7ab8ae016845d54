//! One full analysis pass: reconcile, join, both markets, each-way merge.

use std::collections::HashMap;

use crate::ingest::{BookmakerEntry, PredictionSet};
use crate::market::{self, EdgeRecord};
use crate::rankings::{self, EachWayRecord};
use crate::reconcile;

/// Everything one run produces for the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub each_way: Vec<EachWayRecord>,
    pub win: Vec<EdgeRecord>,
    pub positional: Vec<EdgeRecord>,
    /// Raw names needing manual resolution, deduplicated, first-seen order.
    pub unresolved: Vec<String>,
    /// Bookmaker rows that matched a prediction row. Zero with no
    /// unresolved names means "no matches" — informational, not an error.
    pub matched: usize,
}

impl AnalysisReport {
    pub fn is_empty_join(&self) -> bool {
        self.matched == 0
    }
}

/// Pure transformation over explicit inputs; no session state is read or
/// written here. Callers persist mappings and re-run after confirmations.
pub fn run_analysis(
    entries: &[BookmakerEntry],
    predictions: &PredictionSet,
    mappings: &HashMap<String, String>,
) -> AnalysisReport {
    let candidates = predictions.player_names();
    let (resolved, unresolved) = reconcile::reconcile_entries(entries, &candidates, mappings);

    let joined = market::join_entries(&resolved, predictions);
    let win = market::compute_win_market(&joined);
    let positional = market::compute_positional_market(&joined);
    let each_way = rankings::merge_each_way(&win, &positional);

    AnalysisReport {
        each_way,
        win,
        positional,
        unresolved,
        matched: joined.len(),
    }
}
