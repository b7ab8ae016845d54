//! Blends the two market edges into one ranked Each-Way Value table.

use std::collections::HashMap;

use crate::market::EdgeRecord;

/// One ranked output row: the win-market bookmaker odds plus the mean of
/// the pair's win and positional edges.
#[derive(Debug, Clone)]
pub struct EachWayRecord {
    pub player: String,
    pub bookmaker: String,
    pub bookmaker_odds: f64,
    pub each_way_value_percent: f64,
}

/// Joins win and positional edges on (player, bookmaker) and ranks by the
/// blended value, descending. A pair missing from either side is excluded:
/// each-way value needs both markets.
///
/// `sort_by` is a stable sort, so equal values keep the win-market input
/// order; no secondary key is applied.
pub fn merge_each_way(win: &[EdgeRecord], positional: &[EdgeRecord]) -> Vec<EachWayRecord> {
    let positional_by_key: HashMap<(&str, &str), f64> = positional
        .iter()
        .map(|e| ((e.player.as_str(), e.bookmaker.as_str()), e.edge_percent))
        .collect();

    let mut merged: Vec<EachWayRecord> = win
        .iter()
        .filter_map(|w| {
            let positional_edge =
                positional_by_key.get(&(w.player.as_str(), w.bookmaker.as_str()))?;
            Some(EachWayRecord {
                player: w.player.clone(),
                bookmaker: w.bookmaker.clone(),
                bookmaker_odds: w.bookmaker_odds,
                each_way_value_percent: (w.edge_percent + positional_edge) / 2.0,
            })
        })
        .collect();

    merged.sort_by(|a, b| {
        b.each_way_value_percent
            .total_cmp(&a.each_way_value_percent)
    });
    merged
}

/// Display labels for the ranked rows: when the same player appears for
/// more than one bookmaker, repeats carry a 1-based occurrence count.
/// Purely cosmetic; the records themselves are untouched.
pub fn occurrence_labels(records: &[EachWayRecord]) -> Vec<String> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    records
        .iter()
        .map(|r| {
            let count = counts.entry(r.player.as_str()).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{} ({})", r.player, count)
            } else {
                r.player.clone()
            }
        })
        .collect()
}
