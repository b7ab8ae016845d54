//! Maps bookmaker player-name spellings onto the model's canonical names.
//!
//! Manual mappings saved by the user always win; otherwise the best fuzzy
//! match is accepted when it clears [`MATCH_THRESHOLD`].

use std::collections::{HashMap, HashSet};

use strsim::normalized_levenshtein;

use crate::ingest::BookmakerEntry;

/// Minimum similarity score (0-100) for an automatic match.
pub const MATCH_THRESHOLD: u32 = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Resolved(String),
    Unresolved,
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn token_sort(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity between two names on an integer 0-100 scale.
///
/// Scores the normalized strings and their token-sorted forms ("Woods Tiger"
/// vs "Tiger Woods") and keeps the better of the two.
pub fn similarity(a: &str, b: &str) -> u32 {
    let na = normalize(a);
    let nb = normalize(b);
    if na.is_empty() || nb.is_empty() {
        return 0;
    }
    let plain = normalized_levenshtein(&na, &nb);
    let sorted = normalized_levenshtein(&token_sort(&na), &token_sort(&nb));
    (plain.max(sorted) * 100.0).round() as u32
}

/// Best-scoring candidate for a raw name. Ties keep the first-encountered
/// candidate, so the result is repeatable for a fixed candidate order.
pub fn find_best_match<'a>(raw: &str, candidates: &'a [String]) -> Option<(&'a str, u32)> {
    let mut best: Option<(&'a str, u32)> = None;
    for candidate in candidates {
        let score = similarity(raw, candidate);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate.as_str(), score));
        }
    }
    best
}

/// Resolves a bookmaker name against the canonical candidate list.
///
/// A saved manual mapping short-circuits all fuzzy matching, whatever the
/// candidate list contains.
pub fn resolve(
    raw: &str,
    candidates: &[String],
    mappings: &HashMap<String, String>,
) -> MatchOutcome {
    if let Some(target) = mappings.get(raw) {
        return MatchOutcome::Resolved(target.clone());
    }
    match find_best_match(raw, candidates) {
        Some((candidate, score)) if score >= MATCH_THRESHOLD => {
            MatchOutcome::Resolved(candidate.to_string())
        }
        _ => MatchOutcome::Unresolved,
    }
}

/// Attaches a canonical name to every bookmaker row it can resolve.
///
/// Returns the resolved `(entry, canonical)` pairs in input order plus the
/// raw names that still need manual resolution, deduplicated and in first
/// appearance order.
pub fn reconcile_entries(
    entries: &[BookmakerEntry],
    candidates: &[String],
    mappings: &HashMap<String, String>,
) -> (Vec<(BookmakerEntry, String)>, Vec<String>) {
    let mut resolved = Vec::new();
    let mut unresolved = Vec::new();
    let mut seen_unresolved = HashSet::new();

    for entry in entries {
        match resolve(&entry.player_name_raw, candidates, mappings) {
            MatchOutcome::Resolved(canonical) => resolved.push((entry.clone(), canonical)),
            MatchOutcome::Unresolved => {
                if seen_unresolved.insert(entry.player_name_raw.clone()) {
                    unresolved.push(entry.player_name_raw.clone());
                }
            }
        }
    }

    (resolved, unresolved)
}
