//! Tabular inputs: bookmaker odds CSVs and the model prediction table.

use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};

use crate::odds::{OddsQuote, PlaceTerm};

const DEFAULT_PLACE_COUNT: u32 = 5;
const MAX_PLACE_COUNT: u32 = 10;

/// One configured bookmaker source: where its odds file lives plus the
/// each-way settlement terms it offers.
#[derive(Debug, Clone)]
pub struct BookmakerSourceConfig {
    pub name: String,
    pub path: PathBuf,
    pub place_count: u32,
    pub place_term: PlaceTerm,
}

impl BookmakerSourceConfig {
    /// Scans `BOOKMAKER{n}_FILE` / `_NAME` / `_PLACES` / `_TERM` for
    /// n = 1.. until the first gap. Any number of sources is supported;
    /// each is processed identically downstream.
    pub fn from_env() -> Vec<Self> {
        let mut sources = Vec::new();
        for n in 1.. {
            let Ok(path) = env::var(format!("BOOKMAKER{n}_FILE")) else {
                break;
            };
            if path.trim().is_empty() {
                break;
            }
            let name = env::var(format!("BOOKMAKER{n}_NAME"))
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("Bookmaker {n}"));
            let place_count = env::var(format!("BOOKMAKER{n}_PLACES"))
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(DEFAULT_PLACE_COUNT)
                .clamp(1, MAX_PLACE_COUNT);
            let place_term = env::var(format!("BOOKMAKER{n}_TERM"))
                .ok()
                .and_then(|v| PlaceTerm::parse(&v))
                .unwrap_or(PlaceTerm::Fifth);
            sources.push(Self {
                name,
                path: PathBuf::from(path.trim()),
                place_count,
                place_term,
            });
        }
        sources
    }
}

/// One (player, bookmaker) odds row.
#[derive(Debug, Clone)]
pub struct BookmakerEntry {
    pub player_name_raw: String,
    pub odds: OddsQuote,
    pub bookmaker: String,
    pub place_count: u32,
    pub place_term: PlaceTerm,
}

/// One model row: canonical name, win odds and the published top-N odds.
#[derive(Debug, Clone)]
pub struct PredictionEntry {
    pub player_name: String,
    pub win_odds: Option<f64>,
    pub top_n_odds: HashMap<u32, f64>,
}

/// The loaded prediction table plus the event metadata the model supplies.
#[derive(Debug, Clone, Default)]
pub struct PredictionSet {
    pub event_name: String,
    pub event_country: Option<String>,
    pub entries: Vec<PredictionEntry>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PredictionSet {
    pub fn player_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.player_name.clone()).collect()
    }
}

/// Splits one CSV line, honoring double-quoted fields so player names that
/// contain commas ("Smith, Jordan") survive.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Parses a headerless two-column bookmaker CSV (player name, odds quote).
/// Blank lines and rows with fewer than two fields are skipped.
pub fn parse_bookmaker_csv(raw: &str, cfg: &BookmakerSourceConfig) -> Vec<BookmakerEntry> {
    let mut entries = Vec::new();
    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        if fields.len() < 2 || fields[0].is_empty() {
            continue;
        }
        entries.push(BookmakerEntry {
            player_name_raw: fields[0].clone(),
            odds: OddsQuote::new(fields[1].clone()),
            bookmaker: cfg.name.clone(),
            place_count: cfg.place_count,
            place_term: cfg.place_term,
        });
    }
    entries
}

pub fn load_bookmaker_csv(cfg: &BookmakerSourceConfig) -> Result<Vec<BookmakerEntry>> {
    let raw = fs::read_to_string(&cfg.path)
        .with_context(|| format!("read bookmaker file {}", cfg.path.display()))?;
    Ok(parse_bookmaker_csv(&raw, cfg))
}

/// Parses a model prediction CSV. The header must name a `player_name`
/// column and a `win` column; every `top_{N}` column becomes an entry in
/// the per-player top-N odds map.
pub fn parse_predictions_csv(raw: &str) -> Result<PredictionSet> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next().ok_or_else(|| anyhow!("empty predictions file"))?;
    let columns = split_csv_line(header);

    let name_idx = columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case("player_name"))
        .ok_or_else(|| anyhow!("predictions header has no player_name column"))?;
    let win_idx = columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case("win"))
        .ok_or_else(|| anyhow!("predictions header has no win column"))?;
    let country_idx = columns.iter().position(|c| c.eq_ignore_ascii_case("country"));

    let top_columns: Vec<(usize, u32)> = columns
        .iter()
        .enumerate()
        .filter_map(|(idx, c)| {
            let n = c.to_ascii_lowercase().strip_prefix("top_")?.parse::<u32>().ok()?;
            Some((idx, n))
        })
        .collect();

    let mut entries = Vec::new();
    let mut seen = HashSet::new();
    let mut event_country = None;

    for line in lines {
        let fields = split_csv_line(line);
        let Some(name) = fields.get(name_idx).filter(|s| !s.is_empty()) else {
            continue;
        };
        // Canonical names are unique per load; first occurrence wins.
        if !seen.insert(name.clone()) {
            continue;
        }
        let win_odds = fields.get(win_idx).and_then(|v| v.parse::<f64>().ok());
        let mut top_n_odds = HashMap::new();
        for (idx, n) in &top_columns {
            if let Some(value) = fields.get(*idx).and_then(|v| v.parse::<f64>().ok()) {
                top_n_odds.insert(*n, value);
            }
        }
        if event_country.is_none() {
            event_country = country_idx
                .and_then(|idx| fields.get(idx))
                .filter(|s| !s.is_empty())
                .cloned();
        }
        entries.push(PredictionEntry {
            player_name: name.clone(),
            win_odds,
            top_n_odds,
        });
    }

    Ok(PredictionSet {
        event_name: "Custom Event".to_string(),
        event_country,
        entries,
        fetched_at: None,
    })
}

pub fn load_predictions_csv(path: &Path) -> Result<PredictionSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read predictions file {}", path.display()))?;
    parse_predictions_csv(&raw)
}
