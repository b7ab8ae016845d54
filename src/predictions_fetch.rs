//! Remote model predictions: the DataGolf pre-tournament feed.
//!
//! One bounded-timeout request per run, no retry. A failed or malformed
//! fetch is fatal for that run; the caller surfaces the cause and shows no
//! partial results.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;

use crate::ingest::{self, PredictionEntry, PredictionSet};

const PREDS_URL: &str = "https://feeds.datagolf.com/preds/pre-tournament";
const SUPPORTED_TOURS: &[&str] = &["pga", "euro", "kft", "opp", "liv"];
const REQUEST_TIMEOUT_SECS: u64 = 30;

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

// The feed does not always populate the main prediction key; fall back in
// the order the upstream publishes them.
const PRED_KEYS: &[&str] = &["preds", "baseline_history_fit", "baseline"];

#[derive(Debug, Clone)]
pub struct PredictionsFetchConfig {
    pub api_key: Option<String>,
    pub tour: String,
    pub file: Option<PathBuf>,
}

impl PredictionsFetchConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("DATAGOLF_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let tour = env::var("DATAGOLF_TOUR")
            .unwrap_or_else(|_| "pga".to_string())
            .trim()
            .to_ascii_lowercase();
        let tour = if SUPPORTED_TOURS.contains(&tour.as_str()) {
            tour
        } else {
            "pga".to_string()
        };
        let file = env::var("DATAGOLF_FILE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        Self { api_key, tour, file }
    }
}

/// Loads the prediction table from the configured source: a local CSV when
/// `DATAGOLF_FILE` is set, otherwise the remote feed.
pub fn fetch_predictions(cfg: &PredictionsFetchConfig) -> Result<PredictionSet> {
    if let Some(path) = cfg.file.as_ref() {
        return ingest::load_predictions_csv(path);
    }
    let Some(api_key) = cfg.api_key.as_ref() else {
        return Err(anyhow!("DATAGOLF_API_KEY missing and no DATAGOLF_FILE set"));
    };
    fetch_predictions_api(api_key, &cfg.tour)
}

fn fetch_predictions_api(api_key: &str, tour: &str) -> Result<PredictionSet> {
    let client = http_client()?;
    let resp = client
        .get(PREDS_URL)
        .query(&[
            ("tour", tour),
            ("odds_format", "decimal"),
            ("key", api_key),
        ])
        .header(USER_AGENT, "golfvalue-terminal/0.1")
        .send()
        .context("predictions request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading predictions body")?;
    if !status.is_success() {
        let snippet = body
            .trim()
            .replace('\n', " ")
            .replace('\r', " ")
            .chars()
            .take(220)
            .collect::<String>();
        return Err(anyhow!("predictions http {}: {}", status, snippet));
    }

    parse_predictions_json(&body)
}

/// Parses the feed payload. Field names under the prediction key vary by
/// subscription tier, so the rows are walked as generic JSON.
pub fn parse_predictions_json(raw: &str) -> Result<PredictionSet> {
    let root: Value = serde_json::from_str(raw).context("invalid predictions json")?;

    let event_name = root
        .get("event_name")
        .and_then(Value::as_str)
        .unwrap_or("Golf Event")
        .to_string();

    let rows = PRED_KEYS
        .iter()
        .find_map(|key| {
            root.get(*key)
                .and_then(Value::as_array)
                .filter(|arr| !arr.is_empty())
        })
        .ok_or_else(|| anyhow!("no prediction rows in response"))?;

    let mut entries = Vec::new();
    let mut event_country = None;
    for row in rows {
        let Some(name) = row.get("player_name").and_then(Value::as_str) else {
            continue;
        };
        if event_country.is_none() {
            event_country = row
                .get("country")
                .and_then(Value::as_str)
                .map(|s| s.to_string());
        }
        let win_odds = number_field(row, "win");
        let mut top_n_odds = std::collections::HashMap::new();
        if let Some(obj) = row.as_object() {
            for (key, value) in obj {
                let Some(n) = key.strip_prefix("top_").and_then(|n| n.parse::<u32>().ok()) else {
                    continue;
                };
                if let Some(v) = number_value(value) {
                    top_n_odds.insert(n, v);
                }
            }
        }
        entries.push(PredictionEntry {
            player_name: name.to_string(),
            win_odds,
            top_n_odds,
        });
    }

    if entries.is_empty() {
        return Err(anyhow!("prediction rows carried no player names"));
    }

    Ok(PredictionSet {
        event_name,
        event_country,
        entries,
        fetched_at: Some(Utc::now()),
    })
}

fn number_field(row: &Value, key: &str) -> Option<f64> {
    row.get(key).and_then(number_value)
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
