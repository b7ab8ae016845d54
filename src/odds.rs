//! Odds notation handling: fractional/decimal quotes and each-way place terms.

use serde::{Deserialize, Serialize};

/// Converts a raw odds quote to decimal odds.
///
/// Fractional strings (`"10/1"`) become `num/den + 1.0`; anything else is
/// tried as a plain decimal number (`"11.0"`). Unparseable input yields
/// `None` so callers can filter rather than fail.
pub fn to_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some((num, den)) = s.split_once('/') {
        let num = num.trim().parse::<i64>().ok()?;
        let den = den.trim().parse::<i64>().ok()?;
        if den == 0 {
            return None;
        }
        return Some(num as f64 / den as f64 + 1.0);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Each-way place-payout fraction offered by a bookmaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceTerm {
    Third,
    Quarter,
    Fifth,
}

impl PlaceTerm {
    pub fn divisor(self) -> f64 {
        match self {
            PlaceTerm::Third => 3.0,
            PlaceTerm::Quarter => 4.0,
            PlaceTerm::Fifth => 5.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlaceTerm::Third => "1/3",
            PlaceTerm::Quarter => "1/4",
            PlaceTerm::Fifth => "1/5",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1/3" | "third" => Some(PlaceTerm::Third),
            "1/4" | "quarter" => Some(PlaceTerm::Quarter),
            "1/5" | "fifth" => Some(PlaceTerm::Fifth),
            _ => None,
        }
    }
}

/// Place odds derived from win odds under the given each-way term.
pub fn place_decimal(win_decimal: f64, term: PlaceTerm) -> f64 {
    1.0 + (win_decimal - 1.0) / term.divisor()
}

/// A single odds observation, as supplied by a bookmaker source.
///
/// `decimal` is computed once from `raw` and never mutated afterwards; the
/// only way to change it is replacing the whole quote.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsQuote {
    pub raw: String,
    pub decimal: Option<f64>,
}

impl OddsQuote {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let decimal = to_decimal(&raw);
        Self { raw, decimal }
    }
}
