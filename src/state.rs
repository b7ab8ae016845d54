//! Session state for the terminal UI.
//!
//! Loaded tables survive re-renders until explicitly cleared; the engine
//! itself stays pure and is re-invoked over these inputs.

use std::collections::{HashMap, VecDeque};

use crate::analysis::{self, AnalysisReport};
use crate::ingest::{BookmakerEntry, BookmakerSourceConfig, PredictionSet};
use crate::odds::OddsQuote;
use crate::reconcile::{self, MatchOutcome};

const MAX_LOG_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Value,
    Detail,
    Matching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Win,
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Editing the selected row's odds quote; the buffer holds the new raw
    /// value as typed.
    EditOdds { buffer: String },
}

pub struct AppState {
    pub sources: Vec<BookmakerSourceConfig>,
    pub entries: Vec<BookmakerEntry>,
    pub predictions: Option<PredictionSet>,
    pub mappings: HashMap<String, String>,
    pub report: Option<AnalysisReport>,

    pub screen: Screen,
    pub detail_tab: DetailTab,
    pub input_mode: InputMode,
    pub value_selected: usize,
    pub detail_selected: usize,
    pub unresolved_selected: usize,
    pub candidate_selected: usize,
    pub picking_candidate: bool,
    pub help_overlay: bool,
    pub demo_mode: bool,

    pub log: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            entries: Vec::new(),
            predictions: None,
            mappings: HashMap::new(),
            report: None,
            screen: Screen::Value,
            detail_tab: DetailTab::Win,
            input_mode: InputMode::Normal,
            value_selected: 0,
            detail_selected: 0,
            unresolved_selected: 0,
            candidate_selected: 0,
            picking_candidate: false,
            help_overlay: false,
            demo_mode: false,
            log: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.log.push_back(msg.into());
        while self.log.len() > MAX_LOG_LINES {
            self.log.pop_front();
        }
    }

    pub fn event_title(&self) -> String {
        match self.predictions.as_ref() {
            Some(p) if !p.event_name.is_empty() => match p.event_country.as_deref() {
                Some(country) => format!("{} ({country})", p.event_name),
                None => p.event_name.clone(),
            },
            _ => "Value Finder".to_string(),
        }
    }

    /// Re-runs the whole analysis over the currently loaded tables.
    pub fn rerun_analysis(&mut self) {
        let report = match self.predictions.as_ref() {
            None => {
                self.push_log("[WARN] No prediction table loaded");
                return;
            }
            Some(_) if self.entries.is_empty() => {
                self.push_log("[WARN] No bookmaker rows loaded");
                return;
            }
            Some(predictions) => analysis::run_analysis(&self.entries, predictions, &self.mappings),
        };
        if !report.unresolved.is_empty() {
            self.push_log(format!(
                "[WARN] {} player(s) need manual matching",
                report.unresolved.len()
            ));
        }
        if report.is_empty_join() && report.unresolved.is_empty() {
            self.push_log("[INFO] No matching players found");
        } else {
            self.push_log(format!(
                "[INFO] Comparison complete: {} matched, {} each-way rows",
                report.matched,
                report.each_way.len()
            ));
        }
        self.report = Some(report);
        self.clamp_selections();
    }

    /// Drops all loaded tables and results. Durable mappings are untouched
    /// on disk; the in-memory copy is cleared with everything else.
    pub fn clear_loaded(&mut self) {
        self.entries.clear();
        self.predictions = None;
        self.mappings.clear();
        self.report = None;
        self.value_selected = 0;
        self.detail_selected = 0;
        self.unresolved_selected = 0;
        self.candidate_selected = 0;
        self.picking_candidate = false;
        self.input_mode = InputMode::Normal;
        self.push_log("[INFO] Cleared loaded data");
    }

    /// Canonical names offered when manually matching, sorted for stable
    /// browsing.
    pub fn candidate_names(&self) -> Vec<String> {
        let mut names = self
            .predictions
            .as_ref()
            .map(|p| p.player_names())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn selected_unresolved(&self) -> Option<String> {
        self.report
            .as_ref()?
            .unresolved
            .get(self.unresolved_selected)
            .cloned()
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.move_selection(-1);
    }

    fn move_selection(&mut self, delta: isize) {
        let (index, len) = match self.screen {
            Screen::Value => (
                &mut self.value_selected,
                self.report.as_ref().map_or(0, |r| r.each_way.len()),
            ),
            Screen::Detail => {
                let len = self.report.as_ref().map_or(0, |r| match self.detail_tab {
                    DetailTab::Win => r.win.len(),
                    DetailTab::Positional => r.positional.len(),
                });
                (&mut self.detail_selected, len)
            }
            Screen::Matching => {
                if self.picking_candidate {
                    let len = self.predictions.as_ref().map_or(0, |p| p.entries.len());
                    (&mut self.candidate_selected, len)
                } else {
                    let len = self.report.as_ref().map_or(0, |r| r.unresolved.len());
                    (&mut self.unresolved_selected, len)
                }
            }
        };
        if len == 0 {
            *index = 0;
            return;
        }
        let next = index.saturating_add_signed(delta);
        *index = next.min(len - 1);
    }

    fn clamp_selections(&mut self) {
        let Some(report) = self.report.as_ref() else {
            return;
        };
        self.value_selected = self
            .value_selected
            .min(report.each_way.len().saturating_sub(1));
        self.detail_selected = self.detail_selected.min(
            match self.detail_tab {
                DetailTab::Win => report.win.len(),
                DetailTab::Positional => report.positional.len(),
            }
            .saturating_sub(1),
        );
        self.unresolved_selected = self
            .unresolved_selected
            .min(report.unresolved.len().saturating_sub(1));
    }

    /// Replaces the odds quote of the entry behind a displayed row; nothing
    /// else on the entry changes. Returns false when no row resolves to the
    /// given (player, bookmaker) pair.
    pub fn update_entry_odds(&mut self, player: &str, bookmaker: &str, new_raw: &str) -> bool {
        let candidates = self
            .predictions
            .as_ref()
            .map(|p| p.player_names())
            .unwrap_or_default();
        for entry in &mut self.entries {
            if entry.bookmaker != bookmaker {
                continue;
            }
            let resolved = reconcile::resolve(&entry.player_name_raw, &candidates, &self.mappings);
            if resolved == MatchOutcome::Resolved(player.to_string()) {
                entry.odds = OddsQuote::new(new_raw.to_string());
                return true;
            }
        }
        false
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
