use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use rusqlite::Connection;

use golfvalue_terminal::export;
use golfvalue_terminal::ingest::{self, BookmakerSourceConfig};
use golfvalue_terminal::mappings;
use golfvalue_terminal::predictions_fetch::{self, PredictionsFetchConfig};
use golfvalue_terminal::rankings;
use golfvalue_terminal::sample;
use golfvalue_terminal::state::{AppState, DetailTab, InputMode, Screen};

struct App {
    state: AppState,
    conn: Option<Connection>,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        let mut state = AppState::new();
        let conn = match mappings::resolve_db_path() {
            Some(path) => match mappings::open_db(&path) {
                Ok(conn) => Some(conn),
                Err(err) => {
                    state.push_log(format!("[WARN] Mappings store unavailable: {err}"));
                    None
                }
            },
            None => {
                state.push_log("[WARN] No home directory; manual matches will not persist");
                None
            }
        };
        Self {
            state,
            conn,
            should_quit: false,
        }
    }

    /// One full (re)load: sources, predictions, saved mappings, analysis.
    fn load_and_run(&mut self) {
        self.state.entries.clear();
        self.state.report = None;

        self.state.sources = BookmakerSourceConfig::from_env();
        self.state.demo_mode = self.state.sources.is_empty();

        if self.state.demo_mode {
            self.state.entries = sample::demo_entries();
            self.state.predictions = Some(sample::demo_predictions());
            self.state
                .push_log("[INFO] No bookmaker sources configured; using demo data");
        } else {
            let sources = self.state.sources.clone();
            for cfg in &sources {
                match ingest::load_bookmaker_csv(cfg) {
                    Ok(rows) => {
                        self.state
                            .push_log(format!("[INFO] {}: {} rows", cfg.name, rows.len()));
                        self.state.entries.extend(rows);
                    }
                    Err(err) => self.state.push_log(format!("[ERROR] {}: {err}", cfg.name)),
                }
            }

            let fetch_cfg = PredictionsFetchConfig::from_env();
            match predictions_fetch::fetch_predictions(&fetch_cfg) {
                Ok(predictions) => {
                    self.state.push_log(format!(
                        "[INFO] Predictions loaded: {} ({} players)",
                        predictions.event_name,
                        predictions.entries.len()
                    ));
                    self.state.predictions = Some(predictions);
                }
                Err(err) => {
                    // Fetch failure is fatal for the run: no partial tables.
                    self.state.predictions = None;
                    self.state.push_log(format!("[ERROR] Predictions fetch: {err}"));
                    return;
                }
            }
        }

        if let Some(conn) = self.conn.as_ref() {
            match mappings::load_mappings(conn) {
                Ok(saved) => {
                    if !saved.is_empty() {
                        self.state
                            .push_log(format!("[INFO] {} saved manual matches", saved.len()));
                    }
                    self.state.mappings = saved;
                }
                Err(err) => self.state.push_log(format!("[WARN] Mappings load: {err}")),
            }
        }

        self.state.rerun_analysis();
    }

    fn on_key(&mut self, key: KeyEvent) {
        if let InputMode::EditOdds { .. } = self.state.input_mode {
            self.on_edit_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.state.screen = Screen::Value,
            KeyCode::Char('2') => self.state.screen = Screen::Detail,
            KeyCode::Char('3') => self.state.screen = Screen::Matching,
            KeyCode::Tab => {
                if self.state.screen == Screen::Detail {
                    self.state.detail_tab = match self.state.detail_tab {
                        DetailTab::Win => DetailTab::Positional,
                        DetailTab::Positional => DetailTab::Win,
                    };
                    self.state.detail_selected = 0;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => self.on_enter(),
            KeyCode::Esc => {
                if self.state.picking_candidate {
                    self.state.picking_candidate = false;
                } else {
                    self.state.screen = Screen::Value;
                }
            }
            KeyCode::Char('e') => self.start_odds_edit(),
            KeyCode::Char('x') => self.export_results(),
            KeyCode::Char('r') => {
                self.state.push_log("[INFO] Reloading data");
                self.load_and_run();
            }
            KeyCode::Char('c') => self.state.clear_loaded(),
            _ => {}
        }
    }

    fn on_enter(&mut self) {
        if self.state.screen != Screen::Matching {
            return;
        }
        if !self.state.picking_candidate {
            if self.state.selected_unresolved().is_some() {
                self.state.picking_candidate = true;
                self.state.candidate_selected = 0;
            }
            return;
        }
        self.save_selected_match();
    }

    fn save_selected_match(&mut self) {
        let Some(raw) = self.state.selected_unresolved() else {
            self.state.picking_candidate = false;
            return;
        };
        let candidates = self.state.candidate_names();
        let Some(canonical) = candidates.get(self.state.candidate_selected).cloned() else {
            return;
        };

        if let Some(conn) = self.conn.as_ref() {
            if let Err(err) = mappings::save_mapping(conn, &raw, &canonical) {
                self.state.push_log(format!("[ERROR] Save match: {err}"));
                return;
            }
        }
        self.state.mappings.insert(raw.clone(), canonical.clone());
        self.state
            .push_log(format!("[INFO] Saved match: '{raw}' -> '{canonical}'"));
        self.state.picking_candidate = false;
        self.state.unresolved_selected = 0;
        self.state.rerun_analysis();
    }

    fn selected_pair(&self) -> Option<(String, String, f64)> {
        let report = self.state.report.as_ref()?;
        match self.state.screen {
            Screen::Value => report.each_way.get(self.state.value_selected).map(|r| {
                (r.player.clone(), r.bookmaker.clone(), r.bookmaker_odds)
            }),
            Screen::Detail => {
                let edges = match self.state.detail_tab {
                    DetailTab::Win => &report.win,
                    DetailTab::Positional => &report.positional,
                };
                edges
                    .get(self.state.detail_selected)
                    .map(|e| (e.player.clone(), e.bookmaker.clone(), e.bookmaker_odds))
            }
            Screen::Matching => None,
        }
    }

    fn start_odds_edit(&mut self) {
        if self.selected_pair().is_none() {
            return;
        }
        self.state.input_mode = InputMode::EditOdds {
            buffer: String::new(),
        };
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        let InputMode::EditOdds { buffer } = &mut self.state.input_mode else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.state.input_mode = InputMode::Normal,
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Enter => {
                let new_raw = buffer.trim().to_string();
                self.state.input_mode = InputMode::Normal;
                if new_raw.is_empty() {
                    return;
                }
                let Some((player, bookmaker, _)) = self.selected_pair() else {
                    return;
                };
                if self.state.update_entry_odds(&player, &bookmaker, &new_raw) {
                    self.state.push_log(format!(
                        "[INFO] Updated odds for {player} @ {bookmaker}: {new_raw}"
                    ));
                    self.state.rerun_analysis();
                } else {
                    self.state
                        .push_log(format!("[WARN] No row found for {player} @ {bookmaker}"));
                }
            }
            _ => {}
        }
    }

    fn export_results(&mut self) {
        let Some(report) = self.state.report.as_ref() else {
            self.state.push_log("[WARN] Nothing to export; run the analysis first");
            return;
        };
        if report.each_way.is_empty() {
            self.state.push_log("[WARN] Each-way table is empty; nothing to export");
            return;
        }
        let path = std::env::var("EXPORT_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("each_way_value_analysis.xlsx"));
        match export::export_analysis(&path, report) {
            Ok(summary) => self.state.push_log(format!(
                "[INFO] Exported {} rows to {}",
                summary.rows,
                summary.path.display()
            )),
            Err(err) => self.state.push_log(format!("[ERROR] Export: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut app = App::new();
    app.load_and_run();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Value => render_value(frame, chunks[1], &app.state),
        Screen::Detail => render_detail(frame, chunks[1], &app.state),
        Screen::Matching => render_matching(frame, chunks[1], &app.state),
    }

    let log = Paragraph::new(log_text(&app.state))
        .block(Block::default().title("Log").borders(Borders::TOP));
    frame.render_widget(log, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Value => "EACH WAY VALUE",
        Screen::Detail => "MARKET DETAIL",
        Screen::Matching => "MANUAL MATCHING",
    };
    let demo = if state.demo_mode { " | DEMO" } else { "" };
    let matched = state
        .report
        .as_ref()
        .map(|r| format!(" | {} matched", r.matched))
        .unwrap_or_default();
    format!("{} | {screen}{matched}{demo}", state.event_title())
}

fn footer_text(state: &AppState) -> String {
    if let InputMode::EditOdds { buffer } = &state.input_mode {
        return format!("New odds (fractional or decimal): {buffer}_  |  Enter Apply | Esc Cancel");
    }
    match state.screen {
        Screen::Value => {
            "1 Value | 2 Detail | 3 Matching | j/k Move | e Edit odds | x Export | r Reload | c Clear | ? Help | q Quit"
                .to_string()
        }
        Screen::Detail => {
            "1 Value | 2 Detail | 3 Matching | Tab Win/Positional | j/k Move | e Edit odds | ? Help | q Quit"
                .to_string()
        }
        Screen::Matching => {
            if state.picking_candidate {
                "j/k Move | Enter Save match | Esc Back | q Quit".to_string()
            } else {
                "j/k Move | Enter Pick canonical name | Esc Back | q Quit".to_string()
            }
        }
    }
}

fn log_text(state: &AppState) -> String {
    if state.log.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .log
        .iter()
        .rev()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_value(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = value_columns();
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    render_cell_text(frame, header_cols[0], "Player", header_style);
    render_cell_text(frame, header_cols[1], "Bookmaker", header_style);
    render_cell_text(frame, header_cols[2], "Odds", header_style);
    render_cell_text(frame, header_cols[3], "EW Value %", header_style);

    let list_area = sections[1];
    let Some(report) = state.report.as_ref() else {
        render_empty(frame, list_area, "No analysis yet; press r to run");
        return;
    };
    if report.each_way.is_empty() {
        let message = if report.is_empty_join() && report.unresolved.is_empty() {
            "No matching players found"
        } else {
            "No each-way rows (check unresolved names on screen 3)"
        };
        render_empty(frame, list_area, message);
        return;
    }

    let labels = rankings::occurrence_labels(&report.each_way);
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.value_selected, report.each_way.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = row_rect(list_area, i);
        let selected = idx == state.value_selected;
        let row_style = row_style(selected);
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let record = &report.each_way[idx];
        let value_style = edge_style(record.each_way_value_percent, selected);
        render_cell_text(frame, cols[0], &labels[idx], row_style);
        render_cell_text(frame, cols[1], &record.bookmaker, row_style);
        render_cell_text(frame, cols[2], &format!("{:.2}", record.bookmaker_odds), row_style);
        render_cell_text(
            frame,
            cols[3],
            &format!("{:+.2}", record.each_way_value_percent),
            value_style,
        );
    }
}

fn render_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let tab = Paragraph::new(match state.detail_tab {
        DetailTab::Win => "[Win Market]  Positional Market",
        DetailTab::Positional => " Win Market  [Positional Market]",
    })
    .style(Style::default().fg(Color::Cyan));
    frame.render_widget(tab, sections[0]);

    let widths = detail_columns();
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[1]);
    render_cell_text(frame, header_cols[0], "Player", header_style);
    render_cell_text(frame, header_cols[1], "Bookmaker", header_style);
    render_cell_text(frame, header_cols[2], "Book Odds", header_style);
    render_cell_text(frame, header_cols[3], "Model Odds", header_style);
    render_cell_text(frame, header_cols[4], "Value %", header_style);

    let list_area = sections[2];
    let Some(report) = state.report.as_ref() else {
        render_empty(frame, list_area, "No analysis yet; press r to run");
        return;
    };
    let edges = match state.detail_tab {
        DetailTab::Win => &report.win,
        DetailTab::Positional => &report.positional,
    };
    if edges.is_empty() {
        render_empty(frame, list_area, "No rows for this market");
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.detail_selected, edges.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = row_rect(list_area, i);
        let selected = idx == state.detail_selected;
        let style = row_style(selected);
        if selected {
            frame.render_widget(Block::default().style(style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let edge = &edges[idx];
        render_cell_text(frame, cols[0], &edge.player, style);
        render_cell_text(frame, cols[1], &edge.bookmaker, style);
        render_cell_text(frame, cols[2], &format!("{:.2}", edge.bookmaker_odds), style);
        render_cell_text(frame, cols[3], &format!("{:.2}", edge.model_odds), style);
        render_cell_text(
            frame,
            cols[4],
            &format!("{:+.2}", edge.edge_percent),
            edge_style(edge.edge_percent, selected),
        );
    }
}

fn render_matching(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let unresolved = state
        .report
        .as_ref()
        .map(|r| r.unresolved.clone())
        .unwrap_or_default();

    let left_block = Block::default()
        .title("Unmatched bookmaker names")
        .borders(Borders::ALL);
    let left_inner = left_block.inner(columns[0]);
    frame.render_widget(left_block, columns[0]);

    if unresolved.is_empty() {
        render_empty(frame, left_inner, "All names matched");
    } else {
        let visible = left_inner.height as usize;
        let (start, end) = visible_range(state.unresolved_selected, unresolved.len(), visible);
        for (i, idx) in (start..end).enumerate() {
            let row_area = row_rect(left_inner, i);
            let selected = idx == state.unresolved_selected && !state.picking_candidate;
            let style = row_style(selected);
            if selected {
                frame.render_widget(Block::default().style(style), row_area);
            }
            render_cell_text(frame, row_area, &unresolved[idx], style);
        }
    }

    let right_title = match state.selected_unresolved() {
        Some(raw) if state.picking_candidate => format!("Match for '{raw}'"),
        _ => "Canonical names".to_string(),
    };
    let right_block = Block::default().title(right_title).borders(Borders::ALL);
    let right_inner = right_block.inner(columns[1]);
    frame.render_widget(right_block, columns[1]);

    let candidates = state.candidate_names();
    if candidates.is_empty() {
        render_empty(frame, right_inner, "No prediction table loaded");
        return;
    }
    let visible = right_inner.height as usize;
    let (start, end) = visible_range(state.candidate_selected, candidates.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = row_rect(right_inner, i);
        let selected = idx == state.candidate_selected && state.picking_candidate;
        let style = row_style(selected);
        if selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        render_cell_text(frame, row_area, &candidates[idx], style);
    }
}

fn value_columns() -> [Constraint; 4] {
    [
        Constraint::Min(24),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(12),
    ]
}

fn detail_columns() -> [Constraint; 5] {
    [
        Constraint::Min(24),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(10),
    ]
}

fn row_rect(list_area: Rect, i: usize) -> Rect {
    Rect {
        x: list_area.x,
        y: list_area.y + i as u16,
        width: list_area.width,
        height: 1,
    }
}

fn row_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn edge_style(edge: f64, selected: bool) -> Style {
    let fg = if edge >= 0.0 { Color::Green } else { Color::Red };
    let style = Style::default().fg(fg);
    if selected { style.bg(Color::DarkGray) } else { style }
}

fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(empty, area);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Golf Value Terminal - Help",
        "",
        "Global:",
        "  1            Each-way value table",
        "  2            Win/positional detail",
        "  3            Manual name matching",
        "  j/k or ↑/↓   Move",
        "  r            Reload sources and re-run",
        "  c            Clear loaded data",
        "  x            Export to spreadsheet",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Detail:",
        "  Tab          Switch Win/Positional",
        "  e            Edit selected row's odds",
        "",
        "Matching:",
        "  Enter        Pick / save canonical name",
        "  Esc          Back",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
