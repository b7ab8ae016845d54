//! Durable store for manually confirmed name mappings.
//!
//! One row per raw bookmaker spelling; saving again for the same spelling
//! replaces the previous target. The whole table is read once at the start
//! of a run and appended to only on explicit user confirmation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

const DATA_DIR: &str = "golfvalue_terminal";
const DB_FILE: &str = "manual_matches.sqlite";

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_DATA_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(DATA_DIR).join(DB_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR)
            .join(DB_FILE),
    )
}

/// `MAPPINGS_DB` overrides the default location (used by tests and tooling).
pub fn resolve_db_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("MAPPINGS_DB") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    default_db_path()
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open mappings db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS manual_matches (
            bookmaker_name TEXT PRIMARY KEY,
            canonical_name TEXT NOT NULL,
            saved_at TEXT NOT NULL
        );
        "#,
    )
    .context("init mappings schema")?;
    Ok(())
}

pub fn load_mappings(conn: &Connection) -> Result<HashMap<String, String>> {
    let mut stmt = conn
        .prepare("SELECT bookmaker_name, canonical_name FROM manual_matches")
        .context("prepare mappings select")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .context("query mappings")?;

    let mut mappings = HashMap::new();
    for row in rows {
        let (raw, canonical) = row.context("read mapping row")?;
        mappings.insert(raw, canonical);
    }
    Ok(mappings)
}

pub fn save_mapping(conn: &Connection, raw: &str, canonical: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO manual_matches (bookmaker_name, canonical_name, saved_at) \
         VALUES (?1, ?2, ?3)",
        params![raw, canonical, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("save mapping {raw} -> {canonical}"))?;
    Ok(())
}
