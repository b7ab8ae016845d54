//! Spreadsheet export of the latest analysis.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::analysis::AnalysisReport;
use crate::market::EdgeRecord;
use crate::rankings;

pub struct ExportReport {
    pub path: PathBuf,
    pub sheets: usize,
    pub rows: usize,
}

pub fn export_analysis(path: &Path, report: &AnalysisReport) -> Result<ExportReport> {
    let labels = rankings::occurrence_labels(&report.each_way);
    let mut each_way_rows = vec![vec![
        "Player".to_string(),
        "Bookmaker".to_string(),
        "Bookmaker Odds".to_string(),
        "Each Way Value".to_string(),
    ]];
    for (record, label) in report.each_way.iter().zip(&labels) {
        each_way_rows.push(vec![
            label.clone(),
            record.bookmaker.clone(),
            format!("{:.2}", record.bookmaker_odds),
            format!("{:.2}", record.each_way_value_percent),
        ]);
    }

    let win_rows = detail_rows(&report.win);
    let positional_rows = detail_rows(&report.positional);
    let total_rows = each_way_rows.len() + win_rows.len() + positional_rows.len() - 3;

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Each Way Value")?;
        write_rows(sheet, &each_way_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Win Market")?;
        write_rows(sheet, &win_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Positional Market")?;
        write_rows(sheet, &positional_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        sheets: 3,
        rows: total_rows,
    })
}

fn detail_rows(edges: &[EdgeRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Player".to_string(),
        "Bookmaker".to_string(),
        "Bookmaker Odds".to_string(),
        "Model Odds".to_string(),
        "Value (% Edge)".to_string(),
    ]];
    for edge in edges {
        rows.push(vec![
            edge.player.clone(),
            edge.bookmaker.clone(),
            format!("{:.2}", edge.bookmaker_odds),
            format!("{:.2}", edge.model_odds),
            format!("{:.2}", edge.edge_percent),
        ]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
