//! Reconciliation → timestamped `.xlsx` report.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use conciliar_recon::{Reconciliation, ReconciliationRow};

use crate::error::IoError;

const FONT_NAME: &str = "Calibri";
const FONT_SIZE: f64 = 14.0;
const MAX_COLUMN_WIDTH: usize = 80;

pub const RESULT_SHEET: &str = "Reconciliation";
pub const SUMMARY_SHEET: &str = "Summary";

/// Where exports go and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub prefix: String,
}

/// `{prefix}_{YYYYMMDD_HHMMSS}.xlsx`
pub fn output_filename(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!("{prefix}_{}.xlsx", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write the result workbook and return its path.
///
/// The output directory is created if needed on every call. An existing file
/// with the same name (same prefix, same second) is overwritten.
pub fn write_xlsx(
    result: &Reconciliation,
    config: &ExportConfig,
    timestamp: NaiveDateTime,
) -> Result<PathBuf, IoError> {
    std::fs::create_dir_all(&config.dir).map_err(|e| IoError::Write {
        path: config.dir.clone(),
        message: e.to_string(),
    })?;
    let path = config.dir.join(output_filename(&config.prefix, timestamp));
    let write_err = |e: XlsxError| IoError::Write {
        path: path.clone(),
        message: e.to_string(),
    };

    let body = Format::new().set_font_name(FONT_NAME).set_font_size(FONT_SIZE);
    let header = body.clone().set_bold();

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name(RESULT_SHEET).map_err(write_err)?;
    write_rows(sheet, &result.rows, &body, &header).map_err(write_err)?;

    let sheet = workbook.add_worksheet().set_name(SUMMARY_SHEET).map_err(write_err)?;
    write_summary(sheet, result, &body, &header).map_err(write_err)?;

    workbook.save(&path).map_err(write_err)?;
    log::info!("wrote {} row(s) to {}", result.rows.len(), path.display());
    Ok(path)
}

fn write_rows(
    sheet: &mut Worksheet,
    rows: &[ReconciliationRow],
    body: &Format,
    header: &Format,
) -> Result<(), XlsxError> {
    let mut widths: Vec<usize> = ReconciliationRow::COLUMNS.iter().map(|c| c.chars().count()).collect();

    for (col, name) in ReconciliationRow::COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, header)?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.cells().iter().enumerate() {
            widths[col] = widths[col].max(value.chars().count());
            sheet.write_string_with_format(r, col as u16, value, body)?;
        }
    }

    for (col, len) in widths.into_iter().enumerate() {
        sheet.set_column_width(col as u16, column_width(len) as f64)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_summary(
    sheet: &mut Worksheet,
    result: &Reconciliation,
    body: &Format,
    header: &Format,
) -> Result<(), XlsxError> {
    let s = &result.summary;
    let lines = [
        ("statement_total", s.statement_total),
        ("accounting_total", s.accounting_total),
        ("matched", s.matched),
        ("probable", s.probable),
        ("statement_only", s.statement_only),
        ("accounting_only", s.accounting_only),
    ];

    sheet.write_string_with_format(0, 0, "metric", header)?;
    sheet.write_string_with_format(0, 1, "count", header)?;
    for (i, (label, count)) in lines.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string_with_format(r, 0, *label, body)?;
        sheet.write_number_with_format(r, 1, *count as f64, body)?;
    }
    sheet.set_column_width(0, column_width("accounting_total".len()) as f64)?;
    sheet.set_column_width(1, column_width("count".len()) as f64)?;
    Ok(())
}

/// Longest cell plus one, capped.
pub fn column_width(max_len: usize) -> usize {
    (max_len + 1).min(MAX_COLUMN_WIDTH)
}

/// Resolve a previously written export by bare file name.
///
/// Only plain `.xlsx` names are accepted: no path separators, no `..`.
pub fn resolve_export(dir: &Path, filename: &str) -> Result<PathBuf, IoError> {
    let valid = filename.ends_with(".xlsx")
        && filename.len() > ".xlsx".len()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\');
    if !valid {
        return Err(IoError::InvalidFileName(filename.to_string()));
    }
    let path = dir.join(filename);
    if !path.is_file() {
        return Err(IoError::NotFound(path));
    }
    Ok(path)
}
