//! Source loading: file + explicit column mapping → `RawMovement` list.

use std::path::Path;

use conciliar_recon::config::{ColumnMapping, SourceConfig};
use conciliar_recon::RawMovement;

use crate::error::IoError;
use crate::table::{cell, is_blank, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Delimited,
    Spreadsheet,
}

fn detect_format(path: &Path) -> Option<SourceFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" | "tsv" | "txt" => Some(SourceFormat::Delimited),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(SourceFormat::Spreadsheet),
        _ => None,
    }
}

/// Load one side's records from `path` using the mapping in `source`.
///
/// `path` is passed separately from `source.file` so the caller decides how
/// relative paths resolve. The first non-blank row is the header; fully blank
/// rows are skipped and never produce a record.
pub fn load_movements(path: &Path, source: &SourceConfig) -> Result<Vec<RawMovement>, IoError> {
    let table = match detect_format(path) {
        Some(SourceFormat::Delimited) => crate::csv::read_table(path)?,
        Some(SourceFormat::Spreadsheet) => crate::xlsx::read_table(path, source.sheet.as_deref())?,
        None => {
            return Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };
    let movements = extract(&table, &source.columns, path)?;
    log::info!("loaded {} record(s) from {}", movements.len(), path.display());
    Ok(movements)
}

/// Resolved column positions for one table.
struct Columns {
    date: usize,
    description: usize,
    amount: AmountColumns,
}

enum AmountColumns {
    Single(usize),
    /// Credit and debit positions; first non-empty wins, credit first.
    Split(Option<usize>, Option<usize>),
}

impl Columns {
    fn resolve(table: &Table, mapping: &ColumnMapping, path: &Path) -> Result<Self, IoError> {
        let amount = match &mapping.amount {
            Some(name) => AmountColumns::Single(table.column(name, path)?),
            None => AmountColumns::Split(
                mapping.credit.as_deref().map(|c| table.column(c, path)).transpose()?,
                mapping.debit.as_deref().map(|d| table.column(d, path)).transpose()?,
            ),
        };
        Ok(Columns {
            date: table.column(&mapping.date, path)?,
            description: table.column(&mapping.description, path)?,
            amount,
        })
    }

    fn amount_text<'a>(&self, row: &'a [String]) -> &'a str {
        match self.amount {
            AmountColumns::Single(col) => cell(row, col),
            AmountColumns::Split(credit, debit) => [credit, debit]
                .into_iter()
                .flatten()
                .map(|col| cell(row, col))
                .find(|v| !v.trim().is_empty())
                .unwrap_or(""),
        }
    }
}

fn extract(table: &Table, mapping: &ColumnMapping, path: &Path) -> Result<Vec<RawMovement>, IoError> {
    let columns = Columns::resolve(table, mapping, path)?;
    let mut skipped = 0usize;
    let mut movements = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        if is_blank(row) {
            skipped += 1;
            continue;
        }
        movements.push(RawMovement::new(
            cell(row, columns.date),
            cell(row, columns.description),
            columns.amount_text(row),
        ));
    }
    if skipped > 0 {
        log::debug!("{}: skipped {} blank row(s)", path.display(), skipped);
    }
    Ok(movements)
}
