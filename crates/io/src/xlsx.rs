// Spreadsheet sources (xlsx, xlsm, xls, xlsb, ods) via calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate};

use crate::error::IoError;
use crate::table::Table;

/// Read one worksheet into a table. `sheet` selects by name; the first sheet
/// is used when absent.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IoError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.trim().eq_ignore_ascii_case(wanted.trim()))
            .cloned()
            .ok_or_else(|| IoError::Read {
                path: path.to_path_buf(),
                message: format!(
                    "sheet '{wanted}' not found (available: {})",
                    sheet_names.join(", ")
                ),
            })?,
        None => sheet_names.first().cloned().ok_or_else(|| IoError::Read {
            path: path.to_path_buf(),
            message: "workbook contains no sheets".to_string(),
        })?,
    };

    let range = workbook.worksheet_range(&name).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        message: format!("sheet '{name}': {e}"),
    })?;
    log::debug!(
        "reading sheet '{}' of {} ({}x{})",
        name,
        path.display(),
        range.height(),
        range.width()
    );

    let grid = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(Table::from_grid(grid))
}

/// Text form of a cell as the normalizer expects it.
///
/// Date-formatted cells become `YYYY-MM-DD` (1900 date system). Whole floats
/// drop the fraction; other floats keep two decimals so that a value such as
/// 1234.567 is not read back as a thousands-grouped integer.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n:.2}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Excel serial day (1900 system, with the 1900 leap-year bug) to a calendar date.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}
