//! Header + rows grid shared by the CSV and spreadsheet readers.

use std::path::Path;

use crate::error::IoError;

/// A rectangular-ish text grid: first row split off as headers, remaining rows
/// as data. Rows may be shorter than the header; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Split the first row off as the header. Leading fully blank rows are skipped.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Self {
        let mut rows = grid.into_iter().skip_while(|r| is_blank(r));
        let headers = rows.next().unwrap_or_default();
        Table {
            headers,
            rows: rows.collect(),
        }
    }

    /// Position of `name` among the headers, comparing trimmed and case-folded.
    pub fn column(&self, name: &str, path: &Path) -> Result<usize, IoError> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
            .ok_or_else(|| IoError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
                available: self
                    .headers
                    .iter()
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect(),
            })
    }
}

/// Cell at `col`, empty when the row is short.
pub fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn header_is_first_non_blank_row() {
        let t = Table::from_grid(grid(&[&["", " "], &["Fecha", "Importe"], &["05/01/2024", "10"]]));
        assert_eq!(t.headers, vec!["Fecha", "Importe"]);
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn column_lookup_ignores_case_and_padding() {
        let t = Table::from_grid(grid(&[&[" Fecha ", "CONCEPTO"]]));
        let p = Path::new("x.csv");
        assert_eq!(t.column("fecha", p).unwrap(), 0);
        assert_eq!(t.column("Concepto ", p).unwrap(), 1);
        let err = t.column("importe", p).unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { .. }));
        assert!(err.to_string().contains("available: Fecha, CONCEPTO"));
    }

    #[test]
    fn short_rows_read_as_empty() {
        let row = vec!["a".to_string()];
        assert_eq!(cell(&row, 0), "a");
        assert_eq!(cell(&row, 3), "");
    }
}
