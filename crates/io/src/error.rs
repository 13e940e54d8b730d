use std::fmt;
use std::path::PathBuf;

/// Errors from reading source files or writing exports.
#[derive(Debug)]
pub enum IoError {
    Open { path: PathBuf, message: String },
    Read { path: PathBuf, message: String },
    MissingColumn { path: PathBuf, column: String, available: Vec<String> },
    UnsupportedFormat { path: PathBuf },
    Write { path: PathBuf, message: String },
    InvalidFileName(String),
    NotFound(PathBuf),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Open { path, message } => {
                write!(f, "cannot open {}: {message}", path.display())
            }
            IoError::Read { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            IoError::MissingColumn { path, column, available } => write!(
                f,
                "column '{column}' not found in {} (available: {})",
                path.display(),
                available.join(", ")
            ),
            IoError::UnsupportedFormat { path } => write!(
                f,
                "unsupported file format: {} (expected csv, tsv, txt, xlsx, xlsm, xls, xlsb or ods)",
                path.display()
            ),
            IoError::Write { path, message } => {
                write!(f, "cannot write {}: {message}", path.display())
            }
            IoError::InvalidFileName(name) => write!(f, "invalid export file name '{name}'"),
            IoError::NotFound(path) => write!(f, "file not found: {}", path.display()),
        }
    }
}

impl std::error::Error for IoError {}
