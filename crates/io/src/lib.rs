// Record extraction and spreadsheet export

pub mod csv;
pub mod error;
pub mod export;
pub mod source;
pub mod table;
pub mod xlsx;

pub use error::IoError;
pub use export::{resolve_export, write_xlsx, ExportConfig};
pub use source::load_movements;
