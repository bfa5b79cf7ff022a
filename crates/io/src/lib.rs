//! `coresync-io`: load and persist tables.
//!
//! Workbooks go through calamine (read) and rust_xlsxwriter (write);
//! delimited text goes through the `csv` crate. The format is picked from
//! the file extension.

pub mod csv;
pub mod error;
pub mod save;
pub mod xlsx;

use std::path::Path;

use coresync_engine::Table;

pub use error::TableIoError;
pub use save::{fallback_path, save_with_fallback, save_with_fallback_at, SavedTo};

/// File formats understood by [`load_table`] and [`write_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// xlsx / xlsm (read + write)
    Xlsx,
    /// xls / xlsb / ods (read only)
    LegacyWorkbook,
    Csv,
    Tsv,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" | "xlsb" | "ods" => Some(Self::LegacyWorkbook),
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }
}

/// Load the first sheet (or the whole file, for delimited text) as a table.
///
/// The first row is the header; header names are trimmed.
pub fn load_table(path: &Path) -> Result<Table, TableIoError> {
    if !path.exists() {
        return Err(TableIoError::NotFound(path.to_path_buf()));
    }
    let format = TableFormat::from_path(path)
        .ok_or_else(|| TableIoError::UnsupportedFormat(path.to_path_buf()))?;

    let table = match format {
        TableFormat::Xlsx | TableFormat::LegacyWorkbook => xlsx::import(path)?,
        TableFormat::Csv => csv::import(path)?,
        TableFormat::Tsv => csv::import_with_delimiter(path, b'\t')?,
    };
    log::debug!(
        "loaded {} ({} rows x {} columns)",
        path.display(),
        table.row_count(),
        table.width()
    );
    Ok(table)
}

/// Write a table to `path`, overwriting. Format follows the extension.
pub fn write_table(table: &Table, path: &Path) -> Result<(), TableIoError> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Xlsx) => xlsx::export(table, path),
        Some(TableFormat::Csv) => csv::export(table, path),
        Some(TableFormat::Tsv) => csv::export_with_delimiter(table, path, b'\t'),
        Some(TableFormat::LegacyWorkbook) | None => {
            Err(TableIoError::UnsupportedFormat(path.to_path_buf()))
        }
    }
}
