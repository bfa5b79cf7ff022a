//! Identifier canonicalization.

use coresync_engine::{CellValue, Table};

/// Canonical form of an identifier cell: string form with every whitespace
/// character removed, uppercased. Missing cells stay missing.
pub fn normalize_key(cell: &CellValue) -> CellValue {
    if cell.is_missing() {
        return cell.clone();
    }
    let compact: String = cell.display().split_whitespace().collect();
    CellValue::Text(compact.to_uppercase())
}

/// Canonicalize the column fuzzily matching `target`.
///
/// Returns the actual column name, or `None` (and changes nothing) when no
/// column matches.
pub fn normalize_keys(table: &mut Table, target: &str) -> Option<String> {
    let col = table.find_column(target)?;
    table.map_column(col, normalize_key);
    Some(table.columns()[col].clone())
}
