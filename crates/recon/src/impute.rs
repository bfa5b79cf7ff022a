//! Fill missing cells of one column with a fixed default.

use coresync_engine::{CellValue, Table};

use crate::model::ImputeOutcome;

/// Fill every missing cell of the column fuzzily matching `target` with
/// `fill`. The reported count is taken before replacement.
///
/// Returns `None` when no column matches.
pub fn impute_missing(table: &mut Table, target: &str, fill: &str) -> Option<ImputeOutcome> {
    let col = table.find_column(target)?;
    let filled = table.column_values(col).filter(|c| c.is_missing()).count();

    table.map_column(col, |cell| {
        if cell.is_missing() {
            CellValue::text(fill)
        } else {
            cell.clone()
        }
    });

    Some(ImputeOutcome {
        column: table.columns()[col].clone(),
        filled,
    })
}
