//! Keep the first row per master identifier.

use std::collections::HashSet;

use coresync_engine::{CellKey, Table};

use crate::model::DedupOutcome;

/// Drop every row whose identifier already appeared in an earlier row.
///
/// Rows with a missing identifier are always kept. Returns `None` when the
/// column cannot be located.
pub fn deduplicate(table: &mut Table, master: &str) -> Option<DedupOutcome> {
    let col = table.find_column(master)?;

    let mut seen: HashSet<CellKey> = HashSet::new();
    let mut reported: HashSet<CellKey> = HashSet::new();
    let mut duplicate_ids = Vec::new();
    let before = table.row_count();

    table.retain_rows(|_, row| {
        let Some(id) = row[col].key() else {
            return true;
        };
        if seen.contains(&id) {
            if reported.insert(id.clone()) {
                duplicate_ids.push(id.to_string());
            }
            false
        } else {
            seen.insert(id);
            true
        }
    });

    Some(DedupOutcome {
        column: table.columns()[col].clone(),
        removed: before - table.row_count(),
        duplicate_ids,
    })
}
