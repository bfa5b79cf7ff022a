//! Overwrite primary cells from the secondary table, joined on the master id.

use std::collections::{BTreeSet, HashMap};

use coresync_engine::{normalize_column_name, CellKey, CellValue, Table};

use crate::model::{ColumnSync, SyncOutcome};

/// Columns present (by exact trimmed name) in both tables, sorted, minus any
/// whose normalized name appears in `exclude`.
pub fn shared_columns(primary: &Table, secondary: &Table, exclude: &[String]) -> Vec<String> {
    let excluded: BTreeSet<String> = exclude.iter().map(|e| normalize_column_name(e)).collect();
    let theirs: BTreeSet<&str> = secondary.columns().iter().map(String::as_str).collect();

    primary
        .columns()
        .iter()
        .filter(|c| theirs.contains(c.as_str()))
        .filter(|c| !excluded.contains(&normalize_column_name(c)))
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Synchronize every shared column from `secondary` into `primary`.
///
/// `master` is located fuzzily in each table and is always excluded from the
/// shared set, as is everything in `exclude`. Returns `None` when either
/// table lacks the master column.
pub fn synchronize(
    primary: &mut Table,
    secondary: &Table,
    master: &str,
    exclude: &[String],
) -> Option<SyncOutcome> {
    let p_master = primary.find_column(master)?;
    let s_master = secondary.find_column(master)?;

    let mut excluded = exclude.to_vec();
    excluded.push(master.to_string());
    excluded.push(primary.columns()[p_master].clone());

    let mut outcome = SyncOutcome::default();
    for column in shared_columns(primary, secondary, &excluded) {
        let (Some(p_col), Some(s_col)) = (primary.column_index(&column), secondary.column_index(&column))
        else {
            continue;
        };
        let lookup = build_lookup(secondary, s_master, s_col);
        let replacements = apply_lookup(primary, p_master, p_col, &lookup);
        log::debug!("synced '{column}': {replacements} replacements");
        outcome.total += replacements;
        outcome.columns.push(ColumnSync { column, replacements });
    }
    Some(outcome)
}

/// Master id → first non-missing value of `col`, in secondary row order.
fn build_lookup(secondary: &Table, master: usize, col: usize) -> HashMap<CellKey, CellValue> {
    let mut lookup = HashMap::new();
    for row in secondary.rows() {
        let value = &row[col];
        if value.is_missing() {
            continue;
        }
        if let Some(id) = row[master].key() {
            lookup.entry(id).or_insert_with(|| value.clone());
        }
    }
    lookup
}

fn apply_lookup(
    primary: &mut Table,
    master: usize,
    col: usize,
    lookup: &HashMap<CellKey, CellValue>,
) -> usize {
    let mut replacements = 0;
    for row in 0..primary.row_count() {
        let Some(id) = primary.cell(row, master).key() else {
            continue;
        };
        let Some(value) = lookup.get(&id) else {
            continue;
        };
        let current = primary.cell(row, col);
        if current.is_missing() || current != value {
            primary.set_cell(row, col, value.clone());
            replacements += 1;
        }
    }
    replacements
}
