//! Fuzzy column lookup.
//!
//! Column headers in the source workbooks drift between `Co_No`, `co no`,
//! ` CO_NO ` and so on. Lookups compare names after trimming, lower-casing
//! and treating underscores as spaces.

/// Canonical form used for fuzzy header comparison.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace('_', " ")
}

/// Index of the first column whose normalized name equals the normalized
/// target, or `None`.
pub fn find_column<S: AsRef<str>>(columns: &[S], target: &str) -> Option<usize> {
    let wanted = normalize_column_name(target);
    columns
        .iter()
        .position(|c| normalize_column_name(c.as_ref()) == wanted)
}
