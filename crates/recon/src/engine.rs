use coresync_engine::Table;

use crate::config::ValidateConfig;
use crate::dedup::deduplicate;
use crate::error::ReconError;
use crate::impute::impute_missing;
use crate::model::{NormalizedColumn, ReconOutput, ReportMeta, TableRole, ValidationReport};
use crate::normalize::normalize_keys;
use crate::sync::synchronize;

/// Run the fixed stage order over two loaded tables:
/// key normalization (both) → imputation → synchronization → deduplication.
///
/// Missing columns never fail the run; each skipped stage adds a warning.
pub fn run(
    config: &ValidateConfig,
    mut primary: Table,
    mut secondary: Table,
) -> Result<ReconOutput, ReconError> {
    config.validate()?;

    let primary_rows_in = primary.row_count();
    let mut warnings = Vec::new();
    let mut warn = |msg: String| {
        log::warn!("{msg}");
        warnings.push(msg);
    };

    // Key normalization
    let mut normalized = Vec::new();
    for (role, table) in [
        (TableRole::Primary, &mut primary),
        (TableRole::Secondary, &mut secondary),
    ] {
        match normalize_keys(table, &config.key_column) {
            Some(column) => {
                log::info!("Normalized '{column}' in {role} table.");
                normalized.push(NormalizedColumn { role, column });
            }
            None => warn(format!(
                "column '{}' not found in {role} table; key normalization skipped",
                config.key_column
            )),
        }
    }

    // Imputation
    let imputation = impute_missing(&mut primary, &config.impute_column, &config.impute_value);
    if imputation.is_none() {
        warn(format!(
            "column '{}' not found in primary table; imputation skipped",
            config.impute_column
        ));
    }

    let mut exclude = config.exclude.clone();
    if let Some(ref outcome) = imputation {
        exclude.push(outcome.column.clone());
    }

    // Synchronization
    let master_in_primary = primary.find_column(&config.master_column).is_some();
    let master_in_secondary = secondary.find_column(&config.master_column).is_some();
    let sync = if !master_in_primary {
        warn(format!(
            "column '{}' not found in primary table; synchronization skipped",
            config.master_column
        ));
        None
    } else if !master_in_secondary {
        warn(format!(
            "column '{}' not found in secondary table; synchronization skipped",
            config.master_column
        ));
        None
    } else {
        synchronize(&mut primary, &secondary, &config.master_column, &exclude)
    };

    // Deduplication
    let dedup = deduplicate(&mut primary, &config.master_column);
    if dedup.is_none() {
        warn(format!(
            "column '{}' not found in primary table; deduplication skipped",
            config.master_column
        ));
    }

    let meta = ReportMeta {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
        primary_rows_in,
        primary_rows_out: primary.row_count(),
        secondary_rows: secondary.row_count(),
    };

    Ok(ReconOutput {
        table: primary,
        report: ValidationReport {
            meta,
            normalized,
            imputation,
            sync,
            dedup,
            warnings,
        },
    })
}
