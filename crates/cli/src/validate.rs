//! `coresync validate`: reconcile the primary table against the secondary one.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use coresync_engine::Table;
use coresync_io::{load_table, save_with_fallback, SavedTo, TableIoError};
use coresync_recon::{ValidateConfig, ValidationReport};

use crate::exit_codes::{table_io_exit_code, EXIT_CONFIG};
use crate::CliError;

pub struct ValidateOptions {
    pub config: Option<PathBuf>,
    pub primary: Option<PathBuf>,
    pub secondary: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

pub fn cmd_validate(opts: ValidateOptions) -> Result<(), CliError> {
    let config = resolve_config(&opts)?;

    let primary = load_input(&config.primary)?;
    let secondary = load_input(&config.secondary)?;
    log::info!("Loaded both workbooks.");

    let out = coresync_recon::run(&config, primary, secondary)
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;

    let saved = save_with_fallback(&out.table, &config.output).map_err(|e| {
        CliError::new(table_io_exit_code(&e, true), e.to_string())
            .with_hint("close the file if it is open in another program, or pass --output")
    })?;

    if opts.json {
        let mut value = serde_json::to_value(&out.report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        value["saved"] = serde_json::json!({
            "path": saved.path.display().to_string(),
            "fallback": saved.fallback,
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", render_summary(&out.report, &config.master_column));
        println!("{}", render_saved(&config.output, &saved));
    }

    Ok(())
}

/// Config file (if any) with command-line paths layered on top.
fn resolve_config(opts: &ValidateOptions) -> Result<ValidateConfig, CliError> {
    let mut config = match opts.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::new(EXIT_CONFIG, format!("cannot read config {}: {e}", path.display()))
            })?;
            ValidateConfig::from_toml(&text).map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?
        }
        None => ValidateConfig::default(),
    };

    if let Some(ref p) = opts.primary {
        config.primary = p.clone();
    }
    if let Some(ref p) = opts.secondary {
        config.secondary = p.clone();
    }
    if let Some(ref p) = opts.output {
        config.output = p.clone();
    }

    config
        .validate()
        .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;
    Ok(config)
}

fn load_input(path: &Path) -> Result<Table, CliError> {
    load_table(path).map_err(|e| {
        let err = CliError::new(table_io_exit_code(&e, false), format!("Error loading files: {e}"));
        match e {
            TableIoError::NotFound(_) => {
                err.with_hint("run from the folder holding the workbooks, or pass --primary/--secondary")
            }
            _ => err,
        }
    })
}

/// Human summary: duplicate list, per-stage counts, total.
pub fn render_summary(report: &ValidationReport, master: &str) -> String {
    let mut out = String::new();

    if let Some(ref dedup) = report.dedup {
        if dedup.removed > 0 {
            let _ = writeln!(out, "Duplicate {} values removed:", dedup.column);
            for id in &dedup.duplicate_ids {
                let _ = writeln!(out, "  {id}");
            }
        } else {
            let _ = writeln!(out, "No duplicate rows to remove based on '{}'.", dedup.column);
        }
        out.push('\n');
    } else {
        let _ = writeln!(out, "Skipped duplicate removal: no '{master}' column.\n");
    }

    out.push_str("Summary:\n");
    if let Some(ref imputation) = report.imputation {
        let _ = writeln!(out, "Filled '{}': {} entries.", imputation.column, imputation.filled);
    }
    if let Some(ref sync) = report.sync {
        for col in &sync.columns {
            let _ = writeln!(out, "Synced '{}': {} replacements.", col.column, col.replacements);
        }
    }
    if let Some(ref dedup) = report.dedup {
        let _ = writeln!(out, "\n{} duplicate rows removed.", dedup.removed);
    }
    let _ = writeln!(out, "Total changes: {}\n", report.total_changes());
    out
}

fn render_saved(requested: &Path, saved: &SavedTo) -> String {
    if saved.fallback {
        format!(
            "Could not overwrite '{}'. Saved instead as: {}",
            requested.display(),
            saved.path.display()
        )
    } else {
        format!("Saved: {}", saved.path.display())
    }
}
