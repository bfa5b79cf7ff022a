//! Replace `<prefix>/<hole>/composites/` with the local composite images.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use coresync_store::ObjectStore;

use super::UploadStats;
use crate::exit_codes::EXIT_INPUT;
use crate::CliError;

pub fn run(store: &dyn ObjectStore, prefix: &str, local_base: &Path) -> Result<UploadStats, CliError> {
    let remote = remote_folders(store, prefix)?;
    log::info!("Found {} folders under {}/", remote.len(), prefix);

    let mut stats = UploadStats::default();
    for dir in local_subdirs(local_base)? {
        let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !remote.contains(&name) {
            log::warn!("Skipping '{name}': no matching folder under {prefix}/");
            stats.folders_skipped += 1;
            continue;
        }

        let composites = format!("{prefix}/{name}/composites/");
        log::info!("Processing '{name}' -> {composites}");

        match store.delete_prefix(&composites) {
            Ok(0) => log::info!("No objects under {composites} to delete."),
            Ok(n) => stats.deleted += n,
            Err(e) => log::error!("Error deleting objects under {composites}: {e}"),
        }

        let jpgs = match jpg_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                log::error!("Cannot read {}: {e}", dir.display());
                stats.failed += 1;
                continue;
            }
        };
        if jpgs.is_empty() {
            log::warn!("No .jpg files found in {}.", dir.display());
        }

        for jpg in jpgs {
            let Some(file) = jpg.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let key = format!("{composites}{file}");
            match store.upload(&jpg, &key) {
                Ok(()) => stats.uploaded += 1,
                Err(e) => {
                    log::error!("Failed uploading {file}: {e}");
                    stats.failed += 1;
                }
            }
        }
        stats.folders_processed += 1;
    }

    Ok(stats)
}

/// Last path segment of every common prefix directly under `prefix/`.
fn remote_folders(store: &dyn ObjectStore, prefix: &str) -> Result<HashSet<String>, CliError> {
    let prefixes = store.list_prefixes(&format!("{prefix}/"))?;
    Ok(prefixes
        .iter()
        .filter_map(|p| p.trim_end_matches('/').rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

fn local_subdirs(base: &Path) -> Result<Vec<PathBuf>, CliError> {
    let entries = fs::read_dir(base).map_err(|e| {
        CliError::new(EXIT_INPUT, format!("cannot read {}: {e}", base.display()))
    })?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Files in `dir` (not recursive) with a `.jpg` extension in any case.
fn jpg_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("jpg"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
