//! Publish `<hole>_DATA.html` mineralogy reports that are not already in the store.

use std::path::{Path, PathBuf};

use coresync_store::ObjectStore;
use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use super::UploadStats;
use crate::CliError;

/// Folder mode: the hole name is everything before `_DATA.html`.
static FLAT_REPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([\w\-]+)_DATA\.html$").expect("valid report pattern")
});

/// Scan mode: three dash-separated parts, e.g. `DDH-23-004_DATA.html`.
static SCANNED_REPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\w+-\w+-\w+_DATA\.html$").expect("valid report pattern")
});

const MINERALOGY_SUFFIX: &str = "_Mineralogy";

pub enum Source<'a> {
    /// `*.html` directly inside one folder.
    Folder(&'a Path),
    /// Every `*_Mineralogy` directory below a root.
    Scan(&'a Path),
}

impl Source<'_> {
    pub fn path(&self) -> &Path {
        match self {
            Source::Folder(p) | Source::Scan(p) => p,
        }
    }
}

pub fn run(store: &dyn ObjectStore, prefix: &str, source: Source<'_>) -> Result<UploadStats, CliError> {
    let mut stats = UploadStats::default();

    let targets = match source {
        Source::Folder(folder) => {
            let files = html_files(folder)?;
            log::info!("Found {} html files in {}.", files.len(), folder.display());
            let mut targets = Vec::new();
            for path in files {
                let name = file_name(&path);
                match FLAT_REPORT.captures(&name) {
                    Some(caps) => {
                        let key = format!("{prefix}/{}/{name}", &caps[1]);
                        targets.push((path, key));
                    }
                    None => {
                        log::warn!("Filename does not match pattern: {name}");
                        stats.ignored += 1;
                    }
                }
            }
            targets
        }
        Source::Scan(root) => {
            log::info!("Scanning {}...", root.display());
            scan_reports(root)
                .into_iter()
                .map(|path| {
                    let name = file_name(&path);
                    let folder = name.split('_').next().unwrap_or_default().to_string();
                    let key = format!("{prefix}/{folder}/{name}");
                    (path, key)
                })
                .collect()
        }
    };

    for (path, key) in targets {
        upload_if_missing(store, &path, &key, &mut stats);
    }
    Ok(stats)
}

fn upload_if_missing(store: &dyn ObjectStore, path: &Path, key: &str, stats: &mut UploadStats) {
    match store.head(key) {
        Ok(true) => {
            log::info!("Already exists: {key}");
            stats.skipped_existing += 1;
        }
        Ok(false) => match store.upload(path, key) {
            Ok(()) => stats.uploaded += 1,
            Err(e) => {
                log::error!("Upload failed for {}: {e}", path.display());
                stats.failed += 1;
            }
        },
        Err(e) => {
            log::error!("Failed checking {key}: {e}");
            stats.failed += 1;
        }
    }
}

fn html_files(folder: &Path) -> Result<Vec<PathBuf>, CliError> {
    let pattern = format!("{}/*.html", glob::Pattern::escape(&folder.to_string_lossy()));
    let paths = glob::glob(&pattern)
        .map_err(|e| CliError::args(format!("invalid folder pattern '{pattern}': {e}")))?;
    let mut files: Vec<PathBuf> = paths.filter_map(|p| p.ok()).filter(|p| p.is_file()).collect();
    files.sort();
    Ok(files)
}

/// Report files anywhere inside a `*_Mineralogy` directory under `root`,
/// each listed once even when such directories nest.
fn scan_reports(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| SCANNED_REPORT.is_match(&e.file_name().to_string_lossy()))
        .filter(|e| inside_mineralogy_dir(root, e.path()))
        .map(|e| e.into_path())
        .collect()
}

fn inside_mineralogy_dir(root: &Path, file: &Path) -> bool {
    file.ancestors()
        .skip(1)
        .take_while(|dir| dir.starts_with(root))
        .any(|dir| {
            dir.file_name()
                .map(|n| n.to_string_lossy().ends_with(MINERALOGY_SUFFIX))
                .unwrap_or(false)
        })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
