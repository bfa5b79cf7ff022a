//! Persist with a timestamped fallback when the destination is locked.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use coresync_engine::Table;

use crate::error::TableIoError;
use crate::write_table;

/// Where the table actually landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedTo {
    pub path: PathBuf,
    /// The canonical path was locked and `path` is the timestamped variant.
    pub fallback: bool,
}

/// Write `table` to `path`; if `path` is locked, write to
/// [`fallback_path`] instead. Non-lock failures are returned unchanged.
pub fn save_with_fallback(table: &Table, path: &Path) -> Result<SavedTo, TableIoError> {
    save_with_fallback_at(path, Local::now().naive_local(), |p| write_table(table, p))
}

/// [`save_with_fallback`] with an explicit clock and writer.
///
/// The canonical path is tried exactly once; the fallback path is tried
/// exactly once and any failure there is returned.
pub fn save_with_fallback_at(
    path: &Path,
    now: NaiveDateTime,
    mut write: impl FnMut(&Path) -> Result<(), TableIoError>,
) -> Result<SavedTo, TableIoError> {
    match write(path) {
        Ok(()) => Ok(SavedTo {
            path: path.to_path_buf(),
            fallback: false,
        }),
        Err(e) if e.is_locked() => {
            let alt = fallback_path(path, now);
            log::warn!("{} is locked ({}); writing {}", path.display(), e, alt.display());
            write(&alt)?;
            Ok(SavedTo {
                path: alt,
                fallback: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// `dir/stem.ext` → `dir/stem_YYYYMMDD_HHMMSS.ext`.
pub fn fallback_path(path: &Path, now: NaiveDateTime) -> PathBuf {
    let ts = now.format("%Y%m%d_%H%M%S");
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, ts, ext.to_string_lossy()),
        None => format!("{}_{}", stem, ts),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
    }

    fn locked(path: &Path) -> TableIoError {
        TableIoError::Write {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "file in use"),
        }
    }

    #[test]
    fn fallback_name_embeds_timestamp_before_extension() {
        let alt = fallback_path(Path::new("out/ddh_database_updated.xlsx"), at());
        assert_eq!(alt, PathBuf::from("out/ddh_database_updated_20260307_090501.xlsx"));
    }

    #[test]
    fn fallback_name_without_extension() {
        let alt = fallback_path(Path::new("report"), at());
        assert_eq!(alt, PathBuf::from("report_20260307_090501"));
    }

    #[test]
    fn unlocked_path_is_written_directly() {
        let mut attempts = Vec::new();
        let saved = save_with_fallback_at(Path::new("ddh.xlsx"), at(), |p| {
            attempts.push(p.to_path_buf());
            Ok(())
        })
        .unwrap();
        assert_eq!(saved.path, PathBuf::from("ddh.xlsx"));
        assert!(!saved.fallback);
        assert_eq!(attempts.len(), 1);
    }

    #[test]
    fn locked_path_falls_back_once() {
        let canonical = PathBuf::from("ddh.xlsx");
        let mut attempts = Vec::new();
        let saved = save_with_fallback_at(&canonical, at(), |p| {
            attempts.push(p.to_path_buf());
            if p == canonical { Err(locked(p)) } else { Ok(()) }
        })
        .unwrap();
        assert!(saved.fallback);
        assert_eq!(saved.path, PathBuf::from("ddh_20260307_090501.xlsx"));
        assert_eq!(attempts, vec![canonical.clone(), saved.path.clone()]);
    }

    #[test]
    fn fallback_failure_propagates() {
        let err = save_with_fallback_at(Path::new("ddh.xlsx"), at(), |p| Err(locked(p))).unwrap_err();
        assert!(err.is_locked());
    }

    #[test]
    fn non_lock_errors_are_not_retried() {
        let mut calls = 0;
        let err = save_with_fallback_at(Path::new("ddh.xlsx"), at(), |p| {
            calls += 1;
            Err(TableIoError::Encode {
                path: p.to_path_buf(),
                message: "bad".into(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, TableIoError::Encode { .. }));
        assert_eq!(calls, 1);
    }

    #[test]
    fn writes_real_file_when_unlocked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = Table::from_rows(&["MasterNo"], vec![vec!["M1".into()]]);
        let saved = save_with_fallback(&table, &path).unwrap();
        assert_eq!(saved.path, path);
        assert!(path.exists());
    }
}
