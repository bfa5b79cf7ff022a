use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableIoError {
    /// Input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Extension is not a supported table format (or not writable).
    #[error("unsupported table format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// File exists but could not be opened or parsed.
    #[error("cannot read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },
    /// File parsed but has no header row.
    #[error("{} has no header row", .0.display())]
    MissingHeader(PathBuf),
    /// OS-level failure writing the destination.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Serializer failure unrelated to the filesystem.
    #[error("cannot encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },
}

impl TableIoError {
    /// True when the destination is locked or not writable by this process,
    /// e.g. the workbook is open in Excel.
    pub fn is_locked(&self) -> bool {
        match self {
            TableIoError::Write { source, .. } => is_lock_error(source),
            _ => false,
        }
    }
}

pub(crate) fn is_lock_error(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::PermissionDenied {
        return true;
    }
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}
