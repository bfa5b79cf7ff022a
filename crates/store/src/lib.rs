//! Object-store client: shared by the upload commands.
//!
//! Blocking S3-compatible client (no Tokio runtime required): list, head,
//! batch delete, single-part put. No retries. No multipart. No progress bars.

mod client;
mod credentials;
mod error;
mod signing;
mod xml;

use std::path::Path;

pub use client::{S3Client, DEFAULT_REGION};
pub use credentials::Credentials;
pub use error::StoreError;

/// The object-store operations the upload jobs rely on.
pub trait ObjectStore {
    /// Immediate "folders" under `prefix` (delimiter `/`), each ending in `/`.
    fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Every key under `prefix`, in listing order.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// `Ok(false)` only for a 404; any other failure is an error.
    fn head(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete every object under `prefix`. Returns how many were deleted.
    fn delete_prefix(&self, prefix: &str) -> Result<usize, StoreError>;

    fn upload(&self, path: &Path, key: &str) -> Result<(), StoreError>;
}
