//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                               |
//! |---------|-----------|-------------------------------------------|
//! | 0       | Universal | Success                                   |
//! | 1       | Universal | General error (unspecified)               |
//! | 2       | Universal | CLI usage error (bad args)                |
//! | 3-9     | local     | Input, output and config codes            |
//! | 10-19   | upload    | Object-store credentials and request codes |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use coresync_io::TableIoError;
use coresync_store::StoreError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Local files (3-9)
// =============================================================================

/// An input table or local folder is missing, unreadable, or has no header row.
pub const EXIT_INPUT: u8 = 3;

/// The updated table could not be written (canonical and fallback path).
pub const EXIT_OUTPUT: u8 = 4;

/// Config file unreadable, unparseable, or invalid.
pub const EXIT_CONFIG: u8 = 5;

// =============================================================================
// Upload (10-19)
// =============================================================================

/// Credentials file missing or not `access_key, secret_key`.
pub const EXIT_CREDENTIALS: u8 = 10;

/// Object-store request failed (listing, network, HTTP error).
pub const EXIT_STORE: u8 = 11;

/// Map a table load/save error to its exit code.
pub fn table_io_exit_code(err: &TableIoError, writing: bool) -> u8 {
    match err {
        TableIoError::Write { .. } | TableIoError::Encode { .. } => EXIT_OUTPUT,
        TableIoError::UnsupportedFormat(_) if writing => EXIT_OUTPUT,
        _ => EXIT_INPUT,
    }
}

/// Map an object-store error to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::Credentials { .. } => EXIT_CREDENTIALS,
        _ => EXIT_STORE,
    }
}
