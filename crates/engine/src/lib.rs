//! `coresync-engine`: in-memory tables for drill-core record sheets.
//!
//! No IO. Loaders live in `coresync-io`, pipeline stages in `coresync-recon`.

pub mod cell;
pub mod columns;
pub mod table;

pub use cell::{CellKey, CellValue};
pub use columns::{find_column, normalize_column_name};
pub use table::Table;
