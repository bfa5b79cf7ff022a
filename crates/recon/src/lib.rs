//! `coresync-recon`: reconcile a primary drill-core table against a secondary one.
//!
//! Pure engine crate: receives loaded tables, returns the reconciled primary
//! table plus a report. No CLI or IO dependencies.

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod impute;
pub mod model;
pub mod normalize;
pub mod sync;

pub use config::ValidateConfig;
pub use engine::run;
pub use error::ReconError;
pub use model::{ReconOutput, TableRole, ValidationReport};
