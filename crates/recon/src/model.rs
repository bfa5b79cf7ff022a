use coresync_engine::Table;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRole {
    Primary,
    Secondary,
}

impl std::fmt::Display for TableRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedColumn {
    pub role: TableRole,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImputeOutcome {
    pub column: String,
    /// Missing cells counted before replacement.
    pub filled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSync {
    pub column: String,
    pub replacements: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// One entry per shared column, in sorted column order.
    pub columns: Vec<ColumnSync>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DedupOutcome {
    pub column: String,
    pub removed: usize,
    /// Distinct identifiers that had at least one later duplicate, first-seen order.
    pub duplicate_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Report + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub meta: ReportMeta,
    pub normalized: Vec<NormalizedColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imputation: Option<ImputeOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup: Option<DedupOutcome>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Sum of synchronization replacements (imputation and dedup not included).
    pub fn total_changes(&self) -> usize {
        self.sync.as_ref().map(|s| s.total).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub engine_version: String,
    pub run_at: String,
    pub primary_rows_in: usize,
    pub primary_rows_out: usize,
    pub secondary_rows: usize,
}

/// Reconciled primary table plus what was done to it.
#[derive(Debug, Clone)]
pub struct ReconOutput {
    pub table: Table,
    pub report: ValidationReport,
}
