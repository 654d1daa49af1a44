//! Error types for the Report Processing subsystem

use crate::domain::phase::ProcessingPhase;
use thiserror::Error;

/// Report processing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Report reference period not newer than the last accepted one
    #[error("Stale report: last accepted period {last}, got {got}")]
    StaleReport { last: u64, got: u64 },

    /// Reported state is older than the configured staleness bound
    #[error("Reported state too old: age {age_secs}s exceeds {max_secs}s")]
    StaleData { age_secs: u64, max_secs: u64 },

    /// Operation not allowed in the current processing phase
    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ProcessingPhase,
        to: ProcessingPhase,
    },

    /// Structural sanity check failed; the report is internally inconsistent
    #[error("Report sanity check failed: {reason}")]
    SanityCheck { reason: String },

    /// Ledger collaborator rejected or failed the commit
    #[error("Ledger gateway failure: {reason}")]
    LedgerFailure { reason: String },

    /// Operator registry collaborator failed
    #[error("Operator registry failure: {reason}")]
    RegistryFailure { reason: String },

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow in report processing")]
    ArithmeticOverflow,
}

/// Result type for report processing operations
pub type ReportResult<T> = Result<T, ReportError>;
