//! # Core Domain Entities
//!
//! Defines the value types shared across the share ledger, report
//! processing, and withdrawal queue subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`
//! - **Time**: `Timestamp` (unix seconds, supplied by callers as a logical
//!   clock; the core never reads the wall clock itself)
//! - **Queue**: `RequestId`, `CheckpointIndex`
//! - **Oracle**: `Report`, `ReferencePeriod`

use serde::{Deserialize, Serialize};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 20-byte account address.
pub type Address = [u8; 20];

/// Unix timestamp in seconds. Always supplied by the caller; the accounting
/// core treats it as a logical clock and only ever compares values.
pub type Timestamp = u64;

/// Identifier of a withdrawal request. Requests are 1-indexed; 0 is the
/// zero-valued sentinel slot of the queue.
pub type RequestId = u64;

/// Index into the sparse discount-checkpoint sequence. Checkpoints are
/// 1-indexed; 0 is the sentinel checkpoint.
pub type CheckpointIndex = u64;

/// Oracle reference period. At most one report is accepted per period.
pub type ReferencePeriod = u64;

/// An externally validated oracle report.
///
/// Authenticity and quorum validation happen in the oracle-consensus
/// collaborator before this struct is handed to report processing; the
/// processor only performs structural sanity checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Reference period this report describes.
    pub ref_period: ReferencePeriod,
    /// When the reported state was observed.
    pub reported_at: Timestamp,
    /// Total balance currently held by the underlying validator set.
    pub reported_validator_balance: u128,
    /// Rewards collected from execution-layer sources since the last report.
    pub el_rewards_collected: u128,
    /// Cash that arrived in the withdrawal vault since the last report.
    pub withdrawal_vault_inflow: u128,
    /// Validators that have fully exited as of this report.
    pub exited_validator_count: u64,
    /// Shares the burner account asks to retire this period.
    pub burn_requested_shares: u128,
}
