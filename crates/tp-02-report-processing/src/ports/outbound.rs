//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::ReportResult;
use async_trait::async_trait;
use shared_types::Address;

/// Read snapshot of the ledger, taken before any mutation is planned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub total_shares: u128,
    pub total_pooled_value: u128,
    /// Shares currently held by the burner account.
    pub burner_shares: u128,
    /// Principal moved to the validator set since the last applied report.
    /// The reported balance includes it, so it is not profit.
    pub staked_since_report: u128,
}

/// One fee mint: `recipient` receives shares worth `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeAllocation {
    pub recipient: Address,
    pub value: u128,
}

/// The full effect of one accepted report, committed atomically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportApplication {
    /// Signed pool value change (rewards minus losses).
    pub net_value_change: i128,
    /// Shares to retire from the burner account, if any.
    pub burn: Option<(Address, u128)>,
    /// Dilutive fee mints, applied in order.
    pub fee_mints: Vec<FeeAllocation>,
}

/// Ledger state after a committed report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommittedReport {
    pub total_shares: u128,
    pub total_pooled_value: u128,
    pub fee_shares_minted: u128,
}

/// Share Ledger seam: snapshot for sanity checks, single atomic commit.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Current totals plus the burner account's shares.
    async fn snapshot(&self, burner: Address) -> ReportResult<LedgerSnapshot>;

    /// Apply the whole report effect all-or-nothing.
    async fn commit(&self, application: ReportApplication) -> ReportResult<CommittedReport>;
}

/// Node-operator registry seam.
///
/// The registry owns recipient weighting; report processing treats the
/// allocation as opaque and only checks it does not exceed the budget.
#[async_trait]
pub trait OperatorRegistry: Send + Sync {
    /// Allocate the operator fee budget across operator recipients.
    async fn distribute_fees(&self, total_operator_fee: u128) -> ReportResult<Vec<FeeAllocation>>;
}
