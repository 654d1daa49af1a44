//! Driving Ports (API - Inbound Operations)

use crate::domain::ProcessingPhase;
use crate::error::ReportResult;
use async_trait::async_trait;
use shared_types::{Report, Timestamp};

/// Outcome of a fully processed report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportOutcome {
    pub ref_period: u64,
    pub net_value_change: i128,
    pub total_fee: u128,
    pub operator_fee: u128,
    pub treasury_fee: u128,
    pub fee_shares_minted: u128,
    pub total_shares: u128,
    pub total_pooled_value: u128,
    /// Cash the report moved into the withdrawal vault; the runtime credits
    /// the vault with it on success.
    pub withdrawal_vault_inflow: u128,
}

/// Public API of the Report Processing subsystem.
#[async_trait]
pub trait ReportProcessorApi: Send + Sync {
    /// Process an externally validated report. `now` is the caller's
    /// logical clock, used only for staleness comparison.
    async fn process_report(&self, report: Report, now: Timestamp) -> ReportResult<ReportOutcome>;

    /// Current phase of the processing machine.
    async fn phase(&self) -> ProcessingPhase;
}
