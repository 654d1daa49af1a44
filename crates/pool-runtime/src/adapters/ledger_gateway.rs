//! # Ledger Gateway Adapter
//!
//! Connects report processing to the share ledger: snapshot reads plus the
//! single atomic commit.

use crate::adapters::guardian_gate::GuardianGateAdapter;
use async_trait::async_trait;
use shared_types::Address;
use std::sync::Arc;
use tp_01_share_ledger::{ShareLedgerApi, ShareLedgerService};
use tp_02_report_processing::ports::outbound::{
    CommittedReport, LedgerGateway, LedgerSnapshot, ReportApplication,
};
use tp_02_report_processing::{ReportError, ReportResult};

/// Report-processing view of the concrete ledger service.
pub struct LedgerGatewayAdapter {
    ledger: Arc<ShareLedgerService<GuardianGateAdapter>>,
}

impl LedgerGatewayAdapter {
    pub fn new(ledger: Arc<ShareLedgerService<GuardianGateAdapter>>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl LedgerGateway for LedgerGatewayAdapter {
    async fn snapshot(&self, burner: Address) -> ReportResult<LedgerSnapshot> {
        let totals = self.ledger.totals().await;
        Ok(LedgerSnapshot {
            total_shares: totals.total_shares,
            total_pooled_value: totals.total_pooled_value,
            burner_shares: self.ledger.shares_of(burner).await,
            staked_since_report: self.ledger.staked_since_report(),
        })
    }

    async fn commit(&self, application: ReportApplication) -> ReportResult<CommittedReport> {
        let fee_mints: Vec<(Address, u128)> = application
            .fee_mints
            .iter()
            .map(|mint| (mint.recipient, mint.value))
            .collect();
        let applied = self
            .ledger
            .apply_report(application.net_value_change, application.burn, &fee_mints)
            .map_err(|err| ReportError::LedgerFailure {
                reason: err.to_string(),
            })?;
        Ok(CommittedReport {
            total_shares: applied.total_shares,
            total_pooled_value: applied.total_pooled_value,
            fee_shares_minted: applied.fee_shares_minted,
        })
    }
}
