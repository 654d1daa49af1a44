//! Report Processor Service - Core business logic
//!
//! Consumes externally validated oracle reports and turns them into one
//! atomic ledger commit: the pool value delta, the requested share burn,
//! and the dilutive fee mints. The processor itself only validates
//! structural sanity - report authenticity is the oracle-consensus
//! collaborator's job.
//!
//! Any failure aborts with no state mutation: the ledger sees either the
//! whole application or nothing, and the phase machine returns to `Idle`.

use crate::domain::{FeePolicy, ProcessingPhase};
use crate::error::{ReportError, ReportResult};
use crate::ports::inbound::{ReportOutcome, ReportProcessorApi};
use crate::ports::outbound::{
    FeeAllocation, LedgerGateway, OperatorRegistry, ReportApplication,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Report, ReferencePeriod, Timestamp};
use std::sync::Arc;
use tracing::{info, warn};

/// Report processing configuration.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Fee parameters applied to reported profit.
    pub fee_policy: FeePolicy,
    /// Maximum age of the reported state relative to the caller's clock.
    pub max_report_staleness_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fee_policy: FeePolicy {
                fee_basis_points: 1_000,
                operator_split_bps: 5_000,
                treasury: [0xFE; 20],
                burner: [0xFD; 20],
            },
            max_report_staleness_secs: 86_400,
        }
    }
}

struct ProcessorState {
    phase: ProcessingPhase,
    last_ref_period: Option<ReferencePeriod>,
    /// Validator balance recorded by the last accepted report; the next
    /// report's delta is measured against it.
    last_validator_balance: u128,
}

/// Report Processor Service implementation.
pub struct ReportProcessorService<L, R>
where
    L: LedgerGateway,
    R: OperatorRegistry,
{
    config: ReportConfig,
    state: Arc<RwLock<ProcessorState>>,
    ledger: Arc<L>,
    registry: Arc<R>,
}

impl<L, R> ReportProcessorService<L, R>
where
    L: LedgerGateway,
    R: OperatorRegistry,
{
    pub fn new(config: ReportConfig, ledger: Arc<L>, registry: Arc<R>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ProcessorState {
                phase: ProcessingPhase::Idle,
                last_ref_period: None,
                last_validator_balance: 0,
            })),
            ledger,
            registry,
        }
    }

    /// Phase `Idle -> ReportAccepted`: structural sanity that needs no
    /// ledger access. Leaves the machine in `Idle` on rejection.
    fn accept(&self, report: &Report, now: Timestamp) -> ReportResult<()> {
        let mut state = self.state.write();
        if let Some(last) = state.last_ref_period {
            if report.ref_period <= last {
                return Err(ReportError::StaleReport {
                    last,
                    got: report.ref_period,
                });
            }
        }
        let age_secs = now.saturating_sub(report.reported_at);
        if age_secs > self.config.max_report_staleness_secs {
            return Err(ReportError::StaleData {
                age_secs,
                max_secs: self.config.max_report_staleness_secs,
            });
        }
        state.phase = state.phase.transition(ProcessingPhase::ReportAccepted)?;
        info!(
            ref_period = report.ref_period,
            reported_validator_balance = report.reported_validator_balance,
            "report accepted"
        );
        Ok(())
    }

    /// Phases `ReportAccepted -> Distributing -> commit`. Caller resets the
    /// machine on error.
    async fn run(&self, report: &Report) -> ReportResult<ReportOutcome> {
        let policy = self.config.fee_policy;
        let snapshot = self.ledger.snapshot(policy.burner).await?;

        if report.burn_requested_shares > snapshot.burner_shares {
            return Err(ReportError::SanityCheck {
                reason: format!(
                    "burn request {} exceeds burner shares {}",
                    report.burn_requested_shares, snapshot.burner_shares
                ),
            });
        }

        let net_value_change = self.net_value_change(report, snapshot.staked_since_report)?;
        let profit = if net_value_change > 0 {
            net_value_change as u128
        } else {
            0
        };
        let split = policy.split(profit)?;

        {
            let mut state = self.state.write();
            state.phase = state.phase.transition(ProcessingPhase::Distributing)?;
        }

        let allocations = self.registry.distribute_fees(split.operator_fee).await?;
        let mut allocated: u128 = 0;
        for allocation in &allocations {
            allocated = allocated
                .checked_add(allocation.value)
                .ok_or(ReportError::ArithmeticOverflow)?;
        }
        if allocated > split.operator_fee {
            return Err(ReportError::SanityCheck {
                reason: format!(
                    "registry allocated {} of an operator budget of {}",
                    allocated, split.operator_fee
                ),
            });
        }

        // allocation dust joins the treasury portion
        let mut fee_mints = allocations;
        let treasury_value = split.treasury_fee + (split.operator_fee - allocated);
        if treasury_value > 0 {
            fee_mints.push(FeeAllocation {
                recipient: policy.treasury,
                value: treasury_value,
            });
        }

        let burn = (report.burn_requested_shares > 0)
            .then_some((policy.burner, report.burn_requested_shares));
        let committed = self
            .ledger
            .commit(ReportApplication {
                net_value_change,
                burn,
                fee_mints,
            })
            .await?;

        Ok(ReportOutcome {
            ref_period: report.ref_period,
            net_value_change,
            total_fee: split.total_fee,
            operator_fee: split.operator_fee,
            treasury_fee: split.treasury_fee,
            fee_shares_minted: committed.fee_shares_minted,
            total_shares: committed.total_shares,
            total_pooled_value: committed.total_pooled_value,
            withdrawal_vault_inflow: report.withdrawal_vault_inflow,
        })
    }

    /// Signed pool delta for this report.
    ///
    /// The vault inflow already left the validator set (the reported
    /// balance dropped by it), so it is added back: until finalization
    /// removes it, that cash still backs the shares. Principal staked
    /// since the last report raised the reported balance without any value
    /// entering the system, so the baseline grows by it.
    fn net_value_change(&self, report: &Report, staked_since_report: u128) -> ReportResult<i128> {
        let last = self.state.read().last_validator_balance;
        let reported =
            i128::try_from(report.reported_validator_balance).map_err(|_| ReportError::ArithmeticOverflow)?;
        let last = i128::try_from(last).map_err(|_| ReportError::ArithmeticOverflow)?;
        let staked =
            i128::try_from(staked_since_report).map_err(|_| ReportError::ArithmeticOverflow)?;
        let rewards =
            i128::try_from(report.el_rewards_collected).map_err(|_| ReportError::ArithmeticOverflow)?;
        let inflow = i128::try_from(report.withdrawal_vault_inflow)
            .map_err(|_| ReportError::ArithmeticOverflow)?;

        reported
            .checked_sub(last)
            .and_then(|d| d.checked_sub(staked))
            .and_then(|d| d.checked_add(rewards))
            .and_then(|d| d.checked_add(inflow))
            .ok_or(ReportError::ArithmeticOverflow)
    }
}

#[async_trait]
impl<L, R> ReportProcessorApi for ReportProcessorService<L, R>
where
    L: LedgerGateway,
    R: OperatorRegistry,
{
    async fn process_report(&self, report: Report, now: Timestamp) -> ReportResult<ReportOutcome> {
        self.accept(&report, now)?;
        match self.run(&report).await {
            Ok(outcome) => {
                let mut state = self.state.write();
                state.phase = state.phase.transition(ProcessingPhase::Idle)?;
                state.last_ref_period = Some(report.ref_period);
                state.last_validator_balance = report.reported_validator_balance;
                info!(
                    ref_period = report.ref_period,
                    net_value_change = outcome.net_value_change,
                    total_fee = outcome.total_fee,
                    "report processed"
                );
                Ok(outcome)
            }
            Err(err) => {
                // abort path: nothing was committed, return to Idle
                let mut state = self.state.write();
                state.phase = ProcessingPhase::Idle;
                warn!(ref_period = report.ref_period, error = %err, "report aborted");
                Err(err)
            }
        }
    }

    async fn phase(&self) -> ProcessingPhase {
        self.state.read().phase
    }
}
