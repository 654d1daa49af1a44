//! # Command Loop
//!
//! Every mutation enters through one mpsc channel and is executed by a
//! single task, so cross-subsystem flows (escrow-then-enqueue,
//! finalize-then-settle) never interleave. Queries ride the same channel
//! and observe a consistent point in the serial order.

use std::sync::Arc;

use shared_types::{Address, CheckpointIndex, Report, RequestId, Timestamp};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::container::PoolContainer;
use tp_01_share_ledger::{LedgerError, LedgerTotals, ShareLedgerApi};
use tp_02_report_processing::ports::inbound::{ReportOutcome, ReportProcessorApi};
use tp_02_report_processing::ReportError;
use tp_03_withdrawal_queue::{
    FinalizationPlan, QueueError, QueueInfo, RequestStatus, WithdrawalQueueApi,
};

/// Errors surfaced by runtime command execution.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The command loop is gone; the runtime is shutting down.
    #[error("Runtime unavailable: {0}")]
    Unavailable(&'static str),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// One operation for the writer loop.
pub enum Command {
    SubmitDeposit {
        owner: Address,
        value: u128,
        reply: oneshot::Sender<RuntimeResult<u128>>,
    },
    ApproveDeposit {
        guardian: Address,
        reply: oneshot::Sender<RuntimeResult<()>>,
    },
    StakeBuffered {
        amount: u128,
        reply: oneshot::Sender<RuntimeResult<u128>>,
    },
    SubmitReport {
        report: Report,
        now: Timestamp,
        reply: oneshot::Sender<RuntimeResult<ReportOutcome>>,
    },
    RequestWithdrawal {
        owner: Address,
        value: u128,
        now: Timestamp,
        reply: oneshot::Sender<RuntimeResult<RequestId>>,
    },
    RunFinalization {
        now: Timestamp,
        reply: oneshot::Sender<RuntimeResult<Option<FinalizationPlan>>>,
    },
    Claim {
        id: RequestId,
        hint: Option<CheckpointIndex>,
        caller: Address,
        recipient: Address,
        reply: oneshot::Sender<RuntimeResult<u128>>,
    },
    TransferRequest {
        id: RequestId,
        caller: Address,
        new_owner: Address,
        reply: oneshot::Sender<RuntimeResult<()>>,
    },
    QueryBalance {
        owner: Address,
        reply: oneshot::Sender<u128>,
    },
    QueryTotals {
        reply: oneshot::Sender<LedgerTotals>,
    },
    QueryQueueInfo {
        reply: oneshot::Sender<QueueInfo>,
    },
    QueryRequestStatus {
        id: RequestId,
        reply: oneshot::Sender<RuntimeResult<RequestStatus>>,
    },
}

/// A command plus its correlation id for log tracing.
pub struct CommandEnvelope {
    pub correlation_id: Uuid,
    pub command: Command,
}

/// The single writer draining the command channel.
pub struct CommandExecutor {
    container: Arc<PoolContainer>,
    rx: mpsc::Receiver<CommandEnvelope>,
}

impl CommandExecutor {
    pub fn new(container: Arc<PoolContainer>, rx: mpsc::Receiver<CommandEnvelope>) -> Self {
        Self { container, rx }
    }

    /// Drains the channel until every sender is dropped.
    pub async fn run(mut self) {
        info!("command executor started");
        while let Some(envelope) = self.rx.recv().await {
            self.handle(envelope).await;
        }
        info!("command channel closed, executor stopping");
    }

    async fn handle(&self, envelope: CommandEnvelope) {
        let correlation_id = envelope.correlation_id;
        match envelope.command {
            Command::SubmitDeposit { owner, value, reply } => {
                let result = self
                    .container
                    .ledger
                    .submit_deposit(owner, value)
                    .await
                    .map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
            Command::ApproveDeposit { guardian, reply } => {
                let result = self
                    .container
                    .gate
                    .approve(guardian)
                    .map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
            Command::StakeBuffered { amount, reply } => {
                let result = self
                    .container
                    .ledger
                    .stake_buffered(amount)
                    .await
                    .map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
            Command::SubmitReport { report, now, reply } => {
                let _ = reply.send(self.submit_report(correlation_id, report, now).await);
            }
            Command::RequestWithdrawal {
                owner,
                value,
                now,
                reply,
            } => {
                let _ = reply.send(self.request_withdrawal(owner, value, now).await);
            }
            Command::RunFinalization { now, reply } => {
                let _ = reply.send(self.run_finalization(correlation_id, now).await);
            }
            Command::Claim {
                id,
                hint,
                caller,
                recipient,
                reply,
            } => {
                let _ = reply.send(self.claim(id, hint, caller, recipient).await);
            }
            Command::TransferRequest {
                id,
                caller,
                new_owner,
                reply,
            } => {
                let result = self
                    .container
                    .queue
                    .transfer_request(id, caller, new_owner)
                    .await
                    .map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
            Command::QueryBalance { owner, reply } => {
                let _ = reply.send(self.container.ledger.balance_of(owner).await);
            }
            Command::QueryTotals { reply } => {
                let _ = reply.send(self.container.ledger.totals().await);
            }
            Command::QueryQueueInfo { reply } => {
                let _ = reply.send(self.container.queue.queue_info().await);
            }
            Command::QueryRequestStatus { id, reply } => {
                let result = self
                    .container
                    .queue
                    .request_status(id)
                    .await
                    .map_err(RuntimeError::from);
                let _ = reply.send(result);
            }
        }
    }

    /// Processes a report, then credits the vault with the cash the report
    /// says arrived for withdrawals.
    async fn submit_report(
        &self,
        correlation_id: Uuid,
        report: Report,
        now: Timestamp,
    ) -> RuntimeResult<ReportOutcome> {
        let outcome = self.container.processor.process_report(report, now).await?;
        if outcome.withdrawal_vault_inflow > 0 {
            self.container.vault.credit(outcome.withdrawal_vault_inflow);
        }
        info!(
            %correlation_id,
            ref_period = outcome.ref_period,
            net_value_change = outcome.net_value_change,
            vault_inflow = outcome.withdrawal_vault_inflow,
            "report processed"
        );
        Ok(outcome)
    }

    /// Escrows the backing shares into the reserve, then enqueues. A failed
    /// enqueue returns the shares to the owner.
    async fn request_withdrawal(
        &self,
        owner: Address,
        value: u128,
        now: Timestamp,
    ) -> RuntimeResult<RequestId> {
        let reserve = self.container.config.runtime.withdrawal_reserve;
        let shares = self.container.ledger.value_to_shares(value)?;
        self.container.ledger.escrow_shares(owner, reserve, shares)?;

        match self
            .container
            .queue
            .request_withdrawal(owner, value, shares, now)
            .await
        {
            Ok(id) => Ok(id),
            Err(err) => {
                if let Err(revert) = self.container.ledger.escrow_shares(reserve, owner, shares) {
                    // reserve shares cannot vanish between the two calls on
                    // the single-writer loop
                    error!(%revert, "failed to return escrowed shares");
                }
                Err(err.into())
            }
        }
    }

    /// Plans and commits one finalization batch: the budget is the vault
    /// cash not yet locked, the queue locks its slice and the ledger burns
    /// the reserve's backing shares.
    async fn run_finalization(
        &self,
        correlation_id: Uuid,
        now: Timestamp,
    ) -> RuntimeResult<Option<FinalizationPlan>> {
        let rate = self.container.ledger.share_rate_e27().await?;
        let locked = self.container.queue.queue_info().await.locked_value;
        let budget = self.container.vault.available().saturating_sub(locked);

        let Some(plan) = self
            .container
            .queue
            .plan_finalization(budget, rate, now)
            .await?
        else {
            return Ok(None);
        };

        self.container
            .queue
            .finalize(plan.next_request_id, plan.value_to_lock)
            .await?;
        if let Err(err) = self.container.ledger.settle_withdrawals(
            self.container.config.runtime.withdrawal_reserve,
            plan.shares_to_burn,
            plan.value_to_lock,
        ) {
            // the queue already advanced; this indicates reserve accounting
            // drift and needs operator attention
            error!(%correlation_id, %err, "ledger settlement failed after finalize");
            return Err(err.into());
        }
        info!(
            %correlation_id,
            next_request_id = plan.next_request_id,
            value_locked = plan.value_to_lock,
            shares_burned = plan.shares_to_burn,
            "finalization batch settled"
        );
        Ok(Some(plan))
    }

    /// Claims a request; a missing hint is resolved over the full
    /// checkpoint history first.
    async fn claim(
        &self,
        id: RequestId,
        hint: Option<CheckpointIndex>,
        caller: Address,
        recipient: Address,
    ) -> RuntimeResult<u128> {
        let hint = match hint {
            Some(hint) => hint,
            None => {
                let last = self.container.queue.queue_info().await.last_checkpoint_index;
                self.container
                    .queue
                    .find_checkpoint_hint(id, 0, last)
                    .await?
                    // the full window resolves every finalized id
                    .ok_or(QueueError::InvalidHint { hint: 0 })?
            }
        };
        let payout = self.container.queue.claim(id, hint, caller, recipient).await?;
        Ok(payout)
    }
}

/// Cloneable client side of the command channel.
#[derive(Clone)]
pub struct PoolHandle {
    tx: mpsc::Sender<CommandEnvelope>,
}

impl PoolHandle {
    pub fn new(tx: mpsc::Sender<CommandEnvelope>) -> Self {
        Self { tx }
    }

    async fn dispatch<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<RuntimeResult<T>>) -> Command,
    ) -> RuntimeResult<T> {
        let (reply, rx) = oneshot::channel();
        let envelope = CommandEnvelope {
            correlation_id: Uuid::new_v4(),
            command: build(reply),
        };
        if self.tx.send(envelope).await.is_err() {
            warn!("command channel closed");
            return Err(RuntimeError::Unavailable("command channel closed"));
        }
        rx.await
            .map_err(|_| RuntimeError::Unavailable("executor dropped the reply"))?
    }

    async fn query<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> RuntimeResult<T> {
        let (reply, rx) = oneshot::channel();
        let envelope = CommandEnvelope {
            correlation_id: Uuid::new_v4(),
            command: build(reply),
        };
        if self.tx.send(envelope).await.is_err() {
            return Err(RuntimeError::Unavailable("command channel closed"));
        }
        rx.await
            .map_err(|_| RuntimeError::Unavailable("executor dropped the reply"))
    }

    pub async fn submit_deposit(&self, owner: Address, value: u128) -> RuntimeResult<u128> {
        self.dispatch(|reply| Command::SubmitDeposit { owner, value, reply })
            .await
    }

    pub async fn approve_deposit(&self, guardian: Address) -> RuntimeResult<()> {
        self.dispatch(|reply| Command::ApproveDeposit { guardian, reply })
            .await
    }

    pub async fn stake_buffered(&self, amount: u128) -> RuntimeResult<u128> {
        self.dispatch(|reply| Command::StakeBuffered { amount, reply })
            .await
    }

    pub async fn submit_report(&self, report: Report, now: Timestamp) -> RuntimeResult<ReportOutcome> {
        self.dispatch(|reply| Command::SubmitReport { report, now, reply })
            .await
    }

    pub async fn request_withdrawal(
        &self,
        owner: Address,
        value: u128,
        now: Timestamp,
    ) -> RuntimeResult<RequestId> {
        self.dispatch(|reply| Command::RequestWithdrawal {
            owner,
            value,
            now,
            reply,
        })
        .await
    }

    pub async fn run_finalization(&self, now: Timestamp) -> RuntimeResult<Option<FinalizationPlan>> {
        self.dispatch(|reply| Command::RunFinalization { now, reply })
            .await
    }

    pub async fn claim(
        &self,
        id: RequestId,
        hint: Option<CheckpointIndex>,
        caller: Address,
        recipient: Address,
    ) -> RuntimeResult<u128> {
        self.dispatch(|reply| Command::Claim {
            id,
            hint,
            caller,
            recipient,
            reply,
        })
        .await
    }

    pub async fn transfer_request(
        &self,
        id: RequestId,
        caller: Address,
        new_owner: Address,
    ) -> RuntimeResult<()> {
        self.dispatch(|reply| Command::TransferRequest {
            id,
            caller,
            new_owner,
            reply,
        })
        .await
    }

    pub async fn balance_of(&self, owner: Address) -> RuntimeResult<u128> {
        self.query(|reply| Command::QueryBalance { owner, reply }).await
    }

    pub async fn totals(&self) -> RuntimeResult<LedgerTotals> {
        self.query(|reply| Command::QueryTotals { reply }).await
    }

    pub async fn queue_info(&self) -> RuntimeResult<QueueInfo> {
        self.query(|reply| Command::QueryQueueInfo { reply }).await
    }

    pub async fn request_status(&self, id: RequestId) -> RuntimeResult<RequestStatus> {
        self.dispatch(|reply| Command::QueryRequestStatus { id, reply })
            .await
    }
}
