//! Withdrawal Queue Service - Core business logic
//!
//! Owns the [`WithdrawalLedger`] aggregate and the planner, and drives the
//! payout sink on claims. Queue mutations happen under the write lock;
//! the payout transfer runs after the lock is released, and a failed
//! transfer rolls the claim back.

use crate::domain::planner::{FinalizationPlan, FinalizationPlanner, PlannerConfig};
use crate::domain::queue::WithdrawalLedger;
use crate::domain::request::RequestStatus;
use crate::error::QueueResult;
use crate::ports::inbound::{QueueInfo, WithdrawalQueueApi};
use crate::ports::outbound::PayoutSink;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, CheckpointIndex, RequestId, Timestamp};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Withdrawal Queue configuration.
#[derive(Clone, Debug, Default)]
pub struct QueueConfig {
    pub planner: PlannerConfig,
}

/// Withdrawal Queue Service implementation.
pub struct WithdrawalQueueService<P>
where
    P: PayoutSink,
{
    planner: FinalizationPlanner,
    state: Arc<RwLock<WithdrawalLedger>>,
    payout: Arc<P>,
}

impl<P> WithdrawalQueueService<P>
where
    P: PayoutSink,
{
    pub fn new(config: QueueConfig, payout: Arc<P>) -> Self {
        Self {
            planner: FinalizationPlanner::new(config.planner),
            state: Arc::new(RwLock::new(WithdrawalLedger::new())),
            payout,
        }
    }

    /// Cash the queue still needs on top of what claims already consumed.
    pub fn locked_value(&self) -> u128 {
        self.state.read().locked_value()
    }
}

#[async_trait]
impl<P> WithdrawalQueueApi for WithdrawalQueueService<P>
where
    P: PayoutSink,
{
    async fn request_withdrawal(
        &self,
        owner: Address,
        value: u128,
        shares: u128,
        now: Timestamp,
    ) -> QueueResult<RequestId> {
        let id = self.state.write().enqueue(value, shares, owner, now)?;
        info!(id, value, shares, "withdrawal request enqueued");
        Ok(id)
    }

    async fn plan_finalization(
        &self,
        budget: u128,
        share_rate_e27: u128,
        now: Timestamp,
    ) -> QueueResult<Option<FinalizationPlan>> {
        let state = self.state.read();
        self.planner.plan(&state, budget, share_rate_e27, now)
    }

    async fn finalize(
        &self,
        next_request_id: RequestId,
        value_amount: u128,
    ) -> QueueResult<Option<CheckpointIndex>> {
        let appended = self.state.write().finalize(next_request_id, value_amount)?;
        info!(
            next_request_id,
            value_amount,
            checkpoint = ?appended,
            "finalization batch committed"
        );
        Ok(appended)
    }

    async fn claim(
        &self,
        id: RequestId,
        hint: CheckpointIndex,
        caller: Address,
        recipient: Address,
    ) -> QueueResult<u128> {
        let payout = self.state.write().claim(id, hint, &caller)?;

        // the sink call runs without the lock held; undo on failure
        if let Err(err) = self.payout.transfer(recipient, payout).await {
            warn!(id, payout, %err, "payout failed, reverting claim");
            self.state.write().revert_claim(id, payout);
            return Err(err);
        }
        info!(id, payout, "request claimed");
        Ok(payout)
    }

    async fn find_checkpoint_hint(
        &self,
        id: RequestId,
        search_start: CheckpointIndex,
        search_end: CheckpointIndex,
    ) -> QueueResult<Option<CheckpointIndex>> {
        self.state
            .read()
            .find_checkpoint_hint(id, search_start, search_end)
    }

    async fn transfer_request(
        &self,
        id: RequestId,
        caller: Address,
        new_owner: Address,
    ) -> QueueResult<()> {
        self.state.write().transfer_request(id, &caller, new_owner)?;
        debug!(id, "request transferred");
        Ok(())
    }

    async fn request_status(&self, id: RequestId) -> QueueResult<RequestStatus> {
        self.state.read().status(id)
    }

    async fn requests_of(&self, owner: Address) -> Vec<RequestId> {
        self.state.read().requests_of(&owner)
    }

    async fn queue_info(&self) -> QueueInfo {
        let state = self.state.read();
        QueueInfo {
            last_request_id: state.last_request_id(),
            last_finalized_request_id: state.last_finalized_request_id(),
            last_checkpoint_index: state.last_checkpoint_index(),
            locked_value: state.locked_value(),
            unfinalized_value: state.unfinalized_value(),
        }
    }
}
