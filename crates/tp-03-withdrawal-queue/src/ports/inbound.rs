//! Driving Ports (API - Inbound Operations)

use crate::domain::planner::FinalizationPlan;
use crate::domain::request::RequestStatus;
use crate::error::QueueResult;
use async_trait::async_trait;
use shared_types::{Address, CheckpointIndex, RequestId, Timestamp};

/// Snapshot of the queue's cursors and totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueInfo {
    pub last_request_id: RequestId,
    pub last_finalized_request_id: RequestId,
    pub last_checkpoint_index: CheckpointIndex,
    pub locked_value: u128,
    pub unfinalized_value: u128,
}

/// Public API of the Withdrawal Queue subsystem.
#[async_trait]
pub trait WithdrawalQueueApi: Send + Sync {
    /// Enqueue a withdrawal of `value` backed by `shares`.
    async fn request_withdrawal(
        &self,
        owner: Address,
        value: u128,
        shares: u128,
        now: Timestamp,
    ) -> QueueResult<RequestId>;

    /// Plan the next finalization batch under `budget` at the current
    /// rate. `None` when nothing is finalizable yet.
    async fn plan_finalization(
        &self,
        budget: u128,
        share_rate_e27: u128,
        now: Timestamp,
    ) -> QueueResult<Option<FinalizationPlan>>;

    /// Commit a planned batch; returns the appended checkpoint index, if
    /// the discount changed.
    async fn finalize(
        &self,
        next_request_id: RequestId,
        value_amount: u128,
    ) -> QueueResult<Option<CheckpointIndex>>;

    /// Claim a finalized request through `hint`, paying `recipient`. Only
    /// the owner may claim.
    async fn claim(
        &self,
        id: RequestId,
        hint: CheckpointIndex,
        caller: Address,
        recipient: Address,
    ) -> QueueResult<u128>;

    /// Resolve the checkpoint hint for `id` within `[start, end]`.
    async fn find_checkpoint_hint(
        &self,
        id: RequestId,
        search_start: CheckpointIndex,
        search_end: CheckpointIndex,
    ) -> QueueResult<Option<CheckpointIndex>>;

    /// Hand an unclaimed request to a new owner.
    async fn transfer_request(
        &self,
        id: RequestId,
        caller: Address,
        new_owner: Address,
    ) -> QueueResult<()>;

    /// Derived status of one request.
    async fn request_status(&self, id: RequestId) -> QueueResult<RequestStatus>;

    /// Request ids owned by `owner`.
    async fn requests_of(&self, owner: Address) -> Vec<RequestId>;

    /// Cursor and totals snapshot.
    async fn queue_info(&self) -> QueueInfo;
}
