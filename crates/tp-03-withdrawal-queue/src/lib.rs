//! # tp-03-withdrawal-queue
//!
//! Withdrawal Queue: checkpointed FIFO exit queue for the liquid-staking
//! pool.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **FIFO request queue**: append-only, 1-indexed requests carrying
//!   cumulative value/share sums, so any batch totals are a difference of
//!   two loads
//! - **Sparse discount checkpoints**: finalization records the settlement
//!   discount only when it changes; an always-solvent history never grows
//!   past the sentinel
//! - **Hinted claims**: claims resolve their discount through a checkpoint
//!   hint, validated and discoverable by windowed binary search
//! - **Finalization planning**: the largest batch satisfying both the cash
//!   budget and the minimum request age, via two monotonic searches
//!
//! ## Example
//!
//! ```rust,ignore
//! use tp_03_withdrawal_queue::{QueueConfig, WithdrawalQueueService};
//! use tp_03_withdrawal_queue::ports::inbound::WithdrawalQueueApi;
//!
//! let queue = WithdrawalQueueService::new(QueueConfig::default(), vault);
//! let id = queue.request_withdrawal(owner, value, shares, now).await?;
//! if let Some(plan) = queue.plan_finalization(budget, rate, now).await? {
//!     queue.finalize(plan.next_request_id, plan.value_to_lock).await?;
//! }
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{
    CheckpointHistory, DiscountCheckpoint, FinalizationPlan, FinalizationPlanner, PlannerConfig,
    RequestStatus, WithdrawalLedger, WithdrawalRequest, NO_DISCOUNT, PRECISION,
};
pub use error::{QueueError, QueueResult};
pub use ports::inbound::{QueueInfo, WithdrawalQueueApi};
pub use ports::outbound::PayoutSink;
pub use service::{QueueConfig, WithdrawalQueueService};
