//! Finalization planner
//!
//! Decides how far the finalization cursor may advance given the cash
//! budget and a minimum request age, by intersecting the two monotonic
//! boundary searches on the queue. Pure planning: the caller commits the
//! plan through [`WithdrawalLedger::finalize`].

use crate::domain::queue::WithdrawalLedger;
use crate::error::QueueResult;
use serde::{Deserialize, Serialize};
use shared_types::{RequestId, Timestamp};

/// Planner tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Requests younger than this are never finalized.
    pub min_request_age_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            // one day of cooldown before a request becomes finalizable
            min_request_age_secs: 86_400,
        }
    }
}

/// A committed-to-nothing description of the next finalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizationPlan {
    /// Finalize up to and including this id.
    pub next_request_id: RequestId,
    /// Cash to lock for the batch.
    pub value_to_lock: u128,
    /// Shares the batch releases for burning.
    pub shares_to_burn: u128,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FinalizationPlanner {
    config: PlannerConfig,
}

impl FinalizationPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Plans the largest batch that fits `budget` and only contains
    /// requests at least `min_request_age_secs` old at `now`. Returns
    /// `None` when no request satisfies both constraints.
    pub fn plan(
        &self,
        queue: &WithdrawalLedger,
        budget: u128,
        share_rate_e27: u128,
        now: Timestamp,
    ) -> QueueResult<Option<FinalizationPlan>> {
        let max_created_at = now.saturating_sub(self.config.min_request_age_secs);
        let Some(by_age) = queue.find_last_finalizable_by_timestamp(max_created_at) else {
            return Ok(None);
        };
        let Some(by_budget) = queue.find_last_finalizable_by_budget(budget, share_rate_e27)?
        else {
            return Ok(None);
        };

        let next_request_id = by_age.min(by_budget);
        let (value_to_lock, shares_to_burn) =
            queue.finalization_batch(next_request_id, share_rate_e27)?;
        Ok(Some(FinalizationPlan {
            next_request_id,
            value_to_lock,
            shares_to_burn,
        }))
    }
}
