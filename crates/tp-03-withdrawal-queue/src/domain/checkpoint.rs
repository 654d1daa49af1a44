//! Discount checkpoint history
//!
//! A sparse, append-only list recording the settlement discount factor
//! effective from a given request id onward. A new entry is appended only
//! when the factor changes, so an all-cash history never grows past the
//! sentinel and every claim resolves through it at [`NO_DISCOUNT`].
//!
//! Lookup is a binary search over a caller-restricted window: a caller who
//! already knows an approximate position (e.g. from a prior claim) searches
//! a small window for amortized O(1) across sequential claims.

use serde::{Deserialize, Serialize};
use shared_types::{CheckpointIndex, RequestId, E27};

/// Fixed-point base of the discount factor: 1e27 == no discount.
pub const PRECISION: u128 = E27;

/// Factor meaning the batch was settled at full requested value.
pub const NO_DISCOUNT: u128 = PRECISION;

/// One checkpoint: `discount_factor` applies from `from_request_id` until
/// the next checkpoint's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCheckpoint {
    /// First request id this discount applies to.
    pub from_request_id: RequestId,
    /// Fixed-point ratio scaled by [`PRECISION`]; 0 means total loss.
    pub discount_factor: u128,
}

/// Append-only checkpoint sequence, 1-indexed with a `{0, 0}` sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHistory {
    checkpoints: Vec<DiscountCheckpoint>,
}

impl Default for CheckpointHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointHistory {
    pub fn new() -> Self {
        Self {
            checkpoints: vec![DiscountCheckpoint {
                from_request_id: 0,
                discount_factor: 0,
            }],
        }
    }

    /// Index of the most recent checkpoint (0 when only the sentinel
    /// exists).
    pub fn last_index(&self) -> CheckpointIndex {
        (self.checkpoints.len() - 1) as CheckpointIndex
    }

    pub fn get(&self, index: CheckpointIndex) -> Option<&DiscountCheckpoint> {
        self.checkpoints.get(index as usize)
    }

    /// The factor a claim resolves through `index`: the sentinel stands
    /// for full settlement, real checkpoints carry their stored factor.
    pub fn effective_factor(&self, index: CheckpointIndex) -> u128 {
        if index == 0 {
            NO_DISCOUNT
        } else {
            self.checkpoints[index as usize].discount_factor
        }
    }

    fn last_effective_factor(&self) -> u128 {
        self.effective_factor(self.last_index())
    }

    /// Records the factor for requests from `from_request_id` onward.
    /// Appends only on change; returns the new index when appended.
    ///
    /// `from_request_id` must be strictly greater than the last recorded
    /// start - guaranteed by finalization advancing monotonically.
    pub fn record(
        &mut self,
        from_request_id: RequestId,
        discount_factor: u128,
    ) -> Option<CheckpointIndex> {
        if discount_factor == self.last_effective_factor() {
            return None;
        }
        debug_assert!(
            from_request_id
                > self.checkpoints[self.last_index() as usize].from_request_id
                || self.last_index() == 0
        );
        self.checkpoints.push(DiscountCheckpoint {
            from_request_id,
            discount_factor,
        });
        Some(self.last_index())
    }

    /// Whether `hint`'s range actually contains `request_id`.
    pub fn hint_covers(&self, hint: CheckpointIndex, request_id: RequestId) -> bool {
        let Some(checkpoint) = self.get(hint) else {
            return false;
        };
        if checkpoint.from_request_id > request_id {
            return false;
        }
        match self.get(hint + 1) {
            Some(next) => next.from_request_id > request_id,
            None => true,
        }
    }

    /// Binary search for the checkpoint whose range contains `request_id`,
    /// restricted to the window `[start, end]` (both valid indices).
    ///
    /// Returns `None` when the window's first checkpoint starts after the
    /// id, or when the window's right edge is too narrow to prove
    /// coverage - the caller must widen and retry.
    pub fn find_hint(
        &self,
        request_id: RequestId,
        start: CheckpointIndex,
        end: CheckpointIndex,
    ) -> Option<CheckpointIndex> {
        if self.checkpoints[start as usize].from_request_id > request_id {
            return None;
        }
        if request_id >= self.checkpoints[end as usize].from_request_id {
            // candidate is the window's right edge; only valid if its range
            // provably extends over the id
            return if self.hint_covers(end, request_id) {
                Some(end)
            } else {
                None
            };
        }

        // invariant: cp[lo].from <= request_id < cp[hi].from
        let mut lo = start;
        let mut hi = end;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.checkpoints[mid as usize].from_request_id <= request_id {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Some(lo)
    }
}
