//! # Withdrawal Ledger
//!
//! The queue aggregate: an append-only, 1-indexed request sequence with
//! cumulative sums, the sparse discount-checkpoint history, the owner
//! secondary index, and the finalization cursors.
//!
//! Cumulative sums make every range query a difference of two loads, and
//! the finalization boundary searches are monotonic-predicate binary
//! searches over `(last_finalized, last_request]`:
//!
//! - requested value for a prefix is non-decreasing in the boundary id
//! - `created_at` is non-decreasing in the request id
//!
//! ## Invariants
//!
//! - `last_finalized <= last_request_id` always
//! - `cumulative_value` / `cumulative_shares` non-decreasing in id
//! - checkpoint `from_request_id` strictly increasing
//! - `locked_value` covers every finalized-unclaimed payout

use crate::domain::checkpoint::{CheckpointHistory, NO_DISCOUNT, PRECISION};
use crate::domain::request::{RequestStatus, WithdrawalRequest};
use crate::error::{QueueError, QueueResult};
use serde::{Deserialize, Serialize};
use shared_types::{mul_div, Address, CheckpointIndex, RequestId, Timestamp};
use std::collections::{BTreeSet, HashMap};

/// The withdrawal queue aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalLedger {
    /// Requests, 1-indexed; index 0 is the zero sentinel.
    requests: Vec<WithdrawalRequest>,
    /// Sparse discount history.
    checkpoints: CheckpointHistory,
    /// Highest finalized request id.
    last_finalized: RequestId,
    /// Cash reserved for finalized-but-unclaimed requests.
    locked_value: u128,
    /// Owner -> request ids, for enumeration only; the request row is
    /// authoritative.
    by_owner: HashMap<Address, BTreeSet<RequestId>>,
}

impl Default for WithdrawalLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl WithdrawalLedger {
    pub fn new() -> Self {
        Self {
            requests: vec![WithdrawalRequest::sentinel()],
            checkpoints: CheckpointHistory::new(),
            last_finalized: 0,
            locked_value: 0,
            by_owner: HashMap::new(),
        }
    }

    pub fn last_request_id(&self) -> RequestId {
        (self.requests.len() - 1) as RequestId
    }

    pub fn last_finalized_request_id(&self) -> RequestId {
        self.last_finalized
    }

    pub fn last_checkpoint_index(&self) -> CheckpointIndex {
        self.checkpoints.last_index()
    }

    pub fn locked_value(&self) -> u128 {
        self.locked_value
    }

    /// Total value still waiting for finalization.
    pub fn unfinalized_value(&self) -> u128 {
        let tail = &self.requests[self.last_request_id() as usize];
        let head = &self.requests[self.last_finalized as usize];
        tail.cumulative_value - head.cumulative_value
    }

    fn get(&self, id: RequestId) -> QueueResult<&WithdrawalRequest> {
        if id == 0 || id > self.last_request_id() {
            return Err(QueueError::InvalidRequestId { id });
        }
        Ok(&self.requests[id as usize])
    }

    /// Requested value and shares for the batch `(from, to]`.
    fn range(&self, from: RequestId, to: RequestId) -> (u128, u128) {
        let head = &self.requests[from as usize];
        let tail = &self.requests[to as usize];
        (
            tail.cumulative_value - head.cumulative_value,
            tail.cumulative_shares - head.cumulative_shares,
        )
    }

    /// Appends a request for `value` backed by `shares`.
    pub fn enqueue(
        &mut self,
        value: u128,
        shares: u128,
        owner: Address,
        now: Timestamp,
    ) -> QueueResult<RequestId> {
        if value == 0 {
            return Err(QueueError::ZeroValue);
        }
        let prev = &self.requests[self.last_request_id() as usize];
        let cumulative_value = prev
            .cumulative_value
            .checked_add(value)
            .ok_or(QueueError::ArithmeticOverflow)?;
        let cumulative_shares = prev
            .cumulative_shares
            .checked_add(shares)
            .ok_or(QueueError::ArithmeticOverflow)?;

        self.requests.push(WithdrawalRequest {
            cumulative_value,
            cumulative_shares,
            owner,
            created_at: now,
            claimed: false,
        });
        let id = self.last_request_id();
        self.by_owner.entry(owner).or_default().insert(id);
        Ok(id)
    }

    /// Derived status of a single request.
    pub fn status(&self, id: RequestId) -> QueueResult<RequestStatus> {
        let request = self.get(id)?;
        let (value, shares) = self.range(id - 1, id);
        Ok(RequestStatus {
            value,
            shares,
            owner: request.owner,
            created_at: request.created_at,
            is_finalized: id <= self.last_finalized,
            is_claimed: request.claimed,
        })
    }

    /// Request ids owned by `owner` (enumeration order).
    pub fn requests_of(&self, owner: &Address) -> Vec<RequestId> {
        self.by_owner
            .get(owner)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Value to lock and shares to burn for finalizing up to `next_id`.
    ///
    /// Locked cash never exceeds the requested value, but is capped at the
    /// current redemption value of the backing shares: when the rate has
    /// fallen, claimants receive less than requested.
    pub fn finalization_batch(
        &self,
        next_id: RequestId,
        share_rate_e27: u128,
    ) -> QueueResult<(u128, u128)> {
        if share_rate_e27 == 0 {
            return Err(QueueError::ZeroShareRate);
        }
        if next_id <= self.last_finalized || next_id > self.last_request_id() {
            return Err(QueueError::InvalidRequestId { id: next_id });
        }
        let (requested, shares) = self.range(self.last_finalized, next_id);
        let share_value =
            mul_div(shares, share_rate_e27, PRECISION).ok_or(QueueError::ArithmeticOverflow)?;
        Ok((requested.min(share_value), shares))
    }

    /// Commits a finalization batch: records the discount, advances the
    /// cursor and locks the cash. Returns the appended checkpoint index,
    /// if the discount changed.
    pub fn finalize(
        &mut self,
        next_id: RequestId,
        value_amount: u128,
    ) -> QueueResult<Option<CheckpointIndex>> {
        if next_id <= self.last_finalized || next_id > self.last_request_id() {
            return Err(QueueError::InvalidRequestId { id: next_id });
        }
        let (requested, _) = self.range(self.last_finalized, next_id);
        if value_amount > requested {
            return Err(QueueError::TooMuchValueToFinalize {
                value_amount,
                requested,
            });
        }
        // requested > 0: zero-value requests never enter the queue
        let discount_factor = if value_amount == requested {
            NO_DISCOUNT
        } else {
            mul_div(value_amount, PRECISION, requested).ok_or(QueueError::ArithmeticOverflow)?
        };

        let appended = self
            .checkpoints
            .record(self.last_finalized + 1, discount_factor);
        self.locked_value = self
            .locked_value
            .checked_add(value_amount)
            .ok_or(QueueError::ArithmeticOverflow)?;
        self.last_finalized = next_id;
        Ok(appended)
    }

    /// Settles a claim: validates ownership, finalization, the claim flag
    /// and the hint, then marks the request claimed and releases the
    /// payout from the locked pool. Returns the payout.
    pub fn claim(
        &mut self,
        id: RequestId,
        hint: CheckpointIndex,
        caller: &Address,
    ) -> QueueResult<u128> {
        let last_finalized = self.last_finalized;
        let request = self.get(id)?;
        if id > last_finalized {
            return Err(QueueError::RequestNotFinalized { id });
        }
        if request.claimed {
            return Err(QueueError::RequestAlreadyClaimed { id });
        }
        if request.owner != *caller {
            return Err(QueueError::NotOwner);
        }
        if !self.checkpoints.hint_covers(hint, id) {
            return Err(QueueError::InvalidHint { hint });
        }

        let (requested, _) = self.range(id - 1, id);
        let factor = self.checkpoints.effective_factor(hint);
        let payout = if factor == NO_DISCOUNT {
            requested
        } else {
            mul_div(requested, factor, PRECISION).ok_or(QueueError::ArithmeticOverflow)?
        };
        if payout > self.locked_value {
            return Err(QueueError::InsufficientLockedFunds {
                need: payout,
                have: self.locked_value,
            });
        }

        self.requests[id as usize].claimed = true;
        self.locked_value -= payout;
        Ok(payout)
    }

    /// Rolls back a claim whose payout transfer failed.
    pub fn revert_claim(&mut self, id: RequestId, payout: u128) {
        if let Some(request) = self.requests.get_mut(id as usize) {
            request.claimed = false;
        }
        self.locked_value = self.locked_value.saturating_add(payout);
    }

    /// Transfers an unclaimed request to a new owner.
    pub fn transfer_request(
        &mut self,
        id: RequestId,
        caller: &Address,
        new_owner: Address,
    ) -> QueueResult<()> {
        let request = self.get(id)?;
        if request.claimed {
            return Err(QueueError::RequestAlreadyClaimed { id });
        }
        if request.owner != *caller {
            return Err(QueueError::NotOwner);
        }
        let old_owner = request.owner;
        self.requests[id as usize].owner = new_owner;
        if let Some(ids) = self.by_owner.get_mut(&old_owner) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_owner.remove(&old_owner);
            }
        }
        self.by_owner.entry(new_owner).or_default().insert(id);
        Ok(())
    }

    /// Hinted checkpoint lookup for a finalized request.
    pub fn find_checkpoint_hint(
        &self,
        id: RequestId,
        search_start: CheckpointIndex,
        search_end: CheckpointIndex,
    ) -> QueueResult<Option<CheckpointIndex>> {
        if id == 0 || id > self.last_finalized {
            return Err(QueueError::InvalidRequestId { id });
        }
        if search_start > search_end || search_end > self.checkpoints.last_index() {
            return Err(QueueError::InvalidSearchRange {
                start: search_start,
                end: search_end,
            });
        }
        Ok(self.checkpoints.find_hint(id, search_start, search_end))
    }

    /// Largest unfinalized id whose batch fits within `budget` at the
    /// given rate. Monotonic: the batch value is non-decreasing in the id.
    pub fn find_last_finalizable_by_budget(
        &self,
        budget: u128,
        share_rate_e27: u128,
    ) -> QueueResult<Option<RequestId>> {
        if share_rate_e27 == 0 {
            return Err(QueueError::ZeroShareRate);
        }
        if self.last_finalized == self.last_request_id() {
            return Ok(None);
        }
        let fits = |id: RequestId| -> QueueResult<bool> {
            let (value, _) = self.finalization_batch(id, share_rate_e27)?;
            Ok(value <= budget)
        };

        let mut lo = self.last_finalized + 1;
        let mut hi = self.last_request_id();
        if !fits(lo)? {
            return Ok(None);
        }
        // invariant: fits(lo); search the largest id that still fits
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if fits(mid)? {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        Ok(Some(lo))
    }

    /// Largest unfinalized id created at or before `max_timestamp`.
    /// Monotonic: `created_at` is non-decreasing in the id.
    pub fn find_last_finalizable_by_timestamp(
        &self,
        max_timestamp: Timestamp,
    ) -> Option<RequestId> {
        if self.last_finalized == self.last_request_id() {
            return None;
        }
        let old_enough =
            |id: RequestId| self.requests[id as usize].created_at <= max_timestamp;

        let mut lo = self.last_finalized + 1;
        let mut hi = self.last_request_id();
        if !old_enough(lo) {
            return None;
        }
        while lo < hi {
            let mid = lo + (hi - lo + 1) / 2;
            if old_enough(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        Some(lo)
    }
}
