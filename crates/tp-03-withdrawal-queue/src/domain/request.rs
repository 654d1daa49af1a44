//! Withdrawal request entity

use serde::{Deserialize, Serialize};
use shared_types::{Address, Timestamp};

/// A node in the append-only request sequence.
///
/// Cumulative fields are immutable for the life of the request; per-request
/// value and shares are derived by range difference against the previous
/// request. Only the `claimed` flag and the owner ever change after
/// enqueue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Running sum of all value requested up to and including this request.
    pub cumulative_value: u128,
    /// Running sum of the shares backing those requests.
    pub cumulative_shares: u128,
    /// Who may claim or transfer this request.
    pub owner: Address,
    /// Enqueue time (caller-supplied logical clock).
    pub created_at: Timestamp,
    /// Set on claim; cleared only when the claim's payout transfer fails
    /// and the claim rolls back.
    pub claimed: bool,
}

impl WithdrawalRequest {
    /// The zero sentinel occupying index 0.
    pub fn sentinel() -> Self {
        Self {
            cumulative_value: 0,
            cumulative_shares: 0,
            owner: [0u8; 20],
            created_at: 0,
            claimed: true,
        }
    }
}

/// Derived view of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestStatus {
    pub value: u128,
    pub shares: u128,
    pub owner: Address,
    pub created_at: Timestamp,
    pub is_finalized: bool,
    pub is_claimed: bool,
}
