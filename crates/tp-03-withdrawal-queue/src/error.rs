//! Error types for the Withdrawal Queue subsystem

use shared_types::{CheckpointIndex, RequestId};
use thiserror::Error;

/// Withdrawal queue errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Request id is zero, beyond the queue tail, or outside the
    /// operation's valid range
    #[error("Invalid request id: {id}")]
    InvalidRequestId { id: RequestId },

    /// Zero-value withdrawal requests are rejected at the boundary
    #[error("Withdrawal request value must be non-zero")]
    ZeroValue,

    /// A share rate of zero cannot price a finalization batch
    #[error("Share rate must be non-zero")]
    ZeroShareRate,

    /// More cash offered than the batch ever requested
    #[error("Too much value to finalize: {value_amount} for a batch requesting {requested}")]
    TooMuchValueToFinalize { value_amount: u128, requested: u128 },

    /// Checkpoint hint does not cover the request id
    #[error("Invalid checkpoint hint: {hint}")]
    InvalidHint { hint: CheckpointIndex },

    /// Malformed checkpoint search window
    #[error("Invalid checkpoint search range: [{start}, {end}]")]
    InvalidSearchRange {
        start: CheckpointIndex,
        end: CheckpointIndex,
    },

    /// Request was already claimed
    #[error("Request {id} already claimed")]
    RequestAlreadyClaimed { id: RequestId },

    /// Caller is not the request owner
    #[error("Caller is not the owner of the request")]
    NotOwner,

    /// Request is not yet covered by a finalization
    #[error("Request {id} not finalized")]
    RequestNotFinalized { id: RequestId },

    /// Locked funds do not cover the payout
    #[error("Insufficient locked funds: need {need}, have {have}")]
    InsufficientLockedFunds { need: u128, have: u128 },

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow in withdrawal accounting")]
    ArithmeticOverflow,

    /// The payout collaborator failed; the claim was rolled back
    #[error("Payout failed: {reason}")]
    PayoutFailed { reason: String },
}

/// Result type for withdrawal queue operations
pub type QueueResult<T> = Result<T, QueueError>;
