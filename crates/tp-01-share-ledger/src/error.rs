//! Error types for the Share Ledger subsystem

use thiserror::Error;

/// Share Ledger errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Zero-value mint or conversion where an amount is required
    #[error("Value must be non-zero")]
    ZeroValue,

    /// Holder does not own enough shares
    #[error("Insufficient shares: have {have}, need {need}")]
    InsufficientShares { have: u128, need: u128 },

    /// Conversion requested while no shares exist
    #[error("Total shares is zero - share rate is undefined")]
    ZeroTotalShares,

    /// Conversion or mint requested while the pool holds no value
    #[error("Total pooled value is zero - share rate is undefined")]
    ZeroPooledValue,

    /// Mutation would leave pooled value with no shares backing it
    #[error("Operation would orphan {pooled} pooled value with zero shares outstanding")]
    WouldOrphanPooledValue { pooled: u128 },

    /// Fee mint asked to dilute by more than the whole pool
    #[error("Fee {fee} is not smaller than the pooled value {pooled}")]
    FeeExceedsPooledValue { fee: u128, pooled: u128 },

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow in share accounting")]
    ArithmeticOverflow,

    /// Stake request exceeds the deposit buffer
    #[error("Insufficient buffered value: have {have}, need {need}")]
    InsufficientBufferedValue { have: u128, need: u128 },

    /// Guardian quorum currently forbids deposits for this module
    #[error("Deposit gate closed for module {module_id}")]
    DepositGateClosed { module_id: u32 },

    /// The deposit-gating collaborator failed
    #[error("Deposit gate unavailable: {reason}")]
    GateUnavailable { reason: String },
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
