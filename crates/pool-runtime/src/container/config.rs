//! # Pool Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! ## Security Requirements
//!
//! - The guardian set MUST NOT be empty in production: an empty set means
//!   the deposit gate can never open
//! - The withdrawal reserve MUST NOT be the zero address: escrowed shares
//!   would be unrecoverable

use shared_types::Address;
use tp_01_share_ledger::LedgerConfig;
use tp_02_report_processing::ReportConfig;
use tp_03_withdrawal_queue::QueueConfig;

/// Complete pool configuration.
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Share Ledger configuration.
    pub ledger: LedgerConfig,
    /// Report Processing configuration.
    pub report: ReportConfig,
    /// Withdrawal Queue configuration.
    pub queue: QueueConfig,
    /// Runtime wiring configuration.
    pub runtime: RuntimeConfig,
}

impl PoolConfig {
    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the guardian set is empty or smaller than the quorum
    /// - the withdrawal reserve is the zero address
    /// - a basis-point rate exceeds 100%
    /// - the command channel has no capacity
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.runtime.guardians.is_empty()
            || self.runtime.guardians.len() < self.runtime.guardian_quorum
        {
            return Err(ConfigError::InsufficientGuardians {
                guardians: self.runtime.guardians.len(),
                quorum: self.runtime.guardian_quorum,
            });
        }
        if self.runtime.withdrawal_reserve == [0u8; 20] {
            return Err(ConfigError::ZeroWithdrawalReserve);
        }
        let policy = &self.report.fee_policy;
        if policy.fee_basis_points > 10_000 || policy.operator_split_bps > 10_000 {
            return Err(ConfigError::BasisPointsOutOfRange {
                fee_bps: policy.fee_basis_points,
                split_bps: policy.operator_split_bps,
            });
        }
        if self.runtime.command_buffer == 0 {
            return Err(ConfigError::ZeroCommandBuffer);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The guardian set cannot reach its own quorum.
    #[error(
        "SECURITY VIOLATION: {guardians} guardian(s) configured but quorum is {quorum}. \
         The deposit gate could never open."
    )]
    InsufficientGuardians { guardians: usize, quorum: usize },

    /// Withdrawal reserve left at the zero address.
    #[error(
        "SECURITY VIOLATION: withdrawal reserve is the zero address. \
         Set TP_WITHDRAWAL_RESERVE or provide in config."
    )]
    ZeroWithdrawalReserve,

    /// A basis-point rate above 10_000 (100%).
    #[error("Basis points out of range: fee {fee_bps} bps, operator split {split_bps} bps")]
    BasisPointsOutOfRange { fee_bps: u16, split_bps: u16 },

    /// A zero-capacity command channel cannot accept work.
    #[error("Command buffer capacity must be non-zero")]
    ZeroCommandBuffer,
}

/// Runtime wiring configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Escrow account holding shares that back queued withdrawals.
    pub withdrawal_reserve: Address,
    /// Guardian addresses consulted by the deposit gate.
    pub guardians: Vec<Address>,
    /// Approvals required before the gate opens.
    pub guardian_quorum: usize,
    /// Capacity of the command channel feeding the writer loop.
    pub command_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            withdrawal_reserve: [0u8; 20], // MUST be overridden in production
            guardians: Vec::new(),
            guardian_quorum: 1,
            command_buffer: 256,
        }
    }
}
