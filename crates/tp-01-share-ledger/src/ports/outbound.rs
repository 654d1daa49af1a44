//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::LedgerResult;
use async_trait::async_trait;

/// Guardian-quorum deposit gate.
///
/// The gate decides when buffered value may move to the underlying
/// validator set. The quorum mechanism itself lives outside this system;
/// the ledger only consults the verdict.
#[async_trait]
pub trait DepositGate: Send + Sync {
    /// Whether deposits are currently allowed for `module_id`.
    async fn can_deposit(&self, module_id: u32) -> LedgerResult<bool>;

    /// Forward up to `max_deposits` buffered deposits to the validator set.
    async fn deposit(&self, max_deposits: u64, module_id: u32, payload: Vec<u8>)
        -> LedgerResult<()>;
}
