//! Driving Ports (API - Inbound Operations)

use crate::error::LedgerResult;
use crate::service::LedgerTotals;
use async_trait::async_trait;
use shared_types::Address;

/// Public API of the Share Ledger subsystem.
#[async_trait]
pub trait ShareLedgerApi: Send + Sync {
    /// Accept a deposit: mint shares at the current rate and credit the
    /// deposit buffer.
    async fn submit_deposit(&self, owner: Address, value: u128) -> LedgerResult<u128>;

    /// Move buffered value toward the validator set through the deposit
    /// gate.
    async fn stake_buffered(&self, amount: u128) -> LedgerResult<u128>;

    /// Derived balance of a holder at the current rate.
    async fn balance_of(&self, owner: Address) -> u128;

    /// Shares owned by a holder.
    async fn shares_of(&self, owner: Address) -> u128;

    /// Snapshot of the global totals.
    async fn totals(&self) -> LedgerTotals;

    /// Current share rate scaled by 1e27.
    async fn share_rate_e27(&self) -> LedgerResult<u128>;
}
