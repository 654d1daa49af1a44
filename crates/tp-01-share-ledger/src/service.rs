//! Share Ledger Service - Core business logic
//!
//! Owns the [`ShareLedger`] aggregate plus the deposit buffer, and exposes
//! the atomic mutation entry points used by the runtime and by report
//! processing. Every mutation is all-or-nothing: multi-step mutations are
//! staged on a copy of the aggregate and swapped in only on success.

use crate::domain::ShareLedger;
use crate::error::{LedgerError, LedgerResult};
use crate::ports::inbound::ShareLedgerApi;
use crate::ports::outbound::DepositGate;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Address;
use std::sync::Arc;
use tracing::{debug, info};

/// Share Ledger configuration.
#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Staking module the deposit gate is consulted for.
    pub deposit_module_id: u32,
    /// Upper bound on deposits forwarded per gate call.
    pub max_deposits_per_call: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            deposit_module_id: 1,
            max_deposits_per_call: 16,
        }
    }
}

/// Snapshot of the global ledger totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerTotals {
    pub total_shares: u128,
    pub total_pooled_value: u128,
    pub buffered_value: u128,
}

/// Outcome of an atomically applied report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedReport {
    pub total_shares: u128,
    pub total_pooled_value: u128,
    pub fee_shares_minted: u128,
}

struct LedgerState {
    ledger: ShareLedger,
    /// Deposited value not yet forwarded to the validator set. Part of
    /// `total_pooled_value`, never larger than it.
    buffered_value: u128,
    /// Principal staked since the last applied report. The oracle's next
    /// balance report includes it, so report processing must not read it
    /// as profit.
    staked_since_report: u128,
}

/// Share Ledger Service implementation.
pub struct ShareLedgerService<G>
where
    G: DepositGate,
{
    config: LedgerConfig,
    state: Arc<RwLock<LedgerState>>,
    gate: Arc<G>,
}

impl<G> ShareLedgerService<G>
where
    G: DepositGate,
{
    pub fn new(config: LedgerConfig, gate: Arc<G>) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(LedgerState {
                ledger: ShareLedger::new(),
                buffered_value: 0,
                staked_since_report: 0,
            })),
            gate,
        }
    }

    /// Mints shares for a deposit and credits the buffer.
    pub fn deposit(&self, owner: Address, value: u128) -> LedgerResult<u128> {
        let mut state = self.state.write();
        let shares = state.ledger.mint_shares(owner, value)?;
        state.buffered_value = state
            .buffered_value
            .checked_add(value)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        info!(value, shares_minted = shares, "deposit accepted");
        Ok(shares)
    }

    /// Applies an accepted report atomically: value delta, requested share
    /// burn, then dilutive fee mints. Either every step lands or none does.
    pub fn apply_report(
        &self,
        net_value_change: i128,
        burn: Option<(Address, u128)>,
        fee_mints: &[(Address, u128)],
    ) -> LedgerResult<AppliedReport> {
        let mut state = self.state.write();
        let mut staged = state.ledger.clone();

        staged.apply_report_delta(net_value_change)?;
        if let Some((owner, shares)) = burn {
            staged.burn_shares(&owner, shares)?;
        }
        let mut fee_shares_minted: u128 = 0;
        for (recipient, fee_value) in fee_mints {
            fee_shares_minted = fee_shares_minted
                .checked_add(staged.mint_fee_shares(*recipient, *fee_value)?)
                .ok_or(LedgerError::ArithmeticOverflow)?;
        }

        let applied = AppliedReport {
            total_shares: staged.total_shares(),
            total_pooled_value: staged.total_pooled_value(),
            fee_shares_minted,
        };
        state.ledger = staged;
        // the baseline moves to the reported balance, which now includes
        // the principal staked this period
        state.staked_since_report = 0;
        info!(
            net_value_change,
            fee_shares_minted, "report applied to ledger"
        );
        Ok(applied)
    }

    /// Settles a finalized withdrawal batch: the locked value leaves the
    /// pool and the reserve's backing shares are burned, atomically.
    pub fn settle_withdrawals(
        &self,
        reserve: Address,
        shares: u128,
        value: u128,
    ) -> LedgerResult<()> {
        let mut state = self.state.write();
        let mut staged = state.ledger.clone();
        staged.remove_pooled_value(value)?;
        staged.burn_shares(&reserve, shares)?;
        state.ledger = staged;
        debug!(shares, value, "withdrawal batch settled");
        Ok(())
    }

    /// Escrows shares from a holder into the withdrawal reserve.
    pub fn escrow_shares(&self, from: Address, reserve: Address, shares: u128) -> LedgerResult<()> {
        let mut state = self.state.write();
        state.ledger.transfer_shares(&from, reserve, shares)
    }

    /// Principal moved to the validator set since the last applied report.
    pub fn staked_since_report(&self) -> u128 {
        self.state.read().staked_since_report
    }

    pub fn value_to_shares(&self, value: u128) -> LedgerResult<u128> {
        self.state.read().ledger.value_to_shares(value)
    }

    pub fn shares_to_value(&self, shares: u128) -> LedgerResult<u128> {
        self.state.read().ledger.shares_to_value(shares)
    }

    fn totals_snapshot(&self) -> LedgerTotals {
        let state = self.state.read();
        LedgerTotals {
            total_shares: state.ledger.total_shares(),
            total_pooled_value: state.ledger.total_pooled_value(),
            buffered_value: state.buffered_value,
        }
    }
}

#[async_trait]
impl<G> ShareLedgerApi for ShareLedgerService<G>
where
    G: DepositGate,
{
    async fn submit_deposit(&self, owner: Address, value: u128) -> LedgerResult<u128> {
        self.deposit(owner, value)
    }

    async fn stake_buffered(&self, amount: u128) -> LedgerResult<u128> {
        if amount == 0 {
            return Ok(0);
        }
        let module_id = self.config.deposit_module_id;
        {
            let state = self.state.read();
            if state.buffered_value < amount {
                return Err(LedgerError::InsufficientBufferedValue {
                    have: state.buffered_value,
                    need: amount,
                });
            }
        }

        if !self.gate.can_deposit(module_id).await? {
            return Err(LedgerError::DepositGateClosed { module_id });
        }
        self.gate
            .deposit(self.config.max_deposits_per_call, module_id, Vec::new())
            .await?;

        let mut state = self.state.write();
        // re-check: the gate call ran without the lock held
        if state.buffered_value < amount {
            return Err(LedgerError::InsufficientBufferedValue {
                have: state.buffered_value,
                need: amount,
            });
        }
        state.staked_since_report = state
            .staked_since_report
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        state.buffered_value -= amount;
        info!(amount, module_id, "buffered value staked");
        Ok(amount)
    }

    async fn balance_of(&self, owner: Address) -> u128 {
        self.state.read().ledger.balance_of(&owner)
    }

    async fn shares_of(&self, owner: Address) -> u128 {
        self.state.read().ledger.shares_of(&owner)
    }

    async fn totals(&self) -> LedgerTotals {
        self.totals_snapshot()
    }

    async fn share_rate_e27(&self) -> LedgerResult<u128> {
        self.state.read().ledger.share_rate_e27()
    }
}
