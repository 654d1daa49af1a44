//! # Share Ledger
//!
//! The rebase accounting aggregate: a mapping from holder to shares plus the
//! two process-wide totals (`total_shares`, `total_pooled_value`).
//!
//! A holder's balance is always derived at query time:
//!
//! ```text
//! balance = shares * total_pooled_value / total_shares
//! ```
//!
//! Shares are rebase-invariant; a report that changes `total_pooled_value`
//! changes every derived balance without touching any holder entry.
//!
//! ## Invariants
//!
//! - `sum(holders) == total_shares` after every mutation; all mutation goes
//!   through the mint/burn/transfer primitives that adjust both together.
//! - `total_shares == 0 && total_pooled_value > 0` is unreachable: the
//!   first deposited unit of value fixes the initial 1:1 rate, and burns
//!   that would strand pooled value are rejected.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{mul_div, Address, E27};
use std::collections::HashMap;

/// The rebase share-accounting aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareLedger {
    /// Holder -> shares. Entries are removed when they reach zero.
    holders: HashMap<Address, u128>,
    /// Sum of all holder shares.
    total_shares: u128,
    /// Value backing the shares (buffered + staked), in base units.
    total_pooled_value: u128,
}

impl ShareLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares currently owned by `owner` (zero for unknown holders).
    pub fn shares_of(&self, owner: &Address) -> u128 {
        self.holders.get(owner).copied().unwrap_or(0)
    }

    /// Derived balance of `owner` at the current rate.
    pub fn balance_of(&self, owner: &Address) -> u128 {
        let shares = self.shares_of(owner);
        if shares == 0 || self.total_shares == 0 {
            return 0;
        }
        // shares <= total_shares, so the quotient fits in u128
        mul_div(shares, self.total_pooled_value, self.total_shares).unwrap_or(0)
    }

    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    pub fn total_pooled_value(&self) -> u128 {
        self.total_pooled_value
    }

    /// Number of holders with a non-zero share entry.
    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }

    /// Current rate scaled by 1e27 (value per share). Zero when no shares
    /// exist.
    pub fn share_rate_e27(&self) -> LedgerResult<u128> {
        if self.total_shares == 0 {
            return Ok(0);
        }
        mul_div(self.total_pooled_value, E27, self.total_shares)
            .ok_or(LedgerError::ArithmeticOverflow)
    }

    /// Converts shares to value at the current rate.
    pub fn shares_to_value(&self, shares: u128) -> LedgerResult<u128> {
        if shares == 0 {
            return Ok(0);
        }
        if self.total_shares == 0 {
            return Err(LedgerError::ZeroTotalShares);
        }
        mul_div(shares, self.total_pooled_value, self.total_shares)
            .ok_or(LedgerError::ArithmeticOverflow)
    }

    /// Converts value to shares at the current rate.
    pub fn value_to_shares(&self, value: u128) -> LedgerResult<u128> {
        if value == 0 {
            return Ok(0);
        }
        if self.total_shares == 0 {
            return Err(LedgerError::ZeroTotalShares);
        }
        if self.total_pooled_value == 0 {
            return Err(LedgerError::ZeroPooledValue);
        }
        mul_div(value, self.total_shares, self.total_pooled_value)
            .ok_or(LedgerError::ArithmeticOverflow)
    }

    /// Mints shares for a deposit of `value` base units.
    ///
    /// The first deposit bootstraps the 1:1 rate; afterwards the mint is
    /// priced at the pre-deposit rate. Increases both totals.
    pub fn mint_shares(&mut self, owner: Address, value: u128) -> LedgerResult<u128> {
        if value == 0 {
            return Err(LedgerError::ZeroValue);
        }
        let shares = if self.total_shares == 0 {
            value
        } else {
            if self.total_pooled_value == 0 {
                // live shares over an empty pool: the rate is zero and a
                // deposit cannot be priced
                return Err(LedgerError::ZeroPooledValue);
            }
            mul_div(value, self.total_shares, self.total_pooled_value)
                .ok_or(LedgerError::ArithmeticOverflow)?
        };

        self.total_pooled_value = self
            .total_pooled_value
            .checked_add(value)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        if shares > 0 {
            *self.holders.entry(owner).or_insert(0) += shares;
        }
        Ok(shares)
    }

    /// Mints dilutive fee shares worth `fee_value` at the post-report rate.
    ///
    /// The pool already contains the fee (the report delta was applied
    /// first), so the mint must not add value:
    ///
    /// ```text
    /// shares = fee * total_shares / (total_pooled_value - fee)
    /// ```
    ///
    /// which makes the recipient's post-mint balance exactly `fee_value`
    /// while every other holder keeps their pro-rata claim on the rest.
    pub fn mint_fee_shares(&mut self, recipient: Address, fee_value: u128) -> LedgerResult<u128> {
        if fee_value == 0 {
            return Ok(0);
        }
        if fee_value >= self.total_pooled_value {
            return Err(LedgerError::FeeExceedsPooledValue {
                fee: fee_value,
                pooled: self.total_pooled_value,
            });
        }
        let shares = if self.total_shares == 0 {
            fee_value
        } else {
            mul_div(
                fee_value,
                self.total_shares,
                self.total_pooled_value - fee_value,
            )
            .ok_or(LedgerError::ArithmeticOverflow)?
        };

        self.total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        if shares > 0 {
            *self.holders.entry(recipient).or_insert(0) += shares;
        }
        Ok(shares)
    }

    /// Burns `shares` from `owner` and returns the value they represented
    /// at the pre-burn rate.
    ///
    /// Pooled value is untouched: the backing value stays in the pool and
    /// redistributes to the remaining holders by raising the rate.
    pub fn burn_shares(&mut self, owner: &Address, shares: u128) -> LedgerResult<u128> {
        if shares == 0 {
            return Ok(0);
        }
        let have = self.shares_of(owner);
        if have < shares {
            return Err(LedgerError::InsufficientShares { have, need: shares });
        }
        if shares == self.total_shares && self.total_pooled_value > 0 {
            return Err(LedgerError::WouldOrphanPooledValue {
                pooled: self.total_pooled_value,
            });
        }
        let value_released = self.shares_to_value(shares)?;

        self.decrease_holder(owner, shares);
        self.total_shares -= shares;
        Ok(value_released)
    }

    /// Moves shares between holders without touching the totals.
    pub fn transfer_shares(
        &mut self,
        from: &Address,
        to: Address,
        shares: u128,
    ) -> LedgerResult<()> {
        if shares == 0 {
            return Ok(());
        }
        let have = self.shares_of(from);
        if have < shares {
            return Err(LedgerError::InsufficientShares { have, need: shares });
        }
        self.decrease_holder(from, shares);
        *self.holders.entry(to).or_insert(0) += shares;
        Ok(())
    }

    /// Applies a reported net value change to the pool.
    ///
    /// Losses floor at zero; the report is a fact, not something verified
    /// here. Gains must not create value that no share backs.
    pub fn apply_report_delta(&mut self, net_value_change: i128) -> LedgerResult<u128> {
        let next = if net_value_change >= 0 {
            self.total_pooled_value
                .checked_add(net_value_change as u128)
                .ok_or(LedgerError::ArithmeticOverflow)?
        } else {
            self.total_pooled_value
                .saturating_sub(net_value_change.unsigned_abs())
        };
        if self.total_shares == 0 && next > 0 {
            return Err(LedgerError::WouldOrphanPooledValue { pooled: next });
        }
        self.total_pooled_value = next;
        Ok(next)
    }

    /// Removes settled withdrawal value from the pool.
    ///
    /// Finalization is the one path where value leaves the pool together
    /// with the shares backing it; `apply_report_delta` cannot express the
    /// removal because the locked cash moved to the withdrawal vault, not
    /// to the remaining holders.
    pub fn remove_pooled_value(&mut self, value: u128) -> LedgerResult<u128> {
        if value > self.total_pooled_value {
            return Err(LedgerError::InsufficientBufferedValue {
                have: self.total_pooled_value,
                need: value,
            });
        }
        self.total_pooled_value -= value;
        Ok(self.total_pooled_value)
    }

    fn decrease_holder(&mut self, owner: &Address, shares: u128) {
        if let Some(entry) = self.holders.get_mut(owner) {
            *entry -= shares;
            if *entry == 0 {
                self.holders.remove(owner);
            }
        }
    }

    /// Sum of all holder entries. Test/diagnostic helper for the
    /// `sum(holders) == total_shares` invariant.
    pub fn holder_share_sum(&self) -> u128 {
        self.holders.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = [0xAA; 20];
    const BOB: Address = [0xBB; 20];
    const TREASURY: Address = [0xFE; 20];

    #[test]
    fn test_first_deposit_bootstraps_one_to_one() {
        let mut ledger = ShareLedger::new();
        let shares = ledger.mint_shares(ALICE, 1_000).unwrap();
        assert_eq!(shares, 1_000);
        assert_eq!(ledger.total_shares(), 1_000);
        assert_eq!(ledger.total_pooled_value(), 1_000);
        assert_eq!(ledger.balance_of(&ALICE), 1_000);
    }

    #[test]
    fn test_zero_value_mint_rejected() {
        let mut ledger = ShareLedger::new();
        assert_eq!(ledger.mint_shares(ALICE, 0), Err(LedgerError::ZeroValue));
    }

    #[test]
    fn test_second_deposit_priced_at_current_rate() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        // rewards double the pool, rate becomes 2.0
        ledger.apply_report_delta(1_000).unwrap();

        let shares = ledger.mint_shares(BOB, 500).unwrap();
        assert_eq!(shares, 250);
        assert_eq!(ledger.balance_of(&BOB), 500);
        assert_eq!(ledger.balance_of(&ALICE), 2_000);
    }

    #[test]
    fn test_rebase_changes_balances_not_shares() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        ledger.apply_report_delta(-500).unwrap();

        assert_eq!(ledger.shares_of(&ALICE), 1_000);
        assert_eq!(ledger.balance_of(&ALICE), 500);
    }

    #[test]
    fn test_loss_floors_at_zero() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 100).unwrap();
        ledger.apply_report_delta(-1_000).unwrap();
        assert_eq!(ledger.total_pooled_value(), 0);
    }

    #[test]
    fn test_delta_on_empty_ledger_rejected() {
        let mut ledger = ShareLedger::new();
        assert!(matches!(
            ledger.apply_report_delta(100),
            Err(LedgerError::WouldOrphanPooledValue { .. })
        ));
    }

    #[test]
    fn test_burn_redistributes_to_remaining_holders() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        ledger.mint_shares(BOB, 1_000).unwrap();

        let released = ledger.burn_shares(&BOB, 1_000).unwrap();
        assert_eq!(released, 1_000);
        // pooled value unchanged, Alice now backs it all
        assert_eq!(ledger.total_pooled_value(), 2_000);
        assert_eq!(ledger.balance_of(&ALICE), 2_000);
    }

    #[test]
    fn test_burn_more_than_owned_rejected() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 100).unwrap();
        assert_eq!(
            ledger.burn_shares(&ALICE, 200),
            Err(LedgerError::InsufficientShares {
                have: 100,
                need: 200
            })
        );
    }

    #[test]
    fn test_burn_cannot_orphan_pooled_value() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 100).unwrap();
        assert!(matches!(
            ledger.burn_shares(&ALICE, 100),
            Err(LedgerError::WouldOrphanPooledValue { .. })
        ));
    }

    #[test]
    fn test_holder_sum_matches_total_after_mutations() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        ledger.mint_shares(BOB, 700).unwrap();
        ledger.apply_report_delta(300).unwrap();
        ledger.mint_fee_shares(TREASURY, 30).unwrap();
        ledger.transfer_shares(&ALICE, BOB, 250).unwrap();
        ledger.burn_shares(&BOB, 400).unwrap();

        assert_eq!(ledger.holder_share_sum(), ledger.total_shares());
    }

    #[test]
    fn test_conversion_round_trip_within_rounding() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 3_333).unwrap();
        ledger.apply_report_delta(1_111).unwrap();

        for shares in [1u128, 7, 100, 3_333] {
            let value = ledger.shares_to_value(shares).unwrap();
            let back = ledger.value_to_shares(value).unwrap();
            assert!(back <= shares);
            assert!(shares - back <= 1, "shares={shares} back={back}");
        }
    }

    #[test]
    fn test_conversions_reject_zero_totals() {
        let ledger = ShareLedger::new();
        assert_eq!(ledger.shares_to_value(0), Ok(0));
        assert_eq!(
            ledger.shares_to_value(10),
            Err(LedgerError::ZeroTotalShares)
        );
        assert_eq!(
            ledger.value_to_shares(10),
            Err(LedgerError::ZeroTotalShares)
        );
    }

    #[test]
    fn test_fee_mint_dilutes_to_exact_fee_balance() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        // profitable report: +200, of which 20 is the fee
        ledger.apply_report_delta(200).unwrap();
        let minted = ledger.mint_fee_shares(TREASURY, 20).unwrap();

        assert!(minted > 0);
        assert_eq!(ledger.balance_of(&TREASURY), 20);
        // Alice keeps profit minus fee: 1000 + (200 - 20)
        assert_eq!(ledger.balance_of(&ALICE), 1_180);
    }

    #[test]
    fn test_fee_mint_zero_is_noop() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        assert_eq!(ledger.mint_fee_shares(TREASURY, 0), Ok(0));
        assert_eq!(ledger.total_shares(), 1_000);
    }

    #[test]
    fn test_fee_mint_cannot_consume_pool() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 100).unwrap();
        assert!(matches!(
            ledger.mint_fee_shares(TREASURY, 100),
            Err(LedgerError::FeeExceedsPooledValue { .. })
        ));
    }

    #[test]
    fn test_transfer_preserves_totals() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        ledger.transfer_shares(&ALICE, BOB, 400).unwrap();

        assert_eq!(ledger.shares_of(&ALICE), 600);
        assert_eq!(ledger.shares_of(&BOB), 400);
        assert_eq!(ledger.total_shares(), 1_000);
        assert_eq!(ledger.holder_share_sum(), 1_000);
    }

    #[test]
    fn test_share_rate_tracks_pool() {
        let mut ledger = ShareLedger::new();
        assert_eq!(ledger.share_rate_e27().unwrap(), 0);
        ledger.mint_shares(ALICE, 1_000).unwrap();
        assert_eq!(ledger.share_rate_e27().unwrap(), E27);
        ledger.apply_report_delta(-500).unwrap();
        assert_eq!(ledger.share_rate_e27().unwrap(), E27 / 2);
    }

    #[test]
    fn test_remove_pooled_value_bounded() {
        let mut ledger = ShareLedger::new();
        ledger.mint_shares(ALICE, 1_000).unwrap();
        assert_eq!(ledger.remove_pooled_value(400).unwrap(), 600);
        assert!(ledger.remove_pooled_value(700).is_err());
    }
}
