//! # Cash Vault Adapter
//!
//! Holds the withdrawal cash: report inflows credit it, claim payouts
//! debit it. The queue tracks how much of the balance is locked; the
//! vault only refuses payments it cannot cover.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Address;
use tp_03_withdrawal_queue::{PayoutSink, QueueError, QueueResult};
use tracing::{debug, info};

/// In-memory cash account backing claim payouts.
#[derive(Default)]
pub struct CashVault {
    balance: RwLock<u128>,
}

impl CashVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits cash moved into the vault by an oracle report.
    pub fn credit(&self, amount: u128) {
        let mut balance = self.balance.write();
        *balance = balance.saturating_add(amount);
        debug!(amount, balance = *balance, "vault credited");
    }

    pub fn available(&self) -> u128 {
        *self.balance.read()
    }
}

#[async_trait]
impl PayoutSink for CashVault {
    async fn transfer(&self, recipient: Address, value: u128) -> QueueResult<()> {
        let mut balance = self.balance.write();
        if *balance < value {
            return Err(QueueError::PayoutFailed {
                reason: format!("vault balance {} below payout {}", *balance, value),
            });
        }
        *balance -= value;
        info!(?recipient, value, "payout transferred");
        Ok(())
    }
}
