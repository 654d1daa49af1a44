//! # Guardian Gate Adapter
//!
//! In-process stand-in for the guardian quorum protecting validator-set
//! deposits. Guardians approve; the gate opens once the approval count
//! reaches the quorum, and every forwarded deposit consumes the approvals.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::HashSet;
use tp_01_share_ledger::{DepositGate, LedgerError, LedgerResult};
use tracing::{debug, info};

/// Deposit gate backed by an in-memory guardian approval set.
pub struct GuardianGateAdapter {
    guardians: Vec<Address>,
    quorum: usize,
    approvals: RwLock<HashSet<Address>>,
}

impl GuardianGateAdapter {
    pub fn new(guardians: Vec<Address>, quorum: usize) -> Self {
        Self {
            guardians,
            quorum,
            approvals: RwLock::new(HashSet::new()),
        }
    }

    /// Records a guardian's approval for the next deposit batch.
    pub fn approve(&self, guardian: Address) -> LedgerResult<()> {
        if !self.guardians.contains(&guardian) {
            return Err(LedgerError::GateUnavailable {
                reason: "approval from unknown guardian".into(),
            });
        }
        let mut approvals = self.approvals.write();
        approvals.insert(guardian);
        debug!(
            approvals = approvals.len(),
            quorum = self.quorum,
            "guardian approval recorded"
        );
        Ok(())
    }

    /// Withdraws a guardian's standing approval.
    pub fn revoke(&self, guardian: &Address) {
        self.approvals.write().remove(guardian);
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.read().len()
    }
}

#[async_trait]
impl DepositGate for GuardianGateAdapter {
    async fn can_deposit(&self, _module_id: u32) -> LedgerResult<bool> {
        Ok(self.approvals.read().len() >= self.quorum)
    }

    async fn deposit(
        &self,
        max_deposits: u64,
        module_id: u32,
        _payload: Vec<u8>,
    ) -> LedgerResult<()> {
        let mut approvals = self.approvals.write();
        if approvals.len() < self.quorum {
            return Err(LedgerError::DepositGateClosed { module_id });
        }
        // each batch needs a fresh quorum
        approvals.clear();
        info!(max_deposits, module_id, "deposit batch forwarded through gate");
        Ok(())
    }
}
