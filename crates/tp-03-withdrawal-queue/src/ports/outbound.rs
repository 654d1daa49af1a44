//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::QueueResult;
use async_trait::async_trait;
use shared_types::Address;

/// Where claim payouts come from. The adapter owns the cash; the queue
/// only accounts for how much of it is spoken for.
#[async_trait]
pub trait PayoutSink: Send + Sync {
    /// Transfers `value` to `recipient`. An error rolls the claim back.
    async fn transfer(&self, recipient: Address, value: u128) -> QueueResult<()>;
}
