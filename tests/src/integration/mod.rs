//! Cross-subsystem integration tests

pub mod deposit_gate;
pub mod queue_randomized;
pub mod rebase_flows;
pub mod withdrawal_lifecycle;
