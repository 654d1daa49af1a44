//! Port definitions for the Share Ledger subsystem

pub mod inbound;
pub mod outbound;
