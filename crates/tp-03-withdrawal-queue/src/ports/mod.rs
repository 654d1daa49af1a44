//! Port definitions for the Withdrawal Queue subsystem

pub mod inbound;
pub mod outbound;
