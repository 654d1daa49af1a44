//! Domain layer for the Share Ledger subsystem

pub mod ledger;

pub use ledger::ShareLedger;
