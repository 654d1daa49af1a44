//! # tp-01-share-ledger
//!
//! Share Ledger: rebase share accounting for the liquid-staking pool.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Share accounting**: per-holder shares plus the process-wide
//!   `total_shares` / `total_pooled_value` totals
//! - **Rebase conversion**: balance derived at query time from shares and
//!   the current rate; reports move the rate, never the share entries
//! - **Deposit buffer**: deposited value held until the guardian-quorum
//!   deposit gate releases it toward the validator set
//! - **Atomic report application**: value delta, burn and dilutive fee
//!   mints land together or not at all
//!
//! ## Example
//!
//! ```rust,ignore
//! use tp_01_share_ledger::{LedgerConfig, ShareLedgerService};
//! use tp_01_share_ledger::ports::inbound::ShareLedgerApi;
//!
//! let service = ShareLedgerService::new(LedgerConfig::default(), gate);
//! let shares = service.submit_deposit(owner, 1_000).await?;
//! let balance = service.balance_of(owner).await;
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::ShareLedger;
pub use error::{LedgerError, LedgerResult};
pub use ports::inbound::ShareLedgerApi;
pub use ports::outbound::DepositGate;
pub use service::{AppliedReport, LedgerConfig, LedgerTotals, ShareLedgerService};
