//! # tp-02-report-processing
//!
//! Report Processor: turns validated oracle reports into ledger rebases
//! and fee distribution.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Phase machine**: `Idle -> ReportAccepted -> Distributing -> Idle`,
//!   with every abort path returning to `Idle` untouched
//! - **Structural sanity**: period monotonicity, staleness bounds, burn
//!   requests checked against a ledger snapshot
//! - **Fee distribution**: profit fee split between node operators and the
//!   treasury, minted as dilutive shares in one atomic ledger commit
//!
//! Report authenticity is out of scope: the oracle-consensus collaborator
//! guarantees at most one quorum-validated report per reference period
//! before anything reaches this crate.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{FeePolicy, FeeSplit, ProcessingPhase, BPS_DENOMINATOR};
pub use error::{ReportError, ReportResult};
pub use ports::inbound::{ReportOutcome, ReportProcessorApi};
pub use ports::outbound::{
    CommittedReport, FeeAllocation, LedgerGateway, LedgerSnapshot, OperatorRegistry,
    ReportApplication,
};
pub use service::{ReportConfig, ReportProcessorService};
