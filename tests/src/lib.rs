//! # Tidepool Test Suite
//!
//! Unified test crate for cross-subsystem accounting flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── rebase_flows.rs          # Deposits, reports, fee dilution
//!     ├── withdrawal_lifecycle.rs  # Request → finalize → claim
//!     ├── deposit_gate.rs          # Guardian quorum and staking
//!     └── queue_randomized.rs      # Randomized queue conservation checks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p tp-tests
//!
//! # By category
//! cargo test -p tp-tests integration::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
