//! Domain layer for the Report Processing subsystem

pub mod fees;
pub mod phase;

pub use fees::{FeePolicy, FeeSplit, BPS_DENOMINATOR};
pub use phase::ProcessingPhase;
