//! Port definitions for the Report Processing subsystem

pub mod inbound;
pub mod outbound;
