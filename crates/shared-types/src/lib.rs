//! # Shared Types Crate
//!
//! This crate contains the domain entities and the wide-integer math helpers
//! shared by every Tidepool subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Plain Data**: Entities are serde-derived value types; behavior lives
//!   in the subsystem crate that owns the corresponding aggregate.
//! - **Exact Arithmetic**: Amounts are `u128`; any product that can exceed
//!   128 bits goes through [`math::mul_div`] on a `U256` intermediate.

pub mod entities;
pub mod math;

pub use entities::*;
pub use math::{mul_div, E27};
