//! Domain layer for the Withdrawal Queue subsystem

pub mod checkpoint;
pub mod planner;
pub mod queue;
pub mod request;

pub use checkpoint::{CheckpointHistory, DiscountCheckpoint, NO_DISCOUNT, PRECISION};
pub use planner::{FinalizationPlan, FinalizationPlanner, PlannerConfig};
pub use queue::WithdrawalLedger;
pub use request::{RequestStatus, WithdrawalRequest};
