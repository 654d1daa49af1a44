//! Subsystem container and configuration

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, PoolConfig, RuntimeConfig};
pub use subsystems::{
    ConcreteLedgerService, ConcreteReportProcessor, ConcreteWithdrawalQueue, PoolContainer,
};
