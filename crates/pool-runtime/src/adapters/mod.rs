//! # Port Adapters
//!
//! Concrete implementations of the subsystem outbound ports, wiring the
//! subsystems to each other and to the in-process cash vault.

pub mod cash_vault;
pub mod guardian_gate;
pub mod ledger_gateway;
pub mod operator_registry;

pub use cash_vault::CashVault;
pub use guardian_gate::GuardianGateAdapter;
pub use ledger_gateway::LedgerGatewayAdapter;
pub use operator_registry::StaticOperatorRegistry;
