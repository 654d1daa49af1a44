//! # Subsystem Container
//!
//! Holds all subsystem instances and wires their ports.
//!
//! ## Initialization Order
//!
//! Subsystems are initialized in strict dependency order:
//!
//! ```text
//! Level 0: Guardian gate, cash vault (no dependencies)
//! Level 1: Share Ledger (needs the gate)
//! Level 2: Report Processing (needs the ledger), Withdrawal Queue
//!          (needs the vault)
//! ```
//!
//! ## Thread Safety
//!
//! All services are `Arc`-shared and internally synchronized; the command
//! loop is nonetheless the only writer.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::adapters::{CashVault, GuardianGateAdapter, LedgerGatewayAdapter, StaticOperatorRegistry};
use crate::container::config::PoolConfig;
use tp_01_share_ledger::ShareLedgerService;
use tp_02_report_processing::ReportProcessorService;
use tp_03_withdrawal_queue::WithdrawalQueueService;

/// Concrete type for the Share Ledger service.
pub type ConcreteLedgerService = ShareLedgerService<GuardianGateAdapter>;

/// Concrete type for the Report Processor service.
pub type ConcreteReportProcessor =
    ReportProcessorService<LedgerGatewayAdapter, StaticOperatorRegistry>;

/// Concrete type for the Withdrawal Queue service.
pub type ConcreteWithdrawalQueue = WithdrawalQueueService<CashVault>;

/// Central container holding all subsystem instances.
pub struct PoolContainer {
    /// Share Ledger (Subsystem 1)
    pub ledger: Arc<ConcreteLedgerService>,

    /// Report Processing (Subsystem 2)
    pub processor: Arc<ConcreteReportProcessor>,

    /// Withdrawal Queue (Subsystem 3)
    pub queue: Arc<ConcreteWithdrawalQueue>,

    /// Guardian deposit gate shared with the ledger.
    pub gate: Arc<GuardianGateAdapter>,

    /// Withdrawal cash vault shared with the queue.
    pub vault: Arc<CashVault>,

    /// Pool configuration (immutable after initialization).
    pub config: PoolConfig,
}

impl PoolContainer {
    /// Create a new container with all subsystems initialized and wired.
    #[instrument(name = "subsystem_init", skip(config, operators))]
    pub fn new(config: PoolConfig, operators: Vec<shared_types::Address>) -> Self {
        info!("Initializing Tidepool subsystem container");

        info!("Phase 1: shared collaborators");
        let gate = Arc::new(GuardianGateAdapter::new(
            config.runtime.guardians.clone(),
            config.runtime.guardian_quorum,
        ));
        let vault = Arc::new(CashVault::new());

        info!("Phase 2: Share Ledger");
        let ledger = Arc::new(ShareLedgerService::new(
            config.ledger.clone(),
            Arc::clone(&gate),
        ));

        info!("Phase 3: Report Processing and Withdrawal Queue");
        let gateway = Arc::new(LedgerGatewayAdapter::new(Arc::clone(&ledger)));
        let registry = Arc::new(StaticOperatorRegistry::new(operators));
        let processor = Arc::new(ReportProcessorService::new(
            config.report.clone(),
            gateway,
            registry,
        ));
        let queue = Arc::new(WithdrawalQueueService::new(
            config.queue.clone(),
            Arc::clone(&vault),
        ));

        info!("All subsystems initialized");
        Self {
            ledger,
            processor,
            queue,
            gate,
            vault,
            config,
        }
    }
}
