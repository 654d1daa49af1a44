//! # Tidepool Pool Runtime
//!
//! The main entry point for the Tidepool accounting node.
//!
//! ## Architecture
//!
//! Three subsystems own the pool's accounting state:
//!
//! ```text
//! oracle report ──→ ReportProcessor(2) ──commit──→ ShareLedger(1)
//!                         │                            ↑
//!                   vault inflow                  escrow / settle
//!                         ↓                            │
//!                     CashVault ←──payout──  WithdrawalQueue(3)
//! ```
//!
//! Every mutation is serialized through one mpsc command channel drained
//! by a single executor task: cross-subsystem flows never interleave, so
//! the subsystems' internal locks only guard against concurrent readers.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and subsystem wiring
//! - `adapters/` - Port implementations connecting subsystems
//! - `commands` - The command envelope, the writer loop, and [`PoolHandle`]
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env)
//! 2. Validate the guardian set and the withdrawal reserve
//! 3. Initialize subsystems in dependency order
//! 4. Spawn the command executor
//! 5. Signal ready

pub mod adapters;
pub mod commands;
pub mod container;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::commands::{CommandEnvelope, CommandExecutor, PoolHandle};
use crate::container::{PoolConfig, PoolContainer};
use shared_types::Address;

pub use crate::commands::{RuntimeError, RuntimeResult};

/// The main runtime orchestrating the pool subsystems.
pub struct PoolRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<PoolContainer>,
    /// Client side of the command channel.
    handle: PoolHandle,
    /// Receiver parked here until `start` hands it to the executor.
    executor_rx: Option<mpsc::Receiver<CommandEnvelope>>,
    /// Shutdown signal sender.
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
}

impl PoolRuntime {
    /// Create a new runtime with configuration and a node-operator set.
    pub fn new(config: PoolConfig, operators: Vec<Address>) -> Self {
        info!("Creating Tidepool runtime");

        let buffer = config.runtime.command_buffer;
        let container = Arc::new(PoolContainer::new(config, operators));
        let (tx, rx) = mpsc::channel(buffer);
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Self {
            container,
            handle: PoolHandle::new(tx),
            executor_rx: Some(rx),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Start the command executor. Call once.
    pub async fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Tidepool Pool Runtime v0.1.0");
        info!("  Single-writer command loop");
        info!("===========================================");

        let rx = self
            .executor_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("runtime already started"))?;
        let executor = CommandExecutor::new(Arc::clone(&self.container), rx);
        let mut shutdown = self.shutdown_rx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = executor.run() => {}
                _ = shutdown.changed() => {
                    info!("[executor] Shutdown signal received");
                }
            }
        });

        info!("Command executor running");
        info!(
            guardians = self.container.config.runtime.guardians.len(),
            quorum = self.container.config.runtime.guardian_quorum,
            "Deposit gate configured"
        );
        Ok(())
    }

    /// Cloneable client handle for submitting commands.
    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<PoolContainer> {
        Arc::clone(&self.container)
    }

    /// Shutdown the runtime gracefully.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        // give in-flight commands time to drain
        tokio::time::sleep(Duration::from_millis(200)).await;
        info!("Shutdown complete");
    }
}
