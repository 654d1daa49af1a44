//! Tidepool node binary: configuration loading, logging, and lifecycle.

use anyhow::Result;
use pool_runtime::container::PoolConfig;
use pool_runtime::PoolRuntime;
use shared_types::Address;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Parses a 20-byte hex address like `aabb...` (40 hex chars).
fn parse_address(raw: &str) -> Option<Address> {
    let raw = raw.trim().trim_start_matches("0x");
    if raw.len() != 40 {
        return None;
    }
    let mut address = [0u8; 20];
    for (i, byte) in address.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&raw[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(address)
}

/// Load configuration from environment.
fn load_config() -> (PoolConfig, Vec<Address>) {
    let mut config = PoolConfig::default();

    if let Ok(raw) = std::env::var("TP_WITHDRAWAL_RESERVE") {
        match parse_address(&raw) {
            Some(address) => config.runtime.withdrawal_reserve = address,
            None => warn!("TP_WITHDRAWAL_RESERVE must be 20 bytes (40 hex chars)"),
        }
    }
    if let Ok(raw) = std::env::var("TP_GUARDIANS") {
        config.runtime.guardians = raw.split(',').filter_map(parse_address).collect();
        info!(
            guardians = config.runtime.guardians.len(),
            "Loaded guardian set from environment"
        );
    }
    if let Ok(raw) = std::env::var("TP_GUARDIAN_QUORUM") {
        if let Ok(quorum) = raw.parse() {
            config.runtime.guardian_quorum = quorum;
        }
    }
    if let Ok(raw) = std::env::var("TP_MIN_REQUEST_AGE_SECS") {
        if let Ok(age) = raw.parse() {
            config.queue.planner.min_request_age_secs = age;
        }
    }

    let operators = std::env::var("TP_OPERATORS")
        .map(|raw| raw.split(',').filter_map(parse_address).collect())
        .unwrap_or_default();

    (config, operators)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (config, operators) = load_config();
    config.validate_for_production()?;

    let mut runtime = PoolRuntime::new(config, operators);
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
