//! Command implementations behind the `sb-cli` subcommands.

use std::sync::Arc;

use thiserror::Error;

use stonebridge_core::EmailError;
use stonebridge_gate::app::{IdleListingsApp, Notifier};
use stonebridge_gate::auth::{AuthGate, GateError};
use stonebridge_gate::config::{ConfigError, GateConfig};
use stonebridge_gate::store::StoreError;

pub mod gate;
pub mod interest;

/// Errors surfaced by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid email address: {0}")]
    Email(#[from] EmailError),
    #[error("No stored profile; log in or record an interest first")]
    NoProfile,
}

/// Build a gate wired to the given notifier and a headless listings
/// surface. Commands that want stored state restored call `init` themselves.
pub(crate) fn build_gate(notifier: Arc<dyn Notifier>) -> Result<AuthGate, CliError> {
    let config = GateConfig::from_env()?;
    let gate = AuthGate::from_config(config, notifier, Arc::new(IdleListingsApp))?;
    Ok(gate)
}
