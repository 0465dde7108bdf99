use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::core::EngineConfig;

/// Replay ledger operations and reconcile account balances
#[derive(Parser, Debug)]
#[command(name = "bloom-ledger")]
#[command(about = "Replay ledger operations and reconcile account balances", long_about = None)]
pub struct CliArgs {
    /// Operation script to replay
    #[arg(value_name = "SCRIPT", help = "Path to the CSV operation script")]
    pub script_file: PathBuf,

    /// Starting balances
    #[arg(
        long = "balances",
        value_name = "FILE",
        help = "Path to a CSV of starting balances (account, flowers, tickets, bvr_coins)"
    )]
    pub balances_file: Option<PathBuf>,

    /// Lock acquisition timeout in milliseconds
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MS",
        help = "How long an operation waits for an account lease (default: 5000)"
    )]
    pub lock_timeout_ms: Option<u64>,

    /// Operator gateway address for withdrawal notifications
    #[arg(
        long = "admin-address",
        value_name = "ADDRESS",
        help = "Gateway address notified of withdrawals (default: none, notifications skipped)"
    )]
    pub admin_address: Option<String>,
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments, falling back to defaults
    /// for anything not provided.
    pub fn to_engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(ms) = self.lock_timeout_ms {
            config.lock_timeout = Duration::from_millis(ms);
        }
        if let Some(address) = &self.admin_address {
            config.admin_address = address.clone();
        }
        config
    }
}
