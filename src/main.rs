//! Bloom Ledger CLI
//!
//! Replays a CSV operation script through the ledger engine and writes the
//! final account balances to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ops.csv > balances.csv
//! cargo run -- --balances seed.csv ops.csv > balances.csv
//! cargo run -- --lock-timeout-ms 250 --admin-address ops@example.com ops.csv
//! ```
//!
//! Row-level failures (malformed rows, insufficient funds, rejected
//! transitions) are logged and the replay continues; the log level is
//! controlled via `RUST_LOG`.
//!
//! # Exit Codes
//!
//! - 0: Success (individual rows may still have failed; see the log)
//! - 1: Fatal error (unreadable script or seed file, output failure)

use std::process;

use tracing_subscriber::EnvFilter;

use bloom_ledger::cli;
use bloom_ledger::io::write_balances_csv;
use bloom_ledger::replay::{build_engine, replay_script};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();
    let config = args.to_engine_config();

    let (engine, balances) = match build_engine(args.balances_file.as_deref(), config) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = replay_script(&engine, &args.script_file).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let mut output = std::io::stdout();
    if let Err(e) = write_balances_csv(&balances.all(), &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
