//! Operation replay pipeline
//!
//! Drives a CSV operation script through a `LedgerEngine` and reports the
//! final balances. Row-level failures (malformed rows, rejected operations)
//! are logged and collected without stopping the run; only setup failures
//! (unreadable files) abort.
//!
//! `set_status` rows reference earlier rows by 1-based ordinal, resolved
//! against the entries created so far in this run.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{EngineConfig, LedgerEngine};
use crate::io::csv_format::Operation;
use crate::io::reader::{read_seed_balances, OperationReader};
use crate::notify::LogNotifier;
use crate::store::{MemoryBalanceStore, MemoryLedgerStore};
use crate::types::{EntryId, LedgerError};

/// Outcome summary of one replay run.
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Rows applied successfully.
    pub applied: usize,
    /// Row-level failures, in encounter order.
    pub failures: Vec<String>,
}

/// Engine assembled over the in-memory stores, as used by the replay tool.
pub type ReplayEngine = LedgerEngine<MemoryBalanceStore, MemoryLedgerStore, LogNotifier>;

/// Build an engine seeded from an optional balances CSV.
pub fn build_engine(
    seed_path: Option<&Path>,
    config: EngineConfig,
) -> Result<(ReplayEngine, Arc<MemoryBalanceStore>), LedgerError> {
    let balances = Arc::new(MemoryBalanceStore::new());
    if let Some(path) = seed_path {
        for balance in read_seed_balances(path)? {
            balances.seed(balance);
        }
    }
    let engine = LedgerEngine::new(
        Arc::clone(&balances),
        Arc::new(MemoryLedgerStore::new()),
        Arc::new(LogNotifier),
        config,
    );
    Ok((engine, balances))
}

/// Replay a script against the engine.
///
/// Each created entry (withdrawal or deposit) is appended to the ordinal
/// table; `set_status` rows index into it. Rows that fail are recorded in
/// the report and the run continues.
pub async fn replay_script(
    engine: &ReplayEngine,
    script_path: &Path,
) -> Result<ReplayReport, LedgerError> {
    let reader = OperationReader::new(script_path).map_err(|message| LedgerError::Parse {
        line: None,
        message,
    })?;

    let mut report = ReplayReport::default();
    let mut created: Vec<EntryId> = Vec::new();

    for result in reader {
        let operation = match result {
            Ok(operation) => operation,
            Err(message) => {
                warn!(%message, "skipping malformed row");
                report.failures.push(message);
                continue;
            }
        };

        let outcome = apply(engine, operation, &mut created).await;
        match outcome {
            Ok(()) => report.applied += 1,
            Err(error) => {
                warn!(%error, "operation rejected");
                report.failures.push(error.to_string());
            }
        }
    }

    info!(
        applied = report.applied,
        failed = report.failures.len(),
        "replay finished"
    );
    Ok(report)
}

async fn apply(
    engine: &ReplayEngine,
    operation: Operation,
    created: &mut Vec<EntryId>,
) -> Result<(), LedgerError> {
    match operation {
        Operation::Withdraw(request) => {
            let receipt = engine.submit_withdrawal(request).await?;
            created.push(receipt.entry.id);
            Ok(())
        }
        Operation::Deposit(request) => {
            let entry = engine.record_deposit(request)?;
            created.push(entry.id);
            Ok(())
        }
        Operation::SetStatus {
            entry_ref,
            status,
            notes,
        } => {
            let entry_id = created.get(entry_ref - 1).copied().ok_or_else(|| {
                LedgerError::Parse {
                    line: None,
                    message: format!("entry_ref {entry_ref} does not match any created entry"),
                }
            })?;
            engine.set_status(entry_id, status, notes, None).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str =
        "op,account,type,amount,currency,address,flowers,tickets,usd,entry_ref,status,notes\n";

    fn temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn seed_csv(content: &str) -> NamedTempFile {
        temp_csv(content)
    }

    #[tokio::test]
    async fn test_withdraw_then_cancel_restores_balance() {
        let seed = seed_csv("account,flowers,tickets,bvr_coins\nacct-1,1000,0,0\n");
        let script = temp_csv(&format!(
            "{HEADER}withdraw,acct-1,,300,USD,1 Main St,,,,,,\n\
             set_status,,,,,,,,,1,cancelled,\n"
        ));

        let (engine, balances) =
            build_engine(Some(seed.path()), EngineConfig::default()).unwrap();
        let report = replay_script(&engine, script.path()).await.unwrap();

        assert_eq!(report.applied, 2);
        assert!(report.failures.is_empty());
        let all = balances.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].flowers, 1000);
    }

    #[tokio::test]
    async fn test_rejected_rows_do_not_stop_the_run() {
        let seed = seed_csv("account,flowers,tickets,bvr_coins\nacct-1,0,0,50\n");
        let script = temp_csv(&format!(
            "{HEADER}withdraw,acct-1,,80,BVR,0xabc,,,,,,\n\
             withdraw,acct-1,,20,BVR,0xabc,,,,,,\n"
        ));

        let (engine, balances) =
            build_engine(Some(seed.path()), EngineConfig::default()).unwrap();
        let report = replay_script(&engine, script.path()).await.unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("Insufficient"));
        assert_eq!(balances.all()[0].bvr_coins, 30);
    }

    #[tokio::test]
    async fn test_unresolvable_entry_ref_is_recorded() {
        let script = temp_csv(&format!("{HEADER}set_status,,,,,,,,,7,cancelled,\n"));

        let (engine, _balances) = build_engine(None, EngineConfig::default()).unwrap();
        let report = replay_script(&engine, script.path()).await.unwrap();

        assert_eq!(report.applied, 0);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("entry_ref 7"));
    }

    #[tokio::test]
    async fn test_missing_script_is_fatal() {
        let (engine, _balances) = build_engine(None, EngineConfig::default()).unwrap();
        let result = replay_script(&engine, Path::new("/nonexistent/script.csv")).await;
        assert!(result.is_err());
    }
}
