//! Streaming CSV reader for operation scripts
//!
//! Provides an iterator over operations from a CSV script file, delegating
//! format concerns to the csv_format module, plus a loader for the seed
//! balances file.
//!
//! # Error handling
//!
//! - Fatal errors (file not found) are returned from `new()`
//! - Individual row errors are yielded as Err variants with line numbers,
//!   so a caller can keep replaying past malformed rows

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::io::csv_format::{convert_operation_record, BalanceRecord, Operation, OperationRecord};
use crate::types::{AccountBalance, LedgerError};

/// Streaming reader over an operation script.
#[derive(Debug)]
pub struct OperationReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl OperationReader {
    /// Open a script file for streaming iteration. Fields are trimmed and
    /// trailing columns may be omitted.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for OperationReader {
    type Item = Result<Operation, String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.line_num += 1;
        let mut raw = csv::StringRecord::new();
        match self.reader.read_record(&mut raw) {
            Ok(false) => None,
            Ok(true) => {
                let headers = match self.reader.headers() {
                    Ok(headers) => headers.clone(),
                    Err(e) => return Some(Err(format!("Line {}: {}", self.line_num, e))),
                };
                let record: OperationRecord = match raw.deserialize(Some(&headers)) {
                    Ok(record) => record,
                    Err(e) => return Some(Err(format!("Line {}: {}", self.line_num, e))),
                };
                Some(
                    convert_operation_record(record)
                        .map_err(|e| format!("Line {}: {}", self.line_num, e)),
                )
            }
            Err(e) => Some(Err(format!("Line {}: {}", self.line_num, e))),
        }
    }
}

/// Load starting balances from a seed CSV (account, flowers, tickets,
/// bvr_coins). Unlike script rows, a malformed seed row aborts the load.
pub fn read_seed_balances(path: &Path) -> Result<Vec<AccountBalance>, LedgerError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

    let mut balances = Vec::new();
    for result in reader.deserialize::<BalanceRecord>() {
        balances.push(result?.into());
    }
    Ok(balances)
}
