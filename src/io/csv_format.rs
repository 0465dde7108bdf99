//! CSV format handling for operation scripts and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - OperationRecord structure for deserialization
//! - Conversion from raw records to domain operations
//! - Balance output and seed serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Script format
//!
//! Columns: `op, account, type, amount, currency, address, flowers,
//! tickets, usd, entry_ref, status, notes`. The `op` column selects the
//! operation (`withdraw`, `deposit`, `set_status`); the remaining columns
//! are interpreted per operation and may be left empty where unused.
//! `set_status` rows reference an earlier row's created entry by 1-based
//! ordinal in `entry_ref`, since entry ids are minted at replay time.

use std::io::Write;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{
    AccountBalance, DepositRequest, EntryStatus, EntryType, WithdrawalRequest,
};

/// Raw CSV record for one script row.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct OperationRecord {
    pub op: String,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub flowers: Option<String>,
    #[serde(default)]
    pub tickets: Option<String>,
    #[serde(default)]
    pub usd: Option<String>,
    #[serde(default)]
    pub entry_ref: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Domain operation parsed from a script row.
#[derive(Debug, Clone)]
pub enum Operation {
    Withdraw(WithdrawalRequest),
    Deposit(DepositRequest),
    SetStatus {
        /// 1-based ordinal of the earlier row whose entry is transitioned.
        entry_ref: usize,
        status: EntryStatus,
        notes: Option<String>,
    },
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, String> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("Missing required field '{name}'")),
    }
}

fn parse_u64(value: &str, name: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("Invalid {name} '{value}': expected a non-negative integer"))
}

fn optional_u64(field: &Option<String>, name: &str) -> Result<Option<u64>, String> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => parse_u64(value, name).map(Some),
        _ => Ok(None),
    }
}

/// Convert an OperationRecord to a domain Operation
///
/// Validates per-operation field presence and parses numeric fields;
/// business rules (funds, destinations, transition legality) are left to
/// the engine.
pub fn convert_operation_record(record: OperationRecord) -> Result<Operation, String> {
    match record.op.to_lowercase().as_str() {
        "withdraw" => {
            let account = required(&record.account, "account")?;
            let amount = parse_u64(required(&record.amount, "amount")?, "amount")?;
            let currency = required(&record.currency, "currency")?;

            let mut request = WithdrawalRequest::new(account, amount, currency);
            if let Some(code) = record.entry_type.as_deref().filter(|c| !c.is_empty()) {
                let entry_type = EntryType::from_code(code)
                    .ok_or_else(|| format!("Invalid entry type: '{code}'"))?;
                request.entry_type = entry_type;
            } else if currency == "BVR" {
                request.entry_type = EntryType::WithdrawalBvr;
            }
            request.address = record.address.filter(|a| !a.is_empty());
            Ok(Operation::Withdraw(request))
        }
        "deposit" => {
            let account = required(&record.account, "account")?;
            let amount = parse_u64(required(&record.amount, "amount")?, "amount")?;
            let currency = required(&record.currency, "currency")?;

            let mut request = DepositRequest::new(account, amount, currency);
            if let Some(code) = record.entry_type.as_deref().filter(|c| !c.is_empty()) {
                let entry_type = EntryType::from_code(code)
                    .ok_or_else(|| format!("Invalid entry type: '{code}'"))?;
                request.entry_type = entry_type;
            }
            request.flowers_amount = optional_u64(&record.flowers, "flowers")?;
            request.tickets_amount = optional_u64(&record.tickets, "tickets")?;
            request.usd_amount = match record.usd.as_deref() {
                Some(value) if !value.is_empty() => Some(
                    Decimal::from_str(value.trim())
                        .map_err(|_| format!("Invalid usd amount '{value}'"))?,
                ),
                _ => None,
            };
            request.notes = record.notes.filter(|n| !n.is_empty());
            Ok(Operation::Deposit(request))
        }
        "set_status" => {
            let entry_ref = parse_u64(required(&record.entry_ref, "entry_ref")?, "entry_ref")?;
            if entry_ref == 0 {
                return Err("entry_ref is 1-based".to_string());
            }
            let code = required(&record.status, "status")?;
            let status = EntryStatus::from_code(code)
                .ok_or_else(|| format!("Invalid status: '{code}'"))?;
            Ok(Operation::SetStatus {
                entry_ref: entry_ref as usize,
                status,
                notes: record.notes.filter(|n| !n.is_empty()),
            })
        }
        other => Err(format!("Invalid operation: '{other}'")),
    }
}

/// Seed CSV record: one starting balance per row.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BalanceRecord {
    pub account: String,
    #[serde(default)]
    pub flowers: u64,
    #[serde(default)]
    pub tickets: u64,
    #[serde(default)]
    pub bvr_coins: u64,
}

impl From<BalanceRecord> for AccountBalance {
    fn from(record: BalanceRecord) -> Self {
        let mut balance = AccountBalance::new(record.account);
        balance.flowers = record.flowers;
        balance.tickets = record.tickets;
        balance.bvr_coins = record.bvr_coins;
        balance
    }
}

/// Write final balances to CSV
///
/// Columns: account, flowers, tickets, bvr_coins. Rows are sorted by
/// account id for deterministic output.
pub fn write_balances_csv(
    balances: &[AccountBalance],
    output: &mut dyn Write,
) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["account", "flowers", "tickets", "bvr_coins"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = balances.to_vec();
    sorted.sort_by(|a, b| a.account.cmp(&b.account));

    for balance in sorted {
        writer
            .write_record(&[
                balance.account.clone(),
                balance.flowers.to_string(),
                balance.tickets.to_string(),
                balance.bvr_coins.to_string(),
            ])
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
