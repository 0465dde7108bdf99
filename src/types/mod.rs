//! Types module
//!
//! Contains core data structures used throughout the engine.
//! This module organizes types into logical submodules:
//! - `balance`: Account balance record and currency mapping
//! - `entry`: Ledger entry record, type/status enums, request payloads
//! - `error`: Error types for the ledger engine

pub mod balance;
pub mod entry;
pub mod error;

pub use balance::{AccountBalance, AccountId, CurrencyKind};
pub use entry::{
    DepositRequest, EntryId, EntryStatus, EntryType, LedgerEntry, WithdrawalRequest,
};
pub use error::LedgerError;
