//! Error types for the ledger engine
//!
//! All failures surfaced by the engine are variants of [`LedgerError`].
//! Business-rule rejections (insufficient funds) and backpressure
//! (lock timeout) are recoverable and reported to the caller with no
//! mutation performed; persistence failures during the withdrawal critical
//! section trigger one compensating action and surface as fatal when that
//! compensation itself fails.

use thiserror::Error;
use uuid::Uuid;

use super::entry::EntryStatus;

/// Main error type for the ledger engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The selected balance field holds less than the requested amount.
    ///
    /// Business-rule rejection; nothing was mutated.
    #[error("Insufficient {currency} for account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: String,
        currency: String,
        available: u64,
        requested: u64,
    },

    /// The per-account lease could not be acquired within the timeout.
    ///
    /// Backpressure signal; the caller should retry later. Nothing was
    /// mutated.
    #[error("Could not acquire lock for account {account} within the timeout")]
    LockTimeout { account: String },

    /// No ledger entry with this id.
    #[error("Ledger entry {entry} not found")]
    EntryNotFound { entry: Uuid },

    /// No balance record for this account.
    #[error("No balance record for account {account}")]
    AccountNotFound { account: String },

    /// A zero amount was requested.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// A withdrawal was submitted without any destination address.
    #[error("Withdrawal for account {account} requires an address or crypto address")]
    MissingDestination { account: String },

    /// The entry type is not valid for the requested operation.
    #[error("Entry type '{entry_type}' is not valid for {operation}")]
    UnsupportedEntryType {
        entry_type: String,
        operation: String,
    },

    /// A transition out of a terminal status, or back to pending.
    ///
    /// Terminal statuses are final; rejecting re-application keeps the
    /// credit/refund side effect exactly-once.
    #[error("Ledger entry {entry} cannot move from {from} to {to}")]
    InvalidTransition {
        entry: Uuid,
        from: EntryStatus,
        to: EntryStatus,
    },

    /// A store write failed.
    #[error("Persistence failure during {operation}: {message}")]
    Persistence { operation: String, message: String },

    /// The compensating rollback after a failed ledger write also failed.
    ///
    /// The account may hold an unreconciled debit; manual reconciliation is
    /// required. No automatic retry is attempted.
    #[error("Compensation failed for entry {entry} on account {account}: {message}")]
    CompensationFailed {
        entry: Uuid,
        account: String,
        message: String,
    },

    /// A balance field would overflow.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    Overflow { account: String, operation: String },

    /// I/O error while reading or writing replay files.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Malformed row in a replay script.
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse { line: Option<u64>, message: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());
        LedgerError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Whether the caller may simply retry the same request later.
    ///
    /// Only the lock-timeout backpressure signal qualifies.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::LockTimeout { .. })
    }

    pub fn insufficient_funds(
        account: &str,
        currency: &str,
        available: u64,
        requested: u64,
    ) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            currency: currency.to_string(),
            available,
            requested,
        }
    }

    pub fn lock_timeout(account: &str) -> Self {
        LedgerError::LockTimeout {
            account: account.to_string(),
        }
    }

    pub fn entry_not_found(entry: Uuid) -> Self {
        LedgerError::EntryNotFound { entry }
    }

    pub fn account_not_found(account: &str) -> Self {
        LedgerError::AccountNotFound {
            account: account.to_string(),
        }
    }

    pub fn unsupported_entry_type(entry_type: &str, operation: &str) -> Self {
        LedgerError::UnsupportedEntryType {
            entry_type: entry_type.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn invalid_transition(entry: Uuid, from: EntryStatus, to: EntryStatus) -> Self {
        LedgerError::InvalidTransition { entry, from, to }
    }

    pub fn persistence(operation: &str, message: impl Into<String>) -> Self {
        LedgerError::Persistence {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn compensation_failed(entry: Uuid, account: &str, message: impl Into<String>) -> Self {
        LedgerError::CompensationFailed {
            entry,
            account: account.to_string(),
            message: message.into(),
        }
    }

    pub fn overflow(account: &str, operation: &str) -> Self {
        LedgerError::Overflow {
            account: account.to_string(),
            operation: operation.to_string(),
        }
    }
}
