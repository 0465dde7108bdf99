//! Bloom Ledger Library
//! # Overview
//!
//! This library provides the transaction ledger and balance reconciliation
//! engine for a game economy: per-account balances (flowers, tickets, BVR
//! coins) mutated through auditable ledger entries, with compensating
//! rollback when the paired writes fail partway.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (AccountBalance, LedgerEntry, errors)
//! - [`store`] - Store trait seams and in-memory implementations
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Withdrawal/deposit/status orchestration
//!   - [`core::lock`] - Per-account lease manager
//! - [`notify`] - Best-effort withdrawal notification seam
//! - [`io`] - CSV formats and readers for the replay tool
//! - [`replay`] - Operation script replay pipeline
//! - [`cli`] - CLI argument parsing
//!
//! # Consistency model
//!
//! All balance mutations for one account are serialized by a per-account
//! lease with a reclaim TTL. A withdrawal debits the balance and records a
//! pending ledger entry as a two-step sequence; when the second step fails
//! the debit is compensated. Status transitions are monotonic (pending to
//! one terminal status, exactly once) and carry the terminal balance
//! effects: deposit completion credits rewards, withdrawal cancellation or
//! failure refunds the debited amount.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod notify;
pub mod replay;
pub mod store;
pub mod types;

pub use crate::core::{EngineConfig, LedgerEngine, WithdrawalReceipt};
pub use io::write_balances_csv;
pub use notify::{LogNotifier, WithdrawalNotifier};
pub use store::{BalanceStore, LedgerStore, MemoryBalanceStore, MemoryLedgerStore};
pub use types::{
    AccountBalance, AccountId, CurrencyKind, DepositRequest, EntryId, EntryStatus, EntryType,
    LedgerEntry, LedgerError, WithdrawalRequest,
};
