//! Store traits for balances and ledger entries
//!
//! The engine coordinates two stores: one holding the current balance per
//! account and one holding the ledger entries. Both traits return owned
//! snapshots rather than references, so an implementation is free to hold
//! internal locks only for the duration of each call.
//!
//! Every method returns `Result` even where the in-memory implementations
//! cannot fail; a database-backed store can fail on any of them, and the
//! engine's compensation logic depends on seeing those failures.

use crate::types::{AccountBalance, AccountId, EntryId, LedgerEntry, LedgerError};

/// Trait for loading and persisting account balances
///
/// Implementations must be safe to share across tasks; the engine holds the
/// store behind an `Arc` and serializes mutations per account with its own
/// lock manager, so the store itself only needs consistent individual reads
/// and writes.
pub trait BalanceStore: Send + Sync {
    /// Load the current balance for an account.
    ///
    /// Returns `Ok(None)` when the account has no balance record yet.
    fn load(&self, account: &AccountId) -> Result<Option<AccountBalance>, LedgerError>;

    /// Persist a balance, replacing any previous record for the account.
    fn persist(&self, balance: &AccountBalance) -> Result<(), LedgerError>;
}

/// Trait for storing and querying ledger entries
///
/// Entries are immutable once terminal; the only permitted removal is the
/// compensating delete of an entry whose paired balance write could not be
/// completed.
pub trait LedgerStore: Send + Sync {
    /// Insert a new entry.
    fn insert(&self, entry: &LedgerEntry) -> Result<(), LedgerError>;

    /// Fetch an entry by id.
    fn get(&self, id: EntryId) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Persist an updated entry, replacing the stored version.
    fn persist(&self, entry: &LedgerEntry) -> Result<(), LedgerError>;

    /// Remove an entry. Used only as a compensating action.
    fn remove(&self, id: EntryId) -> Result<(), LedgerError>;

    /// Entries for one account, most recent first, at most `limit`.
    fn for_account(
        &self,
        account: &AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Pending entries across all accounts, most recent first, at most
    /// `limit`.
    fn pending(&self, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Terminal entries across all accounts ordered by `updated_at`
    /// descending, at most `limit`.
    fn processed(&self, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError>;
}
