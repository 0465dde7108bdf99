//! In-memory ledger entry store
//!
//! `MemoryLedgerStore` keeps entries in a `DashMap` keyed by entry id. The
//! list queries snapshot matching entries, sort, and truncate; with the
//! bounded page sizes used by the engine this is adequate for an in-memory
//! store, and a database-backed implementation would push the ordering and
//! limit into its query instead.

use dashmap::DashMap;

use crate::store::traits::LedgerStore;
use crate::types::{AccountId, EntryId, LedgerEntry, LedgerError};

/// Thread-safe in-memory ledger store.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    entries: DashMap<EntryId, LedgerEntry>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect_sorted<P, K>(&self, predicate: P, sort_key: K, limit: usize) -> Vec<LedgerEntry>
    where
        P: Fn(&LedgerEntry) -> bool,
        K: Fn(&LedgerEntry) -> chrono::DateTime<chrono::Utc>,
    {
        let mut matches: Vec<LedgerEntry> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|entry| std::cmp::Reverse(sort_key(entry)));
        matches.truncate(limit);
        matches
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn insert(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        self.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    fn get(&self, id: EntryId) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.entries.get(&id).map(|entry| entry.value().clone()))
    }

    fn persist(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        self.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    fn remove(&self, id: EntryId) -> Result<(), LedgerError> {
        self.entries.remove(&id);
        Ok(())
    }

    fn for_account(
        &self,
        account: &AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.collect_sorted(
            |entry| &entry.account == account,
            |entry| entry.created_at,
            limit,
        ))
    }

    fn pending(&self, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.collect_sorted(
            |entry| !entry.status.is_terminal(),
            |entry| entry.created_at,
            limit,
        ))
    }

    fn processed(&self, limit: usize) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.collect_sorted(
            |entry| entry.status.is_terminal(),
            |entry| entry.updated_at,
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryStatus, LedgerEntry, WithdrawalRequest};
    use chrono::Duration;

    fn entry_for(account: &str) -> LedgerEntry {
        LedgerEntry::pending_withdrawal(&WithdrawalRequest::new(account, 10, "USD"))
    }

    #[test]
    fn test_insert_get_remove() {
        let store = MemoryLedgerStore::new();
        let entry = entry_for("acct-1");

        store.insert(&entry).unwrap();
        assert_eq!(store.get(entry.id).unwrap(), Some(entry.clone()));

        store.remove(entry.id).unwrap();
        assert_eq!(store.get(entry.id).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_for_account_is_recent_first_and_bounded() {
        let store = MemoryLedgerStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let mut entry = entry_for("acct-1");
            entry.created_at = entry.created_at + Duration::seconds(i);
            ids.push(entry.id);
            store.insert(&entry).unwrap();
        }
        store.insert(&entry_for("acct-2")).unwrap();

        let listed = store.for_account(&"acct-1".to_string(), 3).unwrap();
        assert_eq!(listed.len(), 3);
        // Newest (largest created_at) first
        assert_eq!(listed[0].id, ids[4]);
        assert_eq!(listed[1].id, ids[3]);
        assert_eq!(listed[2].id, ids[2]);
    }

    #[test]
    fn test_pending_excludes_terminal_entries() {
        let store = MemoryLedgerStore::new();
        let pending = entry_for("acct-1");
        let mut done = entry_for("acct-1");
        done.status = EntryStatus::Completed;

        store.insert(&pending).unwrap();
        store.insert(&done).unwrap();

        let listed = store.pending(100).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, pending.id);
    }

    #[test]
    fn test_processed_orders_by_updated_at() {
        let store = MemoryLedgerStore::new();
        let mut older = entry_for("acct-1");
        older.status = EntryStatus::Cancelled;
        let mut newer = entry_for("acct-1");
        newer.status = EntryStatus::Completed;
        newer.updated_at = older.updated_at + Duration::seconds(10);

        store.insert(&older).unwrap();
        store.insert(&newer).unwrap();
        store.insert(&entry_for("acct-1")).unwrap(); // pending, excluded

        let listed = store.processed(100).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }
}
