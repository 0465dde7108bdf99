//! In-memory balance store
//!
//! `MemoryBalanceStore` keeps account balances in a `DashMap` for
//! fine-grained concurrent access. Reads clone the record out so no map
//! shard lock is held while the engine works on a balance; the engine's
//! per-account lease makes the read-modify-write cycle safe.

use dashmap::DashMap;

use crate::store::traits::BalanceStore;
use crate::types::{AccountBalance, AccountId, LedgerError};

/// Thread-safe in-memory balance store.
#[derive(Debug, Default)]
pub struct MemoryBalanceStore {
    balances: DashMap<AccountId, AccountBalance>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Seed a balance record, replacing any existing one. Intended for
    /// replay setup and tests.
    pub fn seed(&self, balance: AccountBalance) {
        self.balances.insert(balance.account.clone(), balance);
    }

    /// Snapshot of all balances, unordered.
    pub fn all(&self) -> Vec<AccountBalance> {
        self.balances
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn load(&self, account: &AccountId) -> Result<Option<AccountBalance>, LedgerError> {
        Ok(self.balances.get(account).map(|entry| entry.value().clone()))
    }

    fn persist(&self, balance: &AccountBalance) -> Result<(), LedgerError> {
        self.balances
            .insert(balance.account.clone(), balance.clone());
        Ok(())
    }
}
