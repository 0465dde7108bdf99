//! Storage module
//!
//! Defines the trait seams between the engine and its persistence layer:
//! - `traits` - `BalanceStore` and `LedgerStore` abstractions
//! - `balance` - In-memory balance store backed by DashMap
//! - `ledger` - In-memory ledger entry store backed by DashMap
//!
//! The engine only ever talks to the traits, so tests can substitute
//! failure-injecting implementations and a database-backed store can be
//! swapped in without touching the orchestration logic.

pub mod balance;
pub mod ledger;
pub mod traits;

pub use balance::MemoryBalanceStore;
pub use ledger::MemoryLedgerStore;
pub use traits::{BalanceStore, LedgerStore};
