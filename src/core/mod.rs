//! Core business logic module
//!
//! This module contains the ledger processing components:
//! - `lock` - Per-account lease manager serializing balance mutations
//! - `engine` - Withdrawal/deposit/status orchestration over the stores

pub mod engine;
pub mod lock;

pub use engine::{EngineConfig, LedgerEngine, WithdrawalReceipt};
pub use lock::{AccountLockGuard, AccountLockManager};
