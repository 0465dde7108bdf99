//! Per-account lease manager
//!
//! Balance mutations for one account must be serialized end-to-end: the
//! read-modify-write cycle spans two stores, so DashMap's per-key locking is
//! not enough. `AccountLockManager` hands out at most one lease per account
//! at a time; acquisition polls at a fixed interval until the lease frees up
//! or the caller's timeout elapses.
//!
//! Each lease carries an expiry and an owner token. A holder that never
//! releases (panicked task, lost future) only blocks the account until the
//! lease TTL passes, after which the next acquirer reclaims it. The token
//! check on release ensures a stale guard cannot free a lease that has since
//! been reclaimed by someone else.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::warn;

use crate::types::AccountId;

/// Interval between acquisition attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy)]
struct Lease {
    token: u64,
    expires_at: Instant,
}

/// Hands out per-account leases with bounded acquisition and a reclaim TTL.
#[derive(Debug)]
pub struct AccountLockManager {
    leases: DashMap<AccountId, Lease>,
    next_token: AtomicU64,
    lease_ttl: Duration,
}

impl AccountLockManager {
    pub fn new(lease_ttl: Duration) -> Self {
        Self {
            leases: DashMap::new(),
            next_token: AtomicU64::new(1),
            lease_ttl,
        }
    }

    /// Acquire the lease for `account`, waiting up to `timeout`.
    ///
    /// Returns `None` when the lease is still held (and unexpired) after the
    /// timeout. This is backpressure: the caller reports it to the client
    /// and performs no mutation.
    pub async fn acquire(
        self: &Arc<Self>,
        account: &AccountId,
        timeout: Duration,
    ) -> Option<AccountLockGuard> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(guard) = self.try_acquire(account) {
                return Some(guard);
            }
            if Instant::now() + POLL_INTERVAL > deadline {
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Single atomic acquisition attempt.
    ///
    /// The entry API holds the shard lock across the check, so two tasks
    /// cannot both observe the account free and both insert a lease.
    pub fn try_acquire(self: &Arc<Self>, account: &AccountId) -> Option<AccountLockGuard> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let lease = Lease {
            token,
            expires_at: now + self.lease_ttl,
        };
        let mut reclaimed = false;
        let mut inserted = false;

        self.leases
            .entry(account.clone())
            .and_modify(|held| {
                if held.expires_at <= now {
                    *held = lease;
                    reclaimed = true;
                }
            })
            .or_insert_with(|| {
                inserted = true;
                lease
            });

        if reclaimed {
            warn!(account = %account, "reclaimed expired account lease");
        }

        if reclaimed || inserted {
            Some(AccountLockGuard {
                manager: Arc::clone(self),
                account: account.clone(),
                token,
            })
        } else {
            None
        }
    }

    fn release(&self, account: &AccountId, token: u64) {
        // Only the current owner may free the lease; a reclaimed lease
        // belongs to its new holder.
        self.leases
            .remove_if(account, |_, lease| lease.token == token);
    }
}

impl Default for AccountLockManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// RAII guard for an account lease. Releases on drop under all exit paths.
#[derive(Debug)]
pub struct AccountLockGuard {
    manager: Arc<AccountLockManager>,
    account: AccountId,
    token: u64,
}

impl Drop for AccountLockGuard {
    fn drop(&mut self) {
        self.manager.release(&self.account, self.token);
    }
}
