//! Ledger processing orchestration
//!
//! This module provides the `LedgerEngine` struct, which coordinates the
//! balance store, the ledger store, the per-account lease manager, and the
//! withdrawal notifier to process all balance-affecting operations.
//!
//! # Architecture
//!
//! ```text
//! LedgerEngine
//!     ├── Arc<B: BalanceStore>      (current balance per account)
//!     ├── Arc<L: LedgerStore>       (ledger entries)
//!     ├── Arc<AccountLockManager>   (per-account leases)
//!     └── Arc<N: WithdrawalNotifier> (best-effort gateway)
//! ```
//!
//! # Consistency
//!
//! A withdrawal writes two stores: the balance (debit) and the ledger (the
//! pending entry). The stores offer no cross-store transaction, so the
//! engine runs a two-step sequence under the account lease and compensates
//! when the second write fails: the entry attempt is deleted, a fresh
//! balance is reloaded, and the debited amount is credited back. A failure
//! of the compensation itself is surfaced as `CompensationFailed` and
//! logged at error level for manual reconciliation.
//!
//! Status transitions take the same per-account lease, so a withdrawal and
//! a refund for the same account can never interleave.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{error, warn};

use crate::core::lock::AccountLockManager;
use crate::notify::WithdrawalNotifier;
use crate::store::{BalanceStore, LedgerStore};
use crate::types::{
    AccountBalance, AccountId, CurrencyKind, DepositRequest, EntryId, EntryStatus, LedgerEntry,
    LedgerError, WithdrawalRequest,
};

/// Configuration for the engine
///
/// All knobs have production defaults; the CLI can override the lock
/// timeout and the operator gateway address.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a request waits for the account lease before giving up.
    pub lock_timeout: Duration,
    /// How long a lease may be held before the next acquirer reclaims it.
    pub lease_ttl: Duration,
    /// Page size for the per-account entry listing.
    pub user_page_limit: usize,
    /// Page size for the admin pending/processed listings.
    pub admin_page_limit: usize,
    /// Operator gateway address for withdrawal notifications. Empty means
    /// no gateway is configured and notifications are skipped.
    pub admin_address: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            lease_ttl: Duration::from_secs(30),
            user_page_limit: 50,
            admin_page_limit: 100,
            admin_address: String::new(),
        }
    }
}

/// Outcome of a successful withdrawal submission.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalReceipt {
    /// The pending ledger entry recording the debit.
    pub entry: LedgerEntry,
    /// Flower balance after the debit.
    pub remaining_flowers: u64,
    /// BVR coin balance after the debit.
    pub remaining_bvr: u64,
}

/// Ledger processing orchestrator
///
/// Generic over its store and notifier seams so tests can inject failing
/// implementations and a persistent backend can be swapped in. All state is
/// behind `Arc`, so the engine clones cheaply and can be shared across
/// tasks.
#[derive(Debug)]
pub struct LedgerEngine<B, L, N> {
    balances: Arc<B>,
    ledger: Arc<L>,
    locks: Arc<AccountLockManager>,
    notifier: Arc<N>,
    config: EngineConfig,
}

impl<B, L, N> Clone for LedgerEngine<B, L, N> {
    fn clone(&self) -> Self {
        Self {
            balances: Arc::clone(&self.balances),
            ledger: Arc::clone(&self.ledger),
            locks: Arc::clone(&self.locks),
            notifier: Arc::clone(&self.notifier),
            config: self.config.clone(),
        }
    }
}

impl<B, L, N> LedgerEngine<B, L, N>
where
    B: BalanceStore + 'static,
    L: LedgerStore + 'static,
    N: WithdrawalNotifier + 'static,
{
    pub fn new(balances: Arc<B>, ledger: Arc<L>, notifier: Arc<N>, config: EngineConfig) -> Self {
        Self {
            balances,
            ledger,
            locks: Arc::new(AccountLockManager::new(config.lease_ttl)),
            notifier,
            config,
        }
    }

    /// Submit a withdrawal: debit the balance and record a pending entry.
    ///
    /// The receipt carries the created entry plus the remaining flower and
    /// BVR balances. On any error no net mutation remains (the compensation
    /// path undoes a debit whose ledger write failed).
    pub async fn submit_withdrawal(
        &self,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalReceipt, LedgerError> {
        if request.amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if !request.entry_type.is_withdrawal_class() {
            return Err(LedgerError::unsupported_entry_type(
                request.entry_type.as_code(),
                "withdrawal",
            ));
        }
        if !request.has_destination() {
            return Err(LedgerError::MissingDestination {
                account: request.account.clone(),
            });
        }

        let kind = CurrencyKind::from_code(&request.currency);

        // Cheap pre-check outside the lease. The authoritative check
        // happens again on the reloaded balance below.
        let snapshot = self
            .balances
            .load(&request.account)?
            .ok_or_else(|| LedgerError::account_not_found(&request.account))?;
        if snapshot.available(kind) < request.amount {
            return Err(LedgerError::insufficient_funds(
                &request.account,
                &request.currency,
                snapshot.available(kind),
                request.amount,
            ));
        }

        let guard = self
            .locks
            .acquire(&request.account, self.config.lock_timeout)
            .await
            .ok_or_else(|| LedgerError::lock_timeout(&request.account))?;

        let mut balance = self
            .balances
            .load(&request.account)?
            .ok_or_else(|| LedgerError::account_not_found(&request.account))?;
        balance.debit(kind, request.amount, &request.currency)?;
        self.balances.persist(&balance)?;

        let entry = LedgerEntry::pending_withdrawal(&request);
        if let Err(insert_error) = self.ledger.insert(&entry) {
            self.compensate(&entry, kind)?;
            return Err(insert_error);
        }

        drop(guard);
        self.spawn_notification(entry.clone());

        Ok(WithdrawalReceipt {
            remaining_flowers: balance.flowers,
            remaining_bvr: balance.bvr_coins,
            entry,
        })
    }

    /// Undo a debit whose ledger write failed. Runs under the same lease
    /// that performed the debit.
    fn compensate(&self, entry: &LedgerEntry, kind: CurrencyKind) -> Result<(), LedgerError> {
        let attempt = || -> Result<(), LedgerError> {
            self.ledger.remove(entry.id)?;
            let mut fresh = self
                .balances
                .load(&entry.account)?
                .ok_or_else(|| LedgerError::account_not_found(&entry.account))?;
            fresh.credit(kind, entry.amount)?;
            self.balances.persist(&fresh)
        };
        attempt().map_err(|cause| {
            let failure = LedgerError::compensation_failed(
                entry.id,
                &entry.account,
                cause.to_string(),
            );
            error!(
                entry = %entry.id,
                account = %entry.account,
                amount = entry.amount,
                %cause,
                "compensation failed, balance requires manual reconciliation"
            );
            failure
        })
    }

    fn spawn_notification(&self, entry: LedgerEntry) {
        let notifier = Arc::clone(&self.notifier);
        let admin_address = self.config.admin_address.clone();
        tokio::spawn(async move {
            let email = entry.user_email.clone();
            if let Err(cause) =
                notifier.notify_withdrawal_submitted(&admin_address, &entry, email.as_deref())
            {
                warn!(entry = %entry.id, %cause, "withdrawal notification failed");
            }
        });
    }

    /// Record a deposit awaiting administrator confirmation.
    ///
    /// No balance effect: the credit happens only when the entry is
    /// completed via [`set_status`](Self::set_status).
    pub fn record_deposit(&self, request: DepositRequest) -> Result<LedgerEntry, LedgerError> {
        if request.amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if request.entry_type.is_withdrawal_class() {
            return Err(LedgerError::unsupported_entry_type(
                request.entry_type.as_code(),
                "deposit",
            ));
        }

        let entry = LedgerEntry::pending_deposit(&request);
        self.ledger.insert(&entry)?;
        Ok(entry)
    }

    /// Move an entry to a new status and apply its balance effect.
    ///
    /// Runs under the entry's account lease. Transitions out of a terminal
    /// status (and transitions to `pending`) are rejected, so the terminal
    /// credit or refund applies exactly once:
    /// - deposit-class entry completed: credit `flowers_amount` and
    ///   `tickets_amount`, plus `floor(usd_amount / 10)` bonus tickets for
    ///   crypto deposits.
    /// - withdrawal-class entry cancelled or failed: refund `amount` to the
    ///   balance field selected by the entry's currency.
    /// - `processed_at` is stamped on completed and cancelled only.
    pub async fn set_status(
        &self,
        entry_id: EntryId,
        new_status: EntryStatus,
        admin_notes: Option<String>,
        processed_by: Option<String>,
    ) -> Result<LedgerEntry, LedgerError> {
        let preview = self
            .ledger
            .get(entry_id)?
            .ok_or_else(|| LedgerError::entry_not_found(entry_id))?;

        let guard = self
            .locks
            .acquire(&preview.account, self.config.lock_timeout)
            .await
            .ok_or_else(|| LedgerError::lock_timeout(&preview.account))?;

        // Re-read under the lease; the entry may have been transitioned by
        // a concurrent request between the preview and the acquisition.
        let mut entry = self
            .ledger
            .get(entry_id)?
            .ok_or_else(|| LedgerError::entry_not_found(entry_id))?;

        if entry.status.is_terminal() || new_status == EntryStatus::Pending {
            return Err(LedgerError::invalid_transition(
                entry_id,
                entry.status,
                new_status,
            ));
        }

        let now = chrono::Utc::now();
        entry.status = new_status;
        entry.updated_at = now;
        if admin_notes.is_some() {
            entry.admin_notes = admin_notes;
        }
        if processed_by.is_some() {
            entry.processed_by = processed_by;
        }
        if matches!(new_status, EntryStatus::Completed | EntryStatus::Cancelled) {
            entry.processed_at = Some(now);
        }
        self.ledger.persist(&entry)?;

        // Balance effect after the status write. A failure here is
        // surfaced without rolling the status back.
        if let Err(cause) = self.apply_terminal_effect(&entry) {
            error!(
                entry = %entry.id,
                account = %entry.account,
                status = %entry.status,
                %cause,
                "balance effect failed after status write"
            );
            return Err(cause);
        }

        drop(guard);
        Ok(entry)
    }

    fn apply_terminal_effect(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        if entry.entry_type.is_deposit_class() && entry.status == EntryStatus::Completed {
            let flowers = entry.flowers_amount.unwrap_or(0);
            let mut tickets = entry.tickets_amount.unwrap_or(0);
            tickets += crypto_bonus_tickets(entry);

            let mut balance = self
                .balances
                .load(&entry.account)?
                .unwrap_or_else(|| AccountBalance::new(entry.account.clone()));
            balance.credit_rewards(flowers, tickets)?;
            return self.balances.persist(&balance);
        }

        if entry.entry_type.is_withdrawal_class()
            && matches!(entry.status, EntryStatus::Cancelled | EntryStatus::Failed)
        {
            let kind = CurrencyKind::from_code(&entry.currency);
            let mut balance = self
                .balances
                .load(&entry.account)?
                .ok_or_else(|| LedgerError::account_not_found(&entry.account))?;
            balance.credit(kind, entry.amount)?;
            return self.balances.persist(&balance);
        }

        Ok(())
    }

    /// Entries for one account, most recent first.
    pub fn entries_for_account(
        &self,
        account: &AccountId,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.ledger.for_account(account, self.config.user_page_limit)
    }

    /// Pending entries across all accounts, most recent first.
    pub fn pending_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.ledger.pending(self.config.admin_page_limit)
    }

    /// Terminal entries across all accounts, most recently updated first.
    pub fn processed_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.ledger.processed(self.config.admin_page_limit)
    }
}

/// Bonus tickets for a completed crypto deposit: one per whole 10 USD.
fn crypto_bonus_tickets(entry: &LedgerEntry) -> u64 {
    if entry.entry_type != crate::types::EntryType::DepositCrypto {
        return 0;
    }
    match entry.usd_amount {
        Some(usd) if usd > Decimal::ZERO => (usd / Decimal::from(10))
            .floor()
            .to_u64()
            .unwrap_or(0),
        _ => 0,
    }
}
