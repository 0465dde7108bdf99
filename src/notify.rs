//! Withdrawal notification seam
//!
//! After a withdrawal commits, an operator-facing gateway is informed so the
//! payout can be actioned. Delivery is strictly best-effort: it runs after
//! the lease is released, off the request path, and a failure is logged and
//! otherwise ignored. The transaction outcome never depends on it.

use thiserror::Error;
use tracing::info;

use crate::types::LedgerEntry;

/// Failure reported by a notifier implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Notification failed: {message}")]
pub struct NotifyError {
    pub message: String,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        NotifyError {
            message: message.into(),
        }
    }
}

/// Gateway informed after a committed withdrawal.
pub trait WithdrawalNotifier: Send + Sync {
    /// Notify the operator address that a withdrawal was submitted.
    ///
    /// `admin_address` is empty when no gateway is configured; an
    /// implementation should treat that as "skip" rather than an error.
    fn notify_withdrawal_submitted(
        &self,
        admin_address: &str,
        entry: &LedgerEntry,
        account_email: Option<&str>,
    ) -> Result<(), NotifyError>;
}

/// Default notifier: records the event in the log stream.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl WithdrawalNotifier for LogNotifier {
    fn notify_withdrawal_submitted(
        &self,
        admin_address: &str,
        entry: &LedgerEntry,
        account_email: Option<&str>,
    ) -> Result<(), NotifyError> {
        if admin_address.is_empty() {
            return Ok(());
        }
        info!(
            to = %admin_address,
            entry = %entry.id,
            account = %entry.account,
            amount = entry.amount,
            currency = %entry.currency,
            email = account_email.unwrap_or("-"),
            "withdrawal submitted"
        );
        Ok(())
    }
}
