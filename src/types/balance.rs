//! Account balance types for the ledger engine
//!
//! This module defines the per-account balance record and the currency
//! mapping used to decide which balance field a ledger entry touches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Account identifier, assigned by the authentication layer.
///
/// The core trusts this value as given; it never mints account ids itself.
pub type AccountId = String;

/// Balance field selected by a ledger entry's currency code.
///
/// `"BVR"` maps to the BVR coin balance; every other currency code (USD,
/// diamond payouts, etc.) is denominated in flowers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyKind {
    /// Primary spendable/earnable currency.
    Flowers,
    /// Tertiary coin, withdrawable independently of flowers.
    BvrCoins,
}

impl CurrencyKind {
    /// Map a currency code to the balance field it debits or credits.
    pub fn from_code(code: &str) -> Self {
        if code == "BVR" {
            CurrencyKind::BvrCoins
        } else {
            CurrencyKind::Flowers
        }
    }
}

/// Current spendable quantities for one account
///
/// All fields are unsigned: a balance can never be observed negative, and
/// any mutation that would underflow is rejected before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The owning account.
    pub account: AccountId,

    /// Primary spendable/earnable currency.
    pub flowers: u64,

    /// Secondary reward currency, also earned via purchase bonuses.
    pub tickets: u64,

    /// Tertiary coin, withdrawable independently.
    pub bvr_coins: u64,

    /// Advanced on every mutation.
    pub last_updated: DateTime<Utc>,
}

impl AccountBalance {
    /// Create a zeroed balance for an account.
    pub fn new(account: impl Into<AccountId>) -> Self {
        AccountBalance {
            account: account.into(),
            flowers: 0,
            tickets: 0,
            bvr_coins: 0,
            last_updated: Utc::now(),
        }
    }

    /// Amount currently available in the field selected by `kind`.
    pub fn available(&self, kind: CurrencyKind) -> u64 {
        match kind {
            CurrencyKind::Flowers => self.flowers,
            CurrencyKind::BvrCoins => self.bvr_coins,
        }
    }

    /// Deduct `amount` from the field selected by `kind`.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] when the field holds
    /// less than `amount`; the balance is untouched on failure.
    pub fn debit(&mut self, kind: CurrencyKind, amount: u64, currency: &str) -> Result<(), LedgerError> {
        let field = match kind {
            CurrencyKind::Flowers => &mut self.flowers,
            CurrencyKind::BvrCoins => &mut self.bvr_coins,
        };
        *field = field.checked_sub(amount).ok_or_else(|| {
            LedgerError::insufficient_funds(&self.account, currency, *field, amount)
        })?;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Add `amount` back onto the field selected by `kind`.
    ///
    /// Overflow is a typed error rather than a wrap; the balance is
    /// untouched on failure.
    pub fn credit(&mut self, kind: CurrencyKind, amount: u64) -> Result<(), LedgerError> {
        let field = match kind {
            CurrencyKind::Flowers => &mut self.flowers,
            CurrencyKind::BvrCoins => &mut self.bvr_coins,
        };
        *field = field
            .checked_add(amount)
            .ok_or_else(|| LedgerError::overflow(&self.account, "credit"))?;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Credit flower and ticket rewards in one mutation (deposit completion).
    pub fn credit_rewards(&mut self, flowers: u64, tickets: u64) -> Result<(), LedgerError> {
        self.flowers = self
            .flowers
            .checked_add(flowers)
            .ok_or_else(|| LedgerError::overflow(&self.account, "deposit credit"))?;
        self.tickets = self
            .tickets
            .checked_add(tickets)
            .ok_or_else(|| LedgerError::overflow(&self.account, "deposit credit"))?;
        self.last_updated = Utc::now();
        Ok(())
    }
}
