//! Ledger entry types
//!
//! This module defines the transaction record persisted for every balance
//! mutation, its type and status enums, and the request payloads accepted
//! by the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::balance::AccountId;

/// Ledger entry identifier.
pub type EntryId = Uuid;

/// Transaction types recorded in the ledger
///
/// Deposit-class types credit the account when an administrator completes
/// them; withdrawal-class types are debited at creation time and refunded
/// if the entry is later cancelled or failed. The remaining types carry no
/// balance effect on status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Manually confirmed fiat deposit.
    Deposit,
    /// Crypto deposit; completion also grants bonus tickets per USD spent.
    DepositCrypto,
    /// Standard withdrawal against the flower balance.
    Withdrawal,
    /// Diamond payout withdrawal (flower-denominated).
    WithdrawalDiamond,
    /// Withdrawal against the BVR coin balance.
    WithdrawalBvr,
    /// Currency exchange record.
    Exchange,
    /// Flower pack purchase awaiting admin approval.
    FlowerPurchase,
    /// Referral reward, credited on completion.
    ReferralBonus,
    /// Incoming transfer, credited on completion.
    TransferReceived,
}

impl EntryType {
    /// Parse the wire code used by the source system (`deposit_crypto`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "deposit" => Some(EntryType::Deposit),
            "deposit_crypto" => Some(EntryType::DepositCrypto),
            "withdrawal" => Some(EntryType::Withdrawal),
            "withdrawal_diamond" => Some(EntryType::WithdrawalDiamond),
            "withdrawal_bvr" => Some(EntryType::WithdrawalBvr),
            "exchange" => Some(EntryType::Exchange),
            "flower_purchase" => Some(EntryType::FlowerPurchase),
            "referral_bonus" => Some(EntryType::ReferralBonus),
            "transfer_received" => Some(EntryType::TransferReceived),
            _ => None,
        }
    }

    /// Wire code for this type.
    pub fn as_code(&self) -> &'static str {
        match self {
            EntryType::Deposit => "deposit",
            EntryType::DepositCrypto => "deposit_crypto",
            EntryType::Withdrawal => "withdrawal",
            EntryType::WithdrawalDiamond => "withdrawal_diamond",
            EntryType::WithdrawalBvr => "withdrawal_bvr",
            EntryType::Exchange => "exchange",
            EntryType::FlowerPurchase => "flower_purchase",
            EntryType::ReferralBonus => "referral_bonus",
            EntryType::TransferReceived => "transfer_received",
        }
    }

    /// Types whose completion credits rewards onto the balance.
    ///
    /// Covers the deposit family plus referral bonuses, incoming transfers,
    /// and approved flower purchases.
    pub fn is_deposit_class(&self) -> bool {
        matches!(
            self,
            EntryType::Deposit
                | EntryType::DepositCrypto
                | EntryType::ReferralBonus
                | EntryType::TransferReceived
                | EntryType::FlowerPurchase
        )
    }

    /// Types whose amount was debited at creation time and is refunded on
    /// cancellation or failure.
    pub fn is_withdrawal_class(&self) -> bool {
        matches!(
            self,
            EntryType::Withdrawal | EntryType::WithdrawalDiamond | EntryType::WithdrawalBvr
        )
    }
}

/// Ledger entry status
///
/// `Pending` is the only initial state; the other three are terminal. The
/// engine enforces monotonicity: no transition is permitted out of a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl EntryStatus {
    /// Parse the wire code (`pending`, `completed`, `failed`, `cancelled`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(EntryStatus::Pending),
            "completed" => Some(EntryStatus::Completed),
            "failed" => Some(EntryStatus::Failed),
            "cancelled" => Some(EntryStatus::Cancelled),
            _ => None,
        }
    }

    /// Wire code for this status.
    pub fn as_code(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Completed => "completed",
            EntryStatus::Failed => "failed",
            EntryStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is permitted from this status.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

/// One recorded balance mutation and its outcome
///
/// Created in `Pending` status atomically with its balance effect (for
/// withdrawals) or with no effect yet (for deposits). Transitions to a
/// terminal status exactly once; never deleted except as a compensating
/// action when the initial paired write fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub account: AccountId,
    pub entry_type: EntryType,

    /// For withdrawal-class entries this is the quantity already deducted
    /// from the balance at creation time: a liability, not an aspiration.
    pub amount: u64,
    pub currency: String,
    pub status: EntryStatus,

    // Destination metadata
    pub address: Option<String>,
    pub crypto_address: Option<String>,
    pub network: Option<String>,
    pub wallet_address: Option<String>,

    // Deposit metadata
    pub flowers_amount: Option<u64>,
    pub tickets_amount: Option<u64>,
    pub usd_amount: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub received_amount: Option<Decimal>,

    pub user_email: Option<String>,
    pub notes: Option<String>,
    pub admin_notes: Option<String>,

    /// Administrator that moved the entry to a terminal status.
    pub processed_by: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    fn blank(account: AccountId, entry_type: EntryType, amount: u64, currency: String) -> Self {
        let now = Utc::now();
        LedgerEntry {
            id: Uuid::new_v4(),
            account,
            entry_type,
            amount,
            currency,
            status: EntryStatus::Pending,
            address: None,
            crypto_address: None,
            network: None,
            wallet_address: None,
            flowers_amount: None,
            tickets_amount: None,
            usd_amount: None,
            fees: None,
            received_amount: None,
            user_email: None,
            notes: None,
            admin_notes: None,
            processed_by: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the pending entry recording a withdrawal debit.
    pub fn pending_withdrawal(req: &WithdrawalRequest) -> Self {
        let mut entry = LedgerEntry::blank(
            req.account.clone(),
            req.entry_type,
            req.amount,
            req.currency.clone(),
        );
        entry.address = req.address.clone();
        entry.crypto_address = req.crypto_address.clone();
        entry.user_email = req.user_email.clone();
        entry
    }

    /// Build the pending entry recording a deposit awaiting confirmation.
    pub fn pending_deposit(req: &DepositRequest) -> Self {
        let mut entry = LedgerEntry::blank(
            req.account.clone(),
            req.entry_type,
            req.amount,
            req.currency.clone(),
        );
        entry.flowers_amount = req.flowers_amount;
        entry.tickets_amount = req.tickets_amount;
        entry.usd_amount = req.usd_amount;
        entry.fees = req.fees;
        entry.received_amount = req.received_amount;
        entry.network = req.network.clone();
        entry.wallet_address = req.wallet_address.clone();
        entry.user_email = req.user_email.clone();
        entry.notes = req.notes.clone();
        entry
    }
}

/// Payload for submitting a withdrawal.
#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    pub account: AccountId,
    pub amount: u64,
    /// Currency code selecting the debited balance field (`BVR` or other).
    pub currency: String,
    pub entry_type: EntryType,
    /// Fiat destination address.
    pub address: Option<String>,
    /// Crypto destination address.
    pub crypto_address: Option<String>,
    pub user_email: Option<String>,
}

impl WithdrawalRequest {
    /// Standard withdrawal against the flower balance.
    pub fn new(account: impl Into<AccountId>, amount: u64, currency: impl Into<String>) -> Self {
        WithdrawalRequest {
            account: account.into(),
            amount,
            currency: currency.into(),
            entry_type: EntryType::Withdrawal,
            address: None,
            crypto_address: None,
            user_email: None,
        }
    }

    /// Whether some destination is present on the request.
    pub fn has_destination(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.is_empty())
            || self.crypto_address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Payload for recording a deposit awaiting administrator confirmation.
#[derive(Debug, Clone)]
pub struct DepositRequest {
    pub account: AccountId,
    pub amount: u64,
    pub currency: String,
    pub entry_type: EntryType,
    /// Flowers credited when the deposit completes.
    pub flowers_amount: Option<u64>,
    /// Tickets credited when the deposit completes.
    pub tickets_amount: Option<u64>,
    /// USD value of the deposit; drives the crypto purchase bonus.
    pub usd_amount: Option<Decimal>,
    pub fees: Option<Decimal>,
    pub received_amount: Option<Decimal>,
    pub network: Option<String>,
    pub wallet_address: Option<String>,
    pub user_email: Option<String>,
    pub notes: Option<String>,
}

impl DepositRequest {
    pub fn new(account: impl Into<AccountId>, amount: u64, currency: impl Into<String>) -> Self {
        DepositRequest {
            account: account.into(),
            amount,
            currency: currency.into(),
            entry_type: EntryType::Deposit,
            flowers_amount: None,
            tickets_amount: None,
            usd_amount: None,
            fees: None,
            received_amount: None,
            network: None,
            wallet_address: None,
            user_email: None,
            notes: None,
        }
    }
}
