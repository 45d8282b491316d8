//! # Domain Types
//!
//! Core domain types for the settlement ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │ PaymentDocument  │   │    DebtRecord    │   │ StoreBalance-    │    │
//! │  │ ───────────────  │   │ ───────────────  │   │ Snapshot         │    │
//! │  │ id (UUID)        │   │ sale_id (key)    │   │ ───────────────  │    │
//! │  │ receipt_no       │   │ total_kurus      │   │ store_id         │    │
//! │  │ lines[]          │   │ paid_kurus       │   │ method →         │    │
//! │  │ total_kurus      │   │ status (derived) │   │   CurrencyTotals │    │
//! │  └──────────────────┘   └──────────────────┘   └──────────────────┘    │
//! │        SOURCE OF              DERIVED                DERIVED            │
//! │          TRUTH                                                          │
//! │                                                                         │
//! │  PaymentDocument is append-only. DebtRecord and StoreBalanceSnapshot   │
//! │  must always be reconstructible by replaying a store's documents.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Draft vs Committed
//! UI layers build a [`PaymentDraft`] of [`DraftLine`]s. The settlement
//! engine validates it, recomputes every line's settlement-currency amount
//! server-side, and commits an immutable [`PaymentDocument`]. A client-
//! supplied total that disagrees with the recomputed total is an error,
//! never silently corrected.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency::{Currency, CurrencyTotals, ExchangeRate};
use crate::money::Money;
use crate::PAID_EPSILON_KURUS;

// =============================================================================
// Line Type
// =============================================================================

/// The kind of a payment document line. The four kinds are mutually
/// exclusive in meaning and determine the sign of the line's contribution
/// to the store balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// Cash received, optionally settling an open debt.
    Collection,
    /// Cash leaving the register (supplies, services, petty cash).
    Expense,
    /// Cash leaving the register toward the central account.
    CenterTransfer,
    /// Manual over/under correction; the recorded amount carries its
    /// own sign.
    OverShort,
}

impl LineType {
    /// Sign of this line type's contribution to the store balance.
    ///
    /// ## Sign Rules
    /// | type           | sign                                |
    /// |----------------|-------------------------------------|
    /// | Collection     | +  (cash enters the store)          |
    /// | Expense        | -  (cash leaves the store)          |
    /// | CenterTransfer | -  (cash leaves toward the center)  |
    /// | OverShort      | sign of the recorded amount         |
    #[inline]
    pub const fn sign(&self) -> i64 {
        match self {
            LineType::Collection => 1,
            LineType::Expense => -1,
            LineType::CenterTransfer => -1,
            // The amount itself is signed for corrections.
            LineType::OverShort => 1,
        }
    }

    /// Whether lines of this type may carry a negative amount.
    #[inline]
    pub const fn allows_negative_amount(&self) -> bool {
        matches!(self, LineType::OverShort)
    }
}

// =============================================================================
// Payment Line (committed)
// =============================================================================

/// One line of a committed payment document.
///
/// `amount_kurus` is always `original_kurus × exchange_rate` expressed in
/// the settlement currency; it is the only amount that affects debts and
/// the primary balance slot. `original_kurus` feeds the informational
/// foreign-currency slot for non-TRY lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLine {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The line kind (see [`LineType`]).
    pub line_type: LineType,

    /// Reference to a payment-method definition.
    pub payment_method_id: String,

    /// Currency the amount was physically received/paid in.
    pub currency: Currency,

    /// Amount in `currency`, in that currency's minor unit.
    pub original_kurus: i64,

    /// Multiplier to the settlement currency; identity for TRY lines.
    pub exchange_rate: ExchangeRate,

    /// Settlement-currency amount: `original_kurus × exchange_rate`.
    pub amount_kurus: i64,

    /// Linked sale, only for Collection lines settling an open debt.
    /// A Collection without a sale link is unlinked income and touches
    /// no debt record.
    pub sale_id: Option<String>,

    /// Receipt number of the linked sale (display snapshot).
    pub sale_receipt_no: Option<String>,

    /// Customer of the linked sale (display snapshot).
    pub customer_name: Option<String>,

    /// Free-form note.
    pub description: Option<String>,
}

impl PaymentLine {
    /// Returns the settlement-currency amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_kurus(self.amount_kurus)
    }

    /// Signed settlement-currency contribution of this line to the store
    /// balance (sign rules in [`LineType::sign`]).
    #[inline]
    pub fn signed_amount_kurus(&self) -> i64 {
        self.line_type.sign() * self.amount_kurus
    }

    /// Signed original-currency contribution for the foreign slot of the
    /// dual ledger.
    #[inline]
    pub fn signed_original_kurus(&self) -> i64 {
        self.line_type.sign() * self.original_kurus
    }

    /// Whether this line settles a specific debt record.
    #[inline]
    pub fn settles_debt(&self) -> bool {
        self.line_type == LineType::Collection && self.sale_id.is_some()
    }
}

// =============================================================================
// Payment Document (committed)
// =============================================================================

/// One committed financial transaction receipt.
///
/// Immutable once committed; the only mutation is the engine's wholesale
/// `edit` operation, which replaces `lines`/`total_kurus` as a new atomic
/// transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDocument {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Store this receipt belongs to.
    pub store_id: String,

    /// Store-local calendar date of the receipt.
    pub entry_date: NaiveDate,

    /// Human-facing receipt number, unique per store (not globally).
    pub receipt_no: String,

    /// Personnel who recorded the receipt.
    pub personnel_id: String,

    /// Personnel display name (snapshot at commit time).
    pub personnel_name: String,

    /// Ordered, non-empty line items.
    pub lines: Vec<PaymentLine>,

    /// Sum of all lines' settlement-currency amounts. Invariant:
    /// `total_kurus == Σ lines[i].amount_kurus`, enforced at commit.
    pub total_kurus: i64,

    /// When the document was committed.
    pub created_at: DateTime<Utc>,
}

impl PaymentDocument {
    /// Returns the document total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_kurus(self.total_kurus)
    }
}

// =============================================================================
// Draft Types
// =============================================================================

/// One line of a draft receipt as built by the UI layer.
///
/// Drafts carry the original amount and the rate; the settlement-currency
/// amount is recomputed server-side, never trusted from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftLine {
    pub line_type: LineType,
    pub payment_method_id: String,
    pub currency: Currency,
    pub original_kurus: i64,
    pub exchange_rate: ExchangeRate,
    pub sale_id: Option<String>,
    pub sale_receipt_no: Option<String>,
    pub customer_name: Option<String>,
    pub description: Option<String>,
}

impl DraftLine {
    /// The settlement-currency amount this line will commit with.
    #[inline]
    pub fn amount_kurus(&self) -> i64 {
        self.exchange_rate.convert_kurus(self.original_kurus)
    }

    /// Signed settlement-currency balance contribution.
    #[inline]
    pub fn signed_amount_kurus(&self) -> i64 {
        self.line_type.sign() * self.amount_kurus()
    }

    /// Whether this line settles a specific debt record.
    #[inline]
    pub fn settles_debt(&self) -> bool {
        self.line_type == LineType::Collection && self.sale_id.is_some()
    }
}

/// A draft payment receipt awaiting commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub store_id: String,
    pub entry_date: NaiveDate,
    pub receipt_no: String,
    pub personnel_id: String,
    pub personnel_name: String,
    pub lines: Vec<DraftLine>,

    /// The total the client believes it is committing. Must equal the
    /// server-side recomputed sum of line amounts.
    pub declared_total_kurus: i64,
}

// =============================================================================
// Debt Record
// =============================================================================

/// Payment state of a debt record, derived from its amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    /// Nothing collected yet.
    Unpaid,
    /// Something collected, remainder above the settlement epsilon.
    PartiallyPaid,
    /// Remainder at or below the settlement epsilon (overpaid included).
    Paid,
}

impl DebtStatus {
    /// Derives the status from amounts. Never stored: deriving on read
    /// eliminates the class of drift bugs where a stored status and the
    /// amounts disagree.
    ///
    /// Paid wins over Unpaid for a zero-total debt.
    pub const fn derive(total_kurus: i64, paid_kurus: i64) -> DebtStatus {
        if total_kurus - paid_kurus <= PAID_EPSILON_KURUS {
            DebtStatus::Paid
        } else if paid_kurus == 0 {
            DebtStatus::Unpaid
        } else {
            DebtStatus::PartiallyPaid
        }
    }
}

/// The running open-balance ledger entry for one sale awaiting payment.
///
/// Created by the sale-recording flow; mutated only by the settlement
/// engine when a Collection line references it. `remaining` and `status`
/// are derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DebtRecord {
    /// The originating sale; doubles as this record's own id.
    pub sale_id: String,

    /// Store the sale (and therefore the debt) belongs to.
    pub store_id: String,

    /// Customer display name.
    pub customer_name: String,

    /// Receipt number of the originating sale.
    pub receipt_no: String,

    /// Calendar date of the originating sale.
    pub sale_date: NaiveDate,

    /// Fixed at sale time.
    pub total_kurus: i64,

    /// Monotonically non-decreasing under commits; an edit's reversal may
    /// lower it.
    pub paid_kurus: i64,

    /// Date of the most recent applied Collection line.
    pub last_payment_date: Option<NaiveDate>,
}

impl DebtRecord {
    /// Outstanding amount; negative when overpaid (overpayment is allowed
    /// and not clamped).
    #[inline]
    pub const fn remaining_kurus(&self) -> i64 {
        self.total_kurus - self.paid_kurus
    }

    /// Outstanding amount as Money.
    #[inline]
    pub fn remaining(&self) -> Money {
        Money::from_kurus(self.remaining_kurus())
    }

    /// Derived payment status.
    #[inline]
    pub const fn status(&self) -> DebtStatus {
        DebtStatus::derive(self.total_kurus, self.paid_kurus)
    }
}

// =============================================================================
// Store Balance Snapshot
// =============================================================================

/// The current cash-on-hand view for one store: per payment method, a
/// fixed-size per-currency totals record.
///
/// Derived state. For every committed document, each balance slot equals
/// the running sum of signed contributions from the store's committed
/// lines with that method/currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreBalanceSnapshot {
    pub store_id: String,

    /// Keyed by payment_method_id. BTreeMap keeps iteration deterministic
    /// for display and reconstruction checks.
    pub balances: BTreeMap<String, CurrencyTotals>,
}

impl StoreBalanceSnapshot {
    /// Creates an empty snapshot for a store.
    pub fn empty(store_id: impl Into<String>) -> Self {
        StoreBalanceSnapshot {
            store_id: store_id.into(),
            balances: BTreeMap::new(),
        }
    }

    /// Totals for one payment method (zero record when the method has
    /// never been used).
    pub fn method(&self, payment_method_id: &str) -> CurrencyTotals {
        self.balances
            .get(payment_method_id)
            .copied()
            .unwrap_or_default()
    }

    /// Adds a signed delta to a (method, currency) slot.
    pub fn apply(&mut self, payment_method_id: &str, currency: Currency, delta_kurus: i64) {
        self.balances
            .entry(payment_method_id.to_string())
            .or_default()
            .add(currency, delta_kurus);
    }
}

// =============================================================================
// Directory Types (external collaborators, read-only here)
// =============================================================================

/// A store in the chain, with its commission configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Store {
    pub id: String,
    pub name: String,
    pub commission_model: crate::commission::CommissionModel,
    /// Period sales target for target-based commission, in kurus.
    /// Zero means the target is always met.
    pub target_kurus: i64,
}

/// A payment-method definition (cash, card, meal voucher, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentMethodDef {
    pub id: String,
    pub name: String,
}

/// A personnel record scoped to a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Personnel {
    pub id: String,
    pub store_id: String,
    pub name: String,
    /// Commission rate in basis points (500 = 5%).
    pub commission_rate_bps: u32,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_type_signs() {
        assert_eq!(LineType::Collection.sign(), 1);
        assert_eq!(LineType::Expense.sign(), -1);
        assert_eq!(LineType::CenterTransfer.sign(), -1);
        assert_eq!(LineType::OverShort.sign(), 1);
        assert!(LineType::OverShort.allows_negative_amount());
        assert!(!LineType::Collection.allows_negative_amount());
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(DebtStatus::derive(100_000, 0), DebtStatus::Unpaid);
        assert_eq!(DebtStatus::derive(100_000, 40_000), DebtStatus::PartiallyPaid);
        assert_eq!(DebtStatus::derive(100_000, 100_000), DebtStatus::Paid);
        // Overpayment clamps to Paid
        assert_eq!(DebtStatus::derive(100_000, 120_000), DebtStatus::Paid);
        // Within the 10-kurus epsilon counts as Paid
        assert_eq!(DebtStatus::derive(100_000, 99_990), DebtStatus::Paid);
        assert_eq!(DebtStatus::derive(100_000, 99_989), DebtStatus::PartiallyPaid);
        // Zero-total debt: Paid wins over Unpaid
        assert_eq!(DebtStatus::derive(0, 0), DebtStatus::Paid);
    }

    #[test]
    fn test_debt_record_derivations() {
        let debt = DebtRecord {
            sale_id: "sale-1".into(),
            store_id: "store-1".into(),
            customer_name: "Ayşe Demir".into(),
            receipt_no: "S-0001".into(),
            sale_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            total_kurus: 100_000,
            paid_kurus: 40_000,
            last_payment_date: None,
        };
        assert_eq!(debt.remaining_kurus(), 60_000);
        assert_eq!(debt.status(), DebtStatus::PartiallyPaid);
    }

    #[test]
    fn test_draft_line_amount_recomputed() {
        let line = DraftLine {
            line_type: LineType::Collection,
            payment_method_id: "cash".into(),
            currency: Currency::Usd,
            original_kurus: 10_000, // $100
            exchange_rate: ExchangeRate::from_scaled(325_000),
            sale_id: None,
            sale_receipt_no: None,
            customer_name: None,
            description: None,
        };
        assert_eq!(line.amount_kurus(), 325_000); // ₺3250
        assert_eq!(line.signed_amount_kurus(), 325_000);
    }

    #[test]
    fn test_snapshot_apply() {
        let mut snapshot = StoreBalanceSnapshot::empty("store-1");
        snapshot.apply("cash", Currency::Try, 50_000);
        snapshot.apply("cash", Currency::Try, -15_000);
        snapshot.apply("cash", Currency::Usd, 10_000);

        let cash = snapshot.method("cash");
        assert_eq!(cash.get(Currency::Try), 35_000);
        assert_eq!(cash.get(Currency::Usd), 10_000);
        assert!(snapshot.method("card").is_zero());
    }
}
