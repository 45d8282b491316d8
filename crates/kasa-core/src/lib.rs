//! # kasa-core: Pure Business Logic for the Kasa Settlement Ledger
//!
//! This crate is the **heart** of the Kasa back-office ledger. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasa Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 Back-office UI / report layers                  │    │
//! │  │   receipt entry ──► debt screens ──► cash dashboards            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ library calls                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                    kasa-db (SQLite layer)                       │    │
//! │  │    SettlementEngine::commit / edit, repositories, migrations    │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                ★ kasa-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐ ┌───────────┐ ┌────────────┐ ┌─────────────┐   │    │
//! │  │   │   types   │ │   money   │ │ validation │ │ commission  │   │    │
//! │  │   │ documents │ │  currency │ │   rules    │ │   engine    │   │    │
//! │  │   │   debts   │ │   rates   │ │   checks   │ │  (pure fn)  │   │    │
//! │  │   └───────────┘ └───────────┘ └────────────┘ └─────────────┘   │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PaymentDocument, DebtRecord, snapshots, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`currency`] - Closed currency set, fixed-point exchange rates
//! - [`validation`] - Draft validation rules
//! - [`commission`] - Commission/target payout engine
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in kurus (i64), never floats
//! 4. **Derived State**: Debt status and remaining amounts are computed on
//!    read from stored amounts, never stored alongside them

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod currency;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kasa_core::Money` instead of
// `use kasa_core::money::Money`

pub use commission::{compute_commissions, CommissionModel, CommissionResult, PersonnelSales};
pub use currency::{Currency, CurrencyTotals, ExchangeRate};
pub use error::{ValidationError, ValidationResult};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Settlement epsilon: a debt whose remainder is at or below this many
/// kurus (0.1 TRY) counts as Paid.
///
/// Historical receipts carry rounding residue from foreign-currency
/// conversion; without a tolerance those debts would sit PartiallyPaid
/// forever over fractions of a kurus.
pub const PAID_EPSILON_KURUS: i64 = 10;

/// Maximum lines allowed in a single payment document.
///
/// Prevents runaway receipts; a store's end-of-day document rarely
/// exceeds a dozen lines.
pub const MAX_DOCUMENT_LINES: usize = 50;
