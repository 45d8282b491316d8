//! # Repository Module
//!
//! Read-side database access for the Kasa ledger.
//!
//! ## Read/Write Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repositories here expose QUERIES:                                      │
//! │                                                                         │
//! │    db.payments().list_by_store(...)    payments by store + date range   │
//! │    db.debts().list_open_debts(...)     per-store debt ledger            │
//! │    db.balances().get_store_balance(..) assembled balance snapshot       │
//! │    db.directory().list_stores()        collaborator lookups             │
//! │                                                                         │
//! │  The ONLY write path for payments, debts, and balances is               │
//! │  crate::settlement::SettlementEngine. Keeping mutation out of the       │
//! │  repositories guarantees derived state can never drift from the         │
//! │  payment document history.                                              │
//! │                                                                         │
//! │  Exceptions: debts.record_sale_debt() is the entry point used by the    │
//! │  external sale-recording flow, and the directory repository carries     │
//! │  upserts for seeding.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`payment::PaymentRepository`] - Committed payment documents
//! - [`debt::DebtRepository`] - Per-sale open-balance records
//! - [`balance::BalanceRepository`] - Store cash balance snapshots
//! - [`directory::DirectoryRepository`] - Stores, payment methods, personnel

pub mod balance;
pub mod debt;
pub mod directory;
pub mod payment;
