//! # Kasa DB
//!
//! SQLite persistence and the settlement transaction engine for the Kasa
//! ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              kasa-db                                    │
//! │                                                                         │
//! │   Database (pool + migrations)                                          │
//! │        │                                                                │
//! │        ├── SettlementEngine   the ONLY writer of payments, debts,       │
//! │        │                      and balances (two-phase atomic commit)    │
//! │        │                                                                │
//! │        └── Repositories       read surfaces + directory upserts         │
//! │             ├── PaymentRepository                                       │
//! │             ├── DebtRepository                                          │
//! │             ├── BalanceRepository                                       │
//! │             └── DirectoryRepository                                     │
//! │                                                                         │
//! │   Domain types and the pure engines (validation, commission) live in    │
//! │   kasa-core; this crate adds durability and concurrency control.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::balance::BalanceRepository;
pub use repository::debt::DebtRepository;
pub use repository::directory::DirectoryRepository;
pub use repository::payment::{
    generate_line_id, generate_payment_id, generate_receipt_no, PaymentRepository,
};
pub use settlement::{SettlementEngine, MAX_COMMIT_RETRIES};
