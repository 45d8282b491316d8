//! # Database Error Types
//!
//! Error types for database operations and the settlement engine.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Error Propagation                                  │
//! │                                                                         │
//! │  Validation(ValidationError)  malformed draft, rejected before any      │
//! │                               write; surfaced verbatim, no retry        │
//! │                                                                         │
//! │  NotFound                     referenced sale/debt missing in the       │
//! │                               store; fails the whole commit             │
//! │                                                                         │
//! │  Conflict                     a concurrent commit changed a debt        │
//! │                               between read and write; the engine        │
//! │                               retries the whole commit a bounded        │
//! │                               number of times before surfacing it       │
//! │                                                                         │
//! │  everything else              persistence failures; fatal for the       │
//! │                               operation, caller decides on retry        │
//! │                                                                         │
//! │  Whatever the variant, a failed commit leaves payments, debts and       │
//! │  balances byte-for-byte unchanged.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database and settlement-engine operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - A Collection line's `sale_id` resolves to no debt in the store
    /// - A payment id passed to `edit` does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A concurrent commit changed the entity between the engine's read
    /// phase and its guarded write. The whole commit must be retried from
    /// the read phase.
    #[error("write conflict on {entity} {id}: concurrent commit detected")]
    Conflict { entity: String, id: String },

    /// Draft validation failure (wraps the kasa-core error).
    #[error("validation error: {0}")]
    Validation(#[from] kasa_core::ValidationError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate receipt number within a store
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Conflict error for a given entity type and ID.
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether this error is a write conflict (retryable from the read
    /// phase).
    pub const fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
