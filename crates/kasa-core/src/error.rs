//! # Error Types
//!
//! Domain-specific error types for kasa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                    │
//! │                                                                         │
//! │  kasa-core errors (this file)                                           │
//! │  └── ValidationError  - Malformed drafts, rejected before any write     │
//! │                                                                         │
//! │  kasa-db errors (separate crate)                                        │
//! │  └── DbError          - NotFound / Conflict / persistence failures      │
//! │                         (wraps ValidationError for the engine surface)  │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → caller (UI layer)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, receipt number, amounts)
//! 3. Errors are enum variants, never String
//! 4. A validation failure must occur before any write and is surfaced to
//!    the caller verbatim; there is nothing to retry

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Draft validation errors.
///
/// Raised while checking a [`crate::types::PaymentDraft`] before the
/// settlement engine performs any read or write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid field content (wrong rate for currency, sale link on a
    /// non-collection line, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A draft must carry at least one line.
    #[error("document must contain at least one line")]
    NoLines,

    /// Line count exceeds the per-document cap.
    #[error("document cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// Every line netted to zero or negative; at least one line must add
    /// a positive settlement-currency amount.
    #[error("document must contain at least one line with a positive amount")]
    NoPositiveLine,

    /// The client-declared total disagrees with the server-side recomputed
    /// sum of line amounts. Never silently corrected.
    #[error("declared total {declared_kurus} kurus does not match computed total {computed_kurus} kurus")]
    TotalMismatch {
        declared_kurus: i64,
        computed_kurus: i64,
    },
}

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "store_id".to_string(),
        };
        assert_eq!(err.to_string(), "store_id is required");

        let err = ValidationError::TotalMismatch {
            declared_kurus: 100_000,
            computed_kurus: 95_000,
        };
        assert_eq!(
            err.to_string(),
            "declared total 100000 kurus does not match computed total 95000 kurus"
        );
    }
}
