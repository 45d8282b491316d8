//! # Validation Module
//!
//! Draft validation for the settlement engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Validation Layers                                 │
//! │                                                                         │
//! │  Layer 1: UI layer                                                      │
//! │  ├── Basic format checks (empty fields, parse errors)                   │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (inside SettlementEngine::commit)                 │
//! │  ├── Header fields present                                              │
//! │  ├── Per-line rules (method, amount sign, rate/currency pairing)        │
//! │  └── Declared total vs recomputed total                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  └── Foreign keys                                                       │
//! │                                                                         │
//! │  A draft that fails here is rejected before ANY read or write.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Debt existence is deliberately NOT checked here: resolving a Collection
//! line's sale link is the engine's read phase, a database concern.

use crate::currency::ExchangeRate;
use crate::error::{ValidationError, ValidationResult};
use crate::types::{DraftLine, LineType, PaymentDraft};
use crate::MAX_DOCUMENT_LINES;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a required string field is present and non-blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Line Validators
// =============================================================================

/// Validates a single draft line.
///
/// ## Rules
/// - `payment_method_id` must be non-blank
/// - TRY lines must carry the identity exchange rate
/// - `original_kurus` must be positive, except OverShort lines which may
///   be negative (a shortfall) but never zero
/// - Only Collection lines may carry a sale link
pub fn validate_line(index: usize, line: &DraftLine) -> ValidationResult<()> {
    let field = |name: &str| format!("lines[{index}].{name}");

    validate_required(&field("payment_method_id"), &line.payment_method_id)?;

    if line.currency.is_settlement() && line.exchange_rate != ExchangeRate::ONE {
        return Err(ValidationError::InvalidFormat {
            field: field("exchange_rate"),
            reason: "settlement-currency lines must use rate 1.0".to_string(),
        });
    }

    if line.original_kurus == 0 {
        return Err(ValidationError::MustBePositive {
            field: field("original_kurus"),
        });
    }

    if line.original_kurus < 0 && !line.line_type.allows_negative_amount() {
        return Err(ValidationError::MustBePositive {
            field: field("original_kurus"),
        });
    }

    if line.sale_id.is_some() && line.line_type != LineType::Collection {
        return Err(ValidationError::InvalidFormat {
            field: field("sale_id"),
            reason: "sale links are only valid on collection lines".to_string(),
        });
    }

    if let Some(sale_id) = &line.sale_id {
        validate_required(&field("sale_id"), sale_id)?;
    }

    Ok(())
}

// =============================================================================
// Draft Validator
// =============================================================================

/// Validates a full payment draft and returns the recomputed total.
///
/// ## Rules
/// - `store_id`, `receipt_no`, `personnel_id` non-blank
/// - 1..=[`MAX_DOCUMENT_LINES`] lines, each valid per [`validate_line`]
/// - At least one line with a positive settlement-currency amount
/// - `declared_total_kurus` must equal the recomputed sum; a mismatch is
///   an error, not silently corrected
pub fn validate_draft(draft: &PaymentDraft) -> ValidationResult<i64> {
    validate_required("store_id", &draft.store_id)?;
    validate_required("receipt_no", &draft.receipt_no)?;
    validate_required("personnel_id", &draft.personnel_id)?;

    if draft.lines.is_empty() {
        return Err(ValidationError::NoLines);
    }
    if draft.lines.len() > MAX_DOCUMENT_LINES {
        return Err(ValidationError::TooManyLines {
            max: MAX_DOCUMENT_LINES,
        });
    }

    let mut computed_total: i64 = 0;
    let mut has_positive = false;
    for (index, line) in draft.lines.iter().enumerate() {
        validate_line(index, line)?;
        let amount = line.amount_kurus();
        if amount > 0 {
            has_positive = true;
        }
        computed_total += amount;
    }

    if !has_positive {
        return Err(ValidationError::NoPositiveLine);
    }

    if draft.declared_total_kurus != computed_total {
        return Err(ValidationError::TotalMismatch {
            declared_kurus: draft.declared_total_kurus,
            computed_kurus: computed_total,
        });
    }

    Ok(computed_total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use chrono::NaiveDate;

    fn try_line(line_type: LineType, original_kurus: i64) -> DraftLine {
        DraftLine {
            line_type,
            payment_method_id: "cash".into(),
            currency: Currency::Try,
            original_kurus,
            exchange_rate: ExchangeRate::ONE,
            sale_id: None,
            sale_receipt_no: None,
            customer_name: None,
            description: None,
        }
    }

    fn draft(lines: Vec<DraftLine>, declared_total_kurus: i64) -> PaymentDraft {
        PaymentDraft {
            store_id: "store-1".into(),
            entry_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            receipt_no: "R-0001".into(),
            personnel_id: "p-1".into(),
            personnel_name: "Mehmet Kaya".into(),
            lines,
            declared_total_kurus,
        }
    }

    #[test]
    fn test_valid_draft() {
        let d = draft(
            vec![
                try_line(LineType::Collection, 40_000),
                try_line(LineType::Expense, 15_000),
            ],
            55_000,
        );
        assert_eq!(validate_draft(&d).unwrap(), 55_000);
    }

    #[test]
    fn test_missing_header_fields() {
        let mut d = draft(vec![try_line(LineType::Collection, 100)], 100);
        d.store_id = "  ".into();
        assert_eq!(
            validate_draft(&d),
            Err(ValidationError::Required {
                field: "store_id".into()
            })
        );
    }

    #[test]
    fn test_empty_lines_rejected() {
        let d = draft(vec![], 0);
        assert_eq!(validate_draft(&d), Err(ValidationError::NoLines));
    }

    #[test]
    fn test_total_mismatch_not_corrected() {
        let d = draft(vec![try_line(LineType::Collection, 40_000)], 39_000);
        assert_eq!(
            validate_draft(&d),
            Err(ValidationError::TotalMismatch {
                declared_kurus: 39_000,
                computed_kurus: 40_000,
            })
        );
    }

    #[test]
    fn test_negative_amount_only_for_over_short() {
        let d = draft(
            vec![
                try_line(LineType::Collection, 40_000),
                try_line(LineType::OverShort, -250),
            ],
            39_750,
        );
        assert!(validate_draft(&d).is_ok());

        let d = draft(vec![try_line(LineType::Expense, -100)], -100);
        assert!(matches!(
            validate_draft(&d),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let d = draft(vec![try_line(LineType::OverShort, 0)], 0);
        assert!(matches!(
            validate_draft(&d),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_needs_one_positive_line() {
        let d = draft(vec![try_line(LineType::OverShort, -500)], -500);
        assert_eq!(validate_draft(&d), Err(ValidationError::NoPositiveLine));
    }

    #[test]
    fn test_try_line_must_use_identity_rate() {
        let mut line = try_line(LineType::Collection, 10_000);
        line.exchange_rate = ExchangeRate::from_scaled(20_000);
        let d = draft(vec![line], 20_000);
        assert!(matches!(
            validate_draft(&d),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_sale_link_only_on_collections() {
        let mut line = try_line(LineType::Expense, 10_000);
        line.sale_id = Some("sale-1".into());
        let d = draft(vec![line], 10_000);
        assert!(matches!(
            validate_draft(&d),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_foreign_line_total_uses_converted_amount() {
        let mut line = try_line(LineType::Collection, 10_000); // $100
        line.currency = Currency::Usd;
        line.exchange_rate = ExchangeRate::from_scaled(325_000);
        let d = draft(vec![line], 325_000);
        assert_eq!(validate_draft(&d).unwrap(), 325_000);
    }
}
