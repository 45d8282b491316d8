//! # Commission / Target Engine
//!
//! Read-side computation of personnel commission payouts from aggregated
//! settled-sales totals and the store's configured target.
//!
//! ## Eligibility
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  flat_rate                                                              │
//! │    every personnel: commission = sales × rate, always eligible          │
//! │                                                                         │
//! │  target_based                                                           │
//! │    store_total = Σ personnel sales                                      │
//! │    store_total < target  → ALL personnel ineligible (commission 0),     │
//! │                            regardless of individual performance         │
//! │    store_total ≥ target  → commission = sales × rate per person         │
//! │    target == 0           → target always met (degenerates to flat)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This engine has no write side effects. It is a pure function over its
//! inputs: identical inputs always produce identical output, so a period
//! report can be recomputed at any time.
//!
//! The sales aggregate is an external input, computed by summing Sale
//! documents (not PaymentDocuments) grouped by personnel.

use serde::{Deserialize, Serialize};

// =============================================================================
// Commission Model
// =============================================================================

/// How a store pays commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CommissionModel {
    /// Payout gated on the store hitting its period sales target.
    TargetBased,
    /// Unconditional per-person payout.
    FlatRate,
}

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Aggregated settled sales for one personnel over the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonnelSales {
    pub personnel_id: String,
    pub personnel_name: String,
    /// Settled sales total for the period, in kurus.
    pub sales_kurus: i64,
    /// Commission rate in basis points (500 = 5%).
    pub rate_bps: u32,
}

/// Computed payout for one personnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionResult {
    pub personnel_id: String,
    pub personnel_name: String,
    pub sales_kurus: i64,
    pub rate_bps: u32,
    /// False only when a target-based store missed its target.
    pub eligible: bool,
    /// Zero when ineligible.
    pub commission_kurus: i64,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes `sales × rate_bps / 10_000` with half-up rounding.
///
/// i128 intermediates keep large period totals from overflowing.
fn commission_amount(sales_kurus: i64, rate_bps: u32) -> i64 {
    ((sales_kurus as i128 * rate_bps as i128 + 5_000) / 10_000) as i64
}

/// Computes commission payouts for every personnel in a store period.
///
/// Input order is preserved in the output. `target_kurus` is ignored for
/// [`CommissionModel::FlatRate`]; a zero target under
/// [`CommissionModel::TargetBased`] counts as always met.
pub fn compute_commissions(
    model: CommissionModel,
    target_kurus: i64,
    sales: &[PersonnelSales],
) -> Vec<CommissionResult> {
    let store_total: i64 = sales.iter().map(|s| s.sales_kurus).sum();

    let eligible = match model {
        CommissionModel::FlatRate => true,
        CommissionModel::TargetBased => target_kurus == 0 || store_total >= target_kurus,
    };

    sales
        .iter()
        .map(|s| CommissionResult {
            personnel_id: s.personnel_id.clone(),
            personnel_name: s.personnel_name.clone(),
            sales_kurus: s.sales_kurus,
            rate_bps: s.rate_bps,
            eligible,
            commission_kurus: if eligible {
                commission_amount(s.sales_kurus, s.rate_bps)
            } else {
                0
            },
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn personnel(id: &str, sales_kurus: i64, rate_bps: u32) -> PersonnelSales {
        PersonnelSales {
            personnel_id: id.to_string(),
            personnel_name: format!("Personnel {id}"),
            sales_kurus,
            rate_bps,
        }
    }

    #[test]
    fn test_flat_rate_always_pays() {
        let results = compute_commissions(
            CommissionModel::FlatRate,
            1_000_000, // target irrelevant
            &[personnel("a", 500_000, 500), personnel("b", 200_000, 300)],
        );
        assert!(results[0].eligible);
        assert_eq!(results[0].commission_kurus, 25_000); // 5% of ₺5000
        assert_eq!(results[1].commission_kurus, 6_000); // 3% of ₺2000
    }

    #[test]
    fn test_target_missed_blocks_everyone() {
        // store total 900_000 < target 1_000_000 → all ineligible
        let results = compute_commissions(
            CommissionModel::TargetBased,
            1_000_000,
            &[personnel("a", 500_000, 500), personnel("b", 400_000, 800)],
        );
        assert!(results.iter().all(|r| !r.eligible));
        assert!(results.iter().all(|r| r.commission_kurus == 0));
    }

    #[test]
    fn test_target_met_pays_per_person() {
        // store total 1_100_000 ≥ target 1_000_000
        let results = compute_commissions(
            CommissionModel::TargetBased,
            1_000_000,
            &[personnel("a", 500_000, 500), personnel("b", 600_000, 200)],
        );
        assert!(results.iter().all(|r| r.eligible));
        assert_eq!(results[0].commission_kurus, 25_000);
        assert_eq!(results[1].commission_kurus, 12_000);
    }

    #[test]
    fn test_zero_target_always_met() {
        let results =
            compute_commissions(CommissionModel::TargetBased, 0, &[personnel("a", 100, 500)]);
        assert!(results[0].eligible);
        assert_eq!(results[0].commission_kurus, 5);
    }

    #[test]
    fn test_deterministic() {
        let input = [personnel("a", 123_456, 750), personnel("b", 654_321, 250)];
        let first = compute_commissions(CommissionModel::TargetBased, 500_000, &input);
        let second = compute_commissions(CommissionModel::TargetBased, 500_000, &input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rounding_half_up() {
        // 101 kurus at 5% = 5.05 → 5; 110 at 5% = 5.5 → 6
        assert_eq!(commission_amount(101, 500), 5);
        assert_eq!(commission_amount(110, 500), 6);
    }
}
