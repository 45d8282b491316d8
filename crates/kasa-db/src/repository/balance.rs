//! # Balance Repository
//!
//! Assembles store balance snapshots from the per-slot balance rows.
//!
//! Rows are written only by the settlement engine with increment-by-delta
//! updates; this repository is strictly a read surface.

use sqlx::SqlitePool;

use crate::error::DbResult;
use kasa_core::{Currency, StoreBalanceSnapshot};

/// One persisted balance slot.
#[derive(Debug, sqlx::FromRow)]
struct BalanceRow {
    payment_method_id: String,
    currency: Currency,
    balance_kurus: i64,
}

/// Repository for store balance reads.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    pool: SqlitePool,
}

impl BalanceRepository {
    /// Creates a new BalanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BalanceRepository { pool }
    }

    /// Returns the current cash-on-hand snapshot for a store.
    ///
    /// A store with no committed documents yields an empty snapshot
    /// (all-zero totals for any method queried against it).
    pub async fn get_store_balance(&self, store_id: &str) -> DbResult<StoreBalanceSnapshot> {
        let rows: Vec<BalanceRow> = sqlx::query_as(
            r#"
            SELECT payment_method_id, currency, balance_kurus
            FROM store_balances
            WHERE store_id = ?1
            ORDER BY payment_method_id, currency
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        let mut snapshot = StoreBalanceSnapshot::empty(store_id);
        for row in rows {
            snapshot.apply(&row.payment_method_id, row.currency, row.balance_kurus);
        }

        Ok(snapshot)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_empty_store_has_empty_snapshot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let snapshot = db.balances().get_store_balance("store-1").await.unwrap();
        assert_eq!(snapshot.store_id, "store-1");
        assert!(snapshot.balances.is_empty());
        assert!(snapshot.method("cash").is_zero());
    }
}
