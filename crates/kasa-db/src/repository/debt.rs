//! # Debt Repository
//!
//! Queries over the per-store debt ledger.
//!
//! There is deliberately no update API here: `paid_kurus` and
//! `last_payment_date` change only inside the settlement engine's
//! transaction. `record_sale_debt` exists for the external sale-recording
//! flow that originates debt records.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasa_core::DebtRecord;

/// Repository for debt record queries.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    pool: SqlitePool,
}

impl DebtRepository {
    /// Creates a new DebtRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DebtRepository { pool }
    }

    /// Lists a store's debt records, most recent sale first.
    ///
    /// ## Note
    /// Overpaid and fully paid debts are included; status is derived on
    /// the returned records and "payable" filtering is a UI concern.
    pub async fn list_open_debts(&self, store_id: &str) -> DbResult<Vec<DebtRecord>> {
        let debts: Vec<DebtRecord> = sqlx::query_as(
            r#"
            SELECT
                sale_id,
                store_id,
                customer_name,
                receipt_no,
                sale_date,
                total_kurus,
                paid_kurus,
                last_payment_date
            FROM debts
            WHERE store_id = ?1
            ORDER BY sale_date DESC, sale_id
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(debts)
    }

    /// Gets one debt record by its originating sale, scoped to a store.
    pub async fn get(&self, store_id: &str, sale_id: &str) -> DbResult<Option<DebtRecord>> {
        let debt: Option<DebtRecord> = sqlx::query_as(
            r#"
            SELECT
                sale_id,
                store_id,
                customer_name,
                receipt_no,
                sale_date,
                total_kurus,
                paid_kurus,
                last_payment_date
            FROM debts
            WHERE store_id = ?1 AND sale_id = ?2
            "#,
        )
        .bind(store_id)
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(debt)
    }

    /// Like [`get`](Self::get) but a missing record is an error.
    pub async fn get_required(&self, store_id: &str, sale_id: &str) -> DbResult<DebtRecord> {
        self.get(store_id, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("DebtRecord", sale_id))
    }

    /// Inserts a fresh debt record.
    ///
    /// Called by the sale-recording flow when a credit sale is made (and
    /// by seed/test setup). Never used to adjust amounts afterwards.
    pub async fn record_sale_debt(&self, debt: &DebtRecord) -> DbResult<()> {
        debug!(sale_id = %debt.sale_id, store_id = %debt.store_id, total = debt.total_kurus, "Recording sale debt");

        sqlx::query(
            r#"
            INSERT INTO debts (
                sale_id, store_id, customer_name, receipt_no, sale_date,
                total_kurus, paid_kurus, last_payment_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&debt.sale_id)
        .bind(&debt.store_id)
        .bind(&debt.customer_name)
        .bind(&debt.receipt_no)
        .bind(debt.sale_date)
        .bind(debt.total_kurus)
        .bind(debt.paid_kurus)
        .bind(debt.last_payment_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use kasa_core::DebtStatus;

    fn debt(sale_id: &str, store_id: &str, sale_date: NaiveDate, total_kurus: i64) -> DebtRecord {
        DebtRecord {
            sale_id: sale_id.to_string(),
            store_id: store_id.to_string(),
            customer_name: "Fatma Şahin".to_string(),
            receipt_no: format!("S-{sale_id}"),
            sale_date,
            total_kurus,
            paid_kurus: 0,
            last_payment_date: None,
        }
    }

    #[tokio::test]
    async fn test_list_sorted_by_sale_date_desc() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.debts();

        let d1 = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();
        repo.record_sale_debt(&debt("s1", "store-1", d1, 100_000))
            .await
            .unwrap();
        repo.record_sale_debt(&debt("s2", "store-1", d2, 50_000))
            .await
            .unwrap();
        repo.record_sale_debt(&debt("s3", "store-1", d3, 75_000))
            .await
            .unwrap();
        // Different store, must not appear
        repo.record_sale_debt(&debt("s4", "store-2", d2, 10_000))
            .await
            .unwrap();

        let debts = repo.list_open_debts("store-1").await.unwrap();
        let ids: Vec<&str> = debts.iter().map(|d| d.sale_id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s3", "s1"]);
        assert!(debts.iter().all(|d| d.status() == DebtStatus::Unpaid));
    }

    #[tokio::test]
    async fn test_get_scoped_to_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.debts();

        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        repo.record_sale_debt(&debt("s1", "store-1", date, 100_000))
            .await
            .unwrap();

        assert!(repo.get("store-1", "s1").await.unwrap().is_some());
        // Same sale id from another store does not resolve
        assert!(repo.get("store-2", "s1").await.unwrap().is_none());

        let err = repo.get_required("store-2", "s1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
