//! # Directory Repository
//!
//! Read access to the collaborator-owned directory data: stores, payment
//! methods, and personnel. The ledger core consumes these as plain
//! lookups; management of the directory lives elsewhere. The upserts here
//! exist for seeding and synchronization from that system.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use kasa_core::{PaymentMethodDef, Personnel, Store};

/// Repository for directory lookups.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

impl DirectoryRepository {
    /// Creates a new DirectoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DirectoryRepository { pool }
    }

    /// Lists all stores.
    pub async fn list_stores(&self) -> DbResult<Vec<Store>> {
        let stores: Vec<Store> = sqlx::query_as(
            r#"
            SELECT id, name, commission_model, target_kurus
            FROM stores
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    /// Gets one store by id.
    pub async fn get_store(&self, store_id: &str) -> DbResult<Store> {
        let store: Option<Store> = sqlx::query_as(
            r#"
            SELECT id, name, commission_model, target_kurus
            FROM stores
            WHERE id = ?1
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        store.ok_or_else(|| DbError::not_found("Store", store_id))
    }

    /// Lists all payment-method definitions.
    pub async fn list_payment_methods(&self) -> DbResult<Vec<PaymentMethodDef>> {
        let methods: Vec<PaymentMethodDef> = sqlx::query_as(
            r#"
            SELECT id, name
            FROM payment_methods
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    /// Lists personnel assigned to a store.
    pub async fn list_personnel_by_store(&self, store_id: &str) -> DbResult<Vec<Personnel>> {
        let personnel: Vec<Personnel> = sqlx::query_as(
            r#"
            SELECT id, store_id, name, commission_rate_bps
            FROM personnel
            WHERE store_id = ?1
            ORDER BY name, id
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(personnel)
    }

    /// Inserts or replaces a store definition.
    pub async fn upsert_store(&self, store: &Store) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stores (id, name, commission_model, target_kurus)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                commission_model = excluded.commission_model,
                target_kurus = excluded.target_kurus
            "#,
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(store.commission_model)
        .bind(store.target_kurus)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts or replaces a payment-method definition.
    pub async fn upsert_payment_method(&self, method: &PaymentMethodDef) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_methods (id, name)
            VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(&method.id)
        .bind(&method.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts or replaces a personnel record.
    pub async fn upsert_personnel(&self, personnel: &Personnel) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO personnel (id, store_id, name, commission_rate_bps)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                store_id = excluded.store_id,
                name = excluded.name,
                commission_rate_bps = excluded.commission_rate_bps
            "#,
        )
        .bind(&personnel.id)
        .bind(&personnel.store_id)
        .bind(&personnel.name)
        .bind(personnel.commission_rate_bps)
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
    use kasa_core::CommissionModel;

    #[tokio::test]
    async fn test_store_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.directory();

        let store = Store {
            id: "store-1".to_string(),
            name: "Kadıköy".to_string(),
            commission_model: CommissionModel::TargetBased,
            target_kurus: 1_000_000,
        };
        repo.upsert_store(&store).await.unwrap();

        let loaded = repo.get_store("store-1").await.unwrap();
        assert_eq!(loaded, store);

        let err = repo.get_store("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_personnel_scoped_to_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.directory();

        for (id, store_id) in [("p1", "store-1"), ("p2", "store-1"), ("p3", "store-2")] {
            repo.upsert_store(&Store {
                id: store_id.to_string(),
                name: store_id.to_string(),
                commission_model: CommissionModel::FlatRate,
                target_kurus: 0,
            })
            .await
            .unwrap();
            repo.upsert_personnel(&Personnel {
                id: id.to_string(),
                store_id: store_id.to_string(),
                name: format!("Personnel {id}"),
                commission_rate_bps: 500,
            })
            .await
            .unwrap();
        }

        let personnel = repo.list_personnel_by_store("store-1").await.unwrap();
        assert_eq!(personnel.len(), 2);
        assert!(personnel.iter().all(|p| p.store_id == "store-1"));
    }
}
