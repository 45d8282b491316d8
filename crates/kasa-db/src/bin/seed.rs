//! Seeds a local database with a small demo dataset: two stores, the
//! standard payment methods, personnel, and a handful of open debts.
//!
//! ## Usage
//! ```text
//! cargo run --bin seed -- [path/to/kasa.db]
//! ```

use chrono::NaiveDate;

use kasa_core::{CommissionModel, DebtRecord, PaymentMethodDef, Personnel, Store};
use kasa_db::{Database, DbConfig, DbResult};

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "kasa.db".to_string());
    let db = Database::new(DbConfig::new(&path)).await?;

    seed_directory(&db).await?;
    seed_debts(&db).await?;

    tracing::info!(path, "Seed complete");
    db.close().await;
    Ok(())
}

async fn seed_directory(db: &Database) -> DbResult<()> {
    let directory = db.directory();

    let stores = [
        Store {
            id: "store-01".to_string(),
            name: "Kadıköy".to_string(),
            commission_model: CommissionModel::TargetBased,
            target_kurus: 50_000_000, // ₺500,000 monthly target
        },
        Store {
            id: "store-02".to_string(),
            name: "Beşiktaş".to_string(),
            commission_model: CommissionModel::FlatRate,
            target_kurus: 0,
        },
    ];
    for store in &stores {
        directory.upsert_store(store).await?;
    }

    let methods = [
        ("cash", "Nakit"),
        ("card", "Kredi Kartı"),
        ("voucher", "Yemek Çeki"),
    ];
    for (id, name) in methods {
        directory
            .upsert_payment_method(&PaymentMethodDef {
                id: id.to_string(),
                name: name.to_string(),
            })
            .await?;
    }

    let personnel = [
        ("p-01", "store-01", "Mehmet Kaya", 500u32),
        ("p-02", "store-01", "Ayşe Demir", 750),
        ("p-03", "store-02", "Fatma Şahin", 500),
    ];
    for (id, store_id, name, rate) in personnel {
        directory
            .upsert_personnel(&Personnel {
                id: id.to_string(),
                store_id: store_id.to_string(),
                name: name.to_string(),
                commission_rate_bps: rate,
            })
            .await?;
    }

    Ok(())
}

async fn seed_debts(db: &Database) -> DbResult<()> {
    let debts = db.debts();

    let records = [
        ("sale-1001", "store-01", "Ali Vural", 1, 250_000i64),
        ("sale-1002", "store-01", "Zeynep Aksoy", 8, 100_000),
        ("sale-1003", "store-01", "Ali Vural", 15, 75_500),
        ("sale-2001", "store-02", "Hasan Yıldız", 4, 500_000),
    ];
    for (sale_id, store_id, customer, day, total_kurus) in records {
        debts
            .record_sale_debt(&DebtRecord {
                sale_id: sale_id.to_string(),
                store_id: store_id.to_string(),
                customer_name: customer.to_string(),
                receipt_no: format!("S-{}", &sale_id[5..]),
                sale_date: NaiveDate::from_ymd_opt(2026, 8, day)
                    .unwrap_or_default(),
                total_kurus,
                paid_kurus: 0,
                last_payment_date: None,
            })
            .await?;
    }

    Ok(())
}
