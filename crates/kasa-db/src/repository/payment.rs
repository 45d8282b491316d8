//! # Payment Repository
//!
//! Queries over committed payment documents.
//!
//! Documents are written exclusively by the settlement engine; this
//! repository reassembles them (header + ordered lines) for listing and
//! display.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbResult;
use kasa_core::{Currency, ExchangeRate, LineType, PaymentDocument, PaymentLine};

// =============================================================================
// Row Types
// =============================================================================

/// Flat header row of a payment document.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: String,
    store_id: String,
    entry_date: NaiveDate,
    receipt_no: String,
    personnel_id: String,
    personnel_name: String,
    total_kurus: i64,
    created_at: DateTime<Utc>,
}

/// Flat line row; `line_no` carries the draft's array order.
#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    id: String,
    line_type: LineType,
    payment_method_id: String,
    currency: Currency,
    original_kurus: i64,
    exchange_rate: u32,
    amount_kurus: i64,
    sale_id: Option<String>,
    sale_receipt_no: Option<String>,
    customer_name: Option<String>,
    description: Option<String>,
}

impl LineRow {
    fn into_line(self) -> PaymentLine {
        PaymentLine {
            id: self.id,
            line_type: self.line_type,
            payment_method_id: self.payment_method_id,
            currency: self.currency,
            original_kurus: self.original_kurus,
            exchange_rate: ExchangeRate::from_scaled(self.exchange_rate),
            amount_kurus: self.amount_kurus,
            sale_id: self.sale_id,
            sale_receipt_no: self.sale_receipt_no,
            customer_name: self.customer_name,
            description: self.description,
        }
    }
}

fn assemble(row: PaymentRow, lines: Vec<PaymentLine>) -> PaymentDocument {
    PaymentDocument {
        id: row.id,
        store_id: row.store_id,
        entry_date: row.entry_date,
        receipt_no: row.receipt_no,
        personnel_id: row.personnel_id,
        personnel_name: row.personnel_name,
        lines,
        total_kurus: row.total_kurus,
        created_at: row.created_at,
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for payment document queries.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Gets a payment document (with its lines) by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PaymentDocument>> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT
                id, store_id, entry_date, receipt_no,
                personnel_id, personnel_name, total_kurus, created_at
            FROM payments
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let lines = self.load_lines(&row.id).await?;
                Ok(Some(assemble(row, lines)))
            }
            None => Ok(None),
        }
    }

    /// Lists a store's payment documents within an inclusive date range,
    /// oldest first.
    pub async fn list_by_store(
        &self,
        store_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<PaymentDocument>> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT
                id, store_id, entry_date, receipt_no,
                personnel_id, personnel_name, total_kurus, created_at
            FROM payments
            WHERE store_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3
            ORDER BY entry_date, created_at, id
            "#,
        )
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.load_lines(&row.id).await?;
            documents.push(assemble(row, lines));
        }

        Ok(documents)
    }

    /// Loads a document's lines in their committed array order.
    async fn load_lines(&self, payment_id: &str) -> DbResult<Vec<PaymentLine>> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT
                id, line_type, payment_method_id, currency,
                original_kurus, exchange_rate, amount_kurus,
                sale_id, sale_receipt_no, customer_name, description
            FROM payment_lines
            WHERE payment_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LineRow::into_line).collect())
    }
}

// =============================================================================
// ID / Receipt Number Helpers
// =============================================================================

/// Generates a receipt number in format: YYYYMMDD-SS-NNNN
///
/// ## Format
/// - YYYYMMDD: entry date
/// - SS: store code (last 2 chars of store_id)
/// - NNNN: sequence fragment (padded to 4 digits)
///
/// ## Example
/// `20260415-01-0131`
pub fn generate_receipt_no(store_id: &str, entry_date: NaiveDate) -> String {
    let date_part = entry_date.format("%Y%m%d");

    let store_code: String = store_id
        .chars()
        .rev()
        .take(2)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    let store_code = if store_code.len() < 2 {
        "00".to_string()
    } else {
        store_code
    };

    // TODO: replace the timestamp fragment with a per-store daily counter
    let seq = (Utc::now().timestamp_millis() % 10_000) as u32;

    format!("{}-{}-{:04}", date_part, store_code, seq)
}

/// Generates a new payment document ID.
pub fn generate_payment_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new payment line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}
