//! # Settlement Transaction Engine
//!
//! The only writer of payment documents, debt records, and store balances.
//!
//! ## Two-Phase Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SettlementEngine::commit(draft)                      │
//! │                                                                         │
//! │  0. VALIDATE (kasa-core, before any read or write)                      │
//! │     └── header fields, per-line rules, declared vs recomputed total     │
//! │                                                                         │
//! │  1. READ PHASE (no writes)                                              │
//! │     └── resolve every linked Collection line's DebtRecord               │
//! │     └── collapse per-sale deltas in line order                          │
//! │     └── snapshot each debt's current paid_kurus                         │
//! │                                                                         │
//! │  2. WRITE PHASE (one SQLite transaction, all-or-nothing)                │
//! │     a. insert the document and its lines                                │
//! │     b. per debt: guarded update                                         │
//! │        UPDATE debts SET paid_kurus = <new>                              │
//! │        WHERE sale_id = ? AND paid_kurus = <snapshot>                    │
//! │        0 rows affected → Conflict → whole transaction rolls back        │
//! │     c. per line: increment-by-delta balance upserts (never overwrite)   │
//! │                                                                         │
//! │  3. Conflict → retry the WHOLE commit from the read phase,              │
//! │     at most MAX_COMMIT_RETRIES times, then surface to the caller        │
//! │                                                                         │
//! │  A failed commit of ANY kind leaves payments, debts, and balances       │
//! │  byte-for-byte unchanged. There is no undo, only atomicity.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Balance Sign Rules
//! Collection +, Expense −, CenterTransfer −, OverShort the sign of the
//! recorded amount. The settlement-currency (TRY) slot takes the converted
//! `amount_kurus`; a foreign-currency line additionally tracks its
//! `original_kurus` under its own currency key (dual ledger).

use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::debt::DebtRepository;
use crate::repository::payment::{self, PaymentRepository};
use kasa_core::validation::validate_draft;
use kasa_core::{Currency, DraftLine, PaymentDocument, PaymentDraft, PaymentLine};

// =============================================================================
// Constants
// =============================================================================

/// Bounded internal retries for write conflicts before surfacing
/// [`DbError::Conflict`] to the caller.
pub const MAX_COMMIT_RETRIES: u32 = 3;

// =============================================================================
// Collected Work Items
// =============================================================================

/// One debt mutation collected during the read phase.
///
/// `snapshot_paid_kurus` is the freshness check: the write phase only
/// applies the update if the debt still holds the value read here.
#[derive(Debug, Clone)]
struct DebtUpdate {
    sale_id: String,
    snapshot_paid_kurus: i64,
    new_paid_kurus: i64,
    /// Set only when the net delta collects money; reversals keep the
    /// previous last-payment date.
    payment_date: Option<NaiveDate>,
}

/// One signed balance-slot contribution.
#[derive(Debug, Clone)]
struct BalanceDelta {
    payment_method_id: String,
    currency: Currency,
    delta_kurus: i64,
}

// =============================================================================
// Engine
// =============================================================================

/// The settlement transaction engine.
///
/// Cheap to construct; clones of the pool handle share the same
/// underlying connections.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    pool: SqlitePool,
}

impl SettlementEngine {
    /// Creates a new SettlementEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SettlementEngine { pool }
    }

    /// Validates and atomically commits a draft payment document.
    ///
    /// ## Returns
    /// The committed, immutable document (with server-assigned line ids
    /// and recomputed amounts).
    ///
    /// ## Errors
    /// - [`DbError::Validation`] - malformed draft, nothing written
    /// - [`DbError::NotFound`] - a Collection line's sale does not resolve
    ///   to a debt in the draft's store
    /// - [`DbError::Conflict`] - concurrent commits kept invalidating the
    ///   read snapshots for [`MAX_COMMIT_RETRIES`] attempts
    /// - [`DbError::UniqueViolation`] - receipt number already used in
    ///   the store
    pub async fn commit(&self, draft: &PaymentDraft) -> DbResult<PaymentDocument> {
        let total_kurus = validate_draft(draft)?;

        let mut attempt = 1;
        loop {
            match self.try_commit(draft, total_kurus).await {
                Err(err) if err.is_conflict() && attempt < MAX_COMMIT_RETRIES => {
                    warn!(
                        attempt,
                        store_id = %draft.store_id,
                        receipt_no = %draft.receipt_no,
                        "Commit conflict, retrying from read phase"
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Wholesale edit of a committed document: replaces its lines and
    /// total as one new atomic transaction.
    ///
    /// The old lines' debt and balance effects are reversed and the new
    /// lines' effects applied in the same transaction; only the net
    /// per-sale delta touches each debt. Header fields (store, date,
    /// receipt number, personnel) are kept.
    pub async fn edit(
        &self,
        payment_id: &str,
        lines: Vec<DraftLine>,
        declared_total_kurus: i64,
    ) -> DbResult<PaymentDocument> {
        let existing = PaymentRepository::new(self.pool.clone())
            .get_by_id(payment_id)
            .await?
            .ok_or_else(|| DbError::not_found("PaymentDocument", payment_id))?;

        // The replacement goes through the same validation as a fresh
        // draft, under the existing header.
        let draft = PaymentDraft {
            store_id: existing.store_id.clone(),
            entry_date: existing.entry_date,
            receipt_no: existing.receipt_no.clone(),
            personnel_id: existing.personnel_id.clone(),
            personnel_name: existing.personnel_name.clone(),
            lines,
            declared_total_kurus,
        };
        let total_kurus = validate_draft(&draft)?;

        let mut attempt = 1;
        loop {
            match self.try_edit(&existing, &draft, total_kurus).await {
                Err(err) if err.is_conflict() && attempt < MAX_COMMIT_RETRIES => {
                    warn!(
                        attempt,
                        payment_id = %existing.id,
                        "Edit conflict, retrying from read phase"
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// One commit attempt: read phase, then a single write transaction.
    async fn try_commit(
        &self,
        draft: &PaymentDraft,
        total_kurus: i64,
    ) -> DbResult<PaymentDocument> {
        // ---- Phase 1: read. No writes happen here. --------------------
        let mut deltas = Vec::new();
        for line in &draft.lines {
            if let Some(sale_id) = linked_sale(line) {
                merge_delta(&mut deltas, sale_id, line.amount_kurus());
            }
        }
        let debt_updates = self
            .read_debt_updates(&draft.store_id, draft.entry_date, &deltas)
            .await?;

        let document = build_document(draft, total_kurus);
        let mut balance_deltas = Vec::new();
        collect_draft_balance_deltas(&draft.lines, 1, &mut balance_deltas);

        debug!(
            store_id = %draft.store_id,
            receipt_no = %draft.receipt_no,
            lines = document.lines.len(),
            debts = debt_updates.len(),
            "Read phase complete, entering write phase"
        );

        // ---- Phase 2: all-or-nothing. Dropping `tx` before commit ----
        // rolls every write back.
        let mut tx = self.pool.begin().await?;

        insert_document(&mut tx, &document).await?;
        for update in &debt_updates {
            apply_debt_update(&mut tx, &draft.store_id, update).await?;
        }
        for delta in &balance_deltas {
            apply_balance_delta(&mut tx, &draft.store_id, delta).await?;
        }

        tx.commit().await?;

        info!(
            payment_id = %document.id,
            store_id = %document.store_id,
            receipt_no = %document.receipt_no,
            total_kurus = document.total_kurus,
            "Payment document committed"
        );

        Ok(document)
    }

    /// One edit attempt: net deltas against the stored lines, then a
    /// single write transaction replacing them.
    async fn try_edit(
        &self,
        existing: &PaymentDocument,
        draft: &PaymentDraft,
        total_kurus: i64,
    ) -> DbResult<PaymentDocument> {
        // ---- Phase 1: read. Net per-sale delta = new − old. -----------
        let mut deltas = Vec::new();
        for line in &draft.lines {
            if let Some(sale_id) = linked_sale(line) {
                merge_delta(&mut deltas, sale_id, line.amount_kurus());
            }
        }
        for line in &existing.lines {
            if line.settles_debt() {
                if let Some(sale_id) = &line.sale_id {
                    merge_delta(&mut deltas, sale_id, -line.amount_kurus);
                }
            }
        }
        let debt_updates = self
            .read_debt_updates(&existing.store_id, draft.entry_date, &deltas)
            .await?;

        // Reverse the old lines' balance contributions, then apply the
        // new ones.
        let mut balance_deltas = Vec::new();
        collect_committed_balance_deltas(&existing.lines, -1, &mut balance_deltas);
        collect_draft_balance_deltas(&draft.lines, 1, &mut balance_deltas);

        let new_lines = build_lines(&draft.lines);

        // ---- Phase 2: all-or-nothing. --------------------------------
        let mut tx = self.pool.begin().await?;

        replace_document_lines(&mut tx, &existing.id, total_kurus, &new_lines).await?;
        for update in &debt_updates {
            apply_debt_update(&mut tx, &existing.store_id, update).await?;
        }
        for delta in &balance_deltas {
            apply_balance_delta(&mut tx, &existing.store_id, delta).await?;
        }

        tx.commit().await?;

        info!(
            payment_id = %existing.id,
            store_id = %existing.store_id,
            old_total_kurus = existing.total_kurus,
            new_total_kurus = total_kurus,
            "Payment document edited (lines replaced wholesale)"
        );

        Ok(PaymentDocument {
            lines: new_lines,
            total_kurus,
            ..existing.clone()
        })
    }

    /// Read phase: snapshots every referenced debt.
    ///
    /// Fails the whole operation with NotFound if any sale does not
    /// resolve to a debt in the store - no partial application of the
    /// other lines.
    async fn read_debt_updates(
        &self,
        store_id: &str,
        payment_date: NaiveDate,
        deltas: &[(String, i64)],
    ) -> DbResult<Vec<DebtUpdate>> {
        let repo = DebtRepository::new(self.pool.clone());
        let mut updates = Vec::with_capacity(deltas.len());
        for (sale_id, delta) in deltas {
            if *delta == 0 {
                continue;
            }
            let debt = repo.get_required(store_id, sale_id).await?;
            updates.push(DebtUpdate {
                sale_id: sale_id.clone(),
                snapshot_paid_kurus: debt.paid_kurus,
                new_paid_kurus: debt.paid_kurus + delta,
                payment_date: (*delta > 0).then_some(payment_date),
            });
        }
        Ok(updates)
    }
}

// =============================================================================
// Delta Accumulation
// =============================================================================

/// Sale link of a draft line, when it settles a debt.
fn linked_sale(line: &DraftLine) -> Option<&str> {
    if line.settles_debt() {
        line.sale_id.as_deref()
    } else {
        None
    }
}

/// Merges a per-sale delta, preserving first-seen order so application
/// stays deterministic.
fn merge_delta(deltas: &mut Vec<(String, i64)>, sale_id: &str, amount_kurus: i64) {
    if let Some(entry) = deltas.iter_mut().find(|(id, _)| id == sale_id) {
        entry.1 += amount_kurus;
    } else {
        deltas.push((sale_id.to_string(), amount_kurus));
    }
}

/// Merges a balance-slot delta, preserving first-seen order.
fn merge_balance(
    deltas: &mut Vec<BalanceDelta>,
    payment_method_id: &str,
    currency: Currency,
    delta_kurus: i64,
) {
    if let Some(entry) = deltas
        .iter_mut()
        .find(|d| d.payment_method_id == payment_method_id && d.currency == currency)
    {
        entry.delta_kurus += delta_kurus;
    } else {
        deltas.push(BalanceDelta {
            payment_method_id: payment_method_id.to_string(),
            currency,
            delta_kurus,
        });
    }
}

/// Balance contributions of draft lines (factor 1) or their reversal
/// (factor -1), in line order.
fn collect_draft_balance_deltas(lines: &[DraftLine], factor: i64, deltas: &mut Vec<BalanceDelta>) {
    for line in lines {
        merge_balance(
            deltas,
            &line.payment_method_id,
            Currency::SETTLEMENT,
            factor * line.signed_amount_kurus(),
        );
        if !line.currency.is_settlement() {
            merge_balance(
                deltas,
                &line.payment_method_id,
                line.currency,
                factor * line.line_type.sign() * line.original_kurus,
            );
        }
    }
}

/// Balance contributions of committed lines, for edit reversals.
fn collect_committed_balance_deltas(
    lines: &[PaymentLine],
    factor: i64,
    deltas: &mut Vec<BalanceDelta>,
) {
    for line in lines {
        merge_balance(
            deltas,
            &line.payment_method_id,
            Currency::SETTLEMENT,
            factor * line.signed_amount_kurus(),
        );
        if !line.currency.is_settlement() {
            merge_balance(
                deltas,
                &line.payment_method_id,
                line.currency,
                factor * line.signed_original_kurus(),
            );
        }
    }
}

// =============================================================================
// Document Construction
// =============================================================================

/// Materializes committed lines from draft lines: server-assigned ids,
/// server-recomputed settlement amounts.
fn build_lines(lines: &[DraftLine]) -> Vec<PaymentLine> {
    lines
        .iter()
        .map(|line| PaymentLine {
            id: payment::generate_line_id(),
            line_type: line.line_type,
            payment_method_id: line.payment_method_id.clone(),
            currency: line.currency,
            original_kurus: line.original_kurus,
            exchange_rate: line.exchange_rate,
            amount_kurus: line.amount_kurus(),
            sale_id: line.sale_id.clone(),
            sale_receipt_no: line.sale_receipt_no.clone(),
            customer_name: line.customer_name.clone(),
            description: line.description.clone(),
        })
        .collect()
}

fn build_document(draft: &PaymentDraft, total_kurus: i64) -> PaymentDocument {
    PaymentDocument {
        id: payment::generate_payment_id(),
        store_id: draft.store_id.clone(),
        entry_date: draft.entry_date,
        receipt_no: draft.receipt_no.clone(),
        personnel_id: draft.personnel_id.clone(),
        personnel_name: draft.personnel_name.clone(),
        lines: build_lines(&draft.lines),
        total_kurus,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Write Phase Statements
// =============================================================================

async fn insert_document(
    tx: &mut Transaction<'_, Sqlite>,
    document: &PaymentDocument,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, store_id, entry_date, receipt_no,
            personnel_id, personnel_name, total_kurus, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&document.id)
    .bind(&document.store_id)
    .bind(document.entry_date)
    .bind(&document.receipt_no)
    .bind(&document.personnel_id)
    .bind(&document.personnel_name)
    .bind(document.total_kurus)
    .bind(document.created_at)
    .execute(&mut **tx)
    .await?;

    for (line_no, line) in document.lines.iter().enumerate() {
        insert_line(tx, &document.id, line_no as i64, line).await?;
    }

    Ok(())
}

async fn insert_line(
    tx: &mut Transaction<'_, Sqlite>,
    payment_id: &str,
    line_no: i64,
    line: &PaymentLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payment_lines (
            id, payment_id, line_no, line_type, payment_method_id,
            currency, original_kurus, exchange_rate, amount_kurus,
            sale_id, sale_receipt_no, customer_name, description
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&line.id)
    .bind(payment_id)
    .bind(line_no)
    .bind(line.line_type)
    .bind(&line.payment_method_id)
    .bind(line.currency)
    .bind(line.original_kurus)
    .bind(line.exchange_rate.scaled())
    .bind(line.amount_kurus)
    .bind(&line.sale_id)
    .bind(&line.sale_receipt_no)
    .bind(&line.customer_name)
    .bind(&line.description)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Replaces a document's lines and total wholesale (edit operation).
async fn replace_document_lines(
    tx: &mut Transaction<'_, Sqlite>,
    payment_id: &str,
    total_kurus: i64,
    lines: &[PaymentLine],
) -> DbResult<()> {
    sqlx::query("DELETE FROM payment_lines WHERE payment_id = ?1")
        .bind(payment_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("UPDATE payments SET total_kurus = ?2 WHERE id = ?1")
        .bind(payment_id)
        .bind(total_kurus)
        .execute(&mut **tx)
        .await?;

    for (line_no, line) in lines.iter().enumerate() {
        insert_line(tx, payment_id, line_no as i64, line).await?;
    }

    Ok(())
}

/// Guarded debt write: applies the new paid amount only if the debt still
/// holds the paid amount snapshotted in the read phase.
///
/// Zero rows affected means a concurrent commit won the race; the caller
/// must abandon the transaction and retry from the read phase. A blind
/// read-modify-write here is exactly the lost-update defect this engine
/// exists to prevent.
async fn apply_debt_update(
    tx: &mut Transaction<'_, Sqlite>,
    store_id: &str,
    update: &DebtUpdate,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE debts SET
            paid_kurus = ?1,
            last_payment_date = COALESCE(?2, last_payment_date)
        WHERE sale_id = ?3 AND store_id = ?4 AND paid_kurus = ?5
        "#,
    )
    .bind(update.new_paid_kurus)
    .bind(update.payment_date)
    .bind(&update.sale_id)
    .bind(store_id)
    .bind(update.snapshot_paid_kurus)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict("DebtRecord", &update.sale_id));
    }

    Ok(())
}

/// Increment-by-delta balance write. The upsert adds to the current slot
/// value; concurrent commits therefore compose instead of overwriting
/// each other.
async fn apply_balance_delta(
    tx: &mut Transaction<'_, Sqlite>,
    store_id: &str,
    delta: &BalanceDelta,
) -> DbResult<()> {
    if delta.delta_kurus == 0 {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO store_balances (store_id, payment_method_id, currency, balance_kurus)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (store_id, payment_method_id, currency)
        DO UPDATE SET balance_kurus = balance_kurus + excluded.balance_kurus
        "#,
    )
    .bind(store_id)
    .bind(&delta.payment_method_id)
    .bind(delta.currency)
    .bind(delta.delta_kurus)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
