//! # Sale Service
//!
//! The sale lifecycle: create, edit and delete, each paired with the stock
//! adjustments that keep inventory counters honest.
//!
//! ## Lifecycle & Stock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CREATE                                                                 │
//! │    insert sale ──► apply consumption deltas (one UPDATE per key)       │
//! │                                                                         │
//! │  EDIT                                                                   │
//! │    deltas = compute_deltas(original.lines, new.lines)                   │
//! │    apply deltas ──► all applied? ──► update sale        (Saved)        │
//! │                       └─ partial ──► PendingSave         (ask caller)  │
//! │                                      confirm → update sale anyway      │
//! │                                      abandon → sale untouched          │
//! │                                                                         │
//! │  DELETE                                                                 │
//! │    apply restoration deltas ──► all applied? ──► delete sale           │
//! │                                   └─ partial ──► PendingDelete         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sale write and the stock updates are separate statements on purpose:
//! stock adjustments are independent per-item counters and a partially
//! failed batch is reported, not rolled back. Already-applied adjustments
//! stay applied even when the caller abandons a pending save; the
//! confirmation protects the sale document, not the counters.

use tracing::{info, warn};

use crate::draft::{DraftStore, SaleDraft};
use crate::error::{ApiError, ApiResult};
use crate::session::SessionState;
use dukaan_core::amounts::priced_line;
use dukaan_core::reconcile::{compute_deltas, consumption_deltas, restoration_deltas};
use dukaan_core::validation::{
    validate_customer_name, validate_phone, validate_quantity, validate_rate,
};
use dukaan_core::{
    CoreError, ItemRef, PaymentType, Role, Sale, StockDelta, StockKey, TaxType, Unit,
    FIRST_INVOICE_NUMBER,
};
use dukaan_db::repository::sale::NewSale;
use dukaan_db::Database;

// =============================================================================
// Inputs
// =============================================================================

/// Caller-supplied sale line. `amount` is never accepted from the caller;
/// it is frozen here from quantity, rate and tax type.
#[derive(Debug, Clone)]
pub struct LineInput {
    pub item: ItemRef,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub rate: f64,
    pub tax_type: TaxType,
    pub count: f64,
}

/// Caller-supplied sale fields.
#[derive(Debug, Clone)]
pub struct SaleInput {
    pub customer_name: String,
    pub phone_number: String,
    pub lines: Vec<LineInput>,
    pub received_amount: f64,
    pub payment_type: PaymentType,
}

impl SaleInput {
    /// Validates the input and prices its lines.
    fn into_priced(self) -> ApiResult<NewSale> {
        validate_customer_name(&self.customer_name)?;
        validate_phone(&self.phone_number)?;

        if self.lines.is_empty() {
            return Err(CoreError::EmptySale.into());
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        for line in self.lines {
            validate_quantity(line.quantity)?;
            validate_rate(line.rate)?;
            if line.name.trim().is_empty() {
                return Err(ApiError::validation("line name is required"));
            }

            lines.push(priced_line(
                line.item,
                line.name.trim(),
                line.quantity,
                line.unit,
                line.rate,
                line.tax_type,
                line.count,
            ));
        }

        Ok(NewSale {
            customer_name: self.customer_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            lines,
            received_amount: self.received_amount,
            payment_type: self.payment_type,
        })
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// How a batch of stock adjustments went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentReport {
    /// Adjustments applied (including no-op keys with no inventory record).
    pub applied: usize,
    /// Adjustments that errored.
    pub failed: usize,
    /// Total deltas attempted.
    pub total: usize,
}

impl AdjustmentReport {
    /// True when every delta was applied.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// A sale update held back because stock adjustments partially failed.
///
/// The adjustments in `report` are already on disk; confirming writes the
/// sale document, abandoning leaves it untouched.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub sale_id: String,
    pub report: AdjustmentReport,
    draft_id: Option<String>,
    new_sale: NewSale,
    updated_by: String,
}

/// A sale deletion held back because stock restoration partially failed.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub sale_id: String,
    pub report: AdjustmentReport,
}

/// Result of saving an edit (or submitting a draft).
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Saved {
        sale: Sale,
        report: AdjustmentReport,
    },
    NeedsConfirmation(PendingSave),
}

/// Result of deleting a sale.
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    Deleted { report: AdjustmentReport },
    NeedsConfirmation(PendingDelete),
}

// =============================================================================
// Service
// =============================================================================

/// Sale lifecycle orchestration.
#[derive(Debug, Clone)]
pub struct SaleService {
    db: Database,
    session: SessionState,
    drafts: DraftStore,
}

impl SaleService {
    pub fn new(db: Database, session: SessionState, drafts: DraftStore) -> Self {
        SaleService {
            db,
            session,
            drafts,
        }
    }

    /// The invoice number the next sale will most likely get.
    ///
    /// Display preview only; the real number is allocated inside the
    /// insert transaction. A read failure previews as the first invoice
    /// number rather than surfacing an error on the entry screen.
    pub async fn next_invoice_number(&self) -> i64 {
        match self.db.sales().max_invoice_number().await {
            Ok(max) => max.unwrap_or(0) + 1,
            Err(e) => {
                warn!(error = %e, "Invoice preview read failed");
                FIRST_INVOICE_NUMBER
            }
        }
    }

    /// Creates a sale and deducts the consumed stock.
    pub async fn create_sale(&self, input: SaleInput) -> ApiResult<(Sale, AdjustmentReport)> {
        let session = self.session.require_at_least(Role::Biller, "create sales")?;

        let new_sale = input.into_priced()?;
        let sale = self.db.sales().insert(new_sale, &session.user_id).await?;

        let report = self.apply_deltas(&consumption_deltas(&sale.lines)).await;
        if !report.is_complete() {
            warn!(sale_id = %sale.id, ?report, "Stock deduction incomplete after create");
        }

        info!(sale_id = %sale.id, invoice = sale.invoice_number, "Sale created");
        Ok((sale, report))
    }

    /// Saves an edit to an existing sale.
    ///
    /// Stock is reconciled first (delta between the stored lines and the
    /// new lines). If any adjustment fails, the sale write is withheld and
    /// a [`PendingSave`] is returned for the caller to confirm or abandon.
    pub async fn save_edit(&self, sale_id: &str, input: SaleInput) -> ApiResult<SaveOutcome> {
        self.save_edit_inner(sale_id, input, None).await
    }

    async fn save_edit_inner(
        &self,
        sale_id: &str,
        input: SaleInput,
        draft_id: Option<String>,
    ) -> ApiResult<SaveOutcome> {
        let session = self.session.require_at_least(Role::Biller, "edit sales")?;

        let original = self.db.sales().get_required(sale_id).await?;
        let mut new_sale = input.into_priced()?;

        // The edit form may leave the phone blank; keep the stored one.
        if new_sale.phone_number.is_empty() {
            new_sale.phone_number = original.phone_number.clone();
        }

        let deltas = compute_deltas(&original.lines, &new_sale.lines);
        let report = self.apply_deltas(&deltas).await;

        if !report.is_complete() {
            warn!(sale_id = %sale_id, ?report, "Stock reconciliation incomplete, save withheld");
            return Ok(SaveOutcome::NeedsConfirmation(PendingSave {
                sale_id: sale_id.to_string(),
                report,
                draft_id,
                new_sale,
                updated_by: session.user_id,
            }));
        }

        let sale = self
            .db
            .sales()
            .update(sale_id, new_sale, &session.user_id)
            .await?;

        if let Some(draft_id) = draft_id {
            self.drafts.clear(&draft_id);
        }

        info!(sale_id = %sale.id, "Sale updated");
        Ok(SaveOutcome::Saved { sale, report })
    }

    /// Writes the sale document of a withheld save.
    pub async fn confirm_save(&self, pending: PendingSave) -> ApiResult<Sale> {
        self.session.require_at_least(Role::Biller, "edit sales")?;

        let sale = self
            .db
            .sales()
            .update(&pending.sale_id, pending.new_sale, &pending.updated_by)
            .await?;

        if let Some(draft_id) = pending.draft_id {
            self.drafts.clear(&draft_id);
        }

        info!(sale_id = %sale.id, "Sale updated after confirmation");
        Ok(sale)
    }

    /// Abandons a withheld save. The sale document stays as it was; the
    /// stock adjustments already applied are not reverted.
    pub fn abandon_save(&self, pending: PendingSave) {
        warn!(
            sale_id = %pending.sale_id,
            ?pending.report,
            "Withheld save abandoned; applied stock adjustments remain"
        );
    }

    /// Deletes a sale, restoring the full quantities of its stored lines.
    ///
    /// Restoration uses the stored lines as they are now, independent of
    /// any edits between creation and deletion. If restoration partially
    /// fails, the delete is withheld and returned for confirmation.
    pub async fn delete_sale(&self, sale_id: &str) -> ApiResult<DeleteOutcome> {
        self.session.require_at_least(Role::Biller, "delete sales")?;

        let sale = self.db.sales().get_required(sale_id).await?;
        let report = self.apply_deltas(&restoration_deltas(&sale.lines)).await;

        if !report.is_complete() {
            warn!(sale_id = %sale_id, ?report, "Stock restoration incomplete, delete withheld");
            return Ok(DeleteOutcome::NeedsConfirmation(PendingDelete {
                sale_id: sale_id.to_string(),
                report,
            }));
        }

        self.db.sales().delete(sale_id).await?;
        info!(sale_id = %sale_id, "Sale deleted");
        Ok(DeleteOutcome::Deleted { report })
    }

    /// Deletes the sale document of a withheld delete.
    pub async fn confirm_delete(&self, pending: PendingDelete) -> ApiResult<AdjustmentReport> {
        self.session.require_at_least(Role::Biller, "delete sales")?;

        self.db.sales().delete(&pending.sale_id).await?;
        info!(sale_id = %pending.sale_id, "Sale deleted after confirmation");
        Ok(pending.report)
    }

    /// Marks a sale fully paid: received amount set to the total.
    ///
    /// Lines are unchanged, so no stock reconciliation happens.
    pub async fn mark_received(&self, sale_id: &str) -> ApiResult<Sale> {
        let session = self.session.require_at_least(Role::Biller, "edit sales")?;

        let sale = self.db.sales().get_required(sale_id).await?;
        let new_sale = NewSale {
            customer_name: sale.customer_name,
            phone_number: sale.phone_number,
            lines: sale.lines,
            received_amount: sale.total_amount,
            payment_type: sale.payment_type,
        };

        let sale = self
            .db
            .sales()
            .update(sale_id, new_sale, &session.user_id)
            .await?;
        info!(sale_id = %sale.id, "Sale marked received");
        Ok(sale)
    }

    /// Gets a sale by id.
    pub async fn get_sale(&self, id: &str) -> ApiResult<Option<Sale>> {
        self.session.require()?;
        Ok(self.db.sales().get(id).await?)
    }

    /// Lists all sales, newest first.
    pub async fn list_sales(&self) -> ApiResult<Vec<Sale>> {
        self.session.require()?;
        Ok(self.db.sales().list().await?)
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    /// Starts an empty draft for a new sale.
    pub fn begin_new_draft(&self) -> ApiResult<SaleDraft> {
        self.session.require_at_least(Role::Biller, "create sales")?;
        Ok(self.drafts.begin_new())
    }

    /// Starts a draft prefilled from an existing sale.
    pub async fn begin_edit_draft(&self, sale_id: &str) -> ApiResult<SaleDraft> {
        self.session.require_at_least(Role::Biller, "edit sales")?;
        let sale = self.db.sales().get_required(sale_id).await?;
        Ok(self.drafts.begin_edit(&sale))
    }

    /// Submits a draft: a create when it has no original sale, otherwise
    /// an edit. The draft is cleared once the sale document is written.
    pub async fn submit_draft(&self, draft_id: &str) -> ApiResult<SaveOutcome> {
        let draft = self
            .drafts
            .get(draft_id)
            .ok_or_else(|| ApiError::not_found("Draft", draft_id))?;

        let input = SaleInput {
            customer_name: draft.customer_name.clone(),
            phone_number: draft.phone_number.clone(),
            lines: draft
                .lines
                .iter()
                .map(|line| LineInput {
                    item: line.item.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit: line.unit,
                    rate: line.rate,
                    tax_type: line.tax_type,
                    count: line.count,
                })
                .collect(),
            received_amount: draft.received_amount,
            payment_type: draft.payment_type,
        };

        match &draft.original_sale_id {
            Some(sale_id) => {
                self.save_edit_inner(sale_id, input, Some(draft.id.clone()))
                    .await
            }
            None => {
                let (sale, report) = self.create_sale(input).await?;
                self.drafts.clear(&draft.id);
                Ok(SaveOutcome::Saved { sale, report })
            }
        }
    }

    /// Access to the underlying draft store (field editing, fresh start).
    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    // =========================================================================
    // Stock Application
    // =========================================================================

    /// Applies reconciliation deltas to the item counters.
    ///
    /// Sign convention: positive delta = consumption, so the counter moves
    /// by `-delta`. Each key is an independent UPDATE; a key with no
    /// matching inventory record is a successful no-op, an errored UPDATE
    /// is counted as failed and the batch continues.
    async fn apply_deltas(&self, deltas: &[StockDelta]) -> AdjustmentReport {
        let items = self.db.items();
        let mut report = AdjustmentReport {
            applied: 0,
            failed: 0,
            total: deltas.len(),
        };

        for delta in deltas {
            let adjusted = match &delta.key {
                StockKey::Item(item_id) => items.adjust_stock(item_id, -delta.delta).await,
                StockKey::Name(name) => match items.find_by_name(name).await {
                    Ok(Some(item)) => items.adjust_stock(&item.id, -delta.delta).await,
                    Ok(None) => Ok(false), // free-text line, nothing to adjust
                    Err(e) => Err(e),
                },
            };

            match adjusted {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    warn!(key = ?delta.key, delta = delta.delta, error = %e, "Stock adjustment failed");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::session::Session;
    use chrono::Utc;
    use dukaan_db::repository::item::NewItem;
    use dukaan_db::DbConfig;
    use std::time::Duration;

    fn session_with(role: Role) -> SessionState {
        let state = SessionState::new();
        state.set(Session {
            user_id: "u1".to_string(),
            username: "tester".to_string(),
            role,
            started_at: Utc::now(),
        });
        state
    }

    async fn service() -> (SaleService, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let svc = SaleService::new(
            db.clone(),
            session_with(Role::Biller),
            DraftStore::new(Duration::from_secs(300)),
        );
        (svc, db)
    }

    async fn seed_item(db: &Database, name: &str, stock: f64) -> String {
        db.items()
            .insert(NewItem {
                name: name.to_string(),
                unit: Unit::Ltr,
                sale_price: 100.0,
                purchase_price: 80.0,
                wholesale_price: 90.0,
                stock_quantity: stock,
                min_stock_quantity: 2.0,
                tax_rate: 0.0,
            })
            .await
            .unwrap()
            .id
    }

    fn linked_line(item_id: &str, name: &str, quantity: f64) -> LineInput {
        LineInput {
            item: ItemRef::Linked {
                item_id: item_id.to_string(),
            },
            name: name.to_string(),
            quantity,
            unit: Unit::Ltr,
            rate: 100.0,
            tax_type: TaxType::WithoutTax,
            count: 1.0,
        }
    }

    fn unlinked_line(name: &str, quantity: f64) -> LineInput {
        LineInput {
            item: ItemRef::Unlinked,
            name: name.to_string(),
            quantity,
            unit: Unit::Pcs,
            rate: 50.0,
            tax_type: TaxType::WithoutTax,
            count: 1.0,
        }
    }

    fn input(lines: Vec<LineInput>) -> SaleInput {
        SaleInput {
            customer_name: "Ali".to_string(),
            phone_number: "".to_string(),
            lines,
            received_amount: 0.0,
            payment_type: PaymentType::Credit,
        }
    }

    async fn stock_of(db: &Database, id: &str) -> f64 {
        db.items().get_required(id).await.unwrap().stock_quantity
    }

    #[tokio::test]
    async fn test_create_deducts_linked_and_name_matched_stock() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;
        let filter = seed_item(&db, "Filter", 8.0).await;

        let (sale, report) = svc
            .create_sale(input(vec![
                linked_line(&oil, "Oil", 2.0),
                // Unlinked but name-matches the Filter item
                unlinked_line("  FILTER ", 3.0),
            ]))
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(sale.invoice_number, 1);
        assert_eq!(stock_of(&db, &oil).await, 8.0);
        assert_eq!(stock_of(&db, &filter).await, 5.0);
    }

    #[tokio::test]
    async fn test_unmatched_free_text_line_is_a_noop() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;

        let (_, report) = svc
            .create_sale(input(vec![
                linked_line(&oil, "Oil", 1.0),
                unlinked_line("Hand-written special", 4.0),
            ]))
            .await
            .unwrap();

        // No inventory record for the free-text line: applied as a no-op
        assert!(report.is_complete());
        assert_eq!(report.total, 2);
        assert_eq!(stock_of(&db, &oil).await, 9.0);
    }

    #[tokio::test]
    async fn test_edit_reconciles_only_the_difference() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;
        let filter = seed_item(&db, "Filter", 8.0).await;

        let (sale, _) = svc
            .create_sale(input(vec![
                linked_line(&oil, "Oil", 2.0),
                linked_line(&filter, "Filter", 1.0),
            ]))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &oil).await, 8.0);

        // Oil 2 → 5, Filter removed
        let outcome = svc
            .save_edit(&sale.id, input(vec![linked_line(&oil, "Oil", 5.0)]))
            .await
            .unwrap();

        let SaveOutcome::Saved { sale: edited, report } = outcome else {
            panic!("expected saved outcome");
        };
        assert!(report.is_complete());
        assert_eq!(edited.lines.len(), 1);
        assert_eq!(stock_of(&db, &oil).await, 5.0); // 3 more deducted
        assert_eq!(stock_of(&db, &filter).await, 8.0); // 1 restored
    }

    #[tokio::test]
    async fn test_edit_round_trip_leaves_stock_unchanged() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;

        let (sale, _) = svc
            .create_sale(input(vec![linked_line(&oil, "Oil", 2.0)]))
            .await
            .unwrap();

        svc.save_edit(&sale.id, input(vec![linked_line(&oil, "Oil", 7.0)]))
            .await
            .unwrap();
        svc.save_edit(&sale.id, input(vec![linked_line(&oil, "Oil", 2.0)]))
            .await
            .unwrap();

        assert_eq!(stock_of(&db, &oil).await, 8.0); // only the create deduction
    }

    #[tokio::test]
    async fn test_edit_with_blank_phone_keeps_stored_phone() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;

        let mut create = input(vec![linked_line(&oil, "Oil", 2.0)]);
        create.phone_number = "03001234567".to_string();
        let (sale, _) = svc.create_sale(create).await.unwrap();

        // input() leaves the phone blank
        let SaveOutcome::Saved { sale: edited, .. } = svc
            .save_edit(&sale.id, input(vec![linked_line(&oil, "Oil", 2.0)]))
            .await
            .unwrap()
        else {
            panic!("expected saved outcome");
        };
        assert_eq!(edited.phone_number, "03001234567");

        // An explicit new phone still replaces it
        let mut replace = input(vec![linked_line(&oil, "Oil", 2.0)]);
        replace.phone_number = "03009998877".to_string();
        let SaveOutcome::Saved { sale: replaced, .. } =
            svc.save_edit(&sale.id, replace).await.unwrap()
        else {
            panic!("expected saved outcome");
        };
        assert_eq!(replaced.phone_number, "03009998877");
    }

    #[tokio::test]
    async fn test_delete_restores_full_quantities() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;

        let (sale, _) = svc
            .create_sale(input(vec![linked_line(&oil, "Oil", 4.0)]))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &oil).await, 6.0);

        let outcome = svc.delete_sale(&sale.id).await.unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted { report } if report.is_complete()));
        assert_eq!(stock_of(&db, &oil).await, 10.0);
        assert!(svc.get_sale(&sale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stock_can_go_negative_on_oversell() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 1.0).await;

        let (_, report) = svc
            .create_sale(input(vec![linked_line(&oil, "Oil", 5.0)]))
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(stock_of(&db, &oil).await, -4.0);
    }

    #[tokio::test]
    async fn test_mark_received_zeroes_the_balance() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;

        let (sale, _) = svc
            .create_sale(input(vec![linked_line(&oil, "Oil", 2.0)]))
            .await
            .unwrap();
        assert_eq!(sale.balance_amount, 200.0);

        let paid = svc.mark_received(&sale.id).await.unwrap();
        assert_eq!(paid.received_amount, 200.0);
        assert_eq!(paid.balance_amount, 0.0);
        assert_eq!(stock_of(&db, &oil).await, 8.0); // untouched
    }

    #[tokio::test]
    async fn test_empty_sale_rejected() {
        let (svc, _) = service().await;
        let err = svc.create_sale(input(vec![])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_user_role_cannot_create_sales() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let svc = SaleService::new(
            db,
            session_with(Role::User),
            DraftStore::new(Duration::from_secs(300)),
        );

        let err = svc
            .create_sale(input(vec![unlinked_line("Oil", 1.0)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_invoice_preview_tracks_max() {
        let (svc, _) = service().await;
        assert_eq!(svc.next_invoice_number().await, 1);

        svc.create_sale(input(vec![unlinked_line("Oil", 1.0)]))
            .await
            .unwrap();
        assert_eq!(svc.next_invoice_number().await, 2);
    }

    #[tokio::test]
    async fn test_submit_draft_create_then_edit() {
        let (svc, db) = service().await;
        let oil = seed_item(&db, "Oil", 10.0).await;

        // Create path
        let mut draft = svc.begin_new_draft().unwrap();
        draft.customer_name = "Ali".to_string();
        draft.lines = vec![priced_line(
            ItemRef::Linked {
                item_id: oil.clone(),
            },
            "Oil",
            2.0,
            Unit::Ltr,
            100.0,
            TaxType::WithoutTax,
            1.0,
        )];
        svc.drafts().store(draft.clone());

        let SaveOutcome::Saved { sale, .. } = svc.submit_draft(&draft.id).await.unwrap() else {
            panic!("expected saved outcome");
        };
        assert!(svc.drafts().get(&draft.id).is_none()); // cleared
        assert_eq!(stock_of(&db, &oil).await, 8.0);

        // Edit path: prefilled draft, quantity bumped
        let mut edit = svc.begin_edit_draft(&sale.id).await.unwrap();
        assert_eq!(edit.lines.len(), 1);
        edit.lines[0].quantity = 3.0;
        svc.drafts().store(edit.clone());

        let SaveOutcome::Saved { sale: edited, .. } =
            svc.submit_draft(&edit.id).await.unwrap()
        else {
            panic!("expected saved outcome");
        };
        assert_eq!(edited.total_quantity, 3.0);
        assert_eq!(stock_of(&db, &oil).await, 7.0);
    }

    #[test]
    fn test_adjustment_report_completeness() {
        let complete = AdjustmentReport {
            applied: 3,
            failed: 0,
            total: 3,
        };
        let partial = AdjustmentReport {
            applied: 2,
            failed: 1,
            total: 3,
        };
        assert!(complete.is_complete());
        assert!(!partial.is_complete());
    }
}
