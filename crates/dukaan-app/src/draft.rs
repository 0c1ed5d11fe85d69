//! # Sale Drafts
//!
//! In-memory working copies for the sale entry screen.
//!
//! ## Why Drafts?
//! Editing a sale used to mean mutating shared screen state directly, so a
//! half-finished edit could leak into an unrelated new sale. A draft makes
//! the working copy explicit:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  begin_new()          empty draft, no original                         │
//! │  begin_edit(sale)     draft prefilled from the sale, original linked   │
//! │  fresh_start(id)      same draft identity, fields reset                │
//! │  save → SaleService   draft turned into a create or update             │
//! │  clear(id)            discard                                           │
//! │                                                                         │
//! │  Drafts expire after a TTL; expired drafts are purged on access.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drafts live only in memory. A crash loses them; the saved sales are the
//! durable record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use dukaan_core::{PaymentType, Sale, SaleLine};

/// A working copy of a sale being entered or edited.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    /// Draft identity, distinct from any sale id.
    pub id: String,

    /// The sale being edited, if this is an edit rather than a new entry.
    pub original_sale_id: Option<String>,

    pub customer_name: String,
    pub phone_number: String,
    pub lines: Vec<SaleLine>,
    pub received_amount: f64,
    pub payment_type: PaymentType,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SaleDraft {
    fn empty(ttl: Duration) -> Self {
        let now = Utc::now();
        SaleDraft {
            id: Uuid::new_v4().to_string(),
            original_sale_id: None,
            customer_name: String::new(),
            phone_number: String::new(),
            lines: Vec::new(),
            received_amount: 0.0,
            payment_type: PaymentType::default(),
            created_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::minutes(30)),
        }
    }

    /// Whether the draft has outlived its TTL.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Shared in-memory draft store with TTL-based expiry.
#[derive(Debug, Clone)]
pub struct DraftStore {
    inner: Arc<Mutex<HashMap<String, SaleDraft>>>,
    ttl: Duration,
}

impl DraftStore {
    /// Creates a store whose drafts live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        DraftStore {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Starts an empty draft for a new sale.
    pub fn begin_new(&self) -> SaleDraft {
        let draft = SaleDraft::empty(self.ttl);
        debug!(draft_id = %draft.id, "New sale draft");
        self.store(draft.clone());
        draft
    }

    /// Starts a draft prefilled from an existing sale.
    pub fn begin_edit(&self, sale: &Sale) -> SaleDraft {
        let mut draft = SaleDraft::empty(self.ttl);
        draft.original_sale_id = Some(sale.id.clone());
        draft.customer_name = sale.customer_name.clone();
        draft.phone_number = sale.phone_number.clone();
        draft.lines = sale.lines.clone();
        draft.received_amount = sale.received_amount;
        draft.payment_type = sale.payment_type;

        debug!(draft_id = %draft.id, sale_id = %sale.id, "Edit draft");
        self.store(draft.clone());
        draft
    }

    /// Gets a live draft by id. Expired drafts are dropped, not returned.
    pub fn get(&self, id: &str) -> Option<SaleDraft> {
        let mut map = self.inner.lock().expect("draft lock poisoned");
        match map.get(id) {
            Some(draft) if draft.is_expired() => {
                map.remove(id);
                None
            }
            Some(draft) => Some(draft.clone()),
            None => None,
        }
    }

    /// Saves updated draft fields.
    pub fn store(&self, draft: SaleDraft) {
        self.inner
            .lock()
            .expect("draft lock poisoned")
            .insert(draft.id.clone(), draft);
    }

    /// Resets a draft's fields while keeping its identity and original-sale
    /// link. Used by the "fresh start" action on the entry screen.
    pub fn fresh_start(&self, id: &str) -> Option<SaleDraft> {
        let existing = self.get(id)?;
        let mut reset = SaleDraft::empty(self.ttl);
        reset.id = existing.id;
        reset.original_sale_id = existing.original_sale_id;
        self.store(reset.clone());
        Some(reset)
    }

    /// Discards a draft.
    pub fn clear(&self, id: &str) {
        self.inner.lock().expect("draft lock poisoned").remove(id);
    }

    /// Removes all expired drafts; returns how many were purged.
    pub fn purge_expired(&self) -> usize {
        let mut map = self.inner.lock().expect("draft lock poisoned");
        let before = map.len();
        map.retain(|_, draft| !draft.is_expired());
        before - map.len()
    }

    /// Number of live drafts (expired ones included until purged).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("draft lock poisoned").len()
    }

    /// Whether the store holds no drafts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dukaan_core::amounts::priced_line;
    use dukaan_core::{ItemRef, TaxType, Unit};

    fn store() -> DraftStore {
        DraftStore::new(Duration::from_secs(60))
    }

    fn sample_sale() -> Sale {
        let now = Utc::now();
        Sale {
            id: "s1".to_string(),
            invoice_number: 7,
            customer_name: "Ali".to_string(),
            phone_number: "0300".to_string(),
            lines: vec![priced_line(
                ItemRef::Unlinked,
                "Oil",
                2.0,
                Unit::Ltr,
                100.0,
                TaxType::WithoutTax,
                1.0,
            )],
            subtotal: 200.0,
            total_tax: 0.0,
            total_amount: 200.0,
            total_quantity: 2.0,
            total_count: 1.0,
            received_amount: 50.0,
            balance_amount: 150.0,
            payment_type: PaymentType::Cash,
            sale_date: String::new(),
            sale_time: String::new(),
            created_by: "u1".to_string(),
            updated_by: "u1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_begin_new_is_empty() {
        let drafts = store();
        let draft = drafts.begin_new();

        assert!(draft.original_sale_id.is_none());
        assert!(draft.lines.is_empty());
        assert_eq!(draft.payment_type, PaymentType::Credit);
        assert!(drafts.get(&draft.id).is_some());
    }

    #[test]
    fn test_begin_edit_prefills_from_sale() {
        let drafts = store();
        let draft = drafts.begin_edit(&sample_sale());

        assert_eq!(draft.original_sale_id.as_deref(), Some("s1"));
        assert_eq!(draft.customer_name, "Ali");
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.received_amount, 50.0);
        assert_eq!(draft.payment_type, PaymentType::Cash);
    }

    #[test]
    fn test_fresh_start_keeps_identity_and_link() {
        let drafts = store();
        let draft = drafts.begin_edit(&sample_sale());

        let reset = drafts.fresh_start(&draft.id).unwrap();
        assert_eq!(reset.id, draft.id);
        assert_eq!(reset.original_sale_id.as_deref(), Some("s1"));
        assert!(reset.lines.is_empty());
        assert!(reset.customer_name.is_empty());
    }

    #[test]
    fn test_expired_drafts_are_dropped_on_access() {
        let drafts = DraftStore::new(Duration::from_secs(0));
        let draft = drafts.begin_new();

        assert!(drafts.get(&draft.id).is_none());
    }

    #[test]
    fn test_purge_expired() {
        let drafts = DraftStore::new(Duration::from_secs(0));
        drafts.begin_new();
        drafts.begin_new();

        assert_eq!(drafts.purge_expired(), 2);
        assert!(drafts.is_empty());
    }
}
