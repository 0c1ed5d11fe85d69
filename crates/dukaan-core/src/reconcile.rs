//! # Stock Reconciliation
//!
//! Computes the signed stock deltas needed to keep inventory counters
//! consistent across sale create / edit / delete.
//!
//! ## How Reconciliation Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Edit Reconciliation                                  │
//! │                                                                         │
//! │  Original sale lines          New sale lines                           │
//! │  ───────────────────          ──────────────                           │
//! │  Oil      qty 2               Oil      qty 5                           │
//! │  Filter   qty 1               Coolant  qty 3                           │
//! │                                                                         │
//! │  Key→qty maps (duplicate keys are summed):                             │
//! │    original: { Oil: 2, Filter: 1 }                                     │
//! │    new:      { Oil: 5, Coolant: 3 }                                    │
//! │                                                                         │
//! │  Union of keys, delta = new − original, zero deltas dropped:           │
//! │    Oil:     +3   (3 more units consumed → deduct stock)                │
//! │    Filter:  −1   (returned → restore stock)                            │
//! │    Coolant: +3   (newly consumed → deduct stock)                       │
//! │                                                                         │
//! │  Applying: stock_quantity -= delta, one independent update per key.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sign Convention
//! Positive delta = additional consumption (stock must be deducted).
//! Negative delta = returned quantity (stock must be restored).
//!
//! ## Keying
//! Linked lines key by inventory item id. Unlinked lines key by case-folded
//! trimmed name, so a renamed-but-equivalent free-text entry still matches.

use std::collections::BTreeMap;

use crate::types::{ItemRef, SaleLine};

// =============================================================================
// Stock Key
// =============================================================================

/// Identity under which a sale line's stock effect is accumulated.
///
/// BTreeMap ordering over this key makes delta output deterministic,
/// which keeps `compute_deltas(A,B)` exactly elementwise-negated against
/// `compute_deltas(B,A)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StockKey {
    /// Linked line: keyed by inventory item id.
    Item(String),
    /// Unlinked line: keyed by case-folded trimmed name.
    Name(String),
}

/// Folds a free-text name into its matching key.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Returns the stock key for a sale line.
pub fn line_key(line: &SaleLine) -> StockKey {
    match &line.item {
        ItemRef::Linked { item_id } => StockKey::Item(item_id.clone()),
        ItemRef::Unlinked => StockKey::Name(fold_name(&line.name)),
    }
}

// =============================================================================
// Stock Delta
// =============================================================================

/// A signed stock adjustment for one distinct key.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDelta {
    pub key: StockKey,
    /// Positive = deduct stock, negative = restore stock.
    pub delta: f64,
}

/// Sums line quantities per stock key.
fn quantity_map(lines: &[SaleLine]) -> BTreeMap<StockKey, f64> {
    let mut map: BTreeMap<StockKey, f64> = BTreeMap::new();
    for line in lines {
        *map.entry(line_key(line)).or_insert(0.0) += line.quantity;
    }
    map
}

/// Computes per-key quantity deltas between an original and a new line list.
///
/// Duplicate keys within a list are summed first. Only non-zero deltas are
/// emitted, in key order.
pub fn compute_deltas(original: &[SaleLine], new: &[SaleLine]) -> Vec<StockDelta> {
    let original_qty = quantity_map(original);
    let mut new_qty = quantity_map(new);

    let mut deltas = Vec::new();

    for (key, old) in original_qty {
        let new = new_qty.remove(&key).unwrap_or(0.0);
        let delta = new - old;
        if delta != 0.0 {
            deltas.push(StockDelta { key, delta });
        }
    }

    // Keys present only in the new list
    for (key, new) in new_qty {
        if new != 0.0 {
            deltas.push(StockDelta { key, delta: new });
        }
    }

    deltas.sort_by(|a, b| a.key.cmp(&b.key));
    deltas
}

/// Deltas for a freshly created sale: every line's quantity is consumed.
///
/// Create has no "original", so this is `compute_deltas(&[], lines)`.
pub fn consumption_deltas(lines: &[SaleLine]) -> Vec<StockDelta> {
    compute_deltas(&[], lines)
}

/// Deltas for a deleted sale: every line's quantity is restored in full,
/// independent of any intermediate edits.
pub fn restoration_deltas(lines: &[SaleLine]) -> Vec<StockDelta> {
    compute_deltas(lines, &[])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::priced_line;
    use crate::types::{TaxType, Unit};

    fn linked(item_id: &str, name: &str, quantity: f64) -> SaleLine {
        priced_line(
            ItemRef::Linked {
                item_id: item_id.to_string(),
            },
            name,
            quantity,
            Unit::Pcs,
            10.0,
            TaxType::WithoutTax,
            1.0,
        )
    }

    fn unlinked(name: &str, quantity: f64) -> SaleLine {
        priced_line(
            ItemRef::Unlinked,
            name,
            quantity,
            Unit::Pcs,
            10.0,
            TaxType::WithoutTax,
            1.0,
        )
    }

    #[test]
    fn test_identical_lists_yield_no_deltas() {
        let lines = vec![linked("a", "Oil", 2.0), unlinked("Filter", 1.0)];
        assert!(compute_deltas(&lines, &lines).is_empty());
    }

    #[test]
    fn test_antisymmetry() {
        let a = vec![linked("a", "Oil", 2.0), linked("b", "Filter", 1.0)];
        let b = vec![linked("a", "Oil", 5.0), linked("c", "Coolant", 3.0)];

        let forward = compute_deltas(&a, &b);
        let backward = compute_deltas(&b, &a);

        assert_eq!(forward.len(), backward.len());
        for (f, r) in forward.iter().zip(backward.iter()) {
            assert_eq!(f.key, r.key);
            assert_eq!(f.delta, -r.delta);
        }
    }

    #[test]
    fn test_edit_deltas() {
        let original = vec![linked("a", "Oil", 2.0), linked("b", "Filter", 1.0)];
        let new = vec![linked("a", "Oil", 5.0), linked("c", "Coolant", 3.0)];

        let deltas = compute_deltas(&original, &new);

        assert_eq!(deltas.len(), 3);
        let get = |id: &str| {
            deltas
                .iter()
                .find(|d| d.key == StockKey::Item(id.to_string()))
                .map(|d| d.delta)
        };
        assert_eq!(get("a"), Some(3.0)); // 2 → 5: deduct 3 more
        assert_eq!(get("b"), Some(-1.0)); // removed: restore 1
        assert_eq!(get("c"), Some(3.0)); // new: deduct 3
    }

    #[test]
    fn test_duplicate_keys_are_summed() {
        let original = vec![unlinked("Oil", 1.0), unlinked(" oil ", 2.0)];
        let new = vec![unlinked("OIL", 5.0)];

        let deltas = compute_deltas(&original, &new);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].key, StockKey::Name("oil".to_string()));
        assert_eq!(deltas[0].delta, 2.0); // 5 − (1 + 2)
    }

    #[test]
    fn test_linked_and_unlinked_do_not_collide() {
        // Same display name, different identity
        let original = vec![linked("a", "Oil", 2.0)];
        let new = vec![unlinked("Oil", 2.0)];

        let deltas = compute_deltas(&original, &new);
        assert_eq!(deltas.len(), 2);
    }

    #[test]
    fn test_consumption_and_restoration_are_inverse() {
        let lines = vec![linked("a", "Oil", 2.0), unlinked("Grease", 4.0)];

        let consume = consumption_deltas(&lines);
        let restore = restoration_deltas(&lines);

        assert_eq!(consume.len(), restore.len());
        for (c, r) in consume.iter().zip(restore.iter()) {
            assert_eq!(c.key, r.key);
            assert_eq!(c.delta, -r.delta);
        }
        assert!(consume.iter().all(|d| d.delta > 0.0));
    }

    /// Applying edit deltas and then the reverting deltas nets to zero
    /// per key, so a round-trip edit leaves stock exactly where it was.
    #[test]
    fn test_edit_then_revert_nets_to_zero() {
        let original = vec![linked("a", "Oil", 2.0), linked("b", "Filter", 1.0)];
        let edited = vec![linked("a", "Oil", 7.0)];

        let forward = compute_deltas(&original, &edited);
        let revert = compute_deltas(&edited, &original);

        let mut net: BTreeMap<StockKey, f64> = BTreeMap::new();
        for d in forward.iter().chain(revert.iter()) {
            *net.entry(d.key.clone()).or_insert(0.0) += d.delta;
        }
        assert!(net.values().all(|v| *v == 0.0));
    }
}
