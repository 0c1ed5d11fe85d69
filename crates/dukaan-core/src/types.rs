//! # Domain Types
//!
//! Core domain types used throughout Dukaan POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Item        │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  item (ItemRef) │       │
//! │  │  name (match    │   │  invoice_number │   │  quantity, rate │       │
//! │  │       key)      │   │  lines          │   │  tax_type       │       │
//! │  │  stock_quantity │   │  totals         │   │  amount (frozen)│       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Prize       │   │     Claim       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  points         │   │  claimed_points │   │  role           │       │
//! │  │  quantity       │   │  status         │   │  password_hash  │       │
//! │  │  is_active      │   │  is_custom_prize│   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entity Linking
//! A `SaleLine` carries an explicit [`ItemRef`]: either `Linked` to an
//! inventory item chosen at entry time, or `Unlinked` for a free-text line.
//! Name matching is used only for unlinked lines (and for legacy
//! claim-to-prize resolution).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Units & Tax Type
// =============================================================================

/// Measurement unit of a sale line or inventory item.
///
/// Wire values keep the casing of the historical data set
/// ("Pcs" / "buc" / "Ltr").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum Unit {
    /// Pieces (count-based).
    #[serde(rename = "Pcs")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Pcs"))]
    Pcs,
    /// Buckets (count-based).
    #[serde(rename = "buc")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "buc"))]
    Buc,
    /// Litres (volume-based). The only unit whose loyalty accrual is
    /// proportional to quantity.
    #[serde(rename = "Ltr")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Ltr"))]
    Ltr,
}

impl Unit {
    /// Returns true for volume-based units.
    #[inline]
    pub const fn is_volume(&self) -> bool {
        matches!(self, Unit::Ltr)
    }
}

/// Whether a sale line includes sales tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum TaxType {
    #[serde(rename = "With Tax")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "With Tax"))]
    WithTax,
    #[serde(rename = "Without Tax")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Without Tax"))]
    WithoutTax,
}

impl Default for TaxType {
    fn default() -> Self {
        TaxType::WithoutTax
    }
}

// =============================================================================
// Payment Type
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum PaymentType {
    Credit,
    Cash,
}

impl Default for PaymentType {
    /// New sales default to Credit; the biller switches to Cash explicitly.
    fn default() -> Self {
        PaymentType::Credit
    }
}

// =============================================================================
// Item Reference
// =============================================================================

/// Link from a sale line to its inventory record.
///
/// ## Why an explicit variant?
/// Free-text lines used to be detected by name matching alone. Tagging the
/// fallback makes "not tracked in inventory" a deliberate state instead of
/// an accident of string comparison. Unlinked lines still resolve by
/// case-folded trimmed name when stock is adjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum ItemRef {
    /// Line was linked to an inventory item at entry time.
    #[serde(rename_all = "camelCase")]
    Linked { item_id: String },
    /// Manually-entered line with no backing inventory record.
    Unlinked,
}

impl ItemRef {
    /// Returns the linked item id, if any.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            ItemRef::Linked { item_id } => Some(item_id),
            ItemRef::Unlinked => None,
        }
    }
}

// =============================================================================
// Item (Inventory)
// =============================================================================

/// An inventory item.
///
/// `stock_quantity` is a float and may go negative under concurrent sale
/// mutations; the system accepts this rather than enforcing a floor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name; also the matching key for unlinked sale lines
    /// (case/whitespace-insensitive).
    pub name: String,

    /// Measurement unit.
    pub unit: Unit,

    /// Selling price per unit.
    pub sale_price: f64,

    /// Purchase (cost) price per unit.
    pub purchase_price: f64,

    /// Wholesale price per unit.
    pub wholesale_price: f64,

    /// Current stock level. May go negative under races; not enforced.
    pub stock_quantity: f64,

    /// Low-stock threshold for the dashboard.
    pub min_stock_quantity: f64,

    /// Stored tax rate. Unused by the amount calculator, which applies a
    /// fixed 18% to "With Tax" lines.
    pub tax_rate: f64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Checks whether the item is at or below its low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_quantity
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item embedded in a sale.
///
/// `amount` is frozen at entry time: it is computed once from quantity,
/// rate and tax type, and stored on the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    /// Inventory link (or explicit free-text fallback).
    pub item: ItemRef,

    /// Item name as entered/displayed.
    pub name: String,

    /// Quantity sold.
    pub quantity: f64,

    /// Measurement unit.
    pub unit: Unit,

    /// Rate (price per unit) at time of sale.
    pub rate: f64,

    /// Whether this line carries the 18% sales tax.
    pub tax_type: TaxType,

    /// Container/package count.
    pub count: f64,

    /// Line amount: quantity × rate × (1.18 if taxed else 1), frozen at entry.
    pub amount: f64,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale document with embedded lines.
///
/// `balance_amount` is always recomputed as `total_amount − received_amount`
/// on write; it is never independently trusted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Monotonic invoice number, allocated inside the insert transaction.
    pub invoice_number: i64,

    pub customer_name: String,
    pub phone_number: String,

    /// Ordered line items.
    pub lines: Vec<SaleLine>,

    /// Σ rate × quantity over lines.
    pub subtotal: f64,
    /// Σ rate × quantity × 0.18 over taxed lines.
    pub total_tax: f64,
    /// Σ line amounts (= subtotal + total_tax).
    pub total_amount: f64,
    /// Σ line quantities.
    pub total_quantity: f64,
    /// Σ line counts.
    pub total_count: f64,

    pub received_amount: f64,
    /// total_amount − received_amount, recomputed on every write.
    pub balance_amount: f64,

    pub payment_type: PaymentType,

    /// Display date string, DD/MM/YYYY.
    pub sale_date: String,
    /// Display time string, 12-hour zero-padded with AM/PM.
    pub sale_time: String,

    pub created_by: String,
    pub updated_by: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Formats a timestamp as the invoice display date (DD/MM/YYYY).
pub fn invoice_date_string(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// Formats a timestamp as the invoice display time (hh:mm AM/PM, zero-padded).
pub fn invoice_time_string(at: &DateTime<Utc>) -> String {
    at.format("%I:%M %p").to_string()
}

// =============================================================================
// Prize
// =============================================================================

/// A loyalty prize in the catalog.
///
/// `is_active` is driven to false when `quantity` reaches zero via claim
/// acquisition, and back to true when a deleted claim restores the last unit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Prize {
    pub id: String,
    pub name: String,
    /// Points required to claim this prize.
    pub points: i64,
    /// Remaining units.
    pub quantity: i64,
    pub category: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Claim
// =============================================================================

/// Lifecycle status of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ClaimStatus {
    Pending,
    Claimed,
    Processed,
}

impl Default for ClaimStatus {
    fn default() -> Self {
        ClaimStatus::Pending
    }
}

/// A prize redemption against a customer's loyalty points.
///
/// `claimed_points` is netted against the customer's earned points for the
/// loyalty balance. `created_at` is preserved across edits.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Claim {
    pub id: String,
    pub customer_name: String,
    pub vehicle_no: String,
    pub phone_no: String,
    /// Name of the claimed prize. For catalog prizes this is also the key
    /// used to resolve the prize when the claim is deleted.
    pub prize_name: String,
    pub claimed_points: i64,
    pub status: ClaimStatus,
    /// Custom prizes bypass catalog inventory entirely.
    pub is_custom_prize: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User & Role
// =============================================================================

/// Application role, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Biller,
    User,
}

impl Role {
    /// Privilege rank for at-least comparisons (higher = more privileged).
    pub const fn rank(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Biller => 2,
            Role::User => 1,
        }
    }

    /// Checks whether this role has at least the privilege of `other`.
    #[inline]
    pub const fn is_at_least(&self, other: Role) -> bool {
        self.rank() >= other.rank()
    }
}

impl Default for Role {
    /// Sign-ups default to the least-privileged role.
    fn default() -> Self {
        Role::User
    }
}

/// An application user. Internal type; the password hash never leaves
/// the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tax_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&TaxType::WithTax).unwrap(),
            "\"With Tax\""
        );
        assert_eq!(
            serde_json::to_string(&TaxType::WithoutTax).unwrap(),
            "\"Without Tax\""
        );
    }

    #[test]
    fn test_unit_wire_format() {
        assert_eq!(serde_json::to_string(&Unit::Buc).unwrap(), "\"buc\"");
        assert_eq!(serde_json::to_string(&Unit::Ltr).unwrap(), "\"Ltr\"");
        assert!(Unit::Ltr.is_volume());
        assert!(!Unit::Pcs.is_volume());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentType::default(), PaymentType::Credit);
        assert_eq!(ClaimStatus::default(), ClaimStatus::Pending);
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin.is_at_least(Role::Biller));
        assert!(Role::Biller.is_at_least(Role::Biller));
        assert!(!Role::User.is_at_least(Role::Biller));
    }

    #[test]
    fn test_item_ref() {
        let linked = ItemRef::Linked {
            item_id: "abc".to_string(),
        };
        assert_eq!(linked.item_id(), Some("abc"));
        assert_eq!(ItemRef::Unlinked.item_id(), None);
    }

    #[test]
    fn test_invoice_display_strings() {
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 14, 5, 0).unwrap();
        assert_eq!(invoice_date_string(&at), "31/01/2026");
        assert_eq!(invoice_time_string(&at), "02:05 PM");

        let morning = Utc.with_ymd_and_hms(2026, 1, 31, 9, 30, 0).unwrap();
        assert_eq!(invoice_time_string(&morning), "09:30 AM");
    }

    #[test]
    fn test_low_stock() {
        let now = Utc::now();
        let item = Item {
            id: "i1".to_string(),
            name: "Oil".to_string(),
            unit: Unit::Ltr,
            sale_price: 100.0,
            purchase_price: 80.0,
            wholesale_price: 90.0,
            stock_quantity: 2.0,
            min_stock_quantity: 5.0,
            tax_rate: 0.0,
            created_at: now,
            updated_at: now,
        };
        assert!(item.is_low_stock());
    }
}
