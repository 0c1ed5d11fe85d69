//! # Amount Calculator
//!
//! Pure functions converting line items into monetary amounts and
//! aggregating a line list into sale totals.
//!
//! ## The Tax Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount = quantity × rate × (1.18 if "With Tax" else 1)                │
//! │                                                                         │
//! │  Example: 2 × Rs.100 Without Tax  → Rs.200.00                          │
//! │           2 × Rs.100 With Tax     → Rs.236.00 (Rs.36 tax)              │
//! │                                                                         │
//! │  The 18% rate is a fixed business rule (TAX_RATE constant).            │
//! │  Items carry a tax_rate field, but this calculator never reads it.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Precision Policy
//! Internal totals stay full-precision f64. There is no rounding here;
//! display formatting (two decimals) is the caller's job.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{SaleLine, TaxType};
use crate::TAX_RATE;

// =============================================================================
// Line Amounts
// =============================================================================

/// Computes the amount for a single line: `quantity × rate`, grossed up by
/// 18% when the line carries tax.
#[inline]
pub fn line_amount(quantity: f64, rate: f64, tax_type: TaxType) -> f64 {
    let base = quantity * rate;
    match tax_type {
        TaxType::WithTax => base * (1.0 + TAX_RATE),
        TaxType::WithoutTax => base,
    }
}

/// Computes the tax portion for a single line (zero for untaxed lines).
#[inline]
pub fn line_tax(quantity: f64, rate: f64, tax_type: TaxType) -> f64 {
    match tax_type {
        TaxType::WithTax => quantity * rate * TAX_RATE,
        TaxType::WithoutTax => 0.0,
    }
}

/// Builds a [`SaleLine`] with its `amount` frozen from the other fields.
pub fn priced_line(
    item: crate::types::ItemRef,
    name: impl Into<String>,
    quantity: f64,
    unit: crate::types::Unit,
    rate: f64,
    tax_type: TaxType,
    count: f64,
) -> SaleLine {
    SaleLine {
        item,
        name: name.into(),
        quantity,
        unit,
        rate,
        tax_type,
        count,
        amount: line_amount(quantity, rate, tax_type),
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Aggregated totals over a sale's line list.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleTotals {
    /// Σ rate × quantity.
    pub subtotal: f64,
    /// Σ rate × quantity × 0.18 over taxed lines.
    pub total_tax: f64,
    /// Σ line amounts.
    pub total_amount: f64,
    /// Σ quantities.
    pub total_quantity: f64,
    /// Σ counts.
    pub total_count: f64,
}

/// Aggregates a line list into sale totals.
///
/// Lines carry NOT NULL numeric fields (the storage schema defaults missing
/// numerics to zero), so the reducers here are plain sums.
pub fn calculate_totals(lines: &[SaleLine]) -> SaleTotals {
    let mut totals = SaleTotals::default();

    for line in lines {
        totals.subtotal += line.rate * line.quantity;
        totals.total_tax += line_tax(line.quantity, line.rate, line.tax_type);
        totals.total_amount += line.amount;
        totals.total_quantity += line.quantity;
        totals.total_count += line.count;
    }

    totals
}

/// Balance due: `total_amount − received_amount`.
///
/// Always recomputed at write time; a stored balance is never trusted.
#[inline]
pub fn balance_amount(total_amount: f64, received_amount: f64) -> f64 {
    total_amount - received_amount
}

// =============================================================================
// Unit Tests
// =============================================================================
