//! # Loyalty Points Calculator
//!
//! Derives a customer's loyalty balance from their sale history and
//! prize claims.
//!
//! ## Accrual Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Per sale line:                                                         │
//! │    unit == Ltr  → earn line.quantity points (volume rule)              │
//! │    otherwise    → earn a flat 20 points (count rule)                   │
//! │                                                                         │
//! │  Example: [{Ltr, qty 5}, {Pcs, qty 3}] → 5 + 20 = 25 points            │
//! │  (the Pcs quantity of 3 is irrelevant: flat 20 per line)               │
//! │                                                                         │
//! │  remaining = earned − Σ claim.claimed_points                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Customer Identity
//! There is no customer entity of record. A sale or claim belongs to a
//! customer when its case-insensitive name OR exact phone number matches.
//! This is a deliberately loose join: two people sharing a name accumulate
//! combined points unless their phone numbers differ.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::reconcile::fold_name;
use crate::types::{Claim, Sale, SaleLine};
use crate::COUNT_UNIT_POINTS;

// =============================================================================
// Points Summary
// =============================================================================

/// A customer's loyalty balance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PointsSummary {
    pub earned: f64,
    pub claimed: f64,
    pub remaining: f64,
}

/// Points earned by a single sale line.
#[inline]
pub fn line_points(line: &SaleLine) -> f64 {
    if line.unit.is_volume() {
        line.quantity
    } else {
        COUNT_UNIT_POINTS
    }
}

/// Points earned across a customer's sales.
pub fn earned_points<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> f64 {
    sales
        .into_iter()
        .flat_map(|sale| sale.lines.iter())
        .map(line_points)
        .sum()
}

/// Points consumed across a customer's claims.
pub fn claimed_points<'a>(claims: impl IntoIterator<Item = &'a Claim>) -> f64 {
    claims.into_iter().map(|c| c.claimed_points as f64).sum()
}

/// Nets earned points against claimed points.
pub fn summarize<'a>(
    sales: impl IntoIterator<Item = &'a Sale>,
    claims: impl IntoIterator<Item = &'a Claim>,
) -> PointsSummary {
    let earned = earned_points(sales);
    let claimed = claimed_points(claims);
    PointsSummary {
        earned,
        claimed,
        remaining: earned - claimed,
    }
}

// =============================================================================
// Customer Matching
// =============================================================================

/// Loose customer identity match: case-insensitive name OR exact phone.
///
/// An empty phone never matches (otherwise every walk-in sale without a
/// phone number would join with every other).
pub fn matches_customer(
    record_name: &str,
    record_phone: &str,
    customer_name: &str,
    customer_phone: &str,
) -> bool {
    let name_match =
        !customer_name.trim().is_empty() && fold_name(record_name) == fold_name(customer_name);
    let phone_match = !customer_phone.is_empty() && record_phone == customer_phone;
    name_match || phone_match
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::priced_line;
    use crate::types::{ClaimStatus, ItemRef, PaymentType, TaxType, Unit};
    use chrono::Utc;

    fn sale_with_lines(lines: Vec<SaleLine>) -> Sale {
        let now = Utc::now();
        Sale {
            id: "s1".to_string(),
            invoice_number: 1,
            customer_name: "Ali".to_string(),
            phone_number: "0300".to_string(),
            lines,
            subtotal: 0.0,
            total_tax: 0.0,
            total_amount: 0.0,
            total_quantity: 0.0,
            total_count: 0.0,
            received_amount: 0.0,
            balance_amount: 0.0,
            payment_type: PaymentType::Credit,
            sale_date: String::new(),
            sale_time: String::new(),
            created_by: String::new(),
            updated_by: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn line(unit: Unit, quantity: f64) -> SaleLine {
        priced_line(
            ItemRef::Unlinked,
            "X",
            quantity,
            unit,
            10.0,
            TaxType::WithoutTax,
            1.0,
        )
    }

    fn claim(points: i64) -> Claim {
        let now = Utc::now();
        Claim {
            id: "c1".to_string(),
            customer_name: "Ali".to_string(),
            vehicle_no: String::new(),
            phone_no: "0300".to_string(),
            prize_name: "Cap".to_string(),
            claimed_points: points,
            status: ClaimStatus::Pending,
            is_custom_prize: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// [{Ltr, qty 5}, {Pcs, qty 3}] earns 5 + 20 = 25.
    #[test]
    fn test_earned_points_mixed_units() {
        let sale = sale_with_lines(vec![line(Unit::Ltr, 5.0), line(Unit::Pcs, 3.0)]);
        assert_eq!(earned_points([&sale]), 25.0);
    }

    #[test]
    fn test_count_rule_ignores_quantity() {
        let a = sale_with_lines(vec![line(Unit::Pcs, 1.0)]);
        let b = sale_with_lines(vec![line(Unit::Pcs, 99.0)]);
        assert_eq!(earned_points([&a]), earned_points([&b]));
    }

    #[test]
    fn test_remaining_is_earned_minus_claimed() {
        let sale = sale_with_lines(vec![line(Unit::Ltr, 30.0)]);
        let claims = [claim(10), claim(5)];

        let summary = summarize([&sale], claims.iter());
        assert_eq!(summary.earned, 30.0);
        assert_eq!(summary.claimed, 15.0);
        assert_eq!(summary.remaining, 15.0);
    }

    #[test]
    fn test_remaining_can_go_negative() {
        let sale = sale_with_lines(vec![line(Unit::Ltr, 5.0)]);
        let claims = [claim(20)];
        assert_eq!(summarize([&sale], claims.iter()).remaining, -15.0);
    }

    #[test]
    fn test_matches_customer_by_name() {
        assert!(matches_customer("  ALI  ", "0311", "ali", "0300"));
    }

    #[test]
    fn test_matches_customer_by_phone() {
        assert!(matches_customer("Someone Else", "0300", "Ali", "0300"));
    }

    #[test]
    fn test_empty_phone_does_not_match() {
        assert!(!matches_customer("Other", "", "Ali", ""));
    }
}
