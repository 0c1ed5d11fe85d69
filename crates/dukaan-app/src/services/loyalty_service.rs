//! # Loyalty Service
//!
//! Looks up a customer's loyalty balance: their matching sales and claims
//! are fetched with the loose customer join (case-insensitive name OR
//! exact phone) and netted by `dukaan_core::loyalty`.

use crate::error::{ApiError, ApiResult};
use crate::session::SessionState;
use dukaan_core::loyalty::{summarize, PointsSummary};
use dukaan_core::{Claim, Sale};
use dukaan_db::Database;

/// Customer points lookups.
#[derive(Debug, Clone)]
pub struct LoyaltyService {
    db: Database,
    session: SessionState,
}

impl LoyaltyService {
    pub fn new(db: Database, session: SessionState) -> Self {
        LoyaltyService { db, session }
    }

    /// A customer's earned, claimed and remaining points.
    ///
    /// At least one of name or phone must be given; matching with both
    /// empty would join with nothing (or, worse, everything).
    pub async fn points_for(&self, customer_name: &str, phone: &str) -> ApiResult<PointsSummary> {
        self.session.require()?;

        if customer_name.trim().is_empty() && phone.trim().is_empty() {
            return Err(ApiError::validation(
                "customer name or phone number is required",
            ));
        }

        let sales = self
            .db
            .sales()
            .find_by_customer(customer_name, phone)
            .await?;
        let claims = self
            .db
            .claims()
            .find_by_customer(customer_name, phone)
            .await?;

        Ok(summarize(&sales, &claims))
    }

    /// The sale history backing a customer's points.
    pub async fn sales_for(&self, customer_name: &str, phone: &str) -> ApiResult<Vec<Sale>> {
        self.session.require()?;
        Ok(self
            .db
            .sales()
            .find_by_customer(customer_name, phone)
            .await?)
    }

    /// The claim history backing a customer's points.
    pub async fn claims_for(&self, customer_name: &str, phone: &str) -> ApiResult<Vec<Claim>> {
        self.session.require()?;
        Ok(self
            .db
            .claims()
            .find_by_customer(customer_name, phone)
            .await?)
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
    use dukaan_core::{ClaimStatus, ItemRef, PaymentType, Role, TaxType, Unit};
    use dukaan_db::repository::claim::NewClaim;
    use dukaan_db::repository::sale::NewSale;
    use dukaan_db::DbConfig;

    fn session() -> SessionState {
        let state = SessionState::new();
        state.set(Session {
            user_id: "u1".to_string(),
            username: "tester".to_string(),
            role: Role::User,
            started_at: Utc::now(),
        });
        state
    }

    async fn service() -> (LoyaltyService, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let svc = LoyaltyService::new(db.clone(), session());
        (svc, db)
    }

    async fn seed_sale(db: &Database, customer: &str, phone: &str, unit: Unit, quantity: f64) {
        db.sales()
            .insert(
                NewSale {
                    customer_name: customer.to_string(),
                    phone_number: phone.to_string(),
                    lines: vec![dukaan_core::amounts::priced_line(
                        ItemRef::Unlinked,
                        "Oil",
                        quantity,
                        unit,
                        100.0,
                        TaxType::WithoutTax,
                        1.0,
                    )],
                    received_amount: 0.0,
                    payment_type: PaymentType::Credit,
                },
                "u1",
            )
            .await
            .unwrap();
    }

    async fn seed_claim(db: &Database, customer: &str, phone: &str, points: i64) {
        db.claims()
            .insert(NewClaim {
                customer_name: customer.to_string(),
                vehicle_no: String::new(),
                phone_no: phone.to_string(),
                prize_name: "Cap".to_string(),
                claimed_points: points,
                status: ClaimStatus::Pending,
                is_custom_prize: false,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_points_net_sales_against_claims() {
        let (svc, db) = service().await;

        // 5 Ltr earns 5, a Pcs line earns a flat 20
        seed_sale(&db, "Ali", "0300", Unit::Ltr, 5.0).await;
        seed_sale(&db, "ali", "", Unit::Pcs, 3.0).await;
        seed_claim(&db, "Ali", "0300", 10).await;

        let summary = svc.points_for("Ali", "0300").await.unwrap();
        assert_eq!(summary.earned, 25.0);
        assert_eq!(summary.claimed, 10.0);
        assert_eq!(summary.remaining, 15.0);
    }

    #[tokio::test]
    async fn test_phone_joins_across_different_names() {
        let (svc, db) = service().await;

        seed_sale(&db, "Ali", "0300", Unit::Ltr, 5.0).await;
        seed_sale(&db, "Mohammad Ali", "0300", Unit::Ltr, 7.0).await;
        seed_sale(&db, "Stranger", "0999", Unit::Ltr, 100.0).await;

        let summary = svc.points_for("Ali", "0300").await.unwrap();
        assert_eq!(summary.earned, 12.0);
    }

    #[tokio::test]
    async fn test_blank_lookup_rejected() {
        let (svc, _) = service().await;
        let err = svc.points_for("  ", "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_requires_session() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let svc = LoyaltyService::new(db, SessionState::new());

        let err = svc.points_for("Ali", "0300").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
