//! # Claim Repository
//!
//! Database operations for prize claims.
//!
//! Claims snapshot their prize by name (`prize_name`), not by foreign key,
//! so deleting a prize never invalidates claim history. The inventory side
//! of claiming lives in the prize repository; the claim service sequences
//! the two.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeKind, Collection};
use dukaan_core::{Claim, ClaimStatus};

/// Field set for creating or replacing a claim.
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub customer_name: String,
    pub vehicle_no: String,
    pub phone_no: String,
    pub prize_name: String,
    pub claimed_points: i64,
    pub status: ClaimStatus,
    pub is_custom_prize: bool,
}

/// Repository for claim database operations.
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl ClaimRepository {
    /// Creates a new ClaimRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        ClaimRepository { pool, bus }
    }

    /// Inserts a new claim.
    pub async fn insert(&self, new: NewClaim) -> DbResult<Claim> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, prize = %new.prize_name, "Inserting claim");

        let claim = Claim {
            id: id.clone(),
            customer_name: new.customer_name,
            vehicle_no: new.vehicle_no,
            phone_no: new.phone_no,
            prize_name: new.prize_name,
            claimed_points: new.claimed_points,
            status: new.status,
            is_custom_prize: new.is_custom_prize,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO claims (
                id, customer_name, vehicle_no, phone_no,
                prize_name, claimed_points, status, is_custom_prize,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&claim.id)
        .bind(&claim.customer_name)
        .bind(&claim.vehicle_no)
        .bind(&claim.phone_no)
        .bind(&claim.prize_name)
        .bind(claim.claimed_points)
        .bind(claim.status)
        .bind(claim.is_custom_prize)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await?;

        self.bus.publish(Collection::Claims, ChangeKind::Created, &id);
        Ok(claim)
    }

    /// Replaces a claim's editable fields. `created_at` is preserved so
    /// edits never move a claim in chronological listings.
    pub async fn update(&self, id: &str, new: NewClaim) -> DbResult<Claim> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE claims SET
                customer_name = ?2,
                vehicle_no = ?3,
                phone_no = ?4,
                prize_name = ?5,
                claimed_points = ?6,
                status = ?7,
                is_custom_prize = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&new.customer_name)
        .bind(&new.vehicle_no)
        .bind(&new.phone_no)
        .bind(&new.prize_name)
        .bind(new.claimed_points)
        .bind(new.status)
        .bind(new.is_custom_prize)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Claim", id));
        }

        self.bus.publish(Collection::Claims, ChangeKind::Updated, id);
        self.get_required(id).await
    }

    /// Updates only the lifecycle status of a claim.
    pub async fn set_status(&self, id: &str, status: ClaimStatus) -> DbResult<Claim> {
        let now = Utc::now();

        let result = sqlx::query("UPDATE claims SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Claim", id));
        }

        self.bus.publish(Collection::Claims, ChangeKind::Updated, id);
        self.get_required(id).await
    }

    /// Gets a claim by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Claim>> {
        let claim = sqlx::query_as::<_, Claim>("SELECT * FROM claims WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(claim)
    }

    /// Gets a claim by ID, erroring if absent.
    pub async fn get_required(&self, id: &str) -> DbResult<Claim> {
        self.get(id).await?.ok_or_else(|| DbError::not_found("Claim", id))
    }

    /// Lists all claims, newest first.
    pub async fn list(&self) -> DbResult<Vec<Claim>> {
        let claims =
            sqlx::query_as::<_, Claim>("SELECT * FROM claims ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(claims)
    }

    /// Lists claims belonging to a customer under the loose identity rule:
    /// case-folded name match OR exact non-empty phone match.
    pub async fn find_by_customer(&self, name: &str, phone: &str) -> DbResult<Vec<Claim>> {
        let claims = sqlx::query_as::<_, Claim>(
            r#"
            SELECT * FROM claims
            WHERE (?1 <> '' AND lower(trim(customer_name)) = lower(trim(?1)))
               OR (?2 <> '' AND phone_no = ?2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(claims)
    }

    /// Deletes a claim.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting claim");

        let result = sqlx::query("DELETE FROM claims WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Claim", id));
        }

        self.bus.publish(Collection::Claims, ChangeKind::Deleted, id);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn claim_for(name: &str, phone: &str) -> NewClaim {
        NewClaim {
            customer_name: name.to_string(),
            vehicle_no: "LEB-1234".to_string(),
            phone_no: phone.to_string(),
            prize_name: "Cap".to_string(),
            claimed_points: 50,
            status: ClaimStatus::Pending,
            is_custom_prize: false,
        }
    }

    #[tokio::test]
    async fn test_insert_and_status_transition() {
        let db = test_db().await;
        let repo = db.claims();

        let claim = repo.insert(claim_for("Ali", "0300")).await.unwrap();
        assert_eq!(claim.status, ClaimStatus::Pending);

        repo.set_status(&claim.id, ClaimStatus::Claimed).await.unwrap();
        let fetched = repo.get_required(&claim.id).await.unwrap();
        assert_eq!(fetched.status, ClaimStatus::Claimed);
    }

    #[tokio::test]
    async fn test_update_preserves_created_at() {
        let db = test_db().await;
        let repo = db.claims();
        let claim = repo.insert(claim_for("Ali", "0300")).await.unwrap();

        let mut edited = claim_for("Ali", "0300");
        edited.claimed_points = 75;
        let updated = repo.update(&claim.id, edited).await.unwrap();

        assert_eq!(updated.claimed_points, 75);
        assert_eq!(updated.created_at, claim.created_at);
    }

    #[tokio::test]
    async fn test_find_by_customer_loose_join() {
        let db = test_db().await;
        let repo = db.claims();

        repo.insert(claim_for("  ALI  ", "0311")).await.unwrap();
        repo.insert(claim_for("Someone", "0300")).await.unwrap();
        repo.insert(claim_for("Other", "")).await.unwrap();

        let matched = repo.find_by_customer("ali", "0300").await.unwrap();
        assert_eq!(matched.len(), 2);

        // Empty inputs never match everything
        let none = repo.find_by_customer("", "").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.claims();
        let claim = repo.insert(claim_for("Ali", "")).await.unwrap();

        repo.delete(&claim.id).await.unwrap();
        assert!(repo.get(&claim.id).await.unwrap().is_none());
    }
}
