//! # Prize Repository
//!
//! Database operations for the loyalty prize catalog.
//!
//! ## Inventory Gate
//! Claiming a catalog prize consumes one unit; deleting a claim restores
//! it. Both sides are single conditional UPDATEs so two clerks approving
//! the last unit concurrently can never both succeed:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  try_acquire_unit (claim create)                                        │
//! │    UPDATE ... SET quantity = quantity - 1,                              │
//! │                   is_active = 0 when the pre-update quantity was 1      │
//! │    WHERE id = ? AND quantity > 0                                        │
//! │    rows_affected == 1  → unit acquired                                  │
//! │    rows_affected == 0  → out of stock, claim must be refused            │
//! │                                                                         │
//! │  release_unit (claim delete)                                            │
//! │    UPDATE ... SET quantity = quantity + 1,                              │
//! │                   is_active = 1 when it was depleted-deactivated        │
//! │    (unconditional: restoring can always proceed)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeKind, Collection};
use dukaan_core::Prize;

/// Field set for creating or replacing a prize.
#[derive(Debug, Clone)]
pub struct NewPrize {
    pub name: String,
    pub points: i64,
    pub quantity: i64,
    pub category: String,
    pub is_active: bool,
}

/// Repository for prize database operations.
#[derive(Debug, Clone)]
pub struct PrizeRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl PrizeRepository {
    /// Creates a new PrizeRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        PrizeRepository { pool, bus }
    }

    /// Inserts a new prize.
    pub async fn insert(&self, new: NewPrize) -> DbResult<Prize> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %new.name, "Inserting prize");

        let prize = Prize {
            id: id.clone(),
            name: new.name,
            points: new.points,
            quantity: new.quantity,
            category: new.category,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO prizes (id, name, points, quantity, category, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&prize.id)
        .bind(&prize.name)
        .bind(prize.points)
        .bind(prize.quantity)
        .bind(&prize.category)
        .bind(prize.is_active)
        .bind(prize.created_at)
        .bind(prize.updated_at)
        .execute(&self.pool)
        .await?;

        self.bus.publish(Collection::Prizes, ChangeKind::Created, &id);
        Ok(prize)
    }

    /// Replaces a prize's editable fields, preserving `created_at`.
    pub async fn update(&self, id: &str, new: NewPrize) -> DbResult<Prize> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE prizes SET
                name = ?2, points = ?3, quantity = ?4,
                category = ?5, is_active = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&new.name)
        .bind(new.points)
        .bind(new.quantity)
        .bind(&new.category)
        .bind(new.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Prize", id));
        }

        self.bus.publish(Collection::Prizes, ChangeKind::Updated, id);
        self.get_required(id).await
    }

    /// Gets a prize by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Prize>> {
        let prize = sqlx::query_as::<_, Prize>("SELECT * FROM prizes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(prize)
    }

    /// Gets a prize by ID, erroring if absent.
    pub async fn get_required(&self, id: &str) -> DbResult<Prize> {
        self.get(id).await?.ok_or_else(|| DbError::not_found("Prize", id))
    }

    /// Finds a prize by case-folded trimmed name.
    ///
    /// Claims reference prizes by name, so claim deletion resolves its
    /// prize through this lookup.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Prize>> {
        let prize = sqlx::query_as::<_, Prize>(
            "SELECT * FROM prizes WHERE lower(trim(name)) = lower(trim(?1)) LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(prize)
    }

    /// Lists all prizes ordered by points required.
    pub async fn list(&self) -> DbResult<Vec<Prize>> {
        let prizes = sqlx::query_as::<_, Prize>("SELECT * FROM prizes ORDER BY points, name")
            .fetch_all(&self.pool)
            .await?;

        Ok(prizes)
    }

    /// Lists active prizes only (the claimable catalog).
    pub async fn list_active(&self) -> DbResult<Vec<Prize>> {
        let prizes = sqlx::query_as::<_, Prize>(
            "SELECT * FROM prizes WHERE is_active = 1 ORDER BY points, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(prizes)
    }

    /// Attempts to consume one unit of a prize.
    ///
    /// Returns `true` if a unit was acquired. Returns `false` when the
    /// prize has no stock left; the caller must refuse the claim. If this
    /// takes the last unit, the prize is deactivated in the same statement.
    pub async fn try_acquire_unit(&self, id: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE prizes SET
                quantity = quantity - 1,
                is_active = CASE WHEN quantity - 1 <= 0 THEN 0 ELSE is_active END,
                updated_at = ?2
            WHERE id = ?1 AND quantity > 0
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let acquired = result.rows_affected() == 1;
        debug!(id = %id, acquired, "Prize unit acquisition");

        if acquired {
            self.bus.publish(Collection::Prizes, ChangeKind::Updated, id);
        }
        Ok(acquired)
    }

    /// Restores one unit of a prize (claim deletion).
    ///
    /// Reactivates a prize that was deactivated by depletion; a manually
    /// deactivated prize with stock stays inactive.
    pub async fn release_unit(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE prizes SET
                quantity = quantity + 1,
                is_active = CASE WHEN is_active = 0 AND quantity <= 0 THEN 1 ELSE is_active END,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Prize", id));
        }

        debug!(id = %id, "Prize unit released");
        self.bus.publish(Collection::Prizes, ChangeKind::Updated, id);
        Ok(())
    }

    /// Deletes a prize. Existing claims keep their name snapshot.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM prizes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Prize", id));
        }

        self.bus.publish(Collection::Prizes, ChangeKind::Deleted, id);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
