//! # Item Repository
//!
//! Database operations for inventory items.
//!
//! ## Stock Counter
//! `stock_quantity` is a shared mutable counter. All adjustments go through
//! [`ItemRepository::adjust_stock`], which is a single-statement relative
//! UPDATE (`stock_quantity = stock_quantity + ?`). Concurrent adjustments
//! therefore compose additively instead of overwriting each other with a
//! read-modify-write.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeKind, Collection};
use dukaan_core::{Item, Unit};

/// Field set for creating or replacing an item.
///
/// Identity and timestamps are repository-assigned.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub unit: Unit,
    pub sale_price: f64,
    pub purchase_price: f64,
    pub wholesale_price: f64,
    pub stock_quantity: f64,
    pub min_stock_quantity: f64,
    pub tax_rate: f64,
}

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        ItemRepository { pool, bus }
    }

    /// Inserts a new item with a generated ID and write-time timestamps.
    pub async fn insert(&self, new: NewItem) -> DbResult<Item> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, name = %new.name, "Inserting item");

        let item = Item {
            id: id.clone(),
            name: new.name,
            unit: new.unit,
            sale_price: new.sale_price,
            purchase_price: new.purchase_price,
            wholesale_price: new.wholesale_price,
            stock_quantity: new.stock_quantity,
            min_stock_quantity: new.min_stock_quantity,
            tax_rate: new.tax_rate,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, unit,
                sale_price, purchase_price, wholesale_price,
                stock_quantity, min_stock_quantity, tax_rate,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.unit)
        .bind(item.sale_price)
        .bind(item.purchase_price)
        .bind(item.wholesale_price)
        .bind(item.stock_quantity)
        .bind(item.min_stock_quantity)
        .bind(item.tax_rate)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        self.bus.publish(Collection::Items, ChangeKind::Created, &id);
        Ok(item)
    }

    /// Replaces an item's editable fields, preserving `created_at`.
    pub async fn update(&self, id: &str, new: NewItem) -> DbResult<Item> {
        let now = Utc::now();

        debug!(id = %id, name = %new.name, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = ?2,
                unit = ?3,
                sale_price = ?4,
                purchase_price = ?5,
                wholesale_price = ?6,
                stock_quantity = ?7,
                min_stock_quantity = ?8,
                tax_rate = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&new.name)
        .bind(new.unit)
        .bind(new.sale_price)
        .bind(new.purchase_price)
        .bind(new.wholesale_price)
        .bind(new.stock_quantity)
        .bind(new.min_stock_quantity)
        .bind(new.tax_rate)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.bus.publish(Collection::Items, ChangeKind::Updated, id);
        self.get_required(id).await
    }

    /// Gets an item by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Gets an item by ID, erroring if absent.
    pub async fn get_required(&self, id: &str) -> DbResult<Item> {
        self.get(id).await?.ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Lists all items ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Finds an item by case-folded trimmed name.
    ///
    /// This is the matching key for unlinked sale lines. If several items
    /// share a folded name, the first by rowid wins.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE lower(trim(name)) = lower(trim(?1)) LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Atomically adjusts an item's stock by a relative amount.
    ///
    /// Returns `true` if the item existed. Stock is allowed to go negative;
    /// no floor is enforced.
    pub async fn adjust_stock(&self, id: &str, delta: f64) -> DbResult<bool> {
        let now = Utc::now();

        debug!(id = %id, delta, "Adjusting stock");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let affected = result.rows_affected() > 0;
        if affected {
            self.bus.publish(Collection::Items, ChangeKind::Updated, id);
        }
        Ok(affected)
    }

    /// Lists items at or below their low-stock threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE stock_quantity <= min_stock_quantity ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Deletes an item.
    ///
    /// Sale lines keep their snapshot of name/rate, so history survives.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        self.bus.publish(Collection::Items, ChangeKind::Deleted, id);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
