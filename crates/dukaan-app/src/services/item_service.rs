//! # Item Service
//!
//! Inventory CRUD with validation and role gating. Item mutations are
//! admin-only; stock adjustments driven by sales go through the sale
//! service instead and are gated at biller level there.

use tracing::info;

use crate::error::ApiResult;
use crate::session::SessionState;
use dukaan_core::validation::{validate_name, validate_price};
use dukaan_core::{Item, Role, Unit};
use dukaan_db::repository::item::NewItem;
use dukaan_db::Database;

/// Caller-supplied item fields.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub name: String,
    pub unit: Unit,
    pub sale_price: f64,
    pub purchase_price: f64,
    pub wholesale_price: f64,
    pub stock_quantity: f64,
    pub min_stock_quantity: f64,
    pub tax_rate: f64,
}

impl ItemInput {
    fn validate(&self) -> ApiResult<()> {
        validate_name(&self.name)?;
        validate_price(self.sale_price)?;
        validate_price(self.purchase_price)?;
        validate_price(self.wholesale_price)?;
        Ok(())
    }

    fn into_new_item(self) -> NewItem {
        NewItem {
            name: self.name.trim().to_string(),
            unit: self.unit,
            sale_price: self.sale_price,
            purchase_price: self.purchase_price,
            wholesale_price: self.wholesale_price,
            stock_quantity: self.stock_quantity,
            min_stock_quantity: self.min_stock_quantity,
            tax_rate: self.tax_rate,
        }
    }
}

/// Inventory operations.
#[derive(Debug, Clone)]
pub struct ItemService {
    db: Database,
    session: SessionState,
}

impl ItemService {
    pub fn new(db: Database, session: SessionState) -> Self {
        ItemService { db, session }
    }

    /// Creates an inventory item (admin only).
    pub async fn create_item(&self, input: ItemInput) -> ApiResult<Item> {
        self.session.require_at_least(Role::Admin, "create items")?;
        input.validate()?;

        let item = self.db.items().insert(input.into_new_item()).await?;
        info!(id = %item.id, name = %item.name, "Item created");
        Ok(item)
    }

    /// Updates an inventory item (admin only).
    pub async fn update_item(&self, id: &str, input: ItemInput) -> ApiResult<Item> {
        self.session.require_at_least(Role::Admin, "edit items")?;
        input.validate()?;

        let item = self.db.items().update(id, input.into_new_item()).await?;
        info!(id = %item.id, "Item updated");
        Ok(item)
    }

    /// Deletes an inventory item (admin only). Sale history keeps its
    /// line snapshots.
    pub async fn delete_item(&self, id: &str) -> ApiResult<()> {
        self.session.require_at_least(Role::Admin, "delete items")?;

        self.db.items().delete(id).await?;
        info!(id = %id, "Item deleted");
        Ok(())
    }

    /// Gets an item by id.
    pub async fn get_item(&self, id: &str) -> ApiResult<Option<Item>> {
        self.session.require()?;
        Ok(self.db.items().get(id).await?)
    }

    /// Lists all items.
    pub async fn list_items(&self) -> ApiResult<Vec<Item>> {
        self.session.require()?;
        Ok(self.db.items().list().await?)
    }

    /// Lists items at or below their low-stock threshold.
    pub async fn low_stock_items(&self) -> ApiResult<Vec<Item>> {
        self.session.require()?;
        Ok(self.db.items().low_stock().await?)
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
    use dukaan_db::DbConfig;

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

    async fn service(role: Role) -> ItemService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ItemService::new(db, session_with(role))
    }

    fn oil() -> ItemInput {
        ItemInput {
            name: "Engine Oil".to_string(),
            unit: Unit::Ltr,
            sale_price: 100.0,
            purchase_price: 80.0,
            wholesale_price: 90.0,
            stock_quantity: 10.0,
            min_stock_quantity: 2.0,
            tax_rate: 0.0,
        }
    }

    #[tokio::test]
    async fn test_admin_can_create_and_list() {
        let svc = service(Role::Admin).await;

        let item = svc.create_item(oil()).await.unwrap();
        assert_eq!(item.name, "Engine Oil");

        let items = svc.list_items().await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_biller_cannot_mutate_items() {
        let svc = service(Role::Biller).await;

        let err = svc.create_item(oil()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        // Reads are allowed
        assert!(svc.list_items().await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let svc = service(Role::Admin).await;

        let mut bad = oil();
        bad.name = "   ".to_string();
        assert_eq!(
            svc.create_item(bad).await.unwrap_err().code,
            ErrorCode::ValidationError
        );

        let mut negative = oil();
        negative.sale_price = -5.0;
        assert_eq!(
            svc.create_item(negative).await.unwrap_err().code,
            ErrorCode::ValidationError
        );
    }
}
