//! # Sale Repository
//!
//! Database operations for sales and their embedded lines.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale document                                                          │
//! │                                                                         │
//! │  sales (header)               sale_lines (one row per line)            │
//! │  ─────────────────            ──────────────────────────────           │
//! │  id, invoice_number           sale_id → sales.id (CASCADE)             │
//! │  customer, totals,            position (line order)                    │
//! │  received/balance,            item_id NULL = unlinked line             │
//! │  payment, audit fields        name, qty, unit, rate, tax, amount       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invoice Numbers
//! The invoice number is allocated as `MAX(invoice_number) + 1` inside the
//! same transaction that inserts the header, so two concurrent creates
//! cannot observe the same maximum. [`SaleRepository::max_invoice_number`]
//! exists only for display previews and makes no uniqueness promise.
//!
//! ## Totals
//! Header totals and `balance_amount` are recomputed from the line list on
//! every write. Stored totals are never trusted as input.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeBus, ChangeKind, Collection};
use dukaan_core::amounts::{balance_amount, calculate_totals};
use dukaan_core::types::{invoice_date_string, invoice_time_string};
use dukaan_core::{ItemRef, PaymentType, Sale, SaleLine, TaxType, Unit};

// =============================================================================
// Input & Row Types
// =============================================================================

/// Field set for creating or replacing a sale.
///
/// Identity, invoice number, totals and timestamps are repository-assigned;
/// supplying them here would only invite drift.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub customer_name: String,
    pub phone_number: String,
    pub lines: Vec<SaleLine>,
    pub received_amount: f64,
    pub payment_type: PaymentType,
}

/// Raw header row; lines are attached separately.
#[derive(Debug, sqlx::FromRow)]
struct SaleHeaderRow {
    id: String,
    invoice_number: i64,
    customer_name: String,
    phone_number: String,
    subtotal: f64,
    total_tax: f64,
    total_amount: f64,
    total_quantity: f64,
    total_count: f64,
    received_amount: f64,
    balance_amount: f64,
    payment_type: PaymentType,
    sale_date: String,
    sale_time: String,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SaleHeaderRow {
    fn into_sale(self, lines: Vec<SaleLine>) -> Sale {
        Sale {
            id: self.id,
            invoice_number: self.invoice_number,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            lines,
            subtotal: self.subtotal,
            total_tax: self.total_tax,
            total_amount: self.total_amount,
            total_quantity: self.total_quantity,
            total_count: self.total_count,
            received_amount: self.received_amount,
            balance_amount: self.balance_amount,
            payment_type: self.payment_type,
            sale_date: self.sale_date,
            sale_time: self.sale_time,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Raw line row. A NULL `item_id` marks an unlinked (free-text) line.
#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    sale_id: String,
    item_id: Option<String>,
    name: String,
    quantity: f64,
    unit: Unit,
    rate: f64,
    tax_type: TaxType,
    count: f64,
    amount: f64,
}

impl SaleLineRow {
    fn into_line(self) -> SaleLine {
        SaleLine {
            item: match self.item_id {
                Some(item_id) => ItemRef::Linked { item_id },
                None => ItemRef::Unlinked,
            },
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            rate: self.rate,
            tax_type: self.tax_type,
            count: self.count,
            amount: self.amount,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    bus: ChangeBus,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, bus: ChangeBus) -> Self {
        SaleRepository { pool, bus }
    }

    /// Inserts a new sale, allocating the next invoice number inside the
    /// insert transaction.
    ///
    /// Totals, balance and invoice display strings are computed here from
    /// the line list and the write timestamp.
    pub async fn insert(&self, new: NewSale, created_by: &str) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let totals = calculate_totals(&new.lines);
        let balance = balance_amount(totals.total_amount, new.received_amount);

        let mut tx = self.pool.begin().await?;

        // MAX + 1 under the write transaction; concurrent creates serialize
        // on SQLite's single writer, so the number is unique
        let invoice_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(invoice_number), 0) + 1 FROM sales")
                .fetch_one(&mut *tx)
                .await?;

        debug!(id = %id, invoice_number, "Inserting sale");

        let sale = Sale {
            id: id.clone(),
            invoice_number,
            customer_name: new.customer_name,
            phone_number: new.phone_number,
            lines: new.lines,
            subtotal: totals.subtotal,
            total_tax: totals.total_tax,
            total_amount: totals.total_amount,
            total_quantity: totals.total_quantity,
            total_count: totals.total_count,
            received_amount: new.received_amount,
            balance_amount: balance,
            payment_type: new.payment_type,
            sale_date: invoice_date_string(&now),
            sale_time: invoice_time_string(&now),
            created_by: created_by.to_string(),
            updated_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, customer_name, phone_number,
                subtotal, total_tax, total_amount, total_quantity, total_count,
                received_amount, balance_amount, payment_type,
                sale_date, sale_time, created_by, updated_by,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15, ?16,
                ?17, ?18
            )
            "#,
        )
        .bind(&sale.id)
        .bind(sale.invoice_number)
        .bind(&sale.customer_name)
        .bind(&sale.phone_number)
        .bind(sale.subtotal)
        .bind(sale.total_tax)
        .bind(sale.total_amount)
        .bind(sale.total_quantity)
        .bind(sale.total_count)
        .bind(sale.received_amount)
        .bind(sale.balance_amount)
        .bind(sale.payment_type)
        .bind(&sale.sale_date)
        .bind(&sale.sale_time)
        .bind(&sale.created_by)
        .bind(&sale.updated_by)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_lines(&mut tx, &sale.id, &sale.lines).await?;

        tx.commit().await?;

        self.bus.publish(Collection::Sales, ChangeKind::Created, &id);
        Ok(sale)
    }

    /// Replaces a sale's customer fields, lines and payment, recomputing
    /// totals and balance.
    ///
    /// Invoice number, invoice display strings and the created audit pair
    /// are preserved from the original.
    pub async fn update(&self, id: &str, new: NewSale, updated_by: &str) -> DbResult<Sale> {
        let now = Utc::now();

        let totals = calculate_totals(&new.lines);
        let balance = balance_amount(totals.total_amount, new.received_amount);

        debug!(id = %id, "Updating sale");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                customer_name = ?2,
                phone_number = ?3,
                subtotal = ?4,
                total_tax = ?5,
                total_amount = ?6,
                total_quantity = ?7,
                total_count = ?8,
                received_amount = ?9,
                balance_amount = ?10,
                payment_type = ?11,
                updated_by = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&new.customer_name)
        .bind(&new.phone_number)
        .bind(totals.subtotal)
        .bind(totals.total_tax)
        .bind(totals.total_amount)
        .bind(totals.total_quantity)
        .bind(totals.total_count)
        .bind(new.received_amount)
        .bind(balance)
        .bind(new.payment_type)
        .bind(updated_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        sqlx::query("DELETE FROM sale_lines WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_lines(&mut tx, id, &new.lines).await?;

        tx.commit().await?;

        self.bus.publish(Collection::Sales, ChangeKind::Updated, id);
        self.get_required(id).await
    }

    /// Gets a sale by ID with its lines in entry order.
    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let header = sqlx::query_as::<_, SaleHeaderRow>("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, SaleLineRow>(
            "SELECT * FROM sale_lines WHERE sale_id = ?1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(
            header.into_sale(lines.into_iter().map(SaleLineRow::into_line).collect()),
        ))
    }

    /// Gets a sale by ID, erroring if absent.
    pub async fn get_required(&self, id: &str) -> DbResult<Sale> {
        self.get(id).await?.ok_or_else(|| DbError::not_found("Sale", id))
    }

    /// Lists all sales, newest invoice first, with lines attached.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let headers =
            sqlx::query_as::<_, SaleHeaderRow>("SELECT * FROM sales ORDER BY invoice_number DESC")
                .fetch_all(&self.pool)
                .await?;

        let line_rows = sqlx::query_as::<_, SaleLineRow>(
            "SELECT * FROM sale_lines ORDER BY sale_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(attach_lines(headers, line_rows))
    }

    /// Lists sales belonging to a customer under the loose identity rule:
    /// case-folded name match OR exact non-empty phone match.
    pub async fn find_by_customer(&self, name: &str, phone: &str) -> DbResult<Vec<Sale>> {
        let headers = sqlx::query_as::<_, SaleHeaderRow>(
            r#"
            SELECT * FROM sales
            WHERE (?1 <> '' AND lower(trim(customer_name)) = lower(trim(?1)))
               OR (?2 <> '' AND phone_number = ?2)
            ORDER BY invoice_number DESC
            "#,
        )
        .bind(name)
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        let line_rows = sqlx::query_as::<_, SaleLineRow>(
            "SELECT * FROM sale_lines ORDER BY sale_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(attach_lines(headers, line_rows))
    }

    /// Highest invoice number issued so far, if any.
    ///
    /// For "next invoice" display previews only. Allocation happens inside
    /// [`SaleRepository::insert`].
    pub async fn max_invoice_number(&self) -> DbResult<Option<i64>> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(invoice_number) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(max)
    }

    /// Deletes a sale; lines cascade via the foreign key.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        self.bus.publish(Collection::Sales, ChangeKind::Deleted, id);
        Ok(())
    }
}

/// Inserts the line rows for a sale inside an open transaction.
async fn insert_lines(
    tx: &mut Transaction<'_, Sqlite>,
    sale_id: &str,
    lines: &[SaleLine],
) -> DbResult<()> {
    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                id, sale_id, position, item_id,
                name, quantity, unit, rate, tax_type, count, amount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(sale_id)
        .bind(position as i64)
        .bind(line.item.item_id())
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.unit)
        .bind(line.rate)
        .bind(line.tax_type)
        .bind(line.count)
        .bind(line.amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Groups line rows under their headers, keeping header order.
fn attach_lines(headers: Vec<SaleHeaderRow>, line_rows: Vec<SaleLineRow>) -> Vec<Sale> {
    let mut by_sale: HashMap<String, Vec<SaleLine>> = HashMap::new();
    for row in line_rows {
        let sale_id = row.sale_id.clone();
        by_sale.entry(sale_id).or_default().push(row.into_line());
    }

    headers
        .into_iter()
        .map(|header| {
            let lines = by_sale.remove(&header.id).unwrap_or_default();
            header.into_sale(lines)
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use dukaan_core::amounts::priced_line;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn line(name: &str, quantity: f64, rate: f64, tax: TaxType) -> SaleLine {
        priced_line(ItemRef::Unlinked, name, quantity, Unit::Pcs, rate, tax, 1.0)
    }

    fn new_sale(customer: &str, phone: &str, lines: Vec<SaleLine>, received: f64) -> NewSale {
        NewSale {
            customer_name: customer.to_string(),
            phone_number: phone.to_string(),
            lines,
            received_amount: received,
            payment_type: PaymentType::Credit,
        }
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential() {
        let db = test_db().await;
        let repo = db.sales();

        let first = repo
            .insert(new_sale("Ali", "", vec![line("Oil", 1.0, 100.0, TaxType::WithoutTax)], 0.0), "u1")
            .await
            .unwrap();
        let second = repo
            .insert(new_sale("Bilal", "", vec![line("Oil", 2.0, 100.0, TaxType::WithoutTax)], 0.0), "u1")
            .await
            .unwrap();

        assert_eq!(first.invoice_number, 1);
        assert_eq!(second.invoice_number, 2);
        assert_eq!(repo.max_invoice_number().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_totals_and_balance_are_recomputed_on_write() {
        let db = test_db().await;
        let repo = db.sales();

        let sale = repo
            .insert(
                new_sale(
                    "Ali",
                    "0300",
                    vec![
                        line("Oil", 2.0, 100.0, TaxType::WithoutTax),
                        line("Filter", 1.0, 50.0, TaxType::WithTax),
                    ],
                    100.0,
                ),
                "u1",
            )
            .await
            .unwrap();

        assert_eq!(sale.subtotal, 250.0);
        assert_eq!(sale.total_tax, 9.0); // 50 * 0.18
        assert_eq!(sale.total_amount, 259.0);
        assert_eq!(sale.balance_amount, 159.0);
    }

    #[tokio::test]
    async fn test_get_round_trips_lines_in_order() {
        let db = test_db().await;
        let repo = db.sales();

        let mut linked = line("Oil", 2.0, 100.0, TaxType::WithoutTax);
        linked.item = ItemRef::Linked {
            item_id: "item-1".to_string(),
        };
        let lines = vec![linked, line("Grease", 1.0, 30.0, TaxType::WithoutTax)];

        let created = repo
            .insert(new_sale("Ali", "", lines.clone(), 0.0), "u1")
            .await
            .unwrap();
        let fetched = repo.get_required(&created.id).await.unwrap();

        assert_eq!(fetched.lines, lines);
        assert_eq!(
            fetched.lines[0].item,
            ItemRef::Linked {
                item_id: "item-1".to_string()
            }
        );
        assert_eq!(fetched.lines[1].item, ItemRef::Unlinked);
    }

    #[tokio::test]
    async fn test_update_replaces_lines_and_preserves_identity() {
        let db = test_db().await;
        let repo = db.sales();

        let created = repo
            .insert(new_sale("Ali", "", vec![line("Oil", 2.0, 100.0, TaxType::WithoutTax)], 0.0), "u1")
            .await
            .unwrap();

        let edited = repo
            .update(
                &created.id,
                new_sale("Ali", "0300", vec![line("Coolant", 3.0, 40.0, TaxType::WithoutTax)], 50.0),
                "u2",
            )
            .await
            .unwrap();

        assert_eq!(edited.invoice_number, created.invoice_number);
        assert_eq!(edited.created_at, created.created_at);
        assert_eq!(edited.created_by, "u1");
        assert_eq!(edited.updated_by, "u2");
        assert_eq!(edited.lines.len(), 1);
        assert_eq!(edited.lines[0].name, "Coolant");
        assert_eq!(edited.total_amount, 120.0);
        assert_eq!(edited.balance_amount, 70.0);
    }

    #[tokio::test]
    async fn test_delete_cascades_lines() {
        let db = test_db().await;
        let repo = db.sales();

        let created = repo
            .insert(new_sale("Ali", "", vec![line("Oil", 2.0, 100.0, TaxType::WithoutTax)], 0.0), "u1")
            .await
            .unwrap();

        repo.delete(&created.id).await.unwrap();

        assert!(repo.get(&created.id).await.unwrap().is_none());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_find_by_customer_loose_join() {
        let db = test_db().await;
        let repo = db.sales();

        repo.insert(new_sale("  ALI  ", "0311", vec![line("Oil", 1.0, 10.0, TaxType::WithoutTax)], 0.0), "u1")
            .await
            .unwrap();
        repo.insert(new_sale("Someone", "0300", vec![line("Oil", 1.0, 10.0, TaxType::WithoutTax)], 0.0), "u1")
            .await
            .unwrap();
        repo.insert(new_sale("Other", "", vec![line("Oil", 1.0, 10.0, TaxType::WithoutTax)], 0.0), "u1")
            .await
            .unwrap();

        // Name match OR phone match
        let matched = repo.find_by_customer("ali", "0300").await.unwrap();
        assert_eq!(matched.len(), 2);

        // Empty phone must never join on other empty phones
        let by_name_only = repo.find_by_customer("other", "").await.unwrap();
        assert_eq!(by_name_only.len(), 1);
    }
}
