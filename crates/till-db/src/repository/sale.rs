//! # Sale Repository
//!
//! Checkout and sale history.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       checkout(request)                                 │
//! │                                                                         │
//! │  validate_sale_request()   pure: quantities, discounts, totals         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐  │
//! │  │  for each line:                                                  │  │
//! │  │    UPDATE products SET quantity = quantity - n                   │  │
//! │  │     WHERE id = ? AND quantity >= n  RETURNING name               │  │
//! │  │       │                                                          │  │
//! │  │       ├── no row, product missing  → ProductNotFound   ROLLBACK  │  │
//! │  │       └── no row, stock too low    → InsufficientStock ROLLBACK  │  │
//! │  │                                                                  │  │
//! │  │  next INV-YYYYMMDD-NNNN for today                                │  │
//! │  │  INSERT sales                                                    │  │
//! │  │  INSERT sale_items (with product name snapshot)                  │  │
//! │  COMMIT ────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The first statement is a write, so the transaction takes the SQLite   │
//! │  write lock up front. Concurrent checkouts queue behind it (busy       │
//! │  timeout) and then see the committed stock.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::{debug, info, warn};

use super::{generate_id, non_blank};
use crate::error::{DbError, DbResult};
use till_core::validation::validate_sale_request;
use till_core::{
    CoreError, CreateSaleRequest, Product, Sale, SaleItem, SaleItemDetail, SaleWithItems,
};

const SALE_SELECT: &str = r#"
    SELECT id, invoice_number, customer_name, customer_phone, customer_address,
           subtotal, discount, total_amount, created_at
    FROM sales
"#;

/// Sale item columns plus the live product row, `p_`-prefixed. The product
/// columns are all null when the product has been deleted.
const ITEM_DETAIL_SELECT: &str = r#"
    SELECT
        si.id, si.sale_id, si.product_id, si.product_name, si.quantity_sold,
        si.sell_price, si.unit_discount, si.total_price, si.created_at,
        p.id AS p_id, p.name AS p_name, p.brand AS p_brand,
        p.cost_price AS p_cost_price, p.sell_price AS p_sell_price,
        p.quantity AS p_quantity, p.category_id AS p_category_id,
        p.supplier_id AS p_supplier_id, p.created_at AS p_created_at,
        p.updated_at AS p_updated_at
    FROM sale_items si
    LEFT JOIN products p ON p.id = si.product_id
"#;

/// Length of `INV-YYYYMMDD-`.
const INVOICE_PREFIX_LEN: usize = 13;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Completes a sale: decrements stock for every line and records the
    /// sale, all in one transaction.
    ///
    /// ## Errors
    /// - `DbError::Core(CoreError::EmptyCart | Validation | TotalMismatch ..)`
    ///   when the payload is invalid (nothing touched)
    /// - `DbError::Core(CoreError::ProductNotFound)` for an unknown product
    /// - `DbError::Core(CoreError::InsufficientStock)` naming the first line
    ///   that cannot be fulfilled
    ///
    /// On any error nothing is written.
    pub async fn checkout(&self, request: &CreateSaleRequest) -> DbResult<SaleWithItems> {
        let totals = validate_sale_request(request)?;
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut names = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let decremented: Option<String> = sqlx::query_scalar(
                r#"
                UPDATE products
                SET quantity = quantity - ?1, updated_at = ?3
                WHERE id = ?2 AND quantity >= ?1
                RETURNING name
                "#,
            )
            .bind(line.quantity_sold)
            .bind(&line.product_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

            match decremented {
                Some(name) => names.push(name),
                None => {
                    let current: Option<(String, i64)> =
                        sqlx::query_as("SELECT name, quantity FROM products WHERE id = ?1")
                            .bind(&line.product_id)
                            .fetch_optional(&mut *tx)
                            .await?;
                    tx.rollback()
                        .await
                        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                    let err = match current {
                        None => CoreError::ProductNotFound(line.product_id.clone()),
                        Some((product, available)) => CoreError::InsufficientStock {
                            product,
                            available,
                            requested: line.quantity_sold,
                        },
                    };
                    warn!(product_id = %line.product_id, error = %err, "Checkout rejected");
                    return Err(err.into());
                }
            }
        }

        let day_prefix = invoice_prefix(now);
        let last_seq: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(CAST(substr(invoice_number, ?2) AS INTEGER))
            FROM sales
            WHERE invoice_number LIKE ?1
            "#,
        )
        .bind(format!("{day_prefix}%"))
        .bind((INVOICE_PREFIX_LEN + 1) as i64)
        .fetch_one(&mut *tx)
        .await?;
        let invoice_number = format!("{day_prefix}{:04}", last_seq.unwrap_or(0) + 1);

        let sale = Sale {
            id: generate_id(),
            invoice_number,
            customer_name: non_blank(&request.customer_name),
            customer_phone: non_blank(&request.customer_phone),
            customer_address: non_blank(&request.customer_address),
            subtotal: totals.subtotal,
            discount: totals.discount,
            total_amount: totals.total_amount,
            created_at: now,
        };

        debug!(id = %sale.id, invoice_number = %sale.invoice_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, customer_name, customer_phone, customer_address,
                subtotal, discount, total_amount, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.invoice_number)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(&sale.customer_address)
        .bind(sale.subtotal)
        .bind(sale.discount)
        .bind(sale.total_amount)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for (line, product_name) in request.items.iter().zip(names) {
            let item = SaleItem {
                id: generate_id(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                product_name,
                quantity_sold: line.quantity_sold,
                sell_price: line.sell_price,
                unit_discount: line.unit_discount(),
                total_price: line.line_amount(),
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name, quantity_sold,
                    sell_price, unit_discount, total_price, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity_sold)
            .bind(item.sell_price)
            .bind(item.unit_discount)
            .bind(item.total_price)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %sale.id,
            invoice_number = %sale.invoice_number,
            lines = items.len(),
            total = %sale.total_amount,
            "Sale completed"
        );

        self.get_with_items(&sale.id).await
    }

    /// Gets one sale with its items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<SaleWithItems> {
        let sql = format!("{SALE_SELECT} WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let sql = format!("{ITEM_DETAIL_SELECT} WHERE si.sale_id = ?1 ORDER BY si.rowid");
        let items = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(item_detail_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SaleWithItems { sale, items })
    }

    /// Lists every sale, newest first, with items nested.
    pub async fn list_with_items(&self) -> DbResult<Vec<SaleWithItems>> {
        let sql = format!("{SALE_SELECT} ORDER BY created_at DESC, rowid DESC");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("{ITEM_DETAIL_SELECT} ORDER BY si.rowid");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut by_sale: HashMap<String, Vec<SaleItemDetail>> = HashMap::new();
        for row in &rows {
            let detail = item_detail_from_row(row)?;
            by_sale
                .entry(detail.item.sale_id.clone())
                .or_default()
                .push(detail);
        }

        debug!(count = sales.len(), "Listed sales");

        Ok(sales
            .into_iter()
            .map(|sale| {
                let items = by_sale.remove(&sale.id).unwrap_or_default();
                SaleWithItems { sale, items }
            })
            .collect())
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// `INV-YYYYMMDD-` for the UTC day of `at`.
fn invoice_prefix(at: DateTime<Utc>) -> String {
    format!("INV-{}-", at.format("%Y%m%d"))
}

fn item_detail_from_row(row: &SqliteRow) -> Result<SaleItemDetail, sqlx::Error> {
    let item = SaleItem::from_row(row)?;

    let product = match row.try_get::<Option<String>, _>("p_id")? {
        Some(id) => Some(Product {
            id,
            name: row.try_get("p_name")?,
            brand: row.try_get("p_brand")?,
            cost_price: row.try_get("p_cost_price")?,
            sell_price: row.try_get("p_sell_price")?,
            quantity: row.try_get("p_quantity")?,
            category_id: row.try_get("p_category_id")?,
            supplier_id: row.try_get("p_supplier_id")?,
            created_at: row.try_get("p_created_at")?,
            updated_at: row.try_get("p_updated_at")?,
        }),
        None => None,
    };

    Ok(SaleItemDetail { item, product })
}

// =============================================================================
// Unit Tests
// =============================================================================
