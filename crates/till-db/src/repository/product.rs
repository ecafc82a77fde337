//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - List with case-insensitive search across product, brand, category and
//!   supplier names
//! - CRUD operations, always returning the joined [`ProductDetail`]
//!
//! Stock is only decremented by the checkout transaction in
//! [`SaleRepository`](super::sale::SaleRepository). Edits here replace the
//! quantity outright.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{generate_id, like_pattern, non_blank, product_detail_from_row, PRODUCT_DETAIL_SELECT};
use crate::error::{DbError, DbResult};
use till_core::validation::{validate_product_input, validate_search_query};
use till_core::{CoreError, Product, ProductDetail, ProductInput, ValidationError};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let all = repo.list(None).await?;
/// let kajal = repo.list(Some("kajal")).await?;
/// let one = repo.get_detail("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products with their category and supplier, ordered by name.
    ///
    /// A non-blank `search` keeps products whose name, brand, category name
    /// or supplier name contains it (case-insensitive).
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<ProductDetail>> {
        let query = validate_search_query(search.unwrap_or_default()).map_err(CoreError::from)?;

        debug!(query = %query, "Listing products");

        let rows = if query.is_empty() {
            let sql = format!("{PRODUCT_DETAIL_SELECT} ORDER BY p.name COLLATE NOCASE, p.id");
            sqlx::query(&sql).fetch_all(&self.pool).await?
        } else {
            let sql = format!(
                r#"{PRODUCT_DETAIL_SELECT}
                WHERE p.name LIKE ?1 ESCAPE '\'
                   OR p.brand LIKE ?1 ESCAPE '\'
                   OR c.name LIKE ?1 ESCAPE '\'
                   OR s.name LIKE ?1 ESCAPE '\'
                ORDER BY p.name COLLATE NOCASE, p.id"#
            );
            sqlx::query(&sql)
                .bind(like_pattern(&query))
                .fetch_all(&self.pool)
                .await?
        };

        rows.iter()
            .map(product_detail_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::from)
    }

    /// Gets a bare product row by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, brand, cost_price, sell_price, quantity,
                   category_id, supplier_id, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets one product with its category and supplier.
    pub async fn get_detail(&self, id: &str) -> DbResult<ProductDetail> {
        let sql = format!("{PRODUCT_DETAIL_SELECT} WHERE p.id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product_detail_from_row(&row)?)
    }

    /// Validates and inserts a new product.
    pub async fn insert(&self, input: &ProductInput) -> DbResult<ProductDetail> {
        validate_product_input(input).map_err(CoreError::from)?;
        let category_id = non_blank(&input.category_id);
        let supplier_id = non_blank(&input.supplier_id);
        self.ensure_references(category_id.as_deref(), supplier_id.as_deref())
            .await?;

        let id = generate_id();
        let now = Utc::now();

        debug!(id = %id, name = %input.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, brand, cost_price, sell_price, quantity,
                category_id, supplier_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(input.brand.trim())
        .bind(input.cost_price)
        .bind(input.sell_price)
        .bind(input.quantity)
        .bind(&category_id)
        .bind(&supplier_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_detail(&id).await
    }

    /// Replaces the mutable fields of a product.
    ///
    /// ## Returns
    /// The updated product with its category and supplier.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<ProductDetail> {
        validate_product_input(input).map_err(CoreError::from)?;
        let category_id = non_blank(&input.category_id);
        let supplier_id = non_blank(&input.supplier_id);
        self.ensure_references(category_id.as_deref(), supplier_id.as_deref())
            .await?;

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                brand = ?3,
                cost_price = ?4,
                sell_price = ?5,
                quantity = ?6,
                category_id = ?7,
                supplier_id = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.brand.trim())
        .bind(input.cost_price)
        .bind(input.sell_price)
        .bind(input.quantity)
        .bind(&category_id)
        .bind(&supplier_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_detail(id).await
    }

    /// Hard-deletes a product.
    ///
    /// Sale items that reference it are left as they are; reads return them
    /// with a null product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ensure_references(
        &self,
        category_id: Option<&str>,
        supplier_id: Option<&str>,
    ) -> DbResult<()> {
        if let Some(category_id) = category_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)")
                    .bind(category_id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(unknown_reference("category_id", category_id));
            }
        }

        if let Some(supplier_id) = supplier_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = ?1)")
                    .bind(supplier_id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(unknown_reference("supplier_id", supplier_id));
            }
        }

        Ok(())
    }
}

fn unknown_reference(field: &str, id: &str) -> DbError {
    CoreError::from(ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("no such record '{id}'"),
    })
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
