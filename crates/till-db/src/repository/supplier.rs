//! # Supplier Repository
//!
//! Deleting a supplier keeps its products; their `supplier_id` is set to
//! null by the foreign key.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{generate_id, like_pattern};
use crate::error::{DbError, DbResult};
use till_core::validation::{validate_search_query, validate_supplier_input};
use till_core::{CoreError, Supplier, SupplierInput};

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists suppliers ordered by name, optionally filtered by a
    /// case-insensitive match on name or address.
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Supplier>> {
        let query = validate_search_query(search.unwrap_or_default()).map_err(CoreError::from)?;

        let suppliers = if query.is_empty() {
            sqlx::query_as::<_, Supplier>(
                r#"
                SELECT id, name, contact, address, created_at
                FROM suppliers
                ORDER BY name COLLATE NOCASE, id
                "#,
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Supplier>(
                r#"
                SELECT id, name, contact, address, created_at
                FROM suppliers
                WHERE name LIKE ?1 ESCAPE '\' OR address LIKE ?1 ESCAPE '\'
                ORDER BY name COLLATE NOCASE, id
                "#,
            )
            .bind(like_pattern(&query))
            .fetch_all(&self.pool)
            .await?
        };

        Ok(suppliers)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, address, created_at FROM suppliers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn insert(&self, input: &SupplierInput) -> DbResult<Supplier> {
        validate_supplier_input(input).map_err(CoreError::from)?;

        let supplier = Supplier {
            id: generate_id(),
            name: input.name.trim().to_string(),
            contact: input.contact.trim().to_string(),
            address: input.address.trim().to_string(),
            created_at: Utc::now(),
        };

        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn update(&self, id: &str, input: &SupplierInput) -> DbResult<Supplier> {
        validate_supplier_input(input).map_err(CoreError::from)?;

        debug!(id = %id, "Updating supplier");

        let result = sqlx::query(
            "UPDATE suppliers SET name = ?2, contact = ?3, address = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.contact.trim())
        .bind(input.address.trim())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    /// Counts all suppliers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
