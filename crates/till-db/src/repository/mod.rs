//! # Repository Module
//!
//! Database repository implementations for Till POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().list(Some("kajal"))                             │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self, search)                                               │
//! │  ├── get_detail(&self, id)                                             │
//! │  ├── insert(&self, input)                                              │
//! │  ├── update(&self, id, input)                                          │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and search
//! - [`CategoryRepository`](category::CategoryRepository) - Categories
//! - [`SupplierRepository`](supplier::SupplierRepository) - Suppliers
//! - [`SaleRepository`](sale::SaleRepository) - Checkout and sale history

pub mod category;
pub mod product;
pub mod sale;
pub mod supplier;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use till_core::{Category, Product, ProductDetail, Supplier};

/// Product columns plus the joined category and supplier, aliased with
/// `c_` / `s_` prefixes. Used by every query that returns a `ProductDetail`.
pub(crate) const PRODUCT_DETAIL_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.brand, p.cost_price, p.sell_price, p.quantity,
        p.category_id, p.supplier_id, p.created_at, p.updated_at,
        c.id AS c_id, c.name AS c_name, c.created_at AS c_created_at,
        s.id AS s_id, s.name AS s_name, s.contact AS s_contact,
        s.address AS s_address, s.created_at AS s_created_at
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN suppliers s ON s.id = p.supplier_id
"#;

/// Maps a row produced by [`PRODUCT_DETAIL_SELECT`].
pub(crate) fn product_detail_from_row(row: &SqliteRow) -> Result<ProductDetail, sqlx::Error> {
    let product = Product::from_row(row)?;

    let category = match row.try_get::<Option<String>, _>("c_id")? {
        Some(id) => Some(Category {
            id,
            name: row.try_get("c_name")?,
            created_at: row.try_get("c_created_at")?,
        }),
        None => None,
    };

    let supplier = match row.try_get::<Option<String>, _>("s_id")? {
        Some(id) => Some(Supplier {
            id,
            name: row.try_get("s_name")?,
            contact: row.try_get("s_contact")?,
            address: row.try_get("s_address")?,
            created_at: row.try_get("s_created_at")?,
        }),
        None => None,
    };

    Ok(ProductDetail {
        product,
        category,
        supplier,
    })
}

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Builds a `LIKE` pattern matching `query` anywhere, escaping `%`, `_` and
/// `\`. Use with `ESCAPE '\'`.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Trims an optional text field and treats a blank one (`""` from a form)
/// as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
