//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │    Product      │   │    Supplier     │       │
//! │  │  id, name       │◄──│  category_id?   │──►│  id, name       │       │
//! │  └─────────────────┘   │  supplier_id?   │   │  contact        │       │
//! │                        │  cost/sell      │   │  address        │       │
//! │                        │  quantity ≥ 0   │   └─────────────────┘       │
//! │                        └────────▲────────┘                              │
//! │                                 │ product_id (no FK: may dangle)        │
//! │  ┌─────────────────┐   ┌────────┴────────┐                              │
//! │  │      Sale       │◄──│    SaleItem     │                              │
//! │  │  invoice_number │   │  qty, price,    │                              │
//! │  │  customer       │   │  unit_discount, │                              │
//! │  │  totals         │   │  total_price    │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All money fields are [`Money`] (integer paise). All IDs are UUID v4 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A product category ("Cosmetics", "Kurtis", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A supplier products are bought from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub address: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown at billing and on the invoice.
    pub name: String,

    /// Brand label, may be empty.
    pub brand: String,

    /// Purchase price per unit (for profit calculations).
    pub cost_price: Money,

    /// Selling price per unit.
    pub sell_price: Money,

    /// Quantity on hand. Never negative.
    pub quantity: i64,

    pub category_id: Option<String>,

    pub supplier_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks if `quantity` units can be sold from the on-hand stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.quantity >= quantity
    }
}

/// A product joined with its category and supplier.
///
/// Either side is `None` when the reference is null or points at a row that
/// no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub supplier: Option<Supplier>,
}

/// Mutable product fields, as accepted by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub cost_price: Money,
    pub sell_price: Money,
    pub quantity: i64,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

/// Fields accepted when creating a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
}

/// Fields accepted when creating or updating a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed sale. Created once per checkout, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Human-readable number printed on the invoice: `INV-YYYYMMDD-NNNN`.
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    /// Σ sell_price × quantity_sold.
    pub subtotal: Money,
    /// Σ unit_discount × quantity_sold.
    pub discount: Money,
    /// max(0, subtotal − discount); equals Σ item total_price.
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item in a sale.
///
/// `product_name` is a snapshot taken at checkout, so the line stays readable
/// after the product is renamed or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity_sold: i64,
    pub sell_price: Money,
    pub unit_discount: Money,
    /// (sell_price − unit_discount) × quantity_sold. Unchecked; the line
    /// must have passed `validate_sale_request`.
    pub total_price: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale item with the current product row, if it still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleItemDetail {
    #[serde(flatten)]
    pub item: SaleItem,
    pub product: Option<Product>,
}

impl SaleItemDetail {
    /// Name used for display and grouping: the live product name when the
    /// product still exists, the checkout snapshot otherwise.
    pub fn display_name(&self) -> &str {
        self.product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or(self.item.product_name.as_str())
    }
}

/// A sale with its nested line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItemDetail>,
}

impl SaleWithItems {
    /// Sum of the persisted line amounts.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(|i| i.item.total_price).sum()
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// One requested line of a checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity_sold: i64,
    pub sell_price: Money,
    /// Client-computed line amount. Checked against the server computation
    /// when present.
    #[serde(default)]
    pub total_price: Option<Money>,
    #[serde(default)]
    pub unit_discount: Option<Money>,
}

impl SaleLineRequest {
    /// Discount per unit, zero when absent.
    pub fn unit_discount(&self) -> Money {
        self.unit_discount.unwrap_or_default()
    }

    /// (sell_price − unit_discount) × quantity_sold. Unchecked; the line
    /// must have passed `validate_sale_request`.
    pub fn line_amount(&self) -> Money {
        (self.sell_price - self.unit_discount()).multiply_quantity(self.quantity_sold)
    }
}

/// The `POST /api/sales` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    pub items: Vec<SaleLineRequest>,
    #[serde(default)]
    pub total_amount: Option<Money>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
}

/// Totals computed from a validated checkout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total_amount: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, quantity: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            name: name.to_string(),
            brand: String::new(),
            cost_price: Money::from_rupees(60),
            sell_price: Money::from_rupees(100),
            quantity,
            category_id: None,
            supplier_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn item(name: &str) -> SaleItem {
        SaleItem {
            id: "i-1".to_string(),
            sale_id: "s-1".to_string(),
            product_id: "p-1".to_string(),
            product_name: name.to_string(),
            quantity_sold: 2,
            sell_price: Money::from_rupees(100),
            unit_discount: Money::from_rupees(10),
            total_price: Money::from_rupees(180),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_sell() {
        let p = product("Kajal", 5);
        assert!(p.can_sell(5));
        assert!(!p.can_sell(6));
        assert!(!p.can_sell(0));
    }

    #[test]
    fn test_line_amount_applies_unit_discount() {
        let line = SaleLineRequest {
            product_id: "p-1".to_string(),
            quantity_sold: 2,
            sell_price: Money::from_rupees(100),
            total_price: None,
            unit_discount: Some(Money::from_rupees(10)),
        };
        assert_eq!(line.line_amount(), Money::from_rupees(180));
    }

    #[test]
    fn test_display_name_falls_back_to_snapshot() {
        let orphan = SaleItemDetail {
            item: item("Old Name"),
            product: None,
        };
        assert_eq!(orphan.display_name(), "Old Name");

        let live = SaleItemDetail {
            item: item("Old Name"),
            product: Some(product("New Name", 3)),
        };
        assert_eq!(live.display_name(), "New Name");
    }

    #[test]
    fn test_sale_item_detail_serializes_flat_with_null_product() {
        let orphan = SaleItemDetail {
            item: item("Kajal"),
            product: None,
        };
        let json = serde_json::to_value(&orphan).unwrap();
        assert_eq!(json["quantity_sold"], 2);
        assert_eq!(json["total_price"], 18_000);
        assert!(json["product"].is_null());
    }

    #[test]
    fn test_create_sale_request_accepts_minimal_payload() {
        let req: CreateSaleRequest = serde_json::from_str(
            r#"{"items":[{"product_id":"p-1","quantity_sold":1,"sell_price":5000}]}"#,
        )
        .unwrap();
        assert_eq!(req.items.len(), 1);
        assert!(req.total_amount.is_none());
        assert_eq!(req.items[0].unit_discount(), Money::zero());
    }
}
