//! # Validation Module
//!
//! Input validation for Till POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler                                                 │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field rules (required, lengths, ranges)                           │
//! │  └── Checkout payload: recompute every amount server-side             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  ├── UNIQUE category name                                              │
//! │  └── Guarded stock decrement inside the checkout transaction           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_product_name, validate_quantity};
//!
//! validate_product_name("Lakme Kajal").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{
    CategoryInput, CreateSaleRequest, ProductInput, SaleTotals, SupplierInput,
};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_BRAND_LEN: usize = 100;
const MAX_TEXT_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

fn validate_text(field: &str, value: &str, max: usize, required: bool) -> ValidationResult<()> {
    let value = value.trim();

    if required && value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ```rust
/// use till_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Cotton Kurti").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, MAX_NAME_LEN, true)
}

/// Validates a search query, returning it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity_sold".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity_sold".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an on-hand stock quantity. Zero is allowed.
pub fn validate_stock(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items), anything above
/// [`MAX_PRICE`] is not.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE.paise(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates the mutable fields of a product.
///
/// Category and supplier existence is checked by the database layer.
pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_text("brand", &input.brand, MAX_BRAND_LEN, false)?;
    validate_price("cost_price", input.cost_price)?;
    validate_price("sell_price", input.sell_price)?;
    validate_stock(input.quantity)?;
    Ok(())
}

pub fn validate_category_input(input: &CategoryInput) -> ValidationResult<()> {
    validate_text("name", &input.name, MAX_NAME_LEN, true)
}

pub fn validate_supplier_input(input: &SupplierInput) -> ValidationResult<()> {
    validate_text("name", &input.name, MAX_NAME_LEN, true)?;
    validate_text("contact", &input.contact, MAX_NAME_LEN, false)?;
    validate_text("address", &input.address, MAX_TEXT_LEN, false)?;
    Ok(())
}

// =============================================================================
// Checkout Validation
// =============================================================================

/// Validates a checkout payload and computes its totals.
///
/// ## What Is Checked
/// ```text
/// items non-empty, at most MAX_CART_ITEMS lines
///   └── per line:
///       ├── product_id present
///       ├── 1 ≤ quantity_sold ≤ MAX_ITEM_QUANTITY
///       ├── sell_price ≥ 0
///       ├── 0 ≤ unit_discount ≤ sell_price
///       └── client total_price (if sent) == (price − discount) × qty
/// client total_amount (if sent) == max(0, subtotal − discount)
/// ```
///
/// Stock is NOT checked here; that happens inside the checkout transaction.
///
/// ```rust
/// use till_core::money::Money;
/// use till_core::types::{CreateSaleRequest, SaleLineRequest};
/// use till_core::validation::validate_sale_request;
///
/// let req = CreateSaleRequest {
///     items: vec![SaleLineRequest {
///         product_id: "p-1".into(),
///         quantity_sold: 2,
///         sell_price: Money::from_rupees(100),
///         total_price: None,
///         unit_discount: Some(Money::from_rupees(10)),
///     }],
///     total_amount: None,
///     customer_name: None,
///     customer_phone: None,
///     customer_address: None,
/// };
/// let totals = validate_sale_request(&req).unwrap();
/// assert_eq!(totals.total_amount, Money::from_rupees(180));
/// ```
pub fn validate_sale_request(req: &CreateSaleRequest) -> Result<SaleTotals, CoreError> {
    if req.items.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    if req.items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    let mut subtotal = Money::zero();
    let mut discount = Money::zero();

    for line in &req.items {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::required("product_id").into());
        }
        if line.quantity_sold > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity_sold,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(line.quantity_sold)?;
        validate_price("sell_price", line.sell_price)?;

        let unit_discount = line.unit_discount();
        if unit_discount.is_negative() || unit_discount > line.sell_price {
            return Err(ValidationError::OutOfRange {
                field: "unit_discount".to_string(),
                min: 0,
                max: line.sell_price.paise(),
            }
            .into());
        }

        let gross = line
            .sell_price
            .checked_mul_quantity(line.quantity_sold)
            .ok_or_else(|| overflow("total_price"))?;
        let line_discount = unit_discount
            .checked_mul_quantity(line.quantity_sold)
            .ok_or_else(|| overflow("total_price"))?;
        let expected = gross - line_discount;
        if let Some(actual) = line.total_price {
            if actual != expected {
                return Err(CoreError::TotalMismatch {
                    field: "total_price".to_string(),
                    expected,
                    actual,
                });
            }
        }

        subtotal = subtotal
            .checked_add(gross)
            .ok_or_else(|| overflow("total_amount"))?;
        discount = discount
            .checked_add(line_discount)
            .ok_or_else(|| overflow("total_amount"))?;
    }

    let total_amount = (subtotal - discount).non_negative();
    if let Some(actual) = req.total_amount {
        if actual != total_amount {
            return Err(CoreError::TotalMismatch {
                field: "total_amount".to_string(),
                expected: total_amount,
                actual,
            });
        }
    }

    Ok(SaleTotals {
        subtotal,
        discount,
        total_amount,
    })
}

fn overflow(field: &str) -> CoreError {
    CoreError::AmountOverflow {
        field: field.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleLineRequest;

    fn line(qty: i64, price: i64, discount: Option<i64>) -> SaleLineRequest {
        SaleLineRequest {
            product_id: "p-1".to_string(),
            quantity_sold: qty,
            sell_price: Money::from_rupees(price),
            total_price: None,
            unit_discount: discount.map(Money::from_rupees),
        }
    }

    fn request(items: Vec<SaleLineRequest>) -> CreateSaleRequest {
        CreateSaleRequest {
            items,
            total_amount: None,
            customer_name: Some("Asha".to_string()),
            customer_phone: Some("9876543210".to_string()),
            customer_address: None,
        }
    }

    fn product_input() -> ProductInput {
        ProductInput {
            name: "Cotton Kurti".to_string(),
            brand: "Biba".to_string(),
            cost_price: Money::from_rupees(400),
            sell_price: Money::from_rupees(650),
            quantity: 10,
            category_id: None,
            supplier_id: None,
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Lakme Kajal").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_product_input() {
        assert!(validate_product_input(&product_input()).is_ok());

        let mut negative_stock = product_input();
        negative_stock.quantity = -1;
        assert!(validate_product_input(&negative_stock).is_err());

        let mut negative_price = product_input();
        negative_price.cost_price = Money::from_paise(-1);
        assert!(validate_product_input(&negative_price).is_err());

        let mut huge_price = product_input();
        huge_price.cost_price = Money::from_paise(i64::MAX);
        huge_price.sell_price = Money::from_paise(i64::MAX);
        assert!(matches!(
            validate_product_input(&huge_price),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "cost_price"
        ));

        let mut at_cap = product_input();
        at_cap.sell_price = MAX_PRICE;
        assert!(validate_product_input(&at_cap).is_ok());

        let mut long_brand = product_input();
        long_brand.brand = "B".repeat(101);
        assert!(validate_product_input(&long_brand).is_err());
    }

    #[test]
    fn test_validate_supplier_input() {
        let ok = SupplierInput {
            name: "Surat Textiles".to_string(),
            contact: "9800000000".to_string(),
            address: String::new(),
        };
        assert!(validate_supplier_input(&ok).is_ok());

        let blank = SupplierInput {
            name: " ".to_string(),
            ..ok
        };
        assert!(validate_supplier_input(&blank).is_err());
    }

    #[test]
    fn test_sale_totals_with_discount() {
        let totals = validate_sale_request(&request(vec![line(2, 100, Some(10))])).unwrap();
        assert_eq!(totals.subtotal, Money::from_rupees(200));
        assert_eq!(totals.discount, Money::from_rupees(20));
        assert_eq!(totals.total_amount, Money::from_rupees(180));
    }

    #[test]
    fn test_sale_totals_sum_lines() {
        let totals =
            validate_sale_request(&request(vec![line(1, 50, None), line(3, 20, Some(5))])).unwrap();
        assert_eq!(totals.subtotal, Money::from_rupees(110));
        assert_eq!(totals.discount, Money::from_rupees(15));
        assert_eq!(totals.total_amount, Money::from_rupees(95));
    }

    #[test]
    fn test_empty_sale_rejected() {
        assert!(matches!(
            validate_sale_request(&request(vec![])),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_too_many_lines_rejected() {
        let items = (0..=MAX_CART_ITEMS).map(|_| line(1, 10, None)).collect();
        assert!(matches!(
            validate_sale_request(&request(items)),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_bad_quantities_rejected() {
        assert!(matches!(
            validate_sale_request(&request(vec![line(0, 10, None)])),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            validate_sale_request(&request(vec![line(1000, 10, None)])),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_huge_sell_price_rejected_without_overflow() {
        let mut l = line(3, 0, None);
        l.sell_price = Money::from_paise(4_000_000_000_000_000_000);
        let err = validate_sale_request(&request(vec![l])).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { ref field, .. }) if field == "sell_price"
        ));
    }

    #[test]
    fn test_largest_cart_totals_fit() {
        let items = (0..MAX_CART_ITEMS)
            .map(|_| {
                let mut l = line(MAX_ITEM_QUANTITY, 0, None);
                l.sell_price = MAX_PRICE;
                l
            })
            .collect();
        let totals = validate_sale_request(&request(items)).unwrap();
        assert_eq!(
            totals.total_amount.paise(),
            MAX_PRICE.paise() * MAX_ITEM_QUANTITY * MAX_CART_ITEMS as i64
        );
    }

    #[test]
    fn test_discount_above_price_rejected() {
        let err = validate_sale_request(&request(vec![line(1, 10, Some(11))])).unwrap_err();
        assert!(err.to_string().contains("unit_discount"));
    }

    #[test]
    fn test_client_line_total_must_match() {
        let mut l = line(2, 100, Some(10));
        l.total_price = Some(Money::from_rupees(200));
        let err = validate_sale_request(&request(vec![l])).unwrap_err();
        assert!(matches!(err, CoreError::TotalMismatch { ref field, .. } if field == "total_price"));

        let mut ok = line(2, 100, Some(10));
        ok.total_price = Some(Money::from_rupees(180));
        assert!(validate_sale_request(&request(vec![ok])).is_ok());
    }

    #[test]
    fn test_client_total_amount_must_match() {
        let mut req = request(vec![line(2, 100, Some(10))]);
        req.total_amount = Some(Money::from_rupees(200));
        assert!(matches!(
            validate_sale_request(&req),
            Err(CoreError::TotalMismatch { .. })
        ));

        req.total_amount = Some(Money::from_rupees(180));
        assert!(validate_sale_request(&req).is_ok());
    }
}
