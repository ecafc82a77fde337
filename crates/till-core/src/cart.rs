//! # Billing State
//!
//! The billing screen's state and the single reducer that updates it.
//!
//! ## Reducer Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Billing State Operations                             │
//! │                                                                         │
//! │  UI Event                 BillingAction            State Change         │
//! │  ────────                 ─────────────            ────────────         │
//! │                                                                         │
//! │  Products loaded ───────► SetProducts ───────────► products = list,    │
//! │                                                    lines re-clamped    │
//! │  Click product ─────────► AddProduct(id) ────────► qty + 1 (≤ stock)   │
//! │  Edit quantity ─────────► SetQuantity(id, n) ────► qty = n (≤ stock)   │
//! │  Edit discount ─────────► SetUnitDiscount(id, d) ► 0 ≤ d ≤ price       │
//! │  Click remove ──────────► RemoveProduct(id) ─────► line removed        │
//! │  Type customer ─────────► SetCustomer ───────────► customer = info     │
//! │  Type search ───────────► SetSearch ─────────────► search = text       │
//! │  Sale completed ────────► Clear ─────────────────► empty cart          │
//! │                                                                         │
//! │  Every action goes through BillingState::apply(self, action) -> Self   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never stored. [`Cart::totals`] recomputes them from the lines
//! on every read, so they cannot drift.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{CreateSaleRequest, Product, SaleLineRequest};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// `product` is the snapshot taken from the last product fetch. Its
/// `quantity` is the stock the client believes is on hand; the server
/// re-checks it at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    pub unit_discount: Money,
}

impl CartLine {
    /// sell_price × quantity, before discount.
    pub fn gross(&self) -> Money {
        self.product.sell_price.multiply_quantity(self.quantity)
    }

    /// unit_discount × quantity.
    pub fn discount(&self) -> Money {
        self.unit_discount.multiply_quantity(self.quantity)
    }

    /// (sell_price − unit_discount) × quantity.
    pub fn line_total(&self) -> Money {
        self.gross() - self.discount()
    }

    /// Highest quantity the server will accept for this line.
    fn max_quantity(&self) -> i64 {
        self.product.quantity.min(MAX_ITEM_QUANTITY)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Computed cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    /// max(0, subtotal − discount).
    pub total: Money,
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by product id (adding again increments the quantity)
/// - Insertion order is preserved
/// - 1 ≤ quantity ≤ min(stock snapshot, MAX_ITEM_QUANTITY)
/// - 0 ≤ unit_discount ≤ sell_price
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    fn get_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product.id == product_id)
    }

    /// Adds one unit of `product`, clamped to its stock.
    ///
    /// Out-of-stock products are never added. Adding a product that is
    /// already at its stock limit leaves the cart unchanged.
    fn add(&mut self, product: &Product) {
        if let Some(line) = self.get_mut(&product.id) {
            line.quantity = (line.quantity + 1).min(line.max_quantity());
            return;
        }
        if product.quantity < 1 {
            return;
        }
        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
            unit_discount: Money::zero(),
        });
    }

    fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    fn set_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity < 1 {
            return;
        }
        if let Some(line) = self.get_mut(product_id) {
            line.quantity = quantity.min(line.max_quantity());
        }
    }

    /// Swaps every line's snapshot for the fresh row from `products`.
    ///
    /// Lines whose product is gone or out of stock are dropped; the rest
    /// are re-clamped to the new stock and price.
    fn refresh(&mut self, products: &[Product]) {
        self.lines.retain_mut(|line| {
            let Some(fresh) = products.iter().find(|p| p.id == line.product.id) else {
                return false;
            };
            if fresh.quantity < 1 {
                return false;
            }
            line.product = fresh.clone();
            line.quantity = line.quantity.min(line.max_quantity());
            line.unit_discount = line.unit_discount.min(line.product.sell_price);
            true
        });
    }

    fn set_unit_discount(&mut self, product_id: &str, discount: Money) {
        if let Some(line) = self.get_mut(product_id) {
            line.unit_discount = discount.non_negative().min(line.product.sell_price);
        }
    }

    /// Recomputes the totals from the current lines.
    pub fn totals(&self) -> CartTotals {
        let subtotal: Money = self.lines.iter().map(CartLine::gross).sum();
        let discount: Money = self.lines.iter().map(CartLine::discount).sum();
        CartTotals {
            subtotal,
            discount,
            total: (subtotal - discount).non_negative(),
        }
    }
}

// =============================================================================
// Billing State
// =============================================================================

/// Customer details typed at the counter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Everything that can happen on the billing screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload")]
#[ts(export)]
pub enum BillingAction {
    SetProducts(Vec<Product>),
    AddProduct(String),
    RemoveProduct(String),
    SetQuantity { product_id: String, quantity: i64 },
    SetUnitDiscount { product_id: String, discount: Money },
    SetCustomer(CustomerInfo),
    SetSearch(String),
    Clear,
}

/// State of the billing screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillingState {
    pub products: Vec<Product>,
    pub cart: Cart,
    pub customer: CustomerInfo,
    pub search: String,
}

impl BillingState {
    pub fn new() -> Self {
        BillingState::default()
    }

    /// Applies one action and returns the next state.
    ///
    /// Actions that reference an unknown product are no-ops.
    pub fn apply(mut self, action: BillingAction) -> Self {
        match action {
            BillingAction::SetProducts(products) => {
                self.cart.refresh(&products);
                self.products = products;
            }
            BillingAction::AddProduct(id) => {
                if let Some(product) = self.products.iter().find(|p| p.id == id) {
                    self.cart.add(product);
                }
            }
            BillingAction::RemoveProduct(id) => self.cart.remove(&id),
            BillingAction::SetQuantity {
                product_id,
                quantity,
            } => self.cart.set_quantity(&product_id, quantity),
            BillingAction::SetUnitDiscount {
                product_id,
                discount,
            } => self.cart.set_unit_discount(&product_id, discount),
            BillingAction::SetCustomer(customer) => self.customer = customer,
            BillingAction::SetSearch(search) => self.search = search,
            BillingAction::Clear => {
                self.cart = Cart::new();
                self.customer = CustomerInfo::default();
                self.search.clear();
            }
        }
        self
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    /// Products whose name contains the search text, case-insensitive.
    pub fn visible_products(&self) -> Vec<&Product> {
        let needle = self.search.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Builds the checkout payload for the current cart.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] when nothing is in the cart
    /// - [`CoreError::Validation`] when the customer name or phone is blank
    pub fn checkout_request(&self) -> Result<CreateSaleRequest, CoreError> {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let name = self.customer.name.trim();
        if name.is_empty() {
            return Err(ValidationError::required("customer_name").into());
        }
        let phone = self.customer.phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::required("customer_phone").into());
        }
        let address = self.customer.address.trim();

        let items = self
            .cart
            .lines()
            .iter()
            .map(|line| SaleLineRequest {
                product_id: line.product.id.clone(),
                quantity_sold: line.quantity,
                sell_price: line.product.sell_price,
                total_price: Some(line.line_total()),
                unit_discount: Some(line.unit_discount),
            })
            .collect();

        Ok(CreateSaleRequest {
            items,
            total_amount: Some(self.totals().total),
            customer_name: Some(name.to_string()),
            customer_phone: Some(phone.to_string()),
            customer_address: (!address.is_empty()).then(|| address.to_string()),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
