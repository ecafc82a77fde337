//! # till-core: Pure Business Logic for Till POS
//!
//! This crate holds all of the shop's business rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Browser UI (billing, dashboard)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/till-server (axum)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ invoice │ │dashboard│  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 till-db (SQLite, checkout transaction)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, etc.)
//! - [`money`] - Money type with integer paise arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation, checkout payload checks
//! - [`cart`] - Billing state reducer and cart totals
//! - [`invoice`] - Printable invoice, amount in words, WhatsApp share link
//! - [`dashboard`] - Sales aggregation for the dashboard
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_rupees(100);
//! let discount = Money::from_rupees(10);
//! let line = (price - discount).multiply_quantity(2);
//! assert_eq!(line.to_string(), "₹180.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod dashboard;
pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{BillingAction, BillingState, Cart, CartLine, CartTotals, CustomerInfo};
pub use dashboard::{summarize, DailySales, ProductSales, SalesSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{amount_in_words, whatsapp_link, Invoice, ShareLink, StoreInfo};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale.
///
/// Keeps a checkout transaction short, since it holds the SQLite write lock.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted unit price: ₹1,00,00,000 in paise.
///
/// A full cart at this price (100 lines × 999 units) is about 10^14 paise,
/// far inside `i64`.
pub const MAX_PRICE: Money = Money::from_paise(1_000_000_000);

/// Number of entries in the dashboard's best-selling list.
pub const BEST_SELLING_LIMIT: usize = 5;
