//! # Dashboard Aggregation
//!
//! Folds the sales history into the numbers shown on the dashboard.
//!
//! ```text
//! [SaleWithItems] ──► summarize() ──► SalesSummary
//!                                       ├── total_sales     Σ total_amount
//!                                       ├── total_cost      Σ qty × cost_price (live products only)
//!                                       ├── net_profit      total_sales − total_cost
//!                                       ├── profit_margin   net / sales, in bps and pct
//!                                       ├── best_selling    top 5 by units
//!                                       └── sales_by_date   Σ total_amount per UTC day
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::SaleWithItems;
use crate::BEST_SELLING_LIMIT;

/// Units sold for one product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
}

/// Revenue for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total: Money,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub sale_count: usize,
    pub total_sales: Money,
    pub total_cost: Money,
    pub net_profit: Money,
    /// Net profit over total sales in basis points. Zero without sales.
    pub profit_margin_bps: i64,
    /// Same ratio as a percentage with two decimals, for display.
    pub profit_margin_pct: f64,
    pub best_selling_products: Vec<ProductSales>,
    pub sales_by_date: Vec<DailySales>,
}

/// Aggregates a list of sales.
///
/// Items whose product has been deleted still count toward units sold (under
/// their name snapshot) but contribute nothing to the cost, since the cost
/// price is no longer known.
pub fn summarize(sales: &[SaleWithItems]) -> SalesSummary {
    let mut total_sales = Money::zero();
    let mut total_cost = Money::zero();
    let mut units: HashMap<&str, i64> = HashMap::new();
    let mut by_date: BTreeMap<NaiveDate, Money> = BTreeMap::new();

    for sale in sales {
        total_sales += sale.sale.total_amount;
        *by_date
            .entry(sale.sale.created_at.date_naive())
            .or_default() += sale.sale.total_amount;

        for detail in &sale.items {
            if let Some(product) = &detail.product {
                total_cost += product.cost_price.multiply_quantity(detail.item.quantity_sold);
            }
            *units.entry(detail.display_name()).or_default() += detail.item.quantity_sold;
        }
    }

    let net_profit = total_sales - total_cost;
    let profit_margin_bps = net_profit.ratio_bps(total_sales);

    let mut best_selling_products: Vec<ProductSales> = units
        .into_iter()
        .map(|(name, quantity)| ProductSales {
            name: name.to_string(),
            quantity,
        })
        .collect();
    best_selling_products.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    best_selling_products.truncate(BEST_SELLING_LIMIT);

    let sales_by_date = by_date
        .into_iter()
        .map(|(date, total)| DailySales { date, total })
        .collect();

    SalesSummary {
        sale_count: sales.len(),
        total_sales,
        total_cost,
        net_profit,
        profit_margin_bps,
        profit_margin_pct: profit_margin_bps as f64 / 100.0,
        best_selling_products,
        sales_by_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, Sale, SaleItem, SaleItemDetail};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn product(name: &str, cost_rupees: i64) -> Product {
        Product {
            id: format!("id-{name}"),
            name: name.to_string(),
            brand: String::new(),
            cost_price: Money::from_rupees(cost_rupees),
            sell_price: Money::from_rupees(cost_rupees * 2),
            quantity: 10,
            category_id: None,
            supplier_id: None,
            created_at: at(1, 0),
            updated_at: at(1, 0),
        }
    }

    fn line(name: &str, qty: i64, price_rupees: i64, product: Option<Product>) -> SaleItemDetail {
        SaleItemDetail {
            item: SaleItem {
                id: format!("item-{name}"),
                sale_id: "s".to_string(),
                product_id: format!("id-{name}"),
                product_name: name.to_string(),
                quantity_sold: qty,
                sell_price: Money::from_rupees(price_rupees),
                unit_discount: Money::zero(),
                total_price: Money::from_rupees(price_rupees * qty),
                created_at: at(1, 0),
            },
            product,
        }
    }

    fn sale(created_at: DateTime<Utc>, items: Vec<SaleItemDetail>) -> SaleWithItems {
        let total: Money = items.iter().map(|i| i.item.total_price).sum();
        SaleWithItems {
            sale: Sale {
                id: "s".to_string(),
                invoice_number: "INV-20240501-0001".to_string(),
                customer_name: None,
                customer_phone: None,
                customer_address: None,
                subtotal: total,
                discount: Money::zero(),
                total_amount: total,
                created_at,
            },
            items,
        }
    }

    #[test]
    fn test_empty_history() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_sales, Money::zero());
        assert_eq!(summary.profit_margin_bps, 0);
        assert_eq!(summary.profit_margin_pct, 0.0);
        assert!(summary.best_selling_products.is_empty());
        assert!(summary.sales_by_date.is_empty());
    }

    #[test]
    fn test_totals_and_margin() {
        let sales = vec![
            sale(at(1, 9), vec![line("Kajal", 2, 100, Some(product("Kajal", 60)))]),
            sale(at(2, 9), vec![line("Kurti", 1, 100, Some(product("Kurti", 30)))]),
        ];
        let summary = summarize(&sales);
        assert_eq!(summary.total_sales, Money::from_rupees(300));
        assert_eq!(summary.total_cost, Money::from_rupees(150));
        assert_eq!(summary.net_profit, Money::from_rupees(150));
        assert_eq!(summary.profit_margin_bps, 5000);
        assert_eq!(summary.profit_margin_pct, 50.0);
    }

    #[test]
    fn test_deleted_product_contributes_no_cost() {
        let sales = vec![sale(at(1, 9), vec![line("Gone", 3, 100, None)])];
        let summary = summarize(&sales);
        assert_eq!(summary.total_cost, Money::zero());
        assert_eq!(summary.net_profit, Money::from_rupees(300));
        assert_eq!(summary.best_selling_products[0].name, "Gone");
        assert_eq!(summary.best_selling_products[0].quantity, 3);
    }

    #[test]
    fn test_best_selling_top_five_with_name_ties() {
        let items = vec![
            line("F", 1, 10, None),
            line("E", 2, 10, None),
            line("D", 2, 10, None),
            line("C", 3, 10, None),
            line("B", 4, 10, None),
            line("A", 5, 10, None),
        ];
        let summary = summarize(&[sale(at(1, 9), items)]);
        let names: Vec<_> = summary
            .best_selling_products
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_best_selling_groups_by_name_across_sales() {
        let sales = vec![
            sale(at(1, 9), vec![line("Kajal", 2, 100, None)]),
            sale(at(1, 10), vec![line("Kajal", 3, 100, None), line("Kurti", 4, 100, None)]),
        ];
        let summary = summarize(&sales);
        assert_eq!(
            summary.best_selling_products[0],
            ProductSales {
                name: "Kajal".to_string(),
                quantity: 5
            }
        );
    }

    #[test]
    fn test_sales_by_date_ascending() {
        let sales = vec![
            sale(at(3, 9), vec![line("A", 1, 50, None)]),
            sale(at(1, 9), vec![line("B", 1, 20, None)]),
            sale(at(1, 23), vec![line("C", 1, 30, None)]),
        ];
        let summary = summarize(&sales);
        assert_eq!(summary.sales_by_date.len(), 2);
        assert_eq!(summary.sales_by_date[0].date, at(1, 0).date_naive());
        assert_eq!(summary.sales_by_date[0].total, Money::from_rupees(50));
        assert_eq!(summary.sales_by_date[1].total, Money::from_rupees(50));
    }
}
