//! # Invoice Module
//!
//! Turns a completed sale into the printable cash memo and the WhatsApp
//! share message.
//!
//! ## Invoice Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleWithItems + StoreInfo                                             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Invoice::from_sale()                                                  │
//! │        │                                                                │
//! │        ├──► render_html()    → print document (escaped)               │
//! │        │                                                                │
//! │        └──► share_message()  → "*Shop Invoice*\n\n*Customer:* ..."     │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │             whatsapp_link()  → https://wa.me/91XXXXXXXXXX?text=...    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::SaleWithItems;

const WHATSAPP_BASE: &str = "https://wa.me/";

// =============================================================================
// Amount in Words
// =============================================================================

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [&str; 7] = [
    "",
    "thousand",
    "million",
    "billion",
    "trillion",
    "quadrillion",
    "quintillion",
];

/// Words for 1..=999.
fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let mut parts = Vec::new();

    if hundreds > 0 {
        parts.push(format!("{} hundred", ONES[hundreds as usize]));
    }
    if rest > 0 {
        if rest < 20 {
            parts.push(ONES[rest as usize].to_string());
        } else if rest % 10 == 0 {
            parts.push(TENS[(rest / 10) as usize].to_string());
        } else {
            parts.push(format!(
                "{}-{}",
                TENS[(rest / 10) as usize],
                ONES[(rest % 10) as usize]
            ));
        }
    }

    parts.join(" ")
}

/// English short-scale words for a whole number.
///
/// Groups are separated by commas, tens and units by a hyphen:
/// `1234` → "one thousand, two hundred thirty-four".
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut groups = Vec::new();
    let mut rest = n;
    let mut scale = 0;
    while rest > 0 {
        let group = rest % 1000;
        if group > 0 {
            let words = below_thousand(group);
            groups.push(if SCALES[scale].is_empty() {
                words
            } else {
                format!("{} {}", words, SCALES[scale])
            });
        }
        rest /= 1000;
        scale += 1;
    }

    groups.reverse();
    groups.join(", ")
}

/// Spells out an amount for the invoice footer.
///
/// ```rust
/// use till_core::invoice::amount_in_words;
/// use till_core::money::Money;
///
/// assert_eq!(amount_in_words(Money::from_rupees(180)), "One hundred eighty rupees");
/// assert_eq!(
///     amount_in_words(Money::from_paise(1050)),
///     "Ten rupees and fifty paise"
/// );
/// ```
pub fn amount_in_words(amount: Money) -> String {
    let amount = amount.non_negative();
    let mut words = format!("{} rupees", number_to_words(amount.rupees() as u64));
    let paise = amount.paise_part();
    if paise > 0 {
        words.push_str(&format!(" and {} paise", number_to_words(paise as u64)));
    }
    capitalize(&words)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Share Link
// =============================================================================

/// Normalizes a phone number to the digits WhatsApp expects.
///
/// Non-digits are stripped. A 10-digit number that does not already start
/// with `country_code` gets it prefixed. Fewer than 10 digits is rejected.
pub fn normalize_phone(phone: &str, country_code: &str) -> CoreResult<String> {
    let mut digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 && !digits.starts_with(country_code) {
        digits.insert_str(0, country_code);
    }
    if digits.len() < 10 {
        return Err(CoreError::InvalidPhone(phone.to_string()));
    }
    Ok(digits)
}

/// Builds a `https://wa.me/<digits>?text=<message>` deep link.
///
/// ```rust
/// use till_core::invoice::whatsapp_link;
///
/// let url = whatsapp_link("98765-43210", "Hi there", "91").unwrap();
/// assert_eq!(url, "https://wa.me/919876543210?text=Hi+there");
/// ```
pub fn whatsapp_link(phone: &str, text: &str, country_code: &str) -> CoreResult<String> {
    let digits = normalize_phone(phone, country_code)?;
    link_to_digits(&digits, text)
}

/// `digits` must already be normalized.
fn link_to_digits(digits: &str, text: &str) -> CoreResult<String> {
    let mut url = Url::parse(WHATSAPP_BASE)
        .and_then(|base| base.join(digits))
        .map_err(|_| CoreError::InvalidPhone(digits.to_string()))?;
    url.query_pairs_mut().append_pair("text", text);
    Ok(url.into())
}

/// A ready-to-open share link for a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShareLink {
    pub phone: String,
    pub message: String,
    pub url: String,
}

// =============================================================================
// Invoice Model
// =============================================================================

/// Shop details printed in the invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: i64,
    pub price: Money,
    /// price × quantity, before discount.
    pub amount: Money,
}

/// The printable invoice for one sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    pub store: StoreInfo,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub lines: Vec<InvoiceLine>,
    pub discount: Money,
    pub total: Money,
    pub amount_in_words: String,
}

impl Invoice {
    /// Builds the invoice from a persisted sale.
    ///
    /// Line names use the live product name when the product still exists,
    /// the checkout snapshot otherwise.
    pub fn from_sale(sale: &SaleWithItems, store: &StoreInfo) -> Self {
        let lines = sale
            .items
            .iter()
            .map(|detail| InvoiceLine {
                name: detail.display_name().to_string(),
                quantity: detail.item.quantity_sold,
                price: detail.item.sell_price,
                amount: detail.item.sell_price.multiply_quantity(detail.item.quantity_sold),
            })
            .collect();

        let header = &sale.sale;
        Invoice {
            store: store.clone(),
            invoice_number: header.invoice_number.clone(),
            date: header.created_at,
            customer_name: header.customer_name.clone().unwrap_or_default(),
            customer_phone: header.customer_phone.clone().unwrap_or_default(),
            customer_address: header.customer_address.clone().unwrap_or_default(),
            lines,
            discount: header.discount,
            total: header.total_amount,
            amount_in_words: amount_in_words(header.total_amount),
        }
    }

    fn date_label(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }

    /// Renders the print document.
    pub fn render_html(&self) -> String {
        let mut rows = String::new();
        for line in &self.lines {
            rows.push_str(&format!(
                "          <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&line.name),
                line.quantity,
                line.price,
                line.amount
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Invoice {number}</title>
    <style>
      body {{ font-family: Arial, sans-serif; }}
      thead {{ background-color: lightgrey; }}
      @media print {{
        thead {{ background-color: lightgrey !important; -webkit-print-color-adjust: exact; print-color-adjust: exact; }}
      }}
      .top {{ display: flex; justify-content: space-between; }}
      .invoice {{ max-width: 800px; margin: 0 auto; padding: 20px; }}
      .customer-info p {{ margin: 5px 0; }}
      table {{ width: 100%; border-collapse: collapse; }}
      th, td {{ padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }}
      .total {{ text-align: right; margin-top: 20px; font-weight: bold; }}
    </style>
  </head>
  <body>
    <div class="invoice">
      <div class="top">
        <div class="header">
          <h3>{store_name}</h3>
          <p>{store_address}</p>
          <p>Mob. No: {store_phone}</p>
        </div>
        <p><strong>Sales Invoice/Cash Memo</strong><br/>(original for Recipient)<br/>
        Date: {date}<br/>
        Invoice No: {number}</p>
      </div>
      <div class="customer-info">
        <h3>Bill To:</h3>
        <p>Name: {customer_name}</p>
        <p>Phone: {customer_phone}</p>
        <p>Address: {customer_address}</p>
      </div>
      <table>
        <thead>
          <tr><th>Product</th><th>Quantity</th><th>Price</th><th>Total</th></tr>
        </thead>
        <tbody>
{rows}        </tbody>
      </table>
      <div class="total">
        Discount: {discount}<br/>
        Total: {total}
      </div>
      <h4>Amount In Words:</h4>
      <p>{words}</p>
    </div>
  </body>
</html>
"#,
            number = escape_html(&self.invoice_number),
            store_name = escape_html(&self.store.name),
            store_address = escape_html(&self.store.address),
            store_phone = escape_html(&self.store.phone),
            date = self.date_label(),
            customer_name = escape_html(&self.customer_name),
            customer_phone = escape_html(&self.customer_phone),
            customer_address = escape_html(&self.customer_address),
            rows = rows,
            discount = self.discount,
            total = self.total,
            words = escape_html(&self.amount_in_words),
        )
    }

    /// The itemized text sent over WhatsApp.
    pub fn share_message(&self) -> String {
        let items = self
            .lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                format!(
                    "{}. {} x{} @ {} = {}",
                    idx + 1,
                    line.name,
                    line.quantity,
                    line.price,
                    line.amount
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "*{} Invoice*\n\n\
             *Invoice No:* {}\n\
             *Customer:* {}\n\
             *Phone:* {}\n\
             *Address:* {}\n\
             *Date:* {}\n\n\
             *Items:*\n{}\n\n\
             *Discount:* {}\n\
             *Total Amount:* {}\n\n\
             Thank you for shopping with us!\n\
             For any queries, reply to this message.",
            self.store.name,
            self.invoice_number,
            self.customer_name,
            self.customer_phone,
            self.customer_address,
            self.date_label(),
            items,
            self.discount,
            self.total,
        )
    }

    /// Builds the share link to the customer's phone.
    pub fn share_link(&self, country_code: &str) -> CoreResult<ShareLink> {
        let phone = normalize_phone(&self.customer_phone, country_code)?;
        let message = self.share_message();
        let url = link_to_digits(&phone, &message)?;
        Ok(ShareLink {
            phone,
            message,
            url,
        })
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sale, SaleItem, SaleItemDetail};
    use chrono::TimeZone;

    fn store() -> StoreInfo {
        StoreInfo {
            name: "GenZ Collection".to_string(),
            address: "Bapu Nagar, Pipiganj".to_string(),
            phone: "9000000000".to_string(),
        }
    }

    fn sale(customer_name: &str, phone: Option<&str>) -> SaleWithItems {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 9, 10, 30, 0).unwrap();
        SaleWithItems {
            sale: Sale {
                id: "s-1".to_string(),
                invoice_number: "INV-20240309-0001".to_string(),
                customer_name: Some(customer_name.to_string()),
                customer_phone: phone.map(str::to_string),
                customer_address: None,
                subtotal: Money::from_rupees(200),
                discount: Money::from_rupees(20),
                total_amount: Money::from_rupees(180),
                created_at,
            },
            items: vec![SaleItemDetail {
                item: SaleItem {
                    id: "i-1".to_string(),
                    sale_id: "s-1".to_string(),
                    product_id: "p-1".to_string(),
                    product_name: "Lakme Kajal".to_string(),
                    quantity_sold: 2,
                    sell_price: Money::from_rupees(100),
                    unit_discount: Money::from_rupees(10),
                    total_price: Money::from_rupees(180),
                    created_at,
                },
                product: None,
            }],
        }
    }

    #[test]
    fn test_number_to_words() {
        assert_eq!(number_to_words(0), "zero");
        assert_eq!(number_to_words(13), "thirteen");
        assert_eq!(number_to_words(40), "forty");
        assert_eq!(number_to_words(180), "one hundred eighty");
        assert_eq!(number_to_words(1234), "one thousand, two hundred thirty-four");
        assert_eq!(number_to_words(100_000), "one hundred thousand");
        assert_eq!(number_to_words(2_000_005), "two million, five");
    }

    #[test]
    fn test_amount_in_words() {
        assert_eq!(amount_in_words(Money::zero()), "Zero rupees");
        assert_eq!(amount_in_words(Money::from_rupees(180)), "One hundred eighty rupees");
        assert_eq!(
            amount_in_words(Money::from_paise(99_999)),
            "Nine hundred ninety-nine rupees and ninety-nine paise"
        );
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+91 98765 43210", "91").unwrap(), "919876543210");
        assert_eq!(normalize_phone("98765-43210", "91").unwrap(), "919876543210");
        assert!(matches!(
            normalize_phone("12345", "91"),
            Err(CoreError::InvalidPhone(_))
        ));
    }

    #[test]
    fn test_whatsapp_link_encodes_text() {
        let url = whatsapp_link("9876543210", "*Total:* ₹180.00\nThanks & bye", "91").unwrap();
        assert_eq!(
            url,
            "https://wa.me/919876543210?text=*Total%3A*+%E2%82%B9180.00%0AThanks+%26+bye"
        );
    }

    #[test]
    fn test_invoice_from_sale() {
        let invoice = Invoice::from_sale(&sale("Asha", Some("9876543210")), &store());
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].amount, Money::from_rupees(200));
        assert_eq!(invoice.total, Money::from_rupees(180));
        assert_eq!(invoice.amount_in_words, "One hundred eighty rupees");
        assert_eq!(invoice.customer_address, "");
    }

    #[test]
    fn test_render_html_escapes_text() {
        let invoice = Invoice::from_sale(&sale("<script>x</script>", None), &store());
        let html = invoice.render_html();
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("INV-20240309-0001"));
        assert!(html.contains("Date: 09/03/2024"));
        assert!(html.contains("<td>Lakme Kajal</td><td>2</td><td>₹100.00</td><td>₹200.00</td>"));
        assert!(html.contains("Total: ₹180.00"));
    }

    #[test]
    fn test_share_message_lists_items() {
        let invoice = Invoice::from_sale(&sale("Asha", Some("9876543210")), &store());
        let message = invoice.share_message();
        assert!(message.starts_with("*GenZ Collection Invoice*"));
        assert!(message.contains("1. Lakme Kajal x2 @ ₹100.00 = ₹200.00"));
        assert!(message.contains("*Discount:* ₹20.00"));
        assert!(message.contains("*Total Amount:* ₹180.00"));
    }

    #[test]
    fn test_share_link_requires_valid_phone() {
        let invoice = Invoice::from_sale(&sale("Asha", Some("9876543210")), &store());
        let link = invoice.share_link("91").unwrap();
        assert_eq!(link.phone, "919876543210");
        assert!(link.url.starts_with("https://wa.me/919876543210?text="));

        let url = Url::parse(&link.url).unwrap();
        let text = url
            .query_pairs()
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned());
        assert_eq!(text.as_deref(), Some(link.message.as_str()));

        let no_phone = Invoice::from_sale(&sale("Asha", None), &store());
        assert!(no_phone.share_link("91").is_err());
    }
}
