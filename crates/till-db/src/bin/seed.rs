//! # Seed Data Generator
//!
//! Populates the database with categories, suppliers and products for
//! local development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p till-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p till-db --bin seed -- --db ./till.db --count 200
//! ```
//!
//! Prices are deterministic per product index, so two runs against empty
//! databases produce the same catalog (apart from IDs).

use std::env;

use anyhow::Context;
use till_core::{CategoryInput, Money, ProductInput, SupplierInput};
use till_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Category name and the product names sold under it.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Cosmetics",
        &[
            "Kajal",
            "Lipstick",
            "Compact Powder",
            "Foundation",
            "Nail Polish",
            "Eyeliner",
            "Face Wash",
            "Moisturiser",
        ],
    ),
    (
        "Kurtis",
        &[
            "Cotton Kurti",
            "Anarkali Kurti",
            "Rayon Kurti",
            "Printed Kurti",
            "Chikankari Kurti",
        ],
    ),
    (
        "Jewellery",
        &[
            "Jhumka Earrings",
            "Bangles Set",
            "Oxidised Necklace",
            "Anklet",
            "Nose Pin",
        ],
    ),
    (
        "Accessories",
        &["Dupatta", "Hair Clip Set", "Clutch Bag", "Scrunchies", "Sunglasses"],
    ),
];

const BRANDS: &[&str] = &["Lakme", "Maybelline", "Biba", "W", "Sugar", "Local"];

const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Surat Textiles", "9800000001", "Ring Road, Surat"),
    ("Glow Cosmetics", "9800000002", "Aminabad, Lucknow"),
    ("Jaipur Crafts", "9800000003", "Johari Bazaar, Jaipur"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./till.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if let Some(value) = args.get(i + 1) {
                    count = value
                        .parse()
                        .with_context(|| format!("invalid --count '{value}'"))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    db_path = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Till POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./till.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .context("opening database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut supplier_ids = Vec::new();
    for (name, contact, address) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .insert(&SupplierInput {
                name: name.to_string(),
                contact: contact.to_string(),
                address: address.to_string(),
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} suppliers", supplier_ids.len());

    let mut category_ids = Vec::new();
    for (name, _) in CATALOG {
        let category = db
            .categories()
            .insert(&CategoryInput {
                name: name.to_string(),
            })
            .await?;
        category_ids.push(category.id);
    }
    println!("✓ {} categories", category_ids.len());

    let start = std::time::Instant::now();
    let mut generated = 0;
    let mut seed = 0usize;

    'outer: loop {
        for (category_idx, (_, products)) in CATALOG.iter().enumerate() {
            for name in products.iter() {
                if generated >= count {
                    break 'outer;
                }

                let input = generate_product(
                    name,
                    seed,
                    &category_ids[category_idx],
                    &supplier_ids[seed % supplier_ids.len()],
                );
                seed += 1;

                db.products()
                    .insert(&input)
                    .await
                    .with_context(|| format!("inserting {}", input.name))?;
                generated += 1;
            }
        }
    }

    println!(
        "✓ Generated {} products in {:?}",
        generated,
        start.elapsed()
    );

    let sample = db.products().list(Some("kurti")).await?;
    println!("  Search 'kurti': {} results", sample.len());

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one product. Repeat passes over the catalog get a variant suffix
/// so names stay distinct.
fn generate_product(name: &str, seed: usize, category_id: &str, supplier_id: &str) -> ProductInput {
    let round = seed / 23;
    let full_name = if round == 0 {
        name.to_string()
    } else {
        format!("{} #{}", name, round + 1)
    };

    // ₹49 - ₹1,248
    let sell_paise = 4_900 + ((seed * 3_700) % 120_000) as i64;
    // 55-74% of the selling price
    let cost_pct = 55 + (seed % 20) as i64;

    ProductInput {
        name: full_name,
        brand: BRANDS[seed % BRANDS.len()].to_string(),
        cost_price: Money::from_paise(sell_paise * cost_pct / 100),
        sell_price: Money::from_paise(sell_paise),
        quantity: (seed % 41) as i64,
        category_id: Some(category_id.to_string()),
        supplier_id: Some(supplier_id.to_string()),
    }
}
