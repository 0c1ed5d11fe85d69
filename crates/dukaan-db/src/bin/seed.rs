//! # Seed Data Generator
//!
//! Populates the database with development inventory and a prize catalog.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p dukaan-db --bin seed
//!
//! # Specify database path
//! cargo run -p dukaan-db --bin seed -- --db ./data/dukaan.db
//! ```

use std::env;

use dukaan_core::Unit;
use dukaan_db::repository::item::NewItem;
use dukaan_db::repository::prize::NewPrize;
use dukaan_db::{Database, DbConfig};

/// Dev inventory: (name, unit, sale, purchase, wholesale, stock, min_stock).
const ITEMS: &[(&str, Unit, f64, f64, f64, f64, f64)] = &[
    ("Engine Oil 5W-30", Unit::Ltr, 1850.0, 1500.0, 1700.0, 60.0, 10.0),
    ("Engine Oil 10W-40", Unit::Ltr, 1650.0, 1350.0, 1500.0, 80.0, 10.0),
    ("Gear Oil 85W-140", Unit::Ltr, 1200.0, 950.0, 1100.0, 40.0, 8.0),
    ("Brake Fluid DOT-4", Unit::Ltr, 900.0, 700.0, 820.0, 25.0, 5.0),
    ("Coolant Green", Unit::Ltr, 650.0, 480.0, 580.0, 50.0, 10.0),
    ("Oil Filter Small", Unit::Pcs, 450.0, 300.0, 400.0, 120.0, 20.0),
    ("Oil Filter Large", Unit::Pcs, 650.0, 450.0, 580.0, 90.0, 15.0),
    ("Air Filter", Unit::Pcs, 850.0, 600.0, 760.0, 70.0, 10.0),
    ("Grease Tub", Unit::Buc, 2400.0, 1900.0, 2200.0, 15.0, 3.0),
    ("Chain Lube", Unit::Pcs, 550.0, 380.0, 480.0, 45.0, 10.0),
];

/// Prize catalog: (name, points, quantity, category).
const PRIZES: &[(&str, i64, i64, &str)] = &[
    ("Cap", 100, 25, "Merch"),
    ("T-Shirt", 250, 15, "Merch"),
    ("Key Chain", 50, 60, "Merch"),
    ("Free Oil Change", 500, 10, "Service"),
    ("Travel Mug", 300, 12, "Merch"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./dukaan_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dukaan POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./dukaan_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Dukaan POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().list().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding inventory...");

    for (name, unit, sale, purchase, wholesale, stock, min_stock) in ITEMS {
        db.items()
            .insert(NewItem {
                name: name.to_string(),
                unit: *unit,
                sale_price: *sale,
                purchase_price: *purchase,
                wholesale_price: *wholesale,
                stock_quantity: *stock,
                min_stock_quantity: *min_stock,
                tax_rate: 0.0,
            })
            .await?;
    }
    println!("  {} items", ITEMS.len());

    println!("Seeding prize catalog...");
    for (name, points, quantity, category) in PRIZES {
        db.prizes()
            .insert(NewPrize {
                name: name.to_string(),
                points: *points,
                quantity: *quantity,
                category: category.to_string(),
                is_active: true,
            })
            .await?;
    }
    println!("  {} prizes", PRIZES.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
