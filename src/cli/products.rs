use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::OptionalExtension;

use crate::cli::validate_date;
use crate::db::get_connection;
use crate::error::{Result, RolodexError};
use crate::fmt::{display_date, money};
use crate::models::{PriceHistEntry, Product};
use crate::report::price_as_of;
use crate::settings::db_path;

pub fn add(prodcode: &str, description: &str, unit: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    conn.execute(
        "INSERT INTO product (prodcode, description, unit) VALUES (?1, ?2, ?3)",
        rusqlite::params![prodcode, description, unit],
    )?;
    println!("Added product {prodcode}: {description}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare("SELECT prodcode, description, unit FROM product ORDER BY prodcode")?;
    let products: Vec<Product> = stmt
        .query_map([], |row| {
            Ok(Product {
                prodcode: row.get(0)?,
                description: row.get(1)?,
                unit: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let today = Local::now().format("%Y-%m-%d").to_string();
    let mut table = Table::new();
    table.set_header(vec!["Code", "Description", "Unit", "Current Price"]);
    for p in &products {
        let price = price_as_of(&conn, &p.prodcode, &today)?;
        table.add_row(vec![
            Cell::new(&p.prodcode),
            Cell::new(p.description.as_deref().unwrap_or("N/A")),
            Cell::new(p.unit.as_deref().unwrap_or("")),
            Cell::new(price.map(money).unwrap_or_else(|| "(no price)".to_string())),
        ]);
    }
    println!("Products ({})\n{table}", products.len());
    Ok(())
}

pub fn show(prodcode: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let product = conn
        .query_row(
            "SELECT prodcode, description, unit FROM product WHERE prodcode = ?1",
            [prodcode],
            |row| {
                Ok(Product {
                    prodcode: row.get(0)?,
                    description: row.get(1)?,
                    unit: row.get(2)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| RolodexError::ProductNotFound(prodcode.to_string()))?;

    println!(
        "{} - {}",
        product.prodcode.bold(),
        product.description.as_deref().unwrap_or("N/A")
    );
    println!("Unit: {}", product.unit.as_deref().unwrap_or("N/A"));

    let mut stmt = conn.prepare(
        "SELECT effdate, unitprice FROM pricehist WHERE prodcode = ?1 ORDER BY effdate DESC",
    )?;
    let history: Vec<PriceHistEntry> = stmt
        .query_map([prodcode], |row| {
            Ok(PriceHistEntry {
                effdate: row.get(0)?,
                unitprice: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if history.is_empty() {
        println!("No price history; sales of this product price at $0.00.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Effective", "Unit Price"]);
    for entry in &history {
        table.add_row(vec![
            Cell::new(display_date(&entry.effdate)),
            Cell::new(money(entry.unitprice)),
        ]);
    }
    println!("\nPrice history\n{table}");
    Ok(())
}

pub fn update(prodcode: &str, description: Option<&str>, unit: Option<&str>) -> Result<()> {
    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(description) = description {
        params.push(Box::new(description.to_string()));
        sets.push(format!("description = ?{}", params.len()));
    }
    if let Some(unit) = unit {
        params.push(Box::new(unit.to_string()));
        sets.push(format!("unit = ?{}", params.len()));
    }
    if sets.is_empty() {
        return Err(RolodexError::Other(
            "nothing to update; pass --description or --unit".to_string(),
        ));
    }
    params.push(Box::new(prodcode.to_string()));
    let sql = format!(
        "UPDATE product SET {} WHERE prodcode = ?{}",
        sets.join(", "),
        params.len()
    );

    let conn = get_connection(&db_path())?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let changed = conn.execute(&sql, param_refs.as_slice())?;
    if changed == 0 {
        return Err(RolodexError::ProductNotFound(prodcode.to_string()));
    }
    println!("Updated product {prodcode}");
    Ok(())
}

pub fn remove(prodcode: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let referenced: i64 = conn.query_row(
        "SELECT count(*) FROM salesdetail WHERE prodcode = ?1",
        [prodcode],
        |row| row.get(0),
    )?;
    if referenced > 0 {
        return Err(RolodexError::Other(format!(
            "product {prodcode} appears on {referenced} sale line items; only unreferenced products can be removed"
        )));
    }
    conn.execute("DELETE FROM pricehist WHERE prodcode = ?1", [prodcode])?;
    let deleted = conn.execute("DELETE FROM product WHERE prodcode = ?1", [prodcode])?;
    if deleted == 0 {
        return Err(RolodexError::ProductNotFound(prodcode.to_string()));
    }
    println!("Removed product {prodcode}");
    Ok(())
}

pub fn set_price(prodcode: &str, price: f64, effective: &str) -> Result<()> {
    let effective = validate_date(effective)?;
    if price < 0.0 {
        return Err(RolodexError::Other(format!("price must be non-negative, got {price}")));
    }
    let conn = get_connection(&db_path())?;
    let exists: i64 = conn.query_row(
        "SELECT count(*) FROM product WHERE prodcode = ?1",
        [prodcode],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RolodexError::ProductNotFound(prodcode.to_string()));
    }
    // Same effective date replaces the earlier entry for that date.
    conn.execute(
        "INSERT OR REPLACE INTO pricehist (prodcode, effdate, unitprice) VALUES (?1, ?2, ?3)",
        rusqlite::params![prodcode, effective, price],
    )?;
    println!(
        "Set {prodcode} price to {} effective {}",
        money(price),
        display_date(&effective)
    );
    Ok(())
}
