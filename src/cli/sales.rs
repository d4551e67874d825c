use colored::Colorize;
use comfy_table::{Cell, Table};
use rusqlite::OptionalExtension;

use crate::db::get_connection;
use crate::error::{Result, RolodexError};
use crate::fmt::{display_date, money};
use crate::report::price_as_of;
use crate::settings::db_path;

pub fn list(customer: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut sql = String::from(
        "SELECT s.transno, s.salesdate, c.custname, \
                TRIM(COALESCE(e.firstname, '') || ' ' || COALESCE(e.lastname, '')), \
                (SELECT count(*) FROM salesdetail d WHERE d.transno = s.transno) \
         FROM sales s \
         JOIN customer c ON c.custno = s.custno \
         LEFT JOIN employee e ON e.empno = s.empno",
    );
    if customer.is_some() {
        sql.push_str(" WHERE s.custno = ?1");
    }
    sql.push_str(" ORDER BY s.salesdate DESC, s.transno");

    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<(String, String, String, String, i64)> = match customer {
        Some(custno) => stmt
            .query_map([custno], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?,
    };

    let mut table = Table::new();
    table.set_header(vec!["Transaction #", "Date", "Customer", "Employee", "Items"]);
    for (transno, salesdate, custname, employee, items) in &rows {
        let employee = if employee.is_empty() { "N/A" } else { employee.as_str() };
        table.add_row(vec![
            Cell::new(transno),
            Cell::new(display_date(salesdate)),
            Cell::new(custname),
            Cell::new(employee),
            Cell::new(items),
        ]);
    }
    println!("Sales ({})\n{table}", rows.len());
    Ok(())
}

pub fn show(transno: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let header = conn
        .query_row(
            "SELECT s.transno, s.salesdate, s.custno, c.custname, \
                    TRIM(COALESCE(e.firstname, '') || ' ' || COALESCE(e.lastname, '')) \
             FROM sales s \
             JOIN customer c ON c.custno = s.custno \
             LEFT JOIN employee e ON e.empno = s.empno \
             WHERE s.transno = ?1",
            [transno],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| RolodexError::SaleNotFound(transno.to_string()))?;

    let (transno, salesdate, custno, custname, employee) = header;
    let employee = if employee.is_empty() { "N/A".to_string() } else { employee };
    println!("{} - {}", format!("Transaction #{transno}").bold(), display_date(&salesdate));
    println!("Customer: {custname} ({custno})");
    println!("Employee: {employee}");

    let mut stmt = conn.prepare(
        "SELECT d.prodcode, d.quantity, p.description, p.unit \
         FROM salesdetail d \
         LEFT JOIN product p ON p.prodcode = d.prodcode \
         WHERE d.transno = ?1 ORDER BY d.prodcode",
    )?;
    let details: Vec<(String, i64, Option<String>, Option<String>)> = stmt
        .query_map([&transno], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if details.is_empty() {
        println!("No line items recorded for this transaction.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Product", "Description", "Unit", "Qty", "Unit Price", "Subtotal"]);
    let mut total = 0.0;
    for (prodcode, quantity, description, unit) in &details {
        // Priced as of the sale date, the same rule the report uses.
        let unit_price = price_as_of(&conn, prodcode, &salesdate)?.unwrap_or(0.0);
        let subtotal = *quantity as f64 * unit_price;
        total += subtotal;
        table.add_row(vec![
            Cell::new(prodcode),
            Cell::new(description.as_deref().unwrap_or("N/A")),
            Cell::new(unit.as_deref().unwrap_or("")),
            Cell::new(quantity),
            Cell::new(money(unit_price)),
            Cell::new(money(subtotal)),
        ]);
    }
    println!("{table}");
    println!("Total: {}", money(total).bold());
    Ok(())
}
