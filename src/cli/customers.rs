use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::validate_payterm;
use crate::db::get_connection;
use crate::error::{Result, RolodexError};
use crate::fmt::money;
use crate::report;
use crate::settings::db_path;

pub fn add(
    custno: &str,
    custname: &str,
    address: Option<&str>,
    payterm: Option<&str>,
) -> Result<()> {
    let payterm = payterm.map(validate_payterm).transpose()?;
    let conn = get_connection(&db_path())?;
    conn.execute(
        "INSERT INTO customer (custno, custname, address, payterm) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![custno, custname, address, payterm],
    )?;
    println!("Added customer {custno}: {custname}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let customers = report::list_customers(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name"]);
    for c in &customers {
        table.add_row(vec![Cell::new(&c.custno), Cell::new(&c.custname)]);
    }
    println!("Customers ({})\n{table}", customers.len());
    Ok(())
}

pub fn show(custno: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let report = report::get_sales_report(&conn, custno)?;
    let customer = &report.customer;

    println!("{} ({})", customer.custname.bold(), customer.custno);
    println!("Address:       {}", customer.address.as_deref().unwrap_or("N/A"));
    println!("Payment terms: {}", customer.payterm.as_deref().unwrap_or("N/A"));
    println!(
        "Sales:         {} transactions, {} total",
        report.transactions.len(),
        money(report.total_amount)
    );

    if !report.transactions.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Transaction #", "Date", "Employee", "Total"]);
        for t in report.transactions.iter().take(5) {
            table.add_row(vec![
                Cell::new(&t.transno),
                Cell::new(&t.date),
                Cell::new(&t.employee),
                Cell::new(money(t.total)),
            ]);
        }
        println!("\nMost recent\n{table}");
    }
    Ok(())
}

pub fn update(
    custno: &str,
    name: Option<&str>,
    address: Option<&str>,
    payterm: Option<&str>,
) -> Result<()> {
    let payterm = payterm.map(validate_payterm).transpose()?;

    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(name) = name {
        params.push(Box::new(name.to_string()));
        sets.push(format!("custname = ?{}", params.len()));
    }
    if let Some(address) = address {
        params.push(Box::new(address.to_string()));
        sets.push(format!("address = ?{}", params.len()));
    }
    if let Some(payterm) = payterm {
        params.push(Box::new(payterm));
        sets.push(format!("payterm = ?{}", params.len()));
    }
    if sets.is_empty() {
        return Err(RolodexError::Other(
            "nothing to update; pass --name, --address or --payterm".to_string(),
        ));
    }
    params.push(Box::new(custno.to_string()));
    let sql = format!(
        "UPDATE customer SET {} WHERE custno = ?{}",
        sets.join(", "),
        params.len()
    );

    let conn = get_connection(&db_path())?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let changed = conn.execute(&sql, param_refs.as_slice())?;
    if changed == 0 {
        return Err(RolodexError::CustomerNotFound(custno.to_string()));
    }
    println!("Updated customer {custno}");
    Ok(())
}

pub fn remove(custno: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let sales: i64 = conn.query_row(
        "SELECT count(*) FROM sales WHERE custno = ?1",
        [custno],
        |row| row.get(0),
    )?;
    if sales > 0 {
        return Err(RolodexError::Other(format!(
            "customer {custno} has {sales} recorded sales; only customers with no history can be removed"
        )));
    }
    let deleted = conn.execute("DELETE FROM customer WHERE custno = ?1", [custno])?;
    if deleted == 0 {
        return Err(RolodexError::CustomerNotFound(custno.to_string()));
    }
    println!("Removed customer {custno}");
    Ok(())
}
