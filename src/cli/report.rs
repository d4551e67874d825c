use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::money;
use crate::report::get_sales_report;
use crate::settings::db_path;

/// Terminal rendition of the customer sales report: the same aggregated
/// dataset the PDF renderer consumes, shown with comfy-table.
pub fn sales(custno: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let report = get_sales_report(&conn, custno)?;
    let customer = &report.customer;

    if report.transactions.is_empty() {
        println!(
            "{}",
            format!("No sales recorded for {} ({}).", customer.custname, customer.custno).yellow()
        );
        return Ok(());
    }

    println!("{}", "Customer Sales Report".bold());
    println!("{} ({})", customer.custname.bold(), customer.custno);
    println!("Address:       {}", customer.address.as_deref().unwrap_or("N/A"));
    println!("Payment terms: {}", customer.payterm.as_deref().unwrap_or("N/A"));
    println!(
        "Transactions:  {}   Total: {}",
        report.transactions.len(),
        money(report.total_amount).bold()
    );

    let mut summary = Table::new();
    summary.set_header(vec!["Transaction #", "Date", "Employee", "Total Amount"]);
    for t in &report.transactions {
        summary.add_row(vec![
            Cell::new(&t.transno),
            Cell::new(&t.date),
            Cell::new(&t.employee),
            Cell::new(money(t.total)),
        ]);
    }
    println!("\nSales Transactions\n{summary}");

    println!("\n{}", "Transaction Details".bold());
    for t in &report.transactions {
        println!("\nTransaction #{} - {}", t.transno.bold(), t.date);
        if t.details.is_empty() {
            println!("  No line items recorded for this transaction.");
            continue;
        }
        let mut table = Table::new();
        table.set_header(vec!["Product", "Description", "Quantity", "Unit Price", "Subtotal"]);
        for d in &t.details {
            table.add_row(vec![
                Cell::new(&d.prodcode),
                Cell::new(d.description.as_deref().unwrap_or("N/A")),
                Cell::new(d.quantity),
                Cell::new(money(d.unit_price)),
                Cell::new(money(d.subtotal)),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}
