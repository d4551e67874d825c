use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, RolodexError};
use crate::fmt::display_date;
use crate::models::Customer;

// ---------------------------------------------------------------------------
// Raw rows (as fetched)
// ---------------------------------------------------------------------------

pub struct CustomerSummary {
    pub custno: String,
    pub custname: String,
}

pub struct RawDetail {
    pub prodcode: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub unit: Option<String>,
}

pub struct RawSale {
    pub transno: String,
    pub salesdate: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub details: Vec<RawDetail>,
}

// ---------------------------------------------------------------------------
// Processed report dataset
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ProcessedDetail {
    pub prodcode: String,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

#[derive(Debug)]
pub struct ProcessedTransaction {
    pub transno: String,
    /// Display form (MM/DD/YYYY).
    pub date: String,
    /// Stored form (YYYY-MM-DD); the sort key.
    pub raw_date: String,
    pub employee: String,
    pub total: f64,
    pub details: Vec<ProcessedDetail>,
}

#[derive(Debug)]
pub struct SalesReport {
    pub customer: Customer,
    pub transactions: Vec<ProcessedTransaction>,
    pub total_amount: f64,
}

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

pub fn list_customers(conn: &Connection) -> Result<Vec<CustomerSummary>> {
    let mut stmt = conn.prepare("SELECT custno, custname FROM customer ORDER BY custname")?;
    let rows: Vec<CustomerSummary> = stmt
        .query_map([], |row| {
            Ok(CustomerSummary {
                custno: row.get(0)?,
                custname: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_customer(conn: &Connection, custno: &str) -> Result<Option<Customer>> {
    let customer = conn
        .query_row(
            "SELECT custno, custname, address, payterm FROM customer WHERE custno = ?1",
            [custno],
            |row| {
                Ok(Customer {
                    custno: row.get(0)?,
                    custname: row.get(1)?,
                    address: row.get(2)?,
                    payterm: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(customer)
}

/// One query joining a customer's sales to their line items, the salesperson,
/// and product master data, newest sale first. Flat rows are regrouped per
/// transaction in fetch order. A sale with no line items still yields one
/// row (NULL prodcode) and becomes a transaction with an empty detail list.
pub fn get_customer_sales(conn: &Connection, custno: &str) -> Result<Vec<RawSale>> {
    let mut stmt = conn.prepare(
        "SELECT s.transno, s.salesdate, e.firstname, e.lastname, \
                d.prodcode, d.quantity, p.description, p.unit \
         FROM sales s \
         LEFT JOIN employee e ON s.empno = e.empno \
         LEFT JOIN salesdetail d ON d.transno = s.transno \
         LEFT JOIN product p ON p.prodcode = d.prodcode \
         WHERE s.custno = ?1 \
         ORDER BY s.salesdate DESC, s.transno, d.prodcode",
    )?;
    type FlatRow = (
        String,
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<i64>,
        Option<String>,
        Option<String>,
    );
    let flat: Vec<FlatRow> = stmt
        .query_map([custno], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut sales: Vec<RawSale> = Vec::new();
    for (transno, salesdate, firstname, lastname, prodcode, quantity, description, unit) in flat {
        if sales.last().map(|s: &RawSale| s.transno != transno).unwrap_or(true) {
            sales.push(RawSale {
                transno,
                salesdate,
                firstname,
                lastname,
                details: Vec::new(),
            });
        }
        if let Some(prodcode) = prodcode {
            if let Some(sale) = sales.last_mut() {
                sale.details.push(RawDetail {
                    prodcode,
                    quantity: quantity.unwrap_or(0),
                    description,
                    unit,
                });
            }
        }
    }
    Ok(sales)
}

// ---------------------------------------------------------------------------
// Price resolution
// ---------------------------------------------------------------------------

/// Distinct product codes across all line items, first-appearance order.
pub fn extract_product_codes(sales: &[RawSale]) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for sale in sales {
        for detail in &sale.details {
            if !codes.contains(&detail.prodcode) {
                codes.push(detail.prodcode.clone());
            }
        }
    }
    codes
}

/// The price in effect for a product on a given date: the entry with the
/// greatest effective date at or before the date, or None if the history
/// starts later (the consumer falls back to a zero price).
pub fn price_as_of(conn: &Connection, prodcode: &str, date: &str) -> Result<Option<f64>> {
    let price = conn
        .query_row(
            "SELECT unitprice FROM pricehist \
             WHERE prodcode = ?1 AND effdate <= ?2 \
             ORDER BY effdate DESC LIMIT 1",
            [prodcode, date],
            |row| row.get(0),
        )
        .optional()?;
    Ok(price)
}

/// Batch point-in-time resolution for every (product, sale date) pair the
/// report touches. Keyed per transaction date: the same product resolves
/// independently for each sale it appears on, so a price raise between two
/// sales prices each at its own historical rate.
pub fn resolve_prices(
    conn: &Connection,
    sales: &[RawSale],
) -> Result<HashMap<(String, String), f64>> {
    let codes = extract_product_codes(sales);
    let mut pairs: Vec<(String, String)> = Vec::new();
    for code in &codes {
        for sale in sales {
            if sale.details.iter().any(|d| &d.prodcode == code) {
                let pair = (code.clone(), sale.salesdate.clone());
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        }
    }

    let mut prices = HashMap::new();
    for (code, date) in pairs {
        if let Some(price) = price_as_of(conn, &code, &date)? {
            prices.insert((code, date), price);
        }
    }
    Ok(prices)
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

fn employee_name(firstname: &Option<String>, lastname: &Option<String>) -> String {
    let name = format!(
        "{} {}",
        firstname.as_deref().unwrap_or(""),
        lastname.as_deref().unwrap_or("")
    );
    let name = name.trim();
    if name.is_empty() {
        "N/A".to_string()
    } else {
        name.to_string()
    }
}

/// Enrich raw sales into the report dataset: per-line subtotals from the
/// resolved prices (zero when no entry applies), per-transaction totals
/// summed before any rounding, resolved employee names, and a stable
/// descending sort on the raw date (ties keep fetch order).
pub fn process_sales(
    sales: &[RawSale],
    prices: &HashMap<(String, String), f64>,
) -> Vec<ProcessedTransaction> {
    let mut processed: Vec<ProcessedTransaction> = sales
        .iter()
        .map(|sale| {
            let mut total = 0.0;
            let mut details = Vec::with_capacity(sale.details.len());
            for d in &sale.details {
                let unit_price = prices
                    .get(&(d.prodcode.clone(), sale.salesdate.clone()))
                    .copied()
                    .unwrap_or(0.0);
                let subtotal = d.quantity as f64 * unit_price;
                total += subtotal;
                details.push(ProcessedDetail {
                    prodcode: d.prodcode.clone(),
                    description: d.description.clone(),
                    unit: d.unit.clone(),
                    quantity: d.quantity,
                    unit_price,
                    subtotal,
                });
            }
            ProcessedTransaction {
                transno: sale.transno.clone(),
                date: display_date(&sale.salesdate),
                raw_date: sale.salesdate.clone(),
                employee: employee_name(&sale.firstname, &sale.lastname),
                total,
                details,
            }
        })
        .collect();

    // ISO dates compare lexicographically; sort_by is stable for ties.
    processed.sort_by(|a, b| b.raw_date.cmp(&a.raw_date));
    processed
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Full pipeline for one customer. An unknown customer aborts; a customer
/// with no sales returns an empty transaction list so callers can report
/// "no data" without ever touching price resolution or the renderer.
pub fn get_sales_report(conn: &Connection, custno: &str) -> Result<SalesReport> {
    let customer = get_customer(conn, custno)?
        .ok_or_else(|| RolodexError::CustomerNotFound(custno.to_string()))?;
    let sales = get_customer_sales(conn, custno)?;
    if sales.is_empty() {
        return Ok(SalesReport {
            customer,
            transactions: Vec::new(),
            total_amount: 0.0,
        });
    }
    let prices = resolve_prices(conn, &sales)?;
    let transactions = process_sales(&sales, &prices);
    let total_amount = transactions.iter().map(|t| t.total).sum();
    Ok(SalesReport {
        customer,
        transactions,
        total_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn seed_base(conn: &Connection) {
        conn.execute(
            "INSERT INTO customer (custno, custname, address, payterm) \
             VALUES ('C0001', 'Acme Hardware', '12 Main St', '30D')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO employee (empno, firstname, lastname) VALUES ('E001', 'Maria', 'Santos')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO product (prodcode, description, unit) VALUES ('P1', 'Hex bolts', 'box')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO pricehist (prodcode, effdate, unitprice) VALUES ('P1', '2024-01-01', 10.0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO pricehist (prodcode, effdate, unitprice) VALUES ('P1', '2024-02-01', 12.0)",
            [],
        )
        .unwrap();
    }

    fn seed_sale(conn: &Connection, transno: &str, date: &str, items: &[(&str, i64)]) {
        conn.execute(
            "INSERT INTO sales (transno, salesdate, custno, empno) VALUES (?1, ?2, 'C0001', 'E001')",
            rusqlite::params![transno, date],
        )
        .unwrap();
        for (code, qty) in items {
            conn.execute(
                "INSERT INTO salesdetail (transno, prodcode, quantity) VALUES (?1, ?2, ?3)",
                rusqlite::params![transno, code, qty],
            )
            .unwrap();
        }
    }

    #[test]
    fn test_list_customers_ordered_by_name() {
        let (_dir, conn) = test_db();
        conn.execute("INSERT INTO customer (custno, custname) VALUES ('C2', 'Zenith')", [])
            .unwrap();
        conn.execute("INSERT INTO customer (custno, custname) VALUES ('C1', 'Acme')", [])
            .unwrap();
        let customers = list_customers(&conn).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].custname, "Acme");
        assert_eq!(customers[1].custname, "Zenith");
    }

    #[test]
    fn test_get_customer_not_found_is_none() {
        let (_dir, conn) = test_db();
        assert!(get_customer(&conn, "NOPE").unwrap().is_none());
    }

    #[test]
    fn test_point_in_time_prices_per_transaction_date() {
        // The documented round-trip scenario: two sales of P1 qty 3 straddle
        // a price raise from 10.00 to 12.00.
        let (_dir, conn) = test_db();
        seed_base(&conn);
        seed_sale(&conn, "T0001", "2024-01-10", &[("P1", 3)]);
        seed_sale(&conn, "T0002", "2024-02-05", &[("P1", 3)]);

        let report = get_sales_report(&conn, "C0001").unwrap();
        assert_eq!(report.transactions.len(), 2);
        // Sorted descending: the February sale comes first.
        assert_eq!(report.transactions[0].transno, "T0002");
        assert_eq!(report.transactions[0].details[0].subtotal, 36.0);
        assert_eq!(report.transactions[1].transno, "T0001");
        assert_eq!(report.transactions[1].details[0].subtotal, 30.0);
        assert_eq!(report.total_amount, 66.0);
    }

    #[test]
    fn test_future_dated_price_never_selected() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        // Sale before any price is effective.
        seed_sale(&conn, "T0001", "2023-12-15", &[("P1", 5)]);
        let report = get_sales_report(&conn, "C0001").unwrap();
        let t = &report.transactions[0];
        assert_eq!(t.details[0].unit_price, 0.0);
        assert_eq!(t.details[0].subtotal, 0.0);
        assert_eq!(t.total, 0.0);
    }

    #[test]
    fn test_price_on_effective_date_boundary() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        // Sale exactly on the raise date picks the new price.
        seed_sale(&conn, "T0001", "2024-02-01", &[("P1", 1)]);
        let report = get_sales_report(&conn, "C0001").unwrap();
        assert_eq!(report.transactions[0].details[0].unit_price, 12.0);
    }

    #[test]
    fn test_unknown_product_degrades_to_na() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        seed_sale(&conn, "T0001", "2024-01-10", &[("GHOST", 2)]);
        let report = get_sales_report(&conn, "C0001").unwrap();
        let d = &report.transactions[0].details[0];
        assert!(d.description.is_none());
        assert!(d.unit.is_none());
        assert_eq!(d.unit_price, 0.0);
        assert_eq!(d.subtotal, 0.0);
    }

    #[test]
    fn test_empty_customer_short_circuits() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        let report = get_sales_report(&conn, "C0001").unwrap();
        assert!(report.transactions.is_empty());
        assert_eq!(report.total_amount, 0.0);
    }

    #[test]
    fn test_unknown_customer_aborts() {
        let (_dir, conn) = test_db();
        let err = get_sales_report(&conn, "NOPE").unwrap_err();
        assert!(matches!(err, RolodexError::CustomerNotFound(_)));
    }

    #[test]
    fn test_sale_with_no_line_items_has_empty_details() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        seed_sale(&conn, "T0001", "2024-01-10", &[]);
        let report = get_sales_report(&conn, "C0001").unwrap();
        assert_eq!(report.transactions.len(), 1);
        assert!(report.transactions[0].details.is_empty());
        assert_eq!(report.transactions[0].total, 0.0);
    }

    #[test]
    fn test_missing_employee_resolves_na() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        conn.execute(
            "INSERT INTO sales (transno, salesdate, custno) VALUES ('T0009', '2024-01-12', 'C0001')",
            [],
        )
        .unwrap();
        let report = get_sales_report(&conn, "C0001").unwrap();
        assert_eq!(report.transactions[0].employee, "N/A");
    }

    #[test]
    fn test_employee_name_trims_partial_names() {
        assert_eq!(employee_name(&Some("Maria".into()), &Some("Santos".into())), "Maria Santos");
        assert_eq!(employee_name(&Some("Maria".into()), &None), "Maria");
        assert_eq!(employee_name(&None, &Some("Santos".into())), "Santos");
        assert_eq!(employee_name(&None, &None), "N/A");
        assert_eq!(employee_name(&Some("".into()), &Some("".into())), "N/A");
    }

    #[test]
    fn test_extract_product_codes_dedups_in_first_appearance_order() {
        let sales = vec![
            RawSale {
                transno: "T1".into(),
                salesdate: "2024-03-01".into(),
                firstname: None,
                lastname: None,
                details: vec![
                    RawDetail { prodcode: "B".into(), quantity: 1, description: None, unit: None },
                    RawDetail { prodcode: "A".into(), quantity: 1, description: None, unit: None },
                ],
            },
            RawSale {
                transno: "T2".into(),
                salesdate: "2024-02-01".into(),
                firstname: None,
                lastname: None,
                details: vec![
                    RawDetail { prodcode: "A".into(), quantity: 2, description: None, unit: None },
                    RawDetail { prodcode: "C".into(), quantity: 2, description: None, unit: None },
                ],
            },
        ];
        assert_eq!(extract_product_codes(&sales), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_sort_descending_stable_for_same_date() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        seed_sale(&conn, "T0001", "2024-01-10", &[("P1", 1)]);
        seed_sale(&conn, "T0002", "2024-01-10", &[("P1", 2)]);
        seed_sale(&conn, "T0003", "2024-03-01", &[("P1", 1)]);
        let report = get_sales_report(&conn, "C0001").unwrap();
        let order: Vec<&str> = report.transactions.iter().map(|t| t.transno.as_str()).collect();
        // Newest first; the two same-date sales keep their fetch order.
        assert_eq!(order, vec!["T0003", "T0001", "T0002"]);
    }

    #[test]
    fn test_totals_sum_unrounded_subtotals() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        conn.execute(
            "INSERT INTO product (prodcode, description, unit) VALUES ('P2', 'Washers', 'bag')",
            [],
        )
        .unwrap();
        // A price with sub-cent precision: rounding each subtotal first
        // would drift the total.
        conn.execute(
            "INSERT INTO pricehist (prodcode, effdate, unitprice) VALUES ('P2', '2024-01-01', 0.105)",
            [],
        )
        .unwrap();
        seed_sale(&conn, "T0001", "2024-01-10", &[("P1", 2), ("P2", 3)]);
        let report = get_sales_report(&conn, "C0001").unwrap();
        let t = &report.transactions[0];
        assert!((t.total - (2.0 * 10.0 + 3.0 * 0.105)).abs() < 1e-9);
    }

    #[test]
    fn test_display_date_and_raw_date_both_carried() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        seed_sale(&conn, "T0001", "2024-02-05", &[("P1", 1)]);
        let report = get_sales_report(&conn, "C0001").unwrap();
        assert_eq!(report.transactions[0].raw_date, "2024-02-05");
        assert_eq!(report.transactions[0].date, "02/05/2024");
    }

    #[test]
    fn test_sales_restricted_to_requested_customer() {
        let (_dir, conn) = test_db();
        seed_base(&conn);
        conn.execute("INSERT INTO customer (custno, custname) VALUES ('C0002', 'Other')", [])
            .unwrap();
        seed_sale(&conn, "T0001", "2024-01-10", &[("P1", 1)]);
        conn.execute(
            "INSERT INTO sales (transno, salesdate, custno) VALUES ('T0002', '2024-01-11', 'C0002')",
            [],
        )
        .unwrap();
        let report = get_sales_report(&conn, "C0001").unwrap();
        assert_eq!(report.transactions.len(), 1);
        assert_eq!(report.transactions[0].transno, "T0001");
    }
}
