use chrono::{Datelike, Local, Months, NaiveDate};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{Result, RolodexError};
use crate::settings::{db_path, get_data_dir};

const EMPLOYEES: &[(&str, Option<&str>, Option<&str>)] = &[
    ("E001", Some("Maria"), Some("Santos")),
    ("E002", Some("James"), Some("Cole")),
    ("E003", Some("Priya"), Some("Patel")),
    ("E004", Some("Noel"), None),
];

const PRODUCTS: &[(&str, &str, &str)] = &[
    ("P001", "Hex bolts 10mm", "box"),
    ("P002", "Wood screws 5mm", "box"),
    ("P003", "PVC pipe 2in", "length"),
    ("P004", "Wall anchor kit", "kit"),
    ("P005", "Utility knife", "pcs"),
    ("P006", "Paint roller set", "set"),
    ("P007", "Duct tape", "roll"),
    ("P008", "Safety goggles", "pcs"),
];

// (prodcode, effective date, unit price) — several products cross a price
// raise inside the generated sales window, so reports exercise the
// per-transaction-date lookup on real data.
const PRICE_HISTORY: &[(&str, &str, f64)] = &[
    ("P001", "2024-01-01", 10.00),
    ("P001", "2024-07-01", 11.50),
    ("P001", "2025-02-01", 12.25),
    ("P002", "2024-01-01", 4.50),
    ("P002", "2025-01-01", 4.95),
    ("P003", "2024-01-01", 8.75),
    ("P003", "2024-10-01", 9.40),
    ("P004", "2024-03-01", 15.00),
    ("P005", "2024-01-01", 6.20),
    ("P005", "2024-06-15", 6.80),
    ("P006", "2024-01-01", 12.99),
    ("P007", "2024-01-01", 3.25),
    ("P007", "2025-03-01", 3.60),
    ("P008", "2024-02-01", 9.10),
];

const CUSTOMERS: &[(&str, &str, Option<&str>, Option<&str>)] = &[
    ("C0001", "Acme Hardware", Some("12 Main St, Springfield"), Some("30D")),
    ("C0002", "Borealis Supply Co.", Some("88 Harbor Rd, Portsmouth"), Some("45D")),
    ("C0003", "Cedar & Sons Construction", Some("401 Mill Ave, Boise"), Some("COD")),
    ("C0004", "Dockside Marine Outfitters", Some("7 Wharf St, Galveston"), Some("30D")),
    ("C0005", "Evergreen Property Group", Some("1500 Pine Blvd, Tacoma"), Some("45D")),
    ("C0006", "Foundry Lane Workshop", Some("23 Forge St, Pittsburgh"), Some("COD")),
    // A prospect with no sales yet, to walk the empty-report path.
    ("C0007", "Granite Peak Prospects", None, None),
];

struct SalePlan {
    custno: &'static str,
    day: u32,
    empno: Option<&'static str>,
    items: &'static [(&'static str, i64)],
}

/// Sales generated for every month in the window.
const MONTHLY_SALES: &[SalePlan] = &[
    SalePlan { custno: "C0001", day: 5, empno: Some("E001"), items: &[("P001", 3), ("P002", 10)] },
    SalePlan { custno: "C0002", day: 9, empno: Some("E002"), items: &[("P003", 6)] },
    SalePlan { custno: "C0001", day: 14, empno: Some("E003"), items: &[("P005", 2), ("P007", 12), ("P004", 1)] },
    SalePlan { custno: "C0003", day: 18, empno: Some("E001"), items: &[("P006", 4)] },
    SalePlan { custno: "C0004", day: 21, empno: Some("E002"), items: &[("P008", 5), ("P001", 1)] },
    SalePlan { custno: "C0005", day: 25, empno: Some("E004"), items: &[("P002", 20)] },
    SalePlan { custno: "C0006", day: 27, empno: Some("E003"), items: &[("P007", 6), ("P003", 2)] },
];

/// Clamp a day to the last valid day of the given year/month.
fn clamp_day(year: i32, month: u32, day: u32) -> u32 {
    let last_day = NaiveDate::from_ymd_opt(year, month + 1, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap())
        .pred_opt()
        .unwrap()
        .day();
    day.min(last_day)
}

fn make_date(year: i32, month: u32, day: u32) -> String {
    let d = clamp_day(year, month, day);
    format!("{year:04}-{month:02}-{d:02}")
}

fn seed_masters(conn: &Connection) -> Result<()> {
    for (empno, firstname, lastname) in EMPLOYEES {
        conn.execute(
            "INSERT INTO employee (empno, firstname, lastname) VALUES (?1, ?2, ?3)",
            rusqlite::params![empno, firstname, lastname],
        )?;
    }
    for (prodcode, description, unit) in PRODUCTS {
        conn.execute(
            "INSERT INTO product (prodcode, description, unit) VALUES (?1, ?2, ?3)",
            rusqlite::params![prodcode, description, unit],
        )?;
    }
    for (prodcode, effdate, unitprice) in PRICE_HISTORY {
        conn.execute(
            "INSERT INTO pricehist (prodcode, effdate, unitprice) VALUES (?1, ?2, ?3)",
            rusqlite::params![prodcode, effdate, unitprice],
        )?;
    }
    for (custno, custname, address, payterm) in CUSTOMERS {
        conn.execute(
            "INSERT INTO customer (custno, custname, address, payterm) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![custno, custname, address, payterm],
        )?;
    }
    Ok(())
}

/// Load 18 months of deterministic sample data ending at the current month.
pub fn run() -> Result<()> {
    std::fs::create_dir_all(get_data_dir())?;
    let conn = get_connection(&db_path())?;
    init_db(&conn)?;

    let existing: i64 = conn.query_row("SELECT count(*) FROM customer", [], |row| row.get(0))?;
    if existing > 0 {
        return Err(RolodexError::Other(
            "demo data can only be loaded into an empty database".to_string(),
        ));
    }

    seed_masters(&conn)?;

    let today = Local::now().date_naive();
    let mut transno = 0u32;
    let mut sales = 0usize;
    for i in 0..18u32 {
        // Count backwards: i=0 is 17 months ago, i=17 is the current month
        let months_ago = 17 - i;
        let target = today - Months::new(months_ago);
        let year = target.year();
        let month = target.month();
        let idx = i as usize;

        for plan in MONTHLY_SALES {
            transno += 1;
            let tn = format!("T{transno:04}");
            let date = make_date(year, month, plan.day);
            conn.execute(
                "INSERT INTO sales (transno, salesdate, custno, empno) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![tn, date, plan.custno, plan.empno],
            )?;
            for (prodcode, base_qty) in plan.items {
                // Small deterministic variation by month index
                let quantity = base_qty + (idx as i64 % 3);
                conn.execute(
                    "INSERT INTO salesdetail (transno, prodcode, quantity) VALUES (?1, ?2, ?3)",
                    rusqlite::params![tn, prodcode, quantity],
                )?;
            }
            sales += 1;
        }

        if idx == 5 {
            // A line item for a product dropped from the master table;
            // reports show it as N/A at a zero price.
            transno += 1;
            let tn = format!("T{transno:04}");
            let date = make_date(year, month, 11);
            conn.execute(
                "INSERT INTO sales (transno, salesdate, custno, empno) VALUES (?1, ?2, 'C0002', 'E001')",
                rusqlite::params![tn, date],
            )?;
            conn.execute(
                "INSERT INTO salesdetail (transno, prodcode, quantity) VALUES (?1, 'DISC-01', 2)",
                rusqlite::params![tn],
            )?;
            sales += 1;
        }

        if idx == 8 {
            // A sale recorded with no line items and no salesperson.
            transno += 1;
            let tn = format!("T{transno:04}");
            let date = make_date(year, month, 3);
            conn.execute(
                "INSERT INTO sales (transno, salesdate, custno) VALUES (?1, ?2, 'C0003')",
                rusqlite::params![tn, date],
            )?;
            sales += 1;
        }
    }

    println!(
        "Loaded demo data: {} customers, {} products, {} employees, {sales} sales.",
        CUSTOMERS.len(),
        PRODUCTS.len(),
        EMPLOYEES.len(),
    );
    println!("Try: rolodex report sales C0001");
    Ok(())
}
