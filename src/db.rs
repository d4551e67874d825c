use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

// salesdetail.prodcode carries no foreign key: a detail row referencing a
// product missing from the master table must still load and render with an
// "N/A" description instead of being rejected at insert time.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS customer (
    custno TEXT PRIMARY KEY,
    custname TEXT NOT NULL,
    address TEXT,
    payterm TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS employee (
    empno TEXT PRIMARY KEY,
    firstname TEXT,
    lastname TEXT
);

CREATE TABLE IF NOT EXISTS product (
    prodcode TEXT PRIMARY KEY,
    description TEXT,
    unit TEXT
);

CREATE TABLE IF NOT EXISTS pricehist (
    prodcode TEXT NOT NULL,
    effdate TEXT NOT NULL,
    unitprice REAL NOT NULL,
    PRIMARY KEY (prodcode, effdate),
    FOREIGN KEY (prodcode) REFERENCES product(prodcode)
);

CREATE TABLE IF NOT EXISTS sales (
    transno TEXT PRIMARY KEY,
    salesdate TEXT NOT NULL,
    custno TEXT NOT NULL,
    empno TEXT,
    FOREIGN KEY (custno) REFERENCES customer(custno),
    FOREIGN KEY (empno) REFERENCES employee(empno)
);

CREATE TABLE IF NOT EXISTS salesdetail (
    transno TEXT NOT NULL,
    prodcode TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity >= 0),
    PRIMARY KEY (transno, prodcode),
    FOREIGN KEY (transno) REFERENCES sales(transno)
);

CREATE INDEX IF NOT EXISTS idx_sales_custno ON sales(custno);
CREATE INDEX IF NOT EXISTS idx_pricehist_lookup ON pricehist(prodcode, effdate);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
