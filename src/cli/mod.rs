pub mod customers;
pub mod demo;
#[cfg(feature = "pdf")]
pub mod export;
pub mod init;
pub mod products;
pub mod report;
pub mod sales;

use clap::{Parser, Subcommand};

use crate::error::{Result, RolodexError};

pub const PAY_TERMS: &[&str] = &["30D", "45D", "COD"];

pub(crate) fn validate_payterm(term: &str) -> Result<String> {
    let upper = term.to_uppercase();
    if PAY_TERMS.contains(&upper.as_str()) {
        Ok(upper)
    } else {
        Err(RolodexError::InvalidPayTerm(term.to_string()))
    }
}

pub(crate) fn validate_date(date: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| RolodexError::InvalidDate(date.to_string()))
}

#[derive(Parser)]
#[command(name = "rolodex", about = "Customer sales CRM CLI with PDF report exports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Rolodex: choose a data directory and initialize the database.
    Init {
        /// Path for Rolodex data (default: ~/Documents/rolodex)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Company name shown in PDF branding and footers
        #[arg(long = "company-name")]
        company_name: Option<String>,
        /// Company address for the PDF footer contact line
        #[arg(long = "company-address")]
        company_address: Option<String>,
        /// Company phone for the PDF footer contact line
        #[arg(long = "company-phone")]
        company_phone: Option<String>,
    },
    /// Manage customers.
    Customers {
        #[command(subcommand)]
        command: CustomersCommands,
    },
    /// Manage products and their price history.
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// Browse recorded sales (read-only).
    Sales {
        #[command(subcommand)]
        command: SalesCommands,
    },
    /// Generate reports in the terminal.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export reports to PDF.
    #[cfg(feature = "pdf")]
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Load sample data (customers, products, price history, sales).
    Demo,
}

#[derive(Subcommand)]
pub enum CustomersCommands {
    /// Add a new customer.
    Add {
        /// Customer number, e.g. C0001
        custno: String,
        /// Customer display name
        custname: String,
        /// Free-text address
        #[arg(long)]
        address: Option<String>,
        /// Payment terms: 30D, 45D or COD
        #[arg(long)]
        payterm: Option<String>,
    },
    /// List all customers.
    List,
    /// Show a customer with their recent sales.
    Show { custno: String },
    /// Update customer fields.
    Update {
        custno: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        payterm: Option<String>,
    },
    /// Remove a customer with no recorded sales.
    Remove { custno: String },
}

#[derive(Subcommand)]
pub enum ProductsCommands {
    /// Add a new product.
    Add {
        /// Product code, e.g. P001
        prodcode: String,
        /// Product description
        description: String,
        /// Unit of sale, e.g. box, pcs
        #[arg(long)]
        unit: Option<String>,
    },
    /// List all products with their current price.
    List,
    /// Show a product with its full price history.
    Show { prodcode: String },
    /// Update product fields.
    Update {
        prodcode: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        unit: Option<String>,
    },
    /// Remove a product not referenced by any sale.
    Remove { prodcode: String },
    /// Record a unit price effective from a date.
    SetPrice {
        prodcode: String,
        /// Unit price, e.g. 12.50
        price: f64,
        /// Effective date: YYYY-MM-DD
        #[arg(long)]
        effective: String,
    },
}

#[derive(Subcommand)]
pub enum SalesCommands {
    /// List sales, optionally restricted to one customer.
    List {
        /// Customer number
        #[arg(long)]
        customer: Option<String>,
    },
    /// Show one sale with its line items priced as of the sale date.
    Show { transno: String },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Customer sales report: summary plus per-transaction details.
    Sales { custno: String },
}

#[cfg(feature = "pdf")]
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export a customer sales report to PDF.
    Sales {
        custno: String,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
        /// Max transactions given full detail tables
        #[arg(long, default_value_t = crate::pdf::DEFAULT_DETAIL_CAP)]
        limit: usize,
    },
    /// Build the report PDF and open it in the system viewer.
    Preview {
        custno: String,
        /// Max transactions given full detail tables
        #[arg(long, default_value_t = crate::pdf::DEFAULT_DETAIL_CAP)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_payterm() {
        assert_eq!(validate_payterm("30D").unwrap(), "30D");
        assert_eq!(validate_payterm("cod").unwrap(), "COD");
        assert!(validate_payterm("NET90").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(validate_date("2024-02-05").unwrap(), "2024-02-05");
        assert!(validate_date("2024-13-01").is_err());
        assert!(validate_date("02/05/2024").is_err());
    }
}
