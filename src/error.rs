use thiserror::Error;

#[derive(Error, Debug)]
pub enum RolodexError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown customer: {0}")]
    CustomerNotFound(String),

    #[error("Unknown product: {0}")]
    ProductNotFound(String),

    #[error("Unknown transaction: {0}")]
    SaleNotFound(String),

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid payment term '{0}' (expected one of: 30D, 45D, COD)")]
    InvalidPayTerm(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RolodexError>;
