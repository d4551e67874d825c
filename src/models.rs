#[derive(Debug, Clone)]
pub struct Customer {
    pub custno: String,
    pub custname: String,
    pub address: Option<String>,
    pub payterm: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub prodcode: String,
    pub description: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PriceHistEntry {
    pub effdate: String,
    pub unitprice: f64,
}
