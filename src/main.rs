mod cli;
mod db;
mod error;
mod fmt;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod report;
mod settings;

use clap::Parser;

#[cfg(feature = "pdf")]
use cli::ExportCommands;
use cli::{Cli, Commands, CustomersCommands, ProductsCommands, ReportCommands, SalesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            company_name,
            company_address,
            company_phone,
        } => cli::init::run(data_dir, company_name, company_address, company_phone),
        Commands::Customers { command } => match command {
            CustomersCommands::Add {
                custno,
                custname,
                address,
                payterm,
            } => cli::customers::add(&custno, &custname, address.as_deref(), payterm.as_deref()),
            CustomersCommands::List => cli::customers::list(),
            CustomersCommands::Show { custno } => cli::customers::show(&custno),
            CustomersCommands::Update {
                custno,
                name,
                address,
                payterm,
            } => cli::customers::update(&custno, name.as_deref(), address.as_deref(), payterm.as_deref()),
            CustomersCommands::Remove { custno } => cli::customers::remove(&custno),
        },
        Commands::Products { command } => match command {
            ProductsCommands::Add {
                prodcode,
                description,
                unit,
            } => cli::products::add(&prodcode, &description, unit.as_deref()),
            ProductsCommands::List => cli::products::list(),
            ProductsCommands::Show { prodcode } => cli::products::show(&prodcode),
            ProductsCommands::Update {
                prodcode,
                description,
                unit,
            } => cli::products::update(&prodcode, description.as_deref(), unit.as_deref()),
            ProductsCommands::Remove { prodcode } => cli::products::remove(&prodcode),
            ProductsCommands::SetPrice {
                prodcode,
                price,
                effective,
            } => cli::products::set_price(&prodcode, price, &effective),
        },
        Commands::Sales { command } => match command {
            SalesCommands::List { customer } => cli::sales::list(customer.as_deref()),
            SalesCommands::Show { transno } => cli::sales::show(&transno),
        },
        Commands::Report { command } => match command {
            ReportCommands::Sales { custno } => cli::report::sales(&custno),
        },
        #[cfg(feature = "pdf")]
        Commands::Export { command } => match command {
            ExportCommands::Sales {
                custno,
                output,
                limit,
            } => cli::export::sales(&custno, output, limit),
            ExportCommands::Preview { custno, limit } => cli::export::preview(&custno, limit),
        },
        Commands::Demo => cli::demo::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
