use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(
    data_dir: Option<String>,
    company_name: Option<String>,
    company_address: Option<String>,
    company_phone: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(name) = company_name {
        settings.company_name = name;
    }
    if let Some(address) = company_address {
        settings.company_address = address;
    }
    if let Some(phone) = company_phone {
        settings.company_phone = phone;
    }

    let dir = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("rolodex.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized {}", db_path.display());
    if settings.company_name.is_empty() {
        println!("Tip: set --company-name to brand exported PDF reports.");
    }
    Ok(())
}
