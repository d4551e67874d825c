use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::db::get_connection;
use crate::error::Result;
use crate::pdf::{render_sales_report, report_filename};
use crate::report::get_sales_report;
use crate::settings::{db_path, get_data_dir, load_settings};

fn write_pdf(bytes: &[u8], path: &PathBuf) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    let display = format!("{}", path.display());
    println!("Wrote {display}");
    Ok(display)
}

fn default_export_path(custno: &str) -> PathBuf {
    get_data_dir().join("exports").join(report_filename(custno))
}

/// Shared build pipeline for both verbs: aggregate, short-circuit on empty,
/// render. Only the destination of the bytes differs.
fn build(custno: &str, limit: usize) -> Result<Option<Vec<u8>>> {
    let conn = get_connection(&db_path())?;
    let report = get_sales_report(&conn, custno)?;
    if report.transactions.is_empty() {
        println!(
            "{}",
            format!(
                "No sales recorded for {} ({}); nothing to export.",
                report.customer.custname, report.customer.custno
            )
            .yellow()
        );
        return Ok(None);
    }
    let settings = load_settings();
    let bytes = render_sales_report(&report.customer, &report.transactions, &settings, limit)?;
    Ok(Some(bytes))
}

pub fn sales(custno: &str, output: Option<String>, limit: usize) -> Result<()> {
    let Some(bytes) = build(custno, limit)? else {
        return Ok(());
    };
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_export_path(custno));
    write_pdf(&bytes, &path)?;
    Ok(())
}

pub fn preview(custno: &str, limit: usize) -> Result<()> {
    let Some(bytes) = build(custno, limit)? else {
        return Ok(());
    };
    let path = std::env::temp_dir().join(report_filename(custno));
    std::fs::write(&path, &bytes)?;
    open_viewer(&path);
    Ok(())
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(all(unix, not(target_os = "macos")))]
fn viewer_command(path: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

#[cfg(windows)]
fn viewer_command(path: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("cmd");
    cmd.arg("/C").arg("start").arg("").arg(path);
    cmd
}

fn open_viewer(path: &Path) {
    match viewer_command(path).status() {
        Ok(status) if status.success() => {
            println!("Opened preview {}", path.display());
        }
        _ => {
            // No viewer available; the file is still there to open by hand,
            // and `export sales --output` is the non-interactive route.
            println!("Saved preview to {}", path.display());
            println!("No viewer could be launched; open the file manually.");
        }
    }
}
