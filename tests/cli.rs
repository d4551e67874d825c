use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// Build a command with settings isolated under a temp config dir.
fn rolodex(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rolodex").unwrap();
    cmd.env("ROLODEX_CONFIG_DIR", config_dir);
    cmd
}

/// init + demo into a fresh temp workspace; returns the tempdir guard.
fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config");
    let data = dir.path().join("data");
    rolodex(&config)
        .args(["init", "--data-dir"])
        .arg(&data)
        .args(["--company-name", "Rolodex Trading"])
        .args(["--company-phone", "(555) 123-4567"])
        .assert()
        .success();
    rolodex(&config).arg("demo").assert().success();
    dir
}

fn config_of(dir: &tempfile::TempDir) -> std::path::PathBuf {
    dir.path().join("config")
}

#[test]
fn test_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config");
    let data = dir.path().join("data");
    rolodex(&config)
        .args(["init", "--data-dir"])
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));
    assert!(data.join("rolodex.db").exists());
}

#[test]
fn test_demo_then_listings() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["customers", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Hardware"))
        .stdout(predicate::str::contains("Granite Peak Prospects"));
    rolodex(&config)
        .args(["products", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hex bolts 10mm"));
    rolodex(&config)
        .args(["sales", "list", "--customer", "C0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T0001"));
}

#[test]
fn test_demo_refuses_seeded_database() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .arg("demo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty database"));
}

#[test]
fn test_customer_crud_roundtrip() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["customers", "add", "C9000", "Test Outfitters", "--payterm", "cod"])
        .assert()
        .success();
    rolodex(&config)
        .args(["customers", "show", "C9000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test Outfitters"))
        .stdout(predicate::str::contains("COD"));
    rolodex(&config)
        .args(["customers", "update", "C9000", "--name", "Test & Co."])
        .assert()
        .success();
    rolodex(&config)
        .args(["customers", "remove", "C9000"])
        .assert()
        .success();
    rolodex(&config)
        .args(["customers", "show", "C9000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown customer"));
}

#[test]
fn test_customer_with_sales_cannot_be_removed() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["customers", "remove", "C0001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("recorded sales"));
}

#[test]
fn test_invalid_payterm_rejected() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["customers", "add", "C9001", "Bad Terms Inc.", "--payterm", "NET90"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid payment term"));
}

#[test]
fn test_set_price_and_history() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["products", "set-price", "P001", "13.75", "--effective", "2026-01-01"])
        .assert()
        .success();
    rolodex(&config)
        .args(["products", "show", "P001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$13.75"))
        .stdout(predicate::str::contains("$10.00"));
    rolodex(&config)
        .args(["products", "set-price", "P001", "13.75", "--effective", "01/01/2026"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
    rolodex(&config)
        .args(["products", "set-price", "NOPE", "1.00", "--effective", "2026-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown product"));
}

#[test]
fn test_terminal_report() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["report", "sales", "C0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Customer Sales Report"))
        .stdout(predicate::str::contains("Sales Transactions"))
        .stdout(predicate::str::contains("Transaction Details"));
}

#[test]
fn test_report_unknown_customer_fails() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["report", "sales", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown customer: NOPE"));
}

#[test]
fn test_report_empty_customer_is_informational() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["report", "sales", "C0007"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No sales recorded"));
}

#[test]
fn test_export_writes_pdf() {
    let dir = setup();
    let config = config_of(&dir);
    let out = dir.path().join("c0001.pdf");
    rolodex(&config)
        .args(["export", "sales", "C0001", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_export_empty_customer_writes_nothing() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["customers", "add", "C-9/x", "Odd Id Corp"])
        .assert()
        .success();
    // No sales yet: export reports the empty outcome and writes nothing.
    rolodex(&config)
        .args(["export", "sales", "C-9/x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to export"));
    let exports = dir.path().join("data").join("exports");
    assert!(!exports.exists());
}

#[test]
fn test_export_respects_limit() {
    let dir = setup();
    let config = config_of(&dir);
    let out = dir.path().join("limited.pdf");
    rolodex(&config)
        .args(["export", "sales", "C0001", "--limit", "3", "--output"])
        .arg(&out)
        .assert()
        .success();
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_export_unknown_customer_fails_before_rendering() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["export", "sales", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown customer"));
}

#[test]
fn test_sales_show_prices_as_of_sale_date() {
    let dir = setup();
    let config = config_of(&dir);
    rolodex(&config)
        .args(["sales", "show", "T0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transaction #T0001"));
    rolodex(&config)
        .args(["sales", "show", "T9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown transaction"));
}
