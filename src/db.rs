// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Repairbook", "repairbook"));

pub const DB_ENV: &str = "REPAIRBOOK_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("repairbook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS naming_series(
        prefix TEXT PRIMARY KEY,
        current INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS companies(
        name TEXT PRIMARY KEY,
        default_expense_account TEXT,
        stock_adjustment_account TEXT,
        perpetual_inventory INTEGER NOT NULL DEFAULT 0,
        cost_center TEXT
    );

    CREATE TABLE IF NOT EXISTS asset_category_accounts(
        asset_category TEXT NOT NULL,
        company TEXT NOT NULL,
        fixed_asset_account TEXT NOT NULL,
        PRIMARY KEY(asset_category, company),
        FOREIGN KEY(company) REFERENCES companies(name) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS assets(
        name TEXT PRIMARY KEY,
        asset_category TEXT NOT NULL,
        company TEXT NOT NULL,
        gross_purchase_amount TEXT NOT NULL,
        purchase_date TEXT NOT NULL,
        calculate_depreciation INTEGER NOT NULL DEFAULT 0,
        number_of_depreciations_booked INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'Draft',
        docstatus INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY(company) REFERENCES companies(name)
    );

    CREATE TABLE IF NOT EXISTS asset_finance_books(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        asset TEXT NOT NULL,
        idx INTEGER NOT NULL,
        finance_book TEXT NOT NULL DEFAULT '',
        depreciation_method TEXT NOT NULL,
        total_number_of_depreciations INTEGER NOT NULL,
        frequency_of_depreciation INTEGER NOT NULL CHECK(frequency_of_depreciation > 0),
        depreciation_start_date TEXT NOT NULL,
        expected_value_after_useful_life TEXT NOT NULL DEFAULT '0',
        value_after_depreciation TEXT NOT NULL,
        rate_of_depreciation TEXT NOT NULL DEFAULT '0',
        UNIQUE(asset, finance_book),
        FOREIGN KEY(asset) REFERENCES assets(name) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS depreciation_schedules(
        name TEXT PRIMARY KEY,
        asset TEXT NOT NULL,
        finance_book TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL CHECK(status IN ('Draft','Active','Cancelled')),
        notes TEXT,
        expected_value_after_useful_life TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(asset) REFERENCES assets(name) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_depr_schedules_asset ON depreciation_schedules(asset, status);

    CREATE TABLE IF NOT EXISTS depreciation_schedule_rows(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        schedule TEXT NOT NULL,
        idx INTEGER NOT NULL,
        schedule_date TEXT NOT NULL,
        depreciation_amount TEXT NOT NULL,
        accumulated_depreciation_amount TEXT NOT NULL,
        FOREIGN KEY(schedule) REFERENCES depreciation_schedules(name) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS items(
        item_code TEXT PRIMARY KEY,
        expense_account TEXT,
        valuation_rate TEXT NOT NULL DEFAULT '0'
    );

    CREATE TABLE IF NOT EXISTS bins(
        item_code TEXT NOT NULL,
        warehouse TEXT NOT NULL,
        actual_qty TEXT NOT NULL,
        PRIMARY KEY(item_code, warehouse),
        FOREIGN KEY(item_code) REFERENCES items(item_code) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS stock_entries(
        name TEXT PRIMARY KEY,
        stock_entry_type TEXT NOT NULL,
        company TEXT NOT NULL,
        posting_date TEXT NOT NULL,
        docstatus INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS stock_entry_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        stock_entry TEXT NOT NULL,
        idx INTEGER NOT NULL,
        s_warehouse TEXT NOT NULL,
        item_code TEXT NOT NULL,
        qty TEXT NOT NULL,
        basic_rate TEXT NOT NULL,
        amount TEXT NOT NULL,
        serial_no TEXT,
        cost_center TEXT,
        project TEXT,
        expense_account TEXT,
        FOREIGN KEY(stock_entry) REFERENCES stock_entries(name) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS purchase_invoices(
        name TEXT PRIMARY KEY,
        company TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS purchase_invoice_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        purchase_invoice TEXT NOT NULL,
        idx INTEGER NOT NULL,
        item_code TEXT,
        expense_account TEXT NOT NULL,
        amount TEXT NOT NULL,
        FOREIGN KEY(purchase_invoice) REFERENCES purchase_invoices(name) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS gl_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        posting_date TEXT NOT NULL,
        account TEXT NOT NULL,
        debit TEXT NOT NULL,
        credit TEXT NOT NULL,
        against TEXT NOT NULL,
        voucher_type TEXT NOT NULL,
        voucher_no TEXT NOT NULL,
        against_voucher_type TEXT,
        against_voucher TEXT,
        cost_center TEXT,
        company TEXT NOT NULL,
        is_cancelled INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_gl_entries_voucher ON gl_entries(voucher_type, voucher_no);

    CREATE TABLE IF NOT EXISTS asset_repairs(
        name TEXT PRIMARY KEY,
        asset TEXT NOT NULL,
        company TEXT NOT NULL,
        repair_status TEXT NOT NULL CHECK(repair_status IN ('Pending','Completed')),
        failure_date TEXT,
        completion_date TEXT,
        downtime TEXT,
        repair_cost TEXT NOT NULL DEFAULT '0',
        purchase_invoice TEXT,
        warehouse TEXT,
        cost_center TEXT,
        project TEXT,
        stock_consumption INTEGER NOT NULL DEFAULT 0,
        capitalize_repair_cost INTEGER NOT NULL DEFAULT 0,
        increase_in_asset_life INTEGER NOT NULL DEFAULT 0,
        stock_entry TEXT,
        total_repair_cost TEXT NOT NULL DEFAULT '0',
        description TEXT,
        docstatus INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS asset_repair_stock_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        repair TEXT NOT NULL,
        idx INTEGER NOT NULL,
        item_code TEXT NOT NULL,
        valuation_rate TEXT NOT NULL,
        consumed_quantity TEXT NOT NULL,
        serial_no TEXT,
        total_value TEXT NOT NULL,
        FOREIGN KEY(repair) REFERENCES asset_repairs(name) ON DELETE CASCADE
    );
    "#,
    )
}
