// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use repairbook::models::{
    Asset, AssetStatus, Company, DepreciationMethod, DocStatus, FinanceBookRow, PurchaseInvoice,
    PurchaseInvoiceItem, RepairRecord, RepairStatus, StockLine,
};
use repairbook::{commands, db, repair, stock, store};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub const ASSET: &str = "AST-0001";
pub const COMPANY: &str = "Acme";
pub const WAREHOUSE: &str = "Stores";
pub const INVOICE: &str = "PINV-0001";
pub const FIXED_ASSET_ACCOUNT: &str = "Plant & Machinery";

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    ymd(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn posting_date() -> NaiveDate {
    ymd(2025, 6, 30)
}

pub fn book(method: DepreciationMethod, total: i64, freq: i64, value: Decimal) -> FinanceBookRow {
    FinanceBookRow {
        idx: 1,
        finance_book: None,
        depreciation_method: method,
        total_number_of_depreciations: total,
        frequency_of_depreciation: freq,
        depreciation_start_date: ymd(2021, 1, 1),
        expected_value_after_useful_life: Decimal::ZERO,
        value_after_depreciation: value,
        rate_of_depreciation: Decimal::from(40),
    }
}

/// Company, category account, stocked item and a purchase invoice; no asset yet.
pub fn base() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    store::upsert_company(
        &conn,
        &Company {
            name: COMPANY.into(),
            default_expense_account: Some("Repairs Expense".into()),
            stock_adjustment_account: Some("Stock Adjustment".into()),
            perpetual_inventory: false,
            cost_center: Some("Main".into()),
        },
    )
    .unwrap();
    store::set_asset_category_account(&conn, "Machinery", COMPANY, FIXED_ASSET_ACCOUNT).unwrap();
    store::upsert_item(&conn, "BOLT", Some("Spare Parts Expense"), dec("2.50")).unwrap();
    store::upsert_item(&conn, "GASKET", None, dec("7.25")).unwrap();
    stock::receive(&conn, "BOLT", WAREHOUSE, Decimal::from(100)).unwrap();
    stock::receive(&conn, "GASKET", WAREHOUSE, Decimal::from(10)).unwrap();
    store::insert_purchase_invoice(
        &conn,
        &PurchaseInvoice {
            name: INVOICE.into(),
            company: COMPANY.into(),
            items: vec![PurchaseInvoiceItem {
                item_code: None,
                expense_account: "Repairs Expense".into(),
                amount: Decimal::from(100),
            }],
        },
    )
    .unwrap();
    conn
}

pub fn add_asset(conn: &mut Connection, books: Vec<FinanceBookRow>) {
    let asset = Asset {
        name: ASSET.into(),
        asset_category: "Machinery".into(),
        company: COMPANY.into(),
        gross_purchase_amount: Decimal::from(10000),
        purchase_date: ymd(2020, 12, 1),
        calculate_depreciation: !books.is_empty(),
        number_of_depreciations_booked: 0,
        status: AssetStatus::Draft,
        docstatus: DocStatus::Draft,
        finance_books: books,
    };
    store::save_asset(conn, &asset).unwrap();
    commands::assets::submit(conn, ASSET).unwrap();
}

/// `base()` plus a submitted straight-line asset: 5 yearly depreciations of 10000.
pub fn world() -> Connection {
    let mut conn = base();
    add_asset(
        &mut conn,
        vec![book(DepreciationMethod::StraightLine, 5, 12, Decimal::from(10000))],
    );
    conn
}

/// Save a completed repair built by `f` and return its name.
pub fn completed_repair(conn: &Connection, f: impl FnOnce(&mut RepairRecord)) -> String {
    let mut r = RepairRecord::new(ASSET, COMPANY);
    r.repair_status = RepairStatus::Completed;
    r.cost_center = Some("Main".into());
    f(&mut r);
    repair::save(conn, &mut r).unwrap();
    r.name
}

pub fn bolts(qty: i64) -> StockLine {
    StockLine::new("BOLT", dec("2.50"), Decimal::from(qty))
}

pub fn asset_value(conn: &Connection) -> Decimal {
    store::get_asset(conn, ASSET).unwrap().finance_books[0].value_after_depreciation
}
