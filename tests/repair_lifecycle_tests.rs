// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::*;
use repairbook::models::{
    AssetStatus, Company, DepreciationMethod, DocStatus, RepairRecord, ScheduleStatus,
};
use repairbook::repair::VOUCHER_TYPE;
use repairbook::{RepairError, gl, repair, schedule, stock, store};
use rust_decimal::Decimal;

fn gl_net(conn: &rusqlite::Connection, voucher: &str) -> (Decimal, Decimal) {
    gl::totals(&gl::get_gl_entries_for_voucher(conn, VOUCHER_TYPE, voucher).unwrap())
}

#[test]
fn pending_repair_puts_asset_out_of_order_and_cannot_submit() {
    let mut conn = world();
    let mut r = RepairRecord::new(ASSET, COMPANY);
    r.repair_cost = Decimal::from(100);
    r.capitalize_repair_cost = true;
    r.purchase_invoice = Some(INVOICE.into());
    repair::save(&conn, &mut r).unwrap();
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().status,
        AssetStatus::OutOfOrder
    );

    let err = repair::submit(&mut conn, &r.name, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::RepairStatusPending));
    assert_eq!(err.to_string(), "Please update Repair Status.");
    assert_eq!(asset_value(&conn), Decimal::from(10000));
    assert!(gl::list_gl_entries(&conn, None).unwrap().is_empty());
}

#[test]
fn completing_repair_lets_asset_recompute_status() {
    let conn = world();
    let mut r = RepairRecord::new(ASSET, COMPANY);
    repair::save(&conn, &mut r).unwrap();
    r.repair_status = repairbook::models::RepairStatus::Completed;
    repair::save(&conn, &mut r).unwrap();
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().status,
        AssetStatus::Submitted
    );
}

#[test]
fn capitalized_cost_adds_to_every_book_and_posts_balanced_pair() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
        r.purchase_invoice = Some(INVOICE.into());
    });
    let submitted = repair::submit(&mut conn, &name, posting_date()).unwrap();
    assert_eq!(submitted.docstatus, DocStatus::Submitted);
    assert_eq!(asset_value(&conn), Decimal::from(10100));

    let entries = gl::get_gl_entries_for_voucher(&conn, VOUCHER_TYPE, &name).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].account, FIXED_ASSET_ACCOUNT);
    assert_eq!(entries[0].debit, Decimal::from(100));
    assert_eq!(entries[0].against, "Repairs Expense");
    assert_eq!(entries[0].against_voucher.as_deref(), Some(INVOICE));
    assert_eq!(entries[1].account, "Repairs Expense");
    assert_eq!(entries[1].credit, Decimal::from(100));
    assert!(entries.iter().all(|e| e.posting_date == posting_date()));
    assert!(entries.iter().all(|e| e.cost_center.as_deref() == Some("Main")));

    let sched = schedule::get_asset_depr_schedule_doc(&conn, ASSET, ScheduleStatus::Active, None)
        .unwrap()
        .unwrap();
    assert!(sched.notes.unwrap().contains(&name));
    assert_eq!(sched.rows.last().unwrap().accumulated_depreciation_amount, Decimal::from(10100));
}

#[test]
fn neither_flag_leaves_asset_and_ledger_untouched() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(250);
        r.purchase_invoice = Some(INVOICE.into());
    });
    let submitted = repair::submit(&mut conn, &name, posting_date()).unwrap();
    assert_eq!(submitted.total_repair_cost, Decimal::from(250));
    assert_eq!(asset_value(&conn), Decimal::from(10000));
    assert!(gl::list_gl_entries(&conn, None).unwrap().is_empty());
}

#[test]
fn stock_consumption_needs_items_then_warehouse() {
    let mut conn = world();
    let no_items = completed_repair(&conn, |r| {
        r.stock_consumption = true;
        r.warehouse = Some(WAREHOUSE.into());
    });
    let err = repair::submit(&mut conn, &no_items, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::MissingItems));

    let no_warehouse = completed_repair(&conn, |r| {
        r.stock_consumption = true;
        r.stock_items.push(bolts(2));
    });
    let err = repair::submit(&mut conn, &no_warehouse, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::MissingWarehouse));
    assert_eq!(
        stock::bin_qty(&conn, "BOLT", WAREHOUSE).unwrap(),
        Decimal::from(100)
    );
}

#[test]
fn consumed_stock_is_issued_capitalized_and_reversed_on_cancel() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
        r.purchase_invoice = Some(INVOICE.into());
        r.stock_consumption = true;
        r.warehouse = Some(WAREHOUSE.into());
        r.stock_items.push(bolts(4));
    });
    let r = repair::submit(&mut conn, &name, posting_date()).unwrap();
    assert_eq!(r.total_repair_cost, Decimal::from(110));
    assert_eq!(asset_value(&conn), Decimal::from(10110));
    assert_eq!(
        stock::bin_qty(&conn, "BOLT", WAREHOUSE).unwrap(),
        Decimal::from(96)
    );

    let se_name = r.stock_entry.clone().unwrap();
    let se = stock::get_stock_entry(&conn, &se_name).unwrap();
    assert_eq!(se.stock_entry_type, "Material Issue");
    assert_eq!(se.items[0].amount, Decimal::from(10));

    let entries = gl::get_gl_entries_for_voucher(&conn, VOUCHER_TYPE, &name).unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[2].account, "Spare Parts Expense");
    assert_eq!(entries[2].credit, Decimal::from(10));
    assert_eq!(entries[3].account, FIXED_ASSET_ACCOUNT);
    assert_eq!(entries[3].against_voucher.as_deref(), Some(se_name.as_str()));
    let (debit, credit) = gl_net(&conn, &name);
    assert_eq!(debit, credit);

    let cancelled = repair::cancel(&mut conn, &name, posting_date()).unwrap();
    assert_eq!(cancelled.docstatus, DocStatus::Cancelled);
    assert!(cancelled.stock_entry.is_none());
    assert_eq!(asset_value(&conn), Decimal::from(10000));
    assert_eq!(
        stock::bin_qty(&conn, "BOLT", WAREHOUSE).unwrap(),
        Decimal::from(100)
    );
    assert_eq!(
        stock::get_stock_entry(&conn, &se_name).unwrap().docstatus,
        DocStatus::Cancelled
    );

    let entries = gl::get_gl_entries_for_voucher(&conn, VOUCHER_TYPE, &name).unwrap();
    assert_eq!(entries.len(), 8);
    assert!(entries.iter().all(|e| e.is_cancelled));
    let mut by_account = std::collections::BTreeMap::<String, Decimal>::new();
    for e in &entries {
        *by_account.entry(e.account.clone()).or_default() += e.debit - e.credit;
    }
    assert!(by_account.values().all(|v| v.is_zero()));
}

#[test]
fn perpetual_inventory_falls_back_to_stock_adjustment_account() {
    let mut conn = world();
    let mut company = store::get_company(&conn, COMPANY).unwrap();
    company.perpetual_inventory = true;
    store::upsert_company(&conn, &company).unwrap();

    let name = completed_repair(&conn, |r| {
        r.capitalize_repair_cost = true;
        r.stock_consumption = true;
        r.warehouse = Some(WAREHOUSE.into());
        r.stock_items
            .push(repairbook::models::StockLine::new("GASKET", dec("7.25"), Decimal::from(2)));
    });
    repair::submit(&mut conn, &name, posting_date()).unwrap();
    let entries = gl::get_gl_entries_for_voucher(&conn, VOUCHER_TYPE, &name).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].account, "Stock Adjustment");
    assert_eq!(entries[0].credit, dec("14.50"));
}

#[test]
fn missing_default_expense_account_rolls_back_everything() {
    let mut conn = world();
    store::upsert_company(
        &conn,
        &Company {
            name: COMPANY.into(),
            default_expense_account: None,
            stock_adjustment_account: None,
            perpetual_inventory: false,
            cost_center: None,
        },
    )
    .unwrap();
    let name = completed_repair(&conn, |r| {
        r.capitalize_repair_cost = true;
        r.stock_consumption = true;
        r.warehouse = Some(WAREHOUSE.into());
        r.stock_items
            .push(repairbook::models::StockLine::new("GASKET", dec("7.25"), Decimal::from(2)));
    });
    let err = repair::submit(&mut conn, &name, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::MissingDefaultExpenseAccount(ref c) if c == COMPANY));

    assert_eq!(
        stock::bin_qty(&conn, "GASKET", WAREHOUSE).unwrap(),
        Decimal::from(10)
    );
    assert_eq!(asset_value(&conn), Decimal::from(10000));
    assert_eq!(
        repair::get_repair(&conn, &name).unwrap().docstatus,
        DocStatus::Draft
    );
}

#[test]
fn insufficient_stock_aborts_submission() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.stock_consumption = true;
        r.warehouse = Some(WAREHOUSE.into());
        r.stock_items.push(bolts(101));
    });
    let err = repair::submit(&mut conn, &name, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::InsufficientStock { .. }));
    assert_eq!(asset_value(&conn), Decimal::from(10000));
}

#[test]
fn life_increase_extends_schedule_and_cancel_restores_count() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
        r.purchase_invoice = Some(INVOICE.into());
        r.increase_in_asset_life = 14;
    });
    repair::submit(&mut conn, &name, posting_date()).unwrap();
    let asset = store::get_asset(&conn, ASSET).unwrap();
    assert_eq!(asset.finance_books[0].total_number_of_depreciations, 6);
    let rows = schedule::get_depr_schedule(&conn, ASSET, ScheduleStatus::Active, None).unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows.last().unwrap().schedule_date, ymd(2026, 1, 1));

    repair::cancel(&mut conn, &name, posting_date()).unwrap();
    let asset = store::get_asset(&conn, ASSET).unwrap();
    assert_eq!(asset.finance_books[0].total_number_of_depreciations, 5);
    let rows = schedule::get_depr_schedule(&conn, ASSET, ScheduleStatus::Active, None).unwrap();
    assert_eq!(rows.len(), 5);
    // 2026-01-01 less the two left-over months
    assert_eq!(rows.last().unwrap().schedule_date, ymd(2025, 11, 1));
    assert_eq!(asset_value(&conn), Decimal::from(10000));
}

#[test]
fn short_life_increase_moves_final_date_only() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
        r.purchase_invoice = Some(INVOICE.into());
        r.increase_in_asset_life = 2;
    });
    repair::submit(&mut conn, &name, posting_date()).unwrap();
    let asset = store::get_asset(&conn, ASSET).unwrap();
    assert_eq!(asset.finance_books[0].total_number_of_depreciations, 5);
    let rows = schedule::get_depr_schedule(&conn, ASSET, ScheduleStatus::Active, None).unwrap();
    assert_eq!(rows.last().unwrap().schedule_date, ymd(2025, 3, 1));

    repair::cancel(&mut conn, &name, posting_date()).unwrap();
    let rows = schedule::get_depr_schedule(&conn, ASSET, ScheduleStatus::Active, None).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows.last().unwrap().schedule_date, ymd(2025, 1, 1));
}

#[test]
fn declining_balance_residual_is_read_from_schedule() {
    let mut conn = base();
    add_asset(
        &mut conn,
        vec![book(DepreciationMethod::WrittenDownValue, 3, 12, Decimal::from(1000))],
    );
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
        r.purchase_invoice = Some(INVOICE.into());
    });
    repair::submit(&mut conn, &name, posting_date()).unwrap();

    // 1100 at 40%: 440 + 264 + 158.40 = 862.40
    let asset = store::get_asset(&conn, ASSET).unwrap();
    assert_eq!(
        asset.finance_books[0].expected_value_after_useful_life,
        dec("237.60")
    );
    let sched = schedule::get_asset_depr_schedule_doc(&conn, ASSET, ScheduleStatus::Active, None)
        .unwrap()
        .unwrap();
    assert_eq!(sched.expected_value_after_useful_life, dec("237.60"));
}

#[test]
fn only_submitted_repairs_cancel_and_only_drafts_edit() {
    let mut conn = world();
    let name = completed_repair(&conn, |_| {});
    let err = repair::cancel(&mut conn, &name, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::InvalidState { .. }));

    let mut r = repair::submit(&mut conn, &name, posting_date()).unwrap();
    r.docstatus = DocStatus::Draft;
    assert!(matches!(
        repair::save(&conn, &mut r).unwrap_err(),
        RepairError::InvalidState { .. }
    ));
    assert!(repair::delete(&conn, &name).is_err());
}

#[test]
fn deleting_pending_repair_restores_asset_status() {
    let conn = world();
    let mut r = RepairRecord::new(ASSET, COMPANY);
    repair::save(&conn, &mut r).unwrap();
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().status,
        AssetStatus::OutOfOrder
    );
    repair::delete(&conn, &r.name).unwrap();
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().status,
        AssetStatus::Submitted
    );
    assert!(matches!(
        repair::get_repair(&conn, &r.name).unwrap_err(),
        RepairError::NotFound { .. }
    ));
}

#[test]
fn downtime_is_hours_rounded_to_two_places() {
    let mut r = RepairRecord::new(ASSET, COMPANY);
    r.failure_date = Some(at(2025, 1, 1, 8, 0));
    r.completion_date = Some(at(2025, 1, 2, 10, 20));
    let conn = world();
    repair::save(&conn, &mut r).unwrap();
    assert_eq!(r.downtime, Some(dec("26.33")));
    assert_eq!(
        repair::get_repair(&conn, &r.name).unwrap().downtime,
        Some(dec("26.33"))
    );
}

#[test]
fn oversized_life_increase_is_rejected_without_side_effects() {
    let mut conn = world();
    let mut r = RepairRecord::new(ASSET, COMPANY);
    r.repair_status = repairbook::models::RepairStatus::Completed;
    r.increase_in_asset_life = repair::MAX_LIFE_INCREASE_MONTHS + 1;
    assert!(matches!(
        repair::save(&conn, &mut r).unwrap_err(),
        RepairError::Invalid(_)
    ));

    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
        r.purchase_invoice = Some(INVOICE.into());
    });
    conn.execute(
        "UPDATE asset_repairs SET increase_in_asset_life=?1 WHERE name=?2",
        rusqlite::params![i64::MAX, name],
    )
    .unwrap();
    let err = repair::submit(&mut conn, &name, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::Invalid(_)));
    assert_eq!(asset_value(&conn), Decimal::from(10000));
    assert!(gl::list_gl_entries(&conn, None).unwrap().is_empty());
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().finance_books[0].total_number_of_depreciations,
        5
    );
}

#[test]
fn longest_accepted_life_increase_submits() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.capitalize_repair_cost = true;
        r.increase_in_asset_life = repair::MAX_LIFE_INCREASE_MONTHS;
    });
    repair::submit(&mut conn, &name, posting_date()).unwrap();
    let asset = store::get_asset(&conn, ASSET).unwrap();
    assert_eq!(asset.finance_books[0].total_number_of_depreciations, 105);
}

#[test]
fn asset_with_bad_depreciation_counts_is_not_saved() {
    let conn = base();
    let mut asset = repairbook::models::Asset {
        name: ASSET.into(),
        asset_category: "Machinery".into(),
        company: COMPANY.into(),
        gross_purchase_amount: Decimal::from(10000),
        purchase_date: ymd(2020, 12, 1),
        calculate_depreciation: true,
        number_of_depreciations_booked: -1,
        status: AssetStatus::Draft,
        docstatus: DocStatus::Draft,
        finance_books: vec![book(
            DepreciationMethod::DoubleDecliningBalance,
            0,
            12,
            Decimal::from(10000),
        )],
    };
    assert!(matches!(
        store::save_asset(&conn, &asset).unwrap_err(),
        RepairError::Invalid(_)
    ));
    asset.number_of_depreciations_booked = 0;
    assert!(matches!(
        store::save_asset(&conn, &asset).unwrap_err(),
        RepairError::Invalid(_)
    ));
    assert!(matches!(
        store::get_asset(&conn, ASSET).unwrap_err(),
        RepairError::NotFound { .. }
    ));

    asset.finance_books[0].total_number_of_depreciations = 4;
    store::save_asset(&conn, &asset).unwrap();
}

#[test]
fn capitalizing_a_fully_depreciated_asset_refreshes_its_status() {
    let mut conn = base();
    add_asset(
        &mut conn,
        vec![book(DepreciationMethod::StraightLine, 5, 12, Decimal::ZERO)],
    );
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().status,
        AssetStatus::FullyDepreciated
    );
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
        r.purchase_invoice = Some(INVOICE.into());
    });

    repair::submit(&mut conn, &name, posting_date()).unwrap();
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().status,
        AssetStatus::PartiallyDepreciated
    );

    repair::cancel(&mut conn, &name, posting_date()).unwrap();
    assert_eq!(
        store::get_asset(&conn, ASSET).unwrap().status,
        AssetStatus::FullyDepreciated
    );
}

#[test]
fn capitalized_cost_without_invoice_names_the_repair() {
    let mut conn = world();
    let name = completed_repair(&conn, |r| {
        r.repair_cost = Decimal::from(100);
        r.capitalize_repair_cost = true;
    });
    let err = repair::submit(&mut conn, &name, posting_date()).unwrap_err();
    assert!(matches!(err, RepairError::Invalid(_)));
    assert_eq!(
        err.to_string(),
        format!("Invalid value: repair {} has no purchase invoice", name)
    );
}
