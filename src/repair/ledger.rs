// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! GL entries for capitalized repair cost and consumed stock.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::{RepairError, Result};
use crate::gl;
use crate::models::{GlEntry, RepairRecord};
use crate::repair::VOUCHER_TYPE;
use crate::{stock, store};

fn entry(repair: &RepairRecord, posting_date: NaiveDate, account: &str, against: &str) -> GlEntry {
    GlEntry {
        posting_date,
        account: account.to_string(),
        debit: Decimal::ZERO,
        credit: Decimal::ZERO,
        against: against.to_string(),
        voucher_type: VOUCHER_TYPE.to_string(),
        voucher_no: repair.name.clone(),
        against_voucher_type: None,
        against_voucher: None,
        cost_center: repair.cost_center.clone(),
        company: repair.company.clone(),
        is_cancelled: false,
    }
}

pub fn get_gl_entries(
    conn: &Connection,
    repair: &RepairRecord,
    posting_date: NaiveDate,
) -> Result<Vec<GlEntry>> {
    let mut gl_entries = Vec::new();
    let fixed_asset_account = store::get_asset_account(conn, &repair.asset, &repair.company)?;
    get_gl_entries_for_repair_cost(conn, repair, posting_date, &fixed_asset_account, &mut gl_entries)?;
    get_gl_entries_for_consumed_items(
        conn,
        repair,
        posting_date,
        &fixed_asset_account,
        &mut gl_entries,
    )?;
    Ok(gl_entries)
}

fn get_gl_entries_for_repair_cost(
    conn: &Connection,
    repair: &RepairRecord,
    posting_date: NaiveDate,
    fixed_asset_account: &str,
    gl_entries: &mut Vec<GlEntry>,
) -> Result<()> {
    if repair.repair_cost <= Decimal::ZERO {
        return Ok(());
    }
    let invoice_name = repair
        .purchase_invoice
        .as_deref()
        .ok_or_else(|| {
            RepairError::Invalid(format!("repair {} has no purchase invoice", repair.name))
        })?;
    let invoice = store::get_purchase_invoice(conn, invoice_name)?;
    let pi_expense_account = invoice
        .items
        .first()
        .map(|i| i.expense_account.clone())
        .ok_or_else(|| {
            RepairError::Invalid(format!("Purchase Invoice '{}' has no items", invoice_name))
        })?;

    gl_entries.push(GlEntry {
        debit: repair.repair_cost,
        against_voucher_type: Some("Purchase Invoice".to_string()),
        against_voucher: Some(invoice_name.to_string()),
        ..entry(repair, posting_date, fixed_asset_account, &pi_expense_account)
    });
    gl_entries.push(GlEntry {
        credit: repair.repair_cost,
        ..entry(repair, posting_date, &pi_expense_account, fixed_asset_account)
    });
    Ok(())
}

fn get_gl_entries_for_consumed_items(
    conn: &Connection,
    repair: &RepairRecord,
    posting_date: NaiveDate,
    fixed_asset_account: &str,
    gl_entries: &mut Vec<GlEntry>,
) -> Result<()> {
    if !(repair.stock_consumption && !repair.stock_items.is_empty()) {
        return Ok(());
    }

    // one pair per line of the stock entry raised for this repair
    let stock_entry_name = repair
        .stock_entry
        .as_deref()
        .ok_or_else(|| {
            RepairError::Invalid(format!("repair {} has no stock entry", repair.name))
        })?;
    let stock_entry = stock::get_stock_entry(conn, stock_entry_name)?;

    let mut default_expense_account = None;
    if !store::is_perpetual_inventory_enabled(conn, &repair.company)? {
        let company = store::get_company(conn, &repair.company)?;
        default_expense_account = Some(
            company
                .default_expense_account
                .ok_or_else(|| RepairError::MissingDefaultExpenseAccount(repair.company.clone()))?,
        );
    }

    for item in &stock_entry.items {
        if item.amount <= Decimal::ZERO {
            continue;
        }
        let expense_account = item
            .expense_account
            .clone()
            .or_else(|| default_expense_account.clone())
            .ok_or_else(|| RepairError::MissingDefaultExpenseAccount(repair.company.clone()))?;

        gl_entries.push(GlEntry {
            credit: item.amount,
            ..entry(repair, posting_date, &expense_account, fixed_asset_account)
        });
        gl_entries.push(GlEntry {
            debit: item.amount,
            against_voucher_type: Some("Stock Entry".to_string()),
            against_voucher: Some(stock_entry_name.to_string()),
            ..entry(repair, posting_date, fixed_asset_account, &expense_account)
        });
    }
    Ok(())
}

/// Post the repair's entries, or reverse the posted ones when `cancel` is set.
pub fn make_gl_entries(
    conn: &Connection,
    repair: &RepairRecord,
    posting_date: NaiveDate,
    cancel: bool,
) -> Result<()> {
    if repair.total_repair_cost <= Decimal::ZERO {
        return Ok(());
    }
    if cancel {
        return gl::make_reverse_gl_entries(conn, VOUCHER_TYPE, &repair.name);
    }
    let gl_entries = get_gl_entries(conn, repair, posting_date)?;
    gl::make_gl_entries(conn, &gl_entries, false)
}
