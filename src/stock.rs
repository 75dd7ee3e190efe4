// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Warehouse bins and Material Issue stock entries.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{RepairError, Result};
use crate::models::{DocStatus, StockEntry, StockEntryItem, StockLine};
use crate::store;
use crate::utils::{date_col, decimal_col, round2};

pub const MATERIAL_ISSUE: &str = "Material Issue";

pub fn bin_qty(conn: &Connection, item_code: &str, warehouse: &str) -> Result<Decimal> {
    let v: Option<String> = conn
        .query_row(
            "SELECT actual_qty FROM bins WHERE item_code=?1 AND warehouse=?2",
            params![item_code, warehouse],
            |r| r.get(0),
        )
        .optional()?;
    match v {
        Some(s) => decimal_col(&s),
        None => Ok(Decimal::ZERO),
    }
}

fn set_bin_qty(conn: &Connection, item_code: &str, warehouse: &str, qty: Decimal) -> Result<()> {
    conn.execute(
        "INSERT INTO bins(item_code, warehouse, actual_qty) VALUES (?1, ?2, ?3)
         ON CONFLICT(item_code, warehouse) DO UPDATE SET actual_qty=excluded.actual_qty",
        params![item_code, warehouse, qty.to_string()],
    )?;
    Ok(())
}

/// Add received quantity to a bin and return the new balance.
pub fn receive(conn: &Connection, item_code: &str, warehouse: &str, qty: Decimal) -> Result<Decimal> {
    if qty <= Decimal::ZERO {
        return Err(RepairError::Invalid(format!(
            "received quantity must be positive, got {}",
            qty
        )));
    }
    store::get_item(conn, item_code)?;
    let new_qty = bin_qty(conn, item_code, warehouse)? + qty;
    set_bin_qty(conn, item_code, warehouse, new_qty)?;
    Ok(new_qty)
}

pub struct IssueRequest<'a> {
    pub company: &'a str,
    pub warehouse: &'a str,
    pub cost_center: Option<&'a str>,
    pub project: Option<&'a str>,
    pub posting_date: NaiveDate,
}

/// Build, insert and submit a Material Issue for the consumed lines.
pub fn make_material_issue(
    conn: &Connection,
    req: &IssueRequest<'_>,
    lines: &[StockLine],
) -> Result<StockEntry> {
    let company = store::get_company(conn, req.company)?;
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let (item_account, _) = store::get_item(conn, &line.item_code)?;
        let expense_account = item_account.or_else(|| {
            if company.perpetual_inventory {
                company.stock_adjustment_account.clone()
            } else {
                None
            }
        });
        items.push(StockEntryItem {
            s_warehouse: req.warehouse.to_string(),
            item_code: line.item_code.clone(),
            qty: line.consumed_quantity,
            basic_rate: line.valuation_rate,
            amount: round2(line.consumed_quantity * line.valuation_rate),
            serial_no: line.serial_no.clone(),
            cost_center: req.cost_center.map(str::to_string),
            project: req.project.map(str::to_string),
            expense_account,
        });
    }

    let mut entry = StockEntry {
        name: store::next_name(conn, "MAT-STE-")?,
        stock_entry_type: MATERIAL_ISSUE.to_string(),
        company: req.company.to_string(),
        posting_date: req.posting_date,
        docstatus: DocStatus::Draft,
        items,
    };
    insert_stock_entry(conn, &entry)?;
    submit_stock_entry(conn, &mut entry)?;
    Ok(entry)
}

fn insert_stock_entry(conn: &Connection, entry: &StockEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO stock_entries(name, stock_entry_type, company, posting_date, docstatus)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.name,
            entry.stock_entry_type,
            entry.company,
            entry.posting_date.to_string(),
            entry.docstatus.as_i64()
        ],
    )?;
    for (i, it) in entry.items.iter().enumerate() {
        conn.execute(
            "INSERT INTO stock_entry_items(stock_entry, idx, s_warehouse, item_code, qty, basic_rate,
                amount, serial_no, cost_center, project, expense_account)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                entry.name,
                i as i64 + 1,
                it.s_warehouse,
                it.item_code,
                it.qty.to_string(),
                it.basic_rate.to_string(),
                it.amount.to_string(),
                it.serial_no,
                it.cost_center,
                it.project,
                it.expense_account
            ],
        )?;
    }
    Ok(())
}

fn set_docstatus(conn: &Connection, name: &str, status: DocStatus) -> Result<()> {
    conn.execute(
        "UPDATE stock_entries SET docstatus=?1 WHERE name=?2",
        params![status.as_i64(), name],
    )?;
    Ok(())
}

fn submit_stock_entry(conn: &Connection, entry: &mut StockEntry) -> Result<()> {
    for it in &entry.items {
        let available = bin_qty(conn, &it.item_code, &it.s_warehouse)?;
        if available < it.qty {
            return Err(RepairError::InsufficientStock {
                item_code: it.item_code.clone(),
                warehouse: it.s_warehouse.clone(),
                required: it.qty,
                available,
            });
        }
        set_bin_qty(conn, &it.item_code, &it.s_warehouse, available - it.qty)?;
        debug!(item = %it.item_code, warehouse = %it.s_warehouse, qty = %it.qty, "stock issued");
    }
    set_docstatus(conn, &entry.name, DocStatus::Submitted)?;
    entry.docstatus = DocStatus::Submitted;
    info!(stock_entry = %entry.name, lines = entry.items.len(), "material issue submitted");
    Ok(())
}

/// Return issued quantities to their bins and mark the entry cancelled.
pub fn cancel_stock_entry(conn: &Connection, name: &str) -> Result<()> {
    let entry = get_stock_entry(conn, name)?;
    if entry.docstatus != DocStatus::Submitted {
        return Err(RepairError::InvalidState {
            doctype: "Stock Entry",
            name: name.to_string(),
            actual: entry.docstatus.to_string(),
            expected: "Submitted",
        });
    }
    for it in &entry.items {
        let qty = bin_qty(conn, &it.item_code, &it.s_warehouse)? + it.qty;
        set_bin_qty(conn, &it.item_code, &it.s_warehouse, qty)?;
    }
    set_docstatus(conn, name, DocStatus::Cancelled)?;
    info!(stock_entry = %name, "stock entry cancelled");
    Ok(())
}

pub fn get_stock_entry(conn: &Connection, name: &str) -> Result<StockEntry> {
    let (stock_entry_type, company, posting_date, docstatus): (String, String, String, i64) = conn
        .query_row(
            "SELECT stock_entry_type, company, posting_date, docstatus FROM stock_entries WHERE name=?1",
            params![name],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?
        .ok_or_else(|| RepairError::not_found("Stock Entry", name))?;

    let mut stmt = conn.prepare(
        "SELECT s_warehouse, item_code, qty, basic_rate, amount, serial_no, cost_center, project, expense_account
         FROM stock_entry_items WHERE stock_entry=?1 ORDER BY idx",
    )?;
    let mut cur = stmt.query(params![name])?;
    let mut items = Vec::new();
    while let Some(r) = cur.next()? {
        let qty: String = r.get(2)?;
        let rate: String = r.get(3)?;
        let amount: String = r.get(4)?;
        items.push(StockEntryItem {
            s_warehouse: r.get(0)?,
            item_code: r.get(1)?,
            qty: decimal_col(&qty)?,
            basic_rate: decimal_col(&rate)?,
            amount: decimal_col(&amount)?,
            serial_no: r.get(5)?,
            cost_center: r.get(6)?,
            project: r.get(7)?,
            expense_account: r.get(8)?,
        });
    }

    Ok(StockEntry {
        name: name.to_string(),
        stock_entry_type,
        company,
        posting_date: date_col(&posting_date)?,
        docstatus: DocStatus::from_i64(docstatus)
            .ok_or_else(|| RepairError::Invalid(format!("docstatus {}", docstatus)))?,
        items,
    })
}
