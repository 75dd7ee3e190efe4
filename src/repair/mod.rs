// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Asset Repair lifecycle: validate, save, submit, cancel and delete.
//!
//! Submitting a completed repair may capitalize its cost into the asset, issue
//! the consumed stock, post GL entries and stretch the depreciation schedule.
//! Cancelling undoes each of those steps. Submit and cancel each run in a
//! single transaction, so a failed validation leaves nothing behind.

pub mod adjuster;
pub mod ledger;
pub mod valuation;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{RepairError, Result};
use crate::models::{Asset, AssetStatus, DocStatus, RepairRecord, RepairStatus, StockLine};
use crate::schedule::{self, ScheduleEndDate};
use crate::stock::{self, IssueRequest};
use crate::store;
use crate::utils::{datetime_col, datetime_to_col, decimal_col};

pub const VOUCHER_TYPE: &str = "Asset Repair";
const NAMING_SERIES: &str = "ACC-ASR-";

/// Largest accepted increase in asset life: 100 years.
pub const MAX_LIFE_INCREASE_MONTHS: i64 = 1200;

/// Hours between failure and completion, rounded to 2 places.
pub fn get_downtime(failure_date: NaiveDateTime, completion_date: NaiveDateTime) -> Decimal {
    let seconds = (completion_date - failure_date).num_seconds();
    (Decimal::from(seconds) / Decimal::from(3600)).round_dp(2)
}

pub fn validate(conn: &Connection, repair: &mut RepairRecord) -> Result<()> {
    if repair.repair_cost < Decimal::ZERO {
        return Err(RepairError::Invalid("repair cost cannot be negative".into()));
    }
    if repair.increase_in_asset_life < 0 {
        return Err(RepairError::Invalid(
            "increase in asset life cannot be negative".into(),
        ));
    }
    if repair.increase_in_asset_life > MAX_LIFE_INCREASE_MONTHS {
        return Err(RepairError::Invalid(format!(
            "increase in asset life of {} months exceeds {}",
            repair.increase_in_asset_life, MAX_LIFE_INCREASE_MONTHS
        )));
    }
    if let Some(line) = repair
        .stock_items
        .iter()
        .find(|l| l.consumed_quantity < Decimal::ZERO || l.valuation_rate < Decimal::ZERO)
    {
        return Err(RepairError::Invalid(format!(
            "stock line '{}' has a negative rate or quantity",
            line.item_code
        )));
    }

    let asset = store::get_asset(conn, &repair.asset)?;
    update_status(conn, repair, &asset)?;

    if !repair.stock_items.is_empty() {
        valuation::set_stock_items_cost(repair);
    }
    valuation::calculate_total_repair_cost(repair);

    if let (Some(failed), Some(done)) = (repair.failure_date, repair.completion_date) {
        repair.downtime = Some(get_downtime(failed, done));
    }
    Ok(())
}

fn update_status(conn: &Connection, repair: &RepairRecord, asset: &Asset) -> Result<()> {
    if repair.repair_status == RepairStatus::Pending {
        store::set_asset_status(conn, &asset.name, AssetStatus::OutOfOrder)
    } else {
        store::set_asset_status(conn, &asset.name, asset.compute_status())
    }
}

/// Validate and persist a draft repair, naming it on first save.
pub fn save(conn: &Connection, repair: &mut RepairRecord) -> Result<()> {
    if repair.docstatus != DocStatus::Draft {
        return Err(invalid_state(repair, "Draft"));
    }
    if !repair.name.is_empty() {
        let current = get_repair(conn, &repair.name)?;
        if current.docstatus != DocStatus::Draft {
            return Err(invalid_state(&current, "Draft"));
        }
    }
    validate(conn, repair)?;
    if repair.name.is_empty() {
        repair.name = store::next_name(conn, NAMING_SERIES)?;
    }
    write_repair(conn, repair)?;
    info!(repair = %repair.name, asset = %repair.asset, status = %repair.repair_status, "repair saved");
    Ok(())
}

fn invalid_state(repair: &RepairRecord, expected: &'static str) -> RepairError {
    RepairError::InvalidState {
        doctype: VOUCHER_TYPE,
        name: repair.name.clone(),
        actual: repair.docstatus.to_string(),
        expected,
    }
}

/// Submit a completed repair, applying its effects to the asset, stock and ledger.
pub fn submit(conn: &mut Connection, name: &str, posting_date: NaiveDate) -> Result<RepairRecord> {
    let tx = conn.transaction()?;
    let mut repair = get_repair(&tx, name)?;
    if repair.docstatus != DocStatus::Draft {
        return Err(invalid_state(&repair, "Draft"));
    }
    validate(&tx, &mut repair)?;
    let mut asset = store::get_asset(&tx, &repair.asset)?;
    before_submit(&tx, &mut repair, &mut asset, posting_date)?;
    repair.docstatus = DocStatus::Submitted;
    write_repair(&tx, &repair)?;
    tx.commit()?;
    info!(repair = %repair.name, asset = %repair.asset, total = %repair.total_repair_cost, "repair submitted");
    Ok(repair)
}

fn before_submit(
    conn: &Connection,
    repair: &mut RepairRecord,
    asset: &mut Asset,
    posting_date: NaiveDate,
) -> Result<()> {
    check_repair_status(repair)?;

    if !(repair.stock_consumption || repair.capitalize_repair_cost) {
        return Ok(());
    }

    valuation::increase_asset_value(repair, asset);

    if repair.stock_consumption {
        check_for_stock_items_and_warehouse(repair)?;
        decrease_stock_quantity(conn, repair, posting_date)?;
    }
    let mut end_dates: Vec<ScheduleEndDate> = Vec::new();
    if repair.capitalize_repair_cost {
        ledger::make_gl_entries(conn, repair, posting_date, false)?;
        if asset.calculate_depreciation && repair.increase_in_asset_life > 0 {
            end_dates =
                adjuster::modify_depreciation_schedule(conn, asset, repair.increase_in_asset_life)?;
        }
    }

    let notes = format!(
        "This schedule was created when Asset {} was repaired through Asset Repair {}.",
        asset.name, repair.name
    );
    finish_asset_update(conn, asset, &notes, &end_dates)
}

fn finish_asset_update(
    conn: &Connection,
    asset: &mut Asset,
    notes: &str,
    end_dates: &[ScheduleEndDate],
) -> Result<()> {
    schedule::make_new_active_asset_depr_schedules_and_cancel_current_ones(
        conn, asset, notes, end_dates,
    )?;
    if asset.calculate_depreciation {
        adjuster::update_asset_expected_value_after_useful_life(conn, asset)?;
    }
    asset.status = asset.compute_status();
    store::save_asset(conn, asset)
}

/// Cancel a submitted repair and reverse everything its submission did.
pub fn cancel(conn: &mut Connection, name: &str, posting_date: NaiveDate) -> Result<RepairRecord> {
    let tx = conn.transaction()?;
    let mut repair = get_repair(&tx, name)?;
    if repair.docstatus != DocStatus::Submitted {
        return Err(invalid_state(&repair, "Submitted"));
    }
    before_cancel(&tx, &mut repair, posting_date)?;
    repair.docstatus = DocStatus::Cancelled;
    write_repair(&tx, &repair)?;
    tx.commit()?;
    info!(repair = %repair.name, asset = %repair.asset, "repair cancelled");
    Ok(repair)
}

fn before_cancel(conn: &Connection, repair: &mut RepairRecord, posting_date: NaiveDate) -> Result<()> {
    let mut asset = store::get_asset(conn, &repair.asset)?;

    if !(repair.stock_consumption || repair.capitalize_repair_cost) {
        return Ok(());
    }

    valuation::decrease_asset_value(repair, &mut asset);

    if repair.stock_consumption {
        increase_stock_quantity(conn, repair)?;
    }
    let mut end_dates: Vec<ScheduleEndDate> = Vec::new();
    if repair.capitalize_repair_cost {
        ledger::make_gl_entries(conn, repair, posting_date, true)?;
        repair.stock_entry = None;
        if asset.calculate_depreciation && repair.increase_in_asset_life > 0 {
            end_dates = adjuster::revert_depreciation_schedule_on_cancellation(
                conn,
                &mut asset,
                repair.increase_in_asset_life,
            )?;
        }
    }

    let notes = format!(
        "This schedule was created when Asset {}'s Asset Repair {} was cancelled.",
        asset.name, repair.name
    );
    finish_asset_update(conn, &mut asset, &notes, &end_dates)
}

/// Remove a draft or cancelled repair and refresh the asset's status.
pub fn delete(conn: &Connection, name: &str) -> Result<()> {
    let repair = get_repair(conn, name)?;
    if repair.docstatus == DocStatus::Submitted {
        return Err(invalid_state(&repair, "Draft or Cancelled"));
    }
    conn.execute("DELETE FROM asset_repairs WHERE name=?1", params![name])?;
    after_delete(conn, &repair)?;
    info!(repair = %name, "repair deleted");
    Ok(())
}

fn after_delete(conn: &Connection, repair: &RepairRecord) -> Result<()> {
    store::refresh_asset_status(conn, &repair.asset)?;
    Ok(())
}

fn check_repair_status(repair: &RepairRecord) -> Result<()> {
    if repair.repair_status == RepairStatus::Pending {
        return Err(RepairError::RepairStatusPending);
    }
    Ok(())
}

fn check_for_stock_items_and_warehouse(repair: &RepairRecord) -> Result<()> {
    if repair.stock_items.is_empty() {
        return Err(RepairError::MissingItems);
    }
    if repair.warehouse.as_deref().is_none_or(str::is_empty) {
        return Err(RepairError::MissingWarehouse);
    }
    Ok(())
}

fn decrease_stock_quantity(
    conn: &Connection,
    repair: &mut RepairRecord,
    posting_date: NaiveDate,
) -> Result<()> {
    let warehouse = repair.warehouse.as_deref().ok_or(RepairError::MissingWarehouse)?;
    let req = IssueRequest {
        company: &repair.company,
        warehouse,
        cost_center: repair.cost_center.as_deref(),
        project: repair.project.as_deref(),
        posting_date,
    };
    let entry = stock::make_material_issue(conn, &req, &repair.stock_items)?;
    repair.stock_entry = Some(entry.name);
    Ok(())
}

fn increase_stock_quantity(conn: &Connection, repair: &RepairRecord) -> Result<()> {
    match repair.stock_entry.as_deref() {
        Some(name) => stock::cancel_stock_entry(conn, name),
        None => {
            warn!(repair = %repair.name, "no stock entry linked; nothing to return to stock");
            Ok(())
        }
    }
}

fn write_repair(conn: &Connection, r: &RepairRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO asset_repairs(name, asset, company, repair_status, failure_date, completion_date,
            downtime, repair_cost, purchase_invoice, warehouse, cost_center, project, stock_consumption,
            capitalize_repair_cost, increase_in_asset_life, stock_entry, total_repair_cost, description, docstatus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
         ON CONFLICT(name) DO UPDATE SET
            asset=excluded.asset, company=excluded.company, repair_status=excluded.repair_status,
            failure_date=excluded.failure_date, completion_date=excluded.completion_date,
            downtime=excluded.downtime, repair_cost=excluded.repair_cost,
            purchase_invoice=excluded.purchase_invoice, warehouse=excluded.warehouse,
            cost_center=excluded.cost_center, project=excluded.project,
            stock_consumption=excluded.stock_consumption,
            capitalize_repair_cost=excluded.capitalize_repair_cost,
            increase_in_asset_life=excluded.increase_in_asset_life,
            stock_entry=excluded.stock_entry, total_repair_cost=excluded.total_repair_cost,
            description=excluded.description, docstatus=excluded.docstatus",
        params![
            r.name,
            r.asset,
            r.company,
            r.repair_status.as_ref(),
            r.failure_date.as_ref().map(datetime_to_col),
            r.completion_date.as_ref().map(datetime_to_col),
            r.downtime.map(|d| d.to_string()),
            r.repair_cost.to_string(),
            r.purchase_invoice,
            r.warehouse,
            r.cost_center,
            r.project,
            r.stock_consumption,
            r.capitalize_repair_cost,
            r.increase_in_asset_life,
            r.stock_entry,
            r.total_repair_cost.to_string(),
            r.description,
            r.docstatus.as_i64(),
        ],
    )?;
    conn.execute(
        "DELETE FROM asset_repair_stock_items WHERE repair=?1",
        params![r.name],
    )?;
    for (i, line) in r.stock_items.iter().enumerate() {
        conn.execute(
            "INSERT INTO asset_repair_stock_items(repair, idx, item_code, valuation_rate, consumed_quantity, serial_no, total_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                r.name,
                i as i64 + 1,
                line.item_code,
                line.valuation_rate.to_string(),
                line.consumed_quantity.to_string(),
                line.serial_no,
                line.total_value.to_string()
            ],
        )?;
    }
    Ok(())
}

pub fn get_repair(conn: &Connection, name: &str) -> Result<RepairRecord> {
    let row = conn
        .query_row(
            "SELECT asset, company, repair_status, failure_date, completion_date, downtime, repair_cost,
                    purchase_invoice, warehouse, cost_center, project, stock_consumption,
                    capitalize_repair_cost, increase_in_asset_life, stock_entry, total_repair_cost,
                    description, docstatus
             FROM asset_repairs WHERE name=?1",
            params![name],
            |r| {
                Ok(RawRepair {
                    asset: r.get(0)?,
                    company: r.get(1)?,
                    repair_status: r.get(2)?,
                    failure_date: r.get(3)?,
                    completion_date: r.get(4)?,
                    downtime: r.get(5)?,
                    repair_cost: r.get(6)?,
                    purchase_invoice: r.get(7)?,
                    warehouse: r.get(8)?,
                    cost_center: r.get(9)?,
                    project: r.get(10)?,
                    stock_consumption: r.get(11)?,
                    capitalize_repair_cost: r.get(12)?,
                    increase_in_asset_life: r.get(13)?,
                    stock_entry: r.get(14)?,
                    total_repair_cost: r.get(15)?,
                    description: r.get(16)?,
                    docstatus: r.get(17)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| RepairError::not_found(VOUCHER_TYPE, name))?;

    Ok(RepairRecord {
        name: name.to_string(),
        asset: row.asset,
        company: row.company,
        repair_status: row.repair_status.parse()?,
        failure_date: row.failure_date.as_deref().map(datetime_col).transpose()?,
        completion_date: row.completion_date.as_deref().map(datetime_col).transpose()?,
        downtime: row.downtime.as_deref().map(decimal_col).transpose()?,
        repair_cost: decimal_col(&row.repair_cost)?,
        purchase_invoice: row.purchase_invoice,
        warehouse: row.warehouse,
        cost_center: row.cost_center,
        project: row.project,
        stock_consumption: row.stock_consumption,
        capitalize_repair_cost: row.capitalize_repair_cost,
        increase_in_asset_life: row.increase_in_asset_life,
        stock_items: get_stock_lines(conn, name)?,
        stock_entry: row.stock_entry,
        total_repair_cost: decimal_col(&row.total_repair_cost)?,
        description: row.description,
        docstatus: DocStatus::from_i64(row.docstatus)
            .ok_or_else(|| RepairError::Invalid(format!("docstatus {}", row.docstatus)))?,
    })
}

struct RawRepair {
    asset: String,
    company: String,
    repair_status: String,
    failure_date: Option<String>,
    completion_date: Option<String>,
    downtime: Option<String>,
    repair_cost: String,
    purchase_invoice: Option<String>,
    warehouse: Option<String>,
    cost_center: Option<String>,
    project: Option<String>,
    stock_consumption: bool,
    capitalize_repair_cost: bool,
    increase_in_asset_life: i64,
    stock_entry: Option<String>,
    total_repair_cost: String,
    description: Option<String>,
    docstatus: i64,
}

fn get_stock_lines(conn: &Connection, repair: &str) -> Result<Vec<StockLine>> {
    let mut stmt = conn.prepare(
        "SELECT item_code, valuation_rate, consumed_quantity, serial_no, total_value
         FROM asset_repair_stock_items WHERE repair=?1 ORDER BY idx",
    )?;
    let mut cur = stmt.query(params![repair])?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let rate: String = r.get(1)?;
        let qty: String = r.get(2)?;
        let total: String = r.get(4)?;
        out.push(StockLine {
            item_code: r.get(0)?,
            valuation_rate: decimal_col(&rate)?,
            consumed_quantity: decimal_col(&qty)?,
            serial_no: r.get(3)?,
            total_value: decimal_col(&total)?,
        });
    }
    Ok(out)
}

/// Repairs, optionally limited to one asset, newest first.
pub fn list_repairs(conn: &Connection, asset: Option<&str>) -> Result<Vec<RepairRecord>> {
    let names: Vec<String> = {
        let mut stmt = conn.prepare(
            "SELECT name FROM asset_repairs WHERE ?1 IS NULL OR asset=?1 ORDER BY name DESC",
        )?;
        let rows = stmt.query_map(params![asset], |r| r.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    names.iter().map(|n| get_repair(conn, n)).collect()
}
