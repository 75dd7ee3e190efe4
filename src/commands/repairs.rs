// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{RepairRecord, RepairStatus, StockLine};
use crate::repair;
use crate::store;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_datetime, parse_decimal, pretty_table,
    resolve_company,
};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => create(conn, sub)?,
        Some(("add-item", sub)) => add_item(conn, sub)?,
        Some(("complete", sub)) => complete(conn, sub)?,
        Some(("submit", sub)) => {
            let name = repair_arg(sub);
            let date = posting_date(sub)?;
            let r = repair::submit(conn, name, date)
                .with_context(|| format!("Could not submit {}", name))?;
            println!(
                "Submitted {} for {} (total repair cost {})",
                r.name,
                r.asset,
                fmt_money(&r.total_repair_cost)
            );
            if let Some(se) = &r.stock_entry {
                println!("Stock issued via {}", se);
            }
        }
        Some(("cancel", sub)) => {
            let name = repair_arg(sub);
            let date = posting_date(sub)?;
            let r = repair::cancel(conn, name, date)
                .with_context(|| format!("Could not cancel {}", name))?;
            println!("Cancelled {}; asset {} restored", r.name, r.asset);
        }
        Some(("delete", sub)) => {
            let name = repair_arg(sub);
            repair::delete(conn, name)?;
            println!("Deleted {}", name);
        }
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn repair_arg(sub: &clap::ArgMatches) -> &str {
    sub.get_one::<String>("repair").unwrap().trim()
}

fn posting_date(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("date") {
        Some(s) => parse_date(s.trim()),
        None => Ok(Utc::now().date_naive()),
    }
}

fn opt_string(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn create(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset = sub.get_one::<String>("asset").unwrap().trim();
    let company = resolve_company(conn, sub.get_one::<String>("company"))?;
    let mut r = RepairRecord::new(asset, &company);
    if let Some(c) = sub.get_one::<String>("cost") {
        r.repair_cost = parse_decimal(c)?;
    }
    r.purchase_invoice = opt_string(sub, "invoice");
    r.warehouse = opt_string(sub, "warehouse");
    r.cost_center = match opt_string(sub, "cost-center") {
        Some(cc) => Some(cc),
        None => store::get_company(conn, &company)?.cost_center,
    };
    r.project = opt_string(sub, "project");
    r.description = opt_string(sub, "description");
    r.failure_date = opt_string(sub, "failure-date")
        .map(|s| parse_datetime(&s))
        .transpose()?;
    r.completion_date = opt_string(sub, "completion-date")
        .map(|s| parse_datetime(&s))
        .transpose()?;
    r.stock_consumption = sub.get_flag("stock-consumption");
    r.capitalize_repair_cost = sub.get_flag("capitalize");
    r.increase_in_asset_life = *sub.get_one::<i64>("life-increase").unwrap_or(&0);

    repair::save(conn, &mut r)?;
    println!("Created {} for asset {} (Pending)", r.name, r.asset);
    Ok(())
}

fn add_item(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut r = repair::get_repair(conn, repair_arg(sub))?;
    let code = sub.get_one::<String>("item").unwrap().trim();
    let qty = parse_decimal(sub.get_one::<String>("qty").unwrap())?;
    let rate = match sub.get_one::<String>("rate") {
        Some(s) => parse_decimal(s)?,
        None => store::get_item(conn, code)?.1,
    };
    let mut line = StockLine::new(code, rate, qty);
    line.serial_no = opt_string(sub, "serial");
    r.stock_items.push(line);
    repair::save(conn, &mut r)?;
    println!(
        "Added {} x {} to {} (total repair cost {})",
        qty,
        code,
        r.name,
        fmt_money(&r.total_repair_cost)
    );
    Ok(())
}

fn complete(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut r = repair::get_repair(conn, repair_arg(sub))?;
    r.repair_status = RepairStatus::Completed;
    if let Some(s) = opt_string(sub, "completion-date") {
        r.completion_date = Some(parse_datetime(&s)?);
    }
    repair::save(conn, &mut r)?;
    match r.downtime {
        Some(d) => println!("{} completed after {:.2} hours of downtime", r.name, d),
        None => println!("{} completed", r.name),
    }
    Ok(())
}

#[derive(Serialize)]
struct RepairRow {
    name: String,
    asset: String,
    repair_status: String,
    docstatus: String,
    repair_cost: String,
    total_repair_cost: String,
    stock_entry: String,
}

impl From<&RepairRecord> for RepairRow {
    fn from(r: &RepairRecord) -> Self {
        RepairRow {
            name: r.name.clone(),
            asset: r.asset.clone(),
            repair_status: r.repair_status.to_string(),
            docstatus: r.docstatus.to_string(),
            repair_cost: fmt_money(&r.repair_cost),
            total_repair_cost: fmt_money(&r.total_repair_cost),
            stock_entry: r.stock_entry.clone().unwrap_or_default(),
        }
    }
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let r = repair::get_repair(conn, repair_arg(sub))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &r)? {
        let row = RepairRow::from(&r);
        println!(
            "{}",
            pretty_table(
                &["Repair", "Asset", "Status", "Doc", "Cost", "Total", "Stock Entry"],
                vec![vec![
                    row.name,
                    row.asset,
                    row.repair_status,
                    row.docstatus,
                    row.repair_cost,
                    row.total_repair_cost,
                    row.stock_entry,
                ]],
            )
        );
        let items = r
            .stock_items
            .iter()
            .map(|l| {
                vec![
                    l.item_code.clone(),
                    l.consumed_quantity.to_string(),
                    l.valuation_rate.to_string(),
                    fmt_money(&l.total_value),
                    l.serial_no.clone().unwrap_or_default(),
                ]
            })
            .collect::<Vec<_>>();
        if !items.is_empty() {
            println!(
                "{}",
                pretty_table(&["Item", "Qty", "Rate", "Value", "Serial"], items)
            );
        }
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset = sub.get_one::<String>("asset").map(|s| s.trim());
    let data: Vec<RepairRow> = repair::list_repairs(conn, asset)?
        .iter()
        .map(RepairRow::from)
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .into_iter()
            .map(|r| {
                vec![
                    r.name,
                    r.asset,
                    r.repair_status,
                    r.docstatus,
                    r.repair_cost,
                    r.total_repair_cost,
                    r.stock_entry,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Repair", "Asset", "Status", "Doc", "Cost", "Total", "Stock Entry"],
                rows
            )
        );
    }
    Ok(())
}
