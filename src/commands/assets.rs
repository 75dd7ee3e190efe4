// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    Asset, AssetStatus, DepreciationMethod, DocStatus, FinanceBookRow, ScheduleStatus,
};
use crate::schedule;
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table, resolve_company};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("add-book", sub)) => add_book(conn, sub)?,
        Some(("submit", sub)) => submit(conn, sub.get_one::<String>("asset").unwrap().trim())?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("schedule", sub)) => show_schedule(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let company = resolve_company(conn, sub.get_one::<String>("company"))?;
    store::get_company(conn, &company)?;
    let asset = Asset {
        name,
        asset_category: sub.get_one::<String>("category").unwrap().trim().to_string(),
        company,
        gross_purchase_amount: parse_decimal(sub.get_one::<String>("gross").unwrap())?,
        purchase_date: parse_date(sub.get_one::<String>("purchase-date").unwrap().trim())?,
        calculate_depreciation: sub.get_flag("calculate-depreciation"),
        number_of_depreciations_booked: *sub.get_one::<i64>("booked").unwrap_or(&0),
        status: AssetStatus::Draft,
        docstatus: DocStatus::Draft,
        finance_books: Vec::new(),
    };
    if store::get_asset(conn, &asset.name).is_ok() {
        bail!("Asset '{}' already exists", asset.name);
    }
    store::save_asset(conn, &asset)?;
    println!(
        "Added asset '{}' ({}, {})",
        asset.name,
        asset.asset_category,
        fmt_money(&asset.gross_purchase_amount)
    );
    Ok(())
}

fn add_book(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset_name = sub.get_one::<String>("asset").unwrap().trim();
    let mut asset = store::get_asset(conn, asset_name)?;
    if asset.docstatus != DocStatus::Draft {
        bail!("Asset '{}' is already submitted; finance books are fixed", asset.name);
    }
    let method_raw = sub.get_one::<String>("method").unwrap().trim();
    let method = method_raw
        .parse::<DepreciationMethod>()
        .with_context(|| format!("Unknown depreciation method '{}'", method_raw))?;
    let salvage = match sub.get_one::<String>("salvage") {
        Some(s) => parse_decimal(s)?,
        None => Decimal::ZERO,
    };
    let rate = match sub.get_one::<String>("rate") {
        Some(s) => parse_decimal(s)?,
        None => Decimal::ZERO,
    };
    if method == DepreciationMethod::WrittenDownValue && rate <= Decimal::ZERO {
        bail!("Written Down Value needs a positive --rate");
    }
    let row = FinanceBookRow {
        idx: asset.finance_books.len() as i64 + 1,
        finance_book: sub
            .get_one::<String>("finance-book")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        depreciation_method: method,
        total_number_of_depreciations: *sub.get_one::<i64>("total").unwrap(),
        frequency_of_depreciation: *sub.get_one::<i64>("frequency").unwrap(),
        depreciation_start_date: parse_date(sub.get_one::<String>("start").unwrap().trim())?,
        expected_value_after_useful_life: salvage,
        value_after_depreciation: asset.gross_purchase_amount,
        rate_of_depreciation: rate,
    };
    if asset
        .finance_books
        .iter()
        .any(|r| r.finance_book_key() == row.finance_book_key())
    {
        bail!(
            "Asset '{}' already has finance book '{}'",
            asset.name,
            row.finance_book_key()
        );
    }
    println!(
        "Added {} finance book to '{}' ({} x {} months)",
        row.depreciation_method,
        asset.name,
        row.total_number_of_depreciations,
        row.frequency_of_depreciation
    );
    asset.finance_books.push(row);
    store::save_asset(conn, &asset)?;
    Ok(())
}

/// Submit a draft asset and generate its first depreciation schedules.
pub fn submit(conn: &mut Connection, name: &str) -> Result<()> {
    let tx = conn.transaction()?;
    let mut asset = store::get_asset(&tx, name)?;
    if asset.docstatus != DocStatus::Draft {
        bail!("Asset '{}' is not a draft", asset.name);
    }
    if asset.calculate_depreciation && asset.finance_books.is_empty() {
        bail!("Asset '{}' calculates depreciation but has no finance book", asset.name);
    }
    asset.docstatus = DocStatus::Submitted;
    asset.status = asset.compute_status();
    let notes = format!("Initial schedule for Asset {}.", asset.name);
    schedule::make_new_active_asset_depr_schedules_and_cancel_current_ones(&tx, &asset, &notes, &[])?;
    store::save_asset(&tx, &asset)?;
    tx.commit()?;
    println!("Submitted asset '{}' ({})", asset.name, asset.status);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset = store::get_asset(conn, sub.get_one::<String>("asset").unwrap().trim())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &asset)? {
        println!(
            "{} [{}] {} - {} - gross {}",
            asset.name,
            asset.status,
            asset.asset_category,
            asset.company,
            fmt_money(&asset.gross_purchase_amount)
        );
        let rows = asset
            .finance_books
            .iter()
            .map(|r| {
                vec![
                    r.finance_book_key().to_string(),
                    r.depreciation_method.to_string(),
                    r.total_number_of_depreciations.to_string(),
                    r.frequency_of_depreciation.to_string(),
                    r.depreciation_start_date.to_string(),
                    fmt_money(&r.value_after_depreciation),
                    fmt_money(&r.expected_value_after_useful_life),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Book", "Method", "Count", "Freq", "Start", "Value", "Salvage"],
                rows
            )
        );
    }
    Ok(())
}

fn show_schedule(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let asset = sub.get_one::<String>("asset").unwrap().trim();
    let fb = sub.get_one::<String>("finance-book").map(|s| s.trim());
    let doc = schedule::get_asset_depr_schedule_doc(conn, asset, ScheduleStatus::Active, fb)?
        .with_context(|| format!("No active depreciation schedule for '{}'", asset))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &doc)? {
        if let Some(notes) = &doc.notes {
            println!("{} - {}", doc.name, notes);
        }
        let rows = doc
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.idx.to_string(),
                    r.schedule_date.to_string(),
                    fmt_money(&r.depreciation_amount),
                    fmt_money(&r.accumulated_depreciation_amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["#", "Date", "Depreciation", "Accumulated"], rows)
        );
    }
    Ok(())
}
