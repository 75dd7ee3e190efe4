// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Company;
use crate::store;
use crate::utils::{maybe_print_json, pretty_table, set_setting};
use anyhow::Result;
use rusqlite::Connection;

fn trimmed(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let company = Company {
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
                default_expense_account: trimmed(sub, "default-expense-account"),
                stock_adjustment_account: trimmed(sub, "stock-adjustment-account"),
                perpetual_inventory: sub.get_flag("perpetual-inventory"),
                cost_center: trimmed(sub, "cost-center"),
            };
            store::upsert_company(conn, &company)?;
            if sub.get_flag("default") {
                set_setting(conn, "default_company", &company.name)?;
            }
            println!(
                "Saved company '{}' (perpetual inventory: {})",
                company.name, company.perpetual_inventory
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM companies ORDER BY name")?;
    let names = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let mut companies = Vec::with_capacity(names.len());
    for n in &names {
        companies.push(store::get_company(conn, n)?);
    }
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &companies)? {
        let rows = companies
            .into_iter()
            .map(|c| {
                vec![
                    c.name,
                    c.default_expense_account.unwrap_or_default(),
                    c.stock_adjustment_account.unwrap_or_default(),
                    if c.perpetual_inventory { "yes" } else { "no" }.to_string(),
                    c.cost_center.unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Name", "Default Expense", "Stock Adjustment", "Perpetual", "Cost Center"],
                rows
            )
        );
    }
    Ok(())
}
