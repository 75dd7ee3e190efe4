// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::gl;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("gl", sub)) => export_gl(conn, sub),
        _ => Ok(()),
    }
}

fn export_gl(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    let voucher = sub.get_one::<String>("voucher").map(|s| s.trim());
    let entries = gl::list_gl_entries(conn, voucher)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "posting_date",
                "account",
                "debit",
                "credit",
                "against",
                "voucher_type",
                "voucher_no",
                "against_voucher",
                "cost_center",
                "company",
                "is_cancelled",
            ])?;
            for e in &entries {
                wtr.write_record([
                    e.posting_date.to_string(),
                    e.account.clone(),
                    e.debit.to_string(),
                    e.credit.to_string(),
                    e.against.clone(),
                    e.voucher_type.clone(),
                    e.voucher_no.clone(),
                    e.against_voucher.clone().unwrap_or_default(),
                    e.cost_center.clone().unwrap_or_default(),
                    e.company.clone(),
                    (e.is_cancelled as u8).to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "posting_date": e.posting_date.to_string(),
                        "account": e.account,
                        "debit": e.debit.to_string(),
                        "credit": e.credit.to_string(),
                        "against": e.against,
                        "voucher_type": e.voucher_type,
                        "voucher_no": e.voucher_no,
                        "against_voucher": e.against_voucher,
                        "cost_center": e.cost_center,
                        "company": e.company,
                        "is_cancelled": e.is_cancelled,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} GL entries to {}", entries.len(), out);
    Ok(())
}
