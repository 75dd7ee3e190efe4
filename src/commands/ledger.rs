// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::gl;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let voucher = sub.get_one::<String>("voucher").map(|s| s.trim());
        let entries = gl::list_gl_entries(conn, voucher)?;
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
            let (debit, credit) = gl::totals(&entries);
            let mut rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.posting_date.to_string(),
                        e.voucher_no.clone(),
                        e.account.clone(),
                        fmt_money(&e.debit),
                        fmt_money(&e.credit),
                        e.against.clone(),
                        e.against_voucher.clone().unwrap_or_default(),
                        if e.is_cancelled { "yes" } else { "" }.to_string(),
                    ]
                })
                .collect();
            rows.push(vec![
                String::new(),
                String::new(),
                "Total".into(),
                fmt_money(&debit),
                fmt_money(&credit),
                String::new(),
                String::new(),
                String::new(),
            ]);
            println!(
                "{}",
                pretty_table(
                    &["Date", "Voucher", "Account", "Debit", "Credit", "Against", "Against Voucher", "Cancelled"],
                    rows
                )
            );
        }
    }
    Ok(())
}
