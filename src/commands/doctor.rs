// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{decimal_col, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// (issue, detail) pairs; empty when the books are consistent.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Vouchers whose GL entries do not net to zero
    let mut stmt = conn.prepare("SELECT voucher_no, debit, credit FROM gl_entries")?;
    let mut cur = stmt.query([])?;
    let mut net: BTreeMap<String, Decimal> = BTreeMap::new();
    while let Some(r) = cur.next()? {
        let voucher: String = r.get(0)?;
        let debit: String = r.get(1)?;
        let credit: String = r.get(2)?;
        *net.entry(voucher).or_default() += decimal_col(&debit)? - decimal_col(&credit)?;
    }
    for (voucher, diff) in net {
        if !diff.round_dp(2).is_zero() {
            rows.push(vec!["unbalanced_voucher".into(), format!("{} ({})", voucher, diff)]);
        }
    }

    // 2) Negative bins
    let mut stmt2 = conn.prepare("SELECT item_code, warehouse, actual_qty FROM bins")?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let item: String = r.get(0)?;
        let wh: String = r.get(1)?;
        let qty: String = r.get(2)?;
        if decimal_col(&qty)? < Decimal::ZERO {
            rows.push(vec!["negative_stock".into(), format!("{} @ {}: {}", item, wh, qty)]);
        }
    }

    // 3) Submitted depreciating assets lacking an active schedule
    let mut stmt3 = conn.prepare(
        "SELECT a.name, f.finance_book FROM assets a
         JOIN asset_finance_books f ON f.asset=a.name
         WHERE a.docstatus=1 AND a.calculate_depreciation=1
           AND NOT EXISTS (SELECT 1 FROM depreciation_schedules s
                           WHERE s.asset=a.name AND s.finance_book=f.finance_book AND s.status='Active')",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let asset: String = r.get(0)?;
        let fb: String = r.get(1)?;
        rows.push(vec!["missing_schedule".into(), format!("{} [{}]", asset, fb)]);
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
