// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! General ledger posting and reversal.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{RepairError, Result};
use crate::models::GlEntry;
use crate::utils::{date_col, decimal_col, round2};

/// Post `entries`, or with `cancel` reverse whatever is posted for their voucher.
pub fn make_gl_entries(conn: &Connection, entries: &[GlEntry], cancel: bool) -> Result<()> {
    let Some(first) = entries.first() else {
        return Ok(());
    };
    if cancel {
        return make_reverse_gl_entries(conn, &first.voucher_type, &first.voucher_no);
    }

    let (debit, credit) = totals(entries);
    if round2(debit) != round2(credit) {
        return Err(RepairError::UnbalancedEntries {
            voucher_no: first.voucher_no.clone(),
            debit,
            credit,
        });
    }
    for e in entries {
        insert(conn, e)?;
    }
    info!(
        voucher_type = %first.voucher_type,
        voucher_no = %first.voucher_no,
        entries = entries.len(),
        amount = %debit,
        "gl entries posted"
    );
    Ok(())
}

/// Mark the voucher's live entries cancelled and post mirror entries with
/// debit and credit swapped.
pub fn make_reverse_gl_entries(conn: &Connection, voucher_type: &str, voucher_no: &str) -> Result<()> {
    let live: Vec<GlEntry> = get_gl_entries_for_voucher(conn, voucher_type, voucher_no)?
        .into_iter()
        .filter(|e| !e.is_cancelled)
        .collect();
    if live.is_empty() {
        return Ok(());
    }
    conn.execute(
        "UPDATE gl_entries SET is_cancelled=1 WHERE voucher_type=?1 AND voucher_no=?2",
        params![voucher_type, voucher_no],
    )?;
    for e in &live {
        let mirror = GlEntry {
            debit: e.credit,
            credit: e.debit,
            is_cancelled: true,
            ..e.clone()
        };
        insert(conn, &mirror)?;
    }
    info!(voucher_type, voucher_no, entries = live.len(), "gl entries reversed");
    Ok(())
}

pub fn totals(entries: &[GlEntry]) -> (Decimal, Decimal) {
    entries.iter().fold((Decimal::ZERO, Decimal::ZERO), |(d, c), e| {
        (d + e.debit, c + e.credit)
    })
}

fn insert(conn: &Connection, e: &GlEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO gl_entries(posting_date, account, debit, credit, against, voucher_type, voucher_no,
            against_voucher_type, against_voucher, cost_center, company, is_cancelled)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            e.posting_date.to_string(),
            e.account,
            e.debit.to_string(),
            e.credit.to_string(),
            e.against,
            e.voucher_type,
            e.voucher_no,
            e.against_voucher_type,
            e.against_voucher,
            e.cost_center,
            e.company,
            e.is_cancelled
        ],
    )?;
    Ok(())
}

const SELECT_GL: &str = "SELECT posting_date, account, debit, credit, against, voucher_type, voucher_no,
        against_voucher_type, against_voucher, cost_center, company, is_cancelled FROM gl_entries";

fn query(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<GlEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let mut cur = stmt.query(args)?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let date: String = r.get(0)?;
        let debit: String = r.get(2)?;
        let credit: String = r.get(3)?;
        out.push(GlEntry {
            posting_date: date_col(&date)?,
            account: r.get(1)?,
            debit: decimal_col(&debit)?,
            credit: decimal_col(&credit)?,
            against: r.get(4)?,
            voucher_type: r.get(5)?,
            voucher_no: r.get(6)?,
            against_voucher_type: r.get(7)?,
            against_voucher: r.get(8)?,
            cost_center: r.get(9)?,
            company: r.get(10)?,
            is_cancelled: r.get(11)?,
        });
    }
    Ok(out)
}

pub fn get_gl_entries_for_voucher(
    conn: &Connection,
    voucher_type: &str,
    voucher_no: &str,
) -> Result<Vec<GlEntry>> {
    let sql = format!("{SELECT_GL} WHERE voucher_type=?1 AND voucher_no=?2 ORDER BY id");
    query(conn, &sql, &[&voucher_type, &voucher_no])
}

pub fn list_gl_entries(conn: &Connection, voucher_no: Option<&str>) -> Result<Vec<GlEntry>> {
    match voucher_no {
        Some(v) => {
            let sql = format!("{SELECT_GL} WHERE voucher_no=?1 ORDER BY id");
            query(conn, &sql, &[&v])
        }
        None => query(conn, &format!("{SELECT_GL} ORDER BY id"), &[]),
    }
}
