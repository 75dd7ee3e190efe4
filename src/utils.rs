// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, NaiveDateTime};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::RepairError;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    // A bare date means midnight.
    let d = parse_date(s)
        .with_context(|| format!("Invalid datetime '{}', expected YYYY-MM-DD HH:MM:SS", s))?;
    Ok(d.and_time(chrono::NaiveTime::MIN))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// Monetary precision used for postings and schedule amounts.
pub fn round2(d: Decimal) -> Decimal {
    d.round_dp(2)
}

/// Shift a date by whole months, clamping to the last day of the target month.
pub fn add_months(date: NaiveDate, months: i64) -> crate::error::Result<NaiveDate> {
    let n = u32::try_from(months.unsigned_abs())
        .map_err(|_| RepairError::Invalid(format!("month offset {} out of range", months)))?;
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(n))
    } else {
        date.checked_sub_months(Months::new(n))
    };
    shifted.ok_or_else(|| RepairError::Invalid(format!("{} shifted by {} months", date, months)))
}

pub(crate) fn decimal_col(s: &str) -> crate::error::Result<Decimal> {
    Ok(s.parse::<Decimal>()?)
}

pub(crate) fn date_col(s: &str) -> crate::error::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

pub(crate) fn datetime_col(s: &str) -> crate::error::Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")?)
}

pub(crate) fn datetime_to_col(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn get_setting(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM settings WHERE key=?1",
        params![key],
        |r| r.get(0),
    )
    .optional()
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Company given on the command line, else the configured default.
pub fn resolve_company(conn: &Connection, given: Option<&String>) -> Result<String> {
    if let Some(c) = given {
        return Ok(c.trim().to_string());
    }
    get_setting(conn, "default_company")?
        .context("No company given and no default company configured (see `company add --default`)")
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_months_clamps_to_month_end() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            add_months(d, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            add_months(d, -2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 11, 30).unwrap()
        );
    }

    #[test]
    fn parse_datetime_accepts_bare_dates() {
        let dt = parse_datetime("2025-03-01").unwrap();
        assert_eq!(dt.to_string(), "2025-03-01 00:00:00");
        let dt = parse_datetime(" 2025-03-01 10:30 ").unwrap();
        assert_eq!(dt.to_string(), "2025-03-01 10:30:00");
    }
}
