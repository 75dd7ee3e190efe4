// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Depreciation schedules: one Active schedule per asset and finance book.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{RepairError, Result};
use crate::models::{
    Asset, DepreciationMethod, DepreciationSchedule, FinanceBookRow, ScheduleRow, ScheduleStatus,
};
use crate::store;
use crate::utils::{add_months, date_col, decimal_col, round2};

/// Upper bound on rows in one schedule: monthly for 200 years.
pub const MAX_SCHEDULE_ROWS: i64 = 2400;

/// Final schedule date requested for a finance book after a change in asset life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEndDate {
    pub finance_book: Option<String>,
    pub end_date: NaiveDate,
}

fn end_date_for<'a>(end_dates: &'a [ScheduleEndDate], row: &FinanceBookRow) -> Option<&'a NaiveDate> {
    end_dates
        .iter()
        .rev()
        .find(|e| e.finance_book.as_deref().unwrap_or("") == row.finance_book_key())
        .map(|e| &e.end_date)
}

/// Rows for the pending depreciations of one finance book.
pub fn build_schedule_rows(
    asset: &Asset,
    row: &FinanceBookRow,
    end_date: Option<NaiveDate>,
) -> Result<Vec<ScheduleRow>> {
    let pending = row
        .total_number_of_depreciations
        .saturating_sub(asset.number_of_depreciations_booked);
    if pending <= 0 {
        return Ok(Vec::new());
    }
    let freq = row.frequency_of_depreciation;
    if freq <= 0 {
        return Err(RepairError::Invalid(format!(
            "frequency_of_depreciation must be positive for asset {}",
            asset.name
        )));
    }
    if row.total_number_of_depreciations <= 0 {
        return Err(RepairError::Invalid(format!(
            "total_number_of_depreciations must be positive for asset {}",
            asset.name
        )));
    }
    if pending > MAX_SCHEDULE_ROWS {
        return Err(RepairError::Invalid(format!(
            "{} pending depreciations for asset {} exceed {}",
            pending, asset.name, MAX_SCHEDULE_ROWS
        )));
    }

    let mut dates = Vec::with_capacity(pending as usize);
    for i in 0..pending {
        let months = i.checked_mul(freq).ok_or_else(|| {
            RepairError::Invalid(format!("schedule span overflows for asset {}", asset.name))
        })?;
        dates.push(add_months(row.depreciation_start_date, months)?);
    }
    if let (Some(end), Some(last)) = (end_date, dates.last_mut()) {
        if end > *last {
            *last = end;
        }
    }

    let amounts = match row.depreciation_method {
        DepreciationMethod::StraightLine => straight_line_amounts(row, pending),
        DepreciationMethod::WrittenDownValue => {
            let rate = row.rate_of_depreciation / Decimal::from(100) * Decimal::from(freq)
                / Decimal::from(12);
            declining_amounts(row.value_after_depreciation, rate, pending)
        }
        DepreciationMethod::DoubleDecliningBalance => {
            let rate = Decimal::from(2) / Decimal::from(row.total_number_of_depreciations);
            declining_amounts(row.value_after_depreciation, rate, pending)
        }
    };

    let mut accumulated = Decimal::ZERO;
    Ok(dates
        .into_iter()
        .zip(amounts)
        .enumerate()
        .map(|(i, (schedule_date, amount))| {
            accumulated += amount;
            ScheduleRow {
                idx: i as i64 + 1,
                schedule_date,
                depreciation_amount: amount,
                accumulated_depreciation_amount: accumulated,
            }
        })
        .collect())
}

fn straight_line_amounts(row: &FinanceBookRow, pending: i64) -> Vec<Decimal> {
    let depreciable =
        (row.value_after_depreciation - row.expected_value_after_useful_life).max(Decimal::ZERO);
    let per = round2(depreciable / Decimal::from(pending));
    let mut out = vec![per; pending as usize];
    // last row absorbs rounding
    if let Some(last) = out.last_mut() {
        *last = depreciable - per * Decimal::from(pending - 1);
    }
    out
}

fn declining_amounts(value: Decimal, rate: Decimal, pending: i64) -> Vec<Decimal> {
    let mut remaining = value.max(Decimal::ZERO);
    let mut out = Vec::with_capacity(pending as usize);
    for _ in 0..pending {
        let amount = round2(remaining * rate).min(remaining);
        remaining -= amount;
        out.push(amount);
    }
    out
}

/// Cancel every Active schedule of the asset and store freshly generated ones.
pub fn make_new_active_asset_depr_schedules_and_cancel_current_ones(
    conn: &Connection,
    asset: &Asset,
    notes: &str,
    end_dates: &[ScheduleEndDate],
) -> Result<()> {
    if !asset.calculate_depreciation {
        return Ok(());
    }
    for row in &asset.finance_books {
        let fb = row.finance_book_key();
        let cancelled = conn.execute(
            "UPDATE depreciation_schedules SET status='Cancelled'
             WHERE asset=?1 AND finance_book=?2 AND status='Active'",
            params![asset.name, fb],
        )?;
        let end = end_date_for(end_dates, row).copied();
        let rows = build_schedule_rows(asset, row, end)?;
        let schedule = DepreciationSchedule {
            name: store::next_name(conn, "ACC-ADS-")?,
            asset: asset.name.clone(),
            finance_book: row.finance_book.clone(),
            status: ScheduleStatus::Active,
            notes: Some(notes.to_string()),
            expected_value_after_useful_life: row.expected_value_after_useful_life,
            rows,
        };
        insert_schedule(conn, &schedule)?;
        debug!(asset = %asset.name, finance_book = fb, cancelled, "schedule superseded");
        info!(
            asset = %asset.name,
            schedule = %schedule.name,
            rows = schedule.rows.len(),
            "active depreciation schedule created"
        );
    }
    Ok(())
}

fn insert_schedule(conn: &Connection, s: &DepreciationSchedule) -> Result<()> {
    conn.execute(
        "INSERT INTO depreciation_schedules(name, asset, finance_book, status, notes, expected_value_after_useful_life)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            s.name,
            s.asset,
            s.finance_book.as_deref().unwrap_or(""),
            s.status.as_ref(),
            s.notes,
            s.expected_value_after_useful_life.to_string()
        ],
    )?;
    for r in &s.rows {
        conn.execute(
            "INSERT INTO depreciation_schedule_rows(schedule, idx, schedule_date, depreciation_amount, accumulated_depreciation_amount)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                s.name,
                r.idx,
                r.schedule_date.to_string(),
                r.depreciation_amount.to_string(),
                r.accumulated_depreciation_amount.to_string()
            ],
        )?;
    }
    Ok(())
}

pub fn get_asset_depr_schedule_doc(
    conn: &Connection,
    asset: &str,
    status: ScheduleStatus,
    finance_book: Option<&str>,
) -> Result<Option<DepreciationSchedule>> {
    let head: Option<(String, Option<String>, String)> = conn
        .query_row(
            "SELECT name, notes, expected_value_after_useful_life FROM depreciation_schedules
             WHERE asset=?1 AND status=?2 AND finance_book=?3
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![asset, status.as_ref(), finance_book.unwrap_or("")],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let Some((name, notes, expected)) = head else {
        return Ok(None);
    };
    let rows = schedule_rows(conn, &name)?;
    Ok(Some(DepreciationSchedule {
        name,
        asset: asset.to_string(),
        finance_book: finance_book.filter(|f| !f.is_empty()).map(str::to_string),
        status,
        notes,
        expected_value_after_useful_life: decimal_col(&expected)?,
        rows,
    }))
}

fn schedule_rows(conn: &Connection, schedule: &str) -> Result<Vec<ScheduleRow>> {
    let mut stmt = conn.prepare(
        "SELECT idx, schedule_date, depreciation_amount, accumulated_depreciation_amount
         FROM depreciation_schedule_rows WHERE schedule=?1 ORDER BY idx",
    )?;
    let mut cur = stmt.query(params![schedule])?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let date: String = r.get(1)?;
        let amount: String = r.get(2)?;
        let acc: String = r.get(3)?;
        out.push(ScheduleRow {
            idx: r.get(0)?,
            schedule_date: date_col(&date)?,
            depreciation_amount: decimal_col(&amount)?,
            accumulated_depreciation_amount: decimal_col(&acc)?,
        });
    }
    Ok(out)
}

/// Rows of the schedule in the given state; empty when there is none.
pub fn get_depr_schedule(
    conn: &Connection,
    asset: &str,
    status: ScheduleStatus,
    finance_book: Option<&str>,
) -> Result<Vec<ScheduleRow>> {
    Ok(get_asset_depr_schedule_doc(conn, asset, status, finance_book)?
        .map(|s| s.rows)
        .unwrap_or_default())
}

pub fn set_expected_value_after_useful_life(
    conn: &Connection,
    schedule: &str,
    value: Decimal,
) -> Result<()> {
    conn.execute(
        "UPDATE depreciation_schedules SET expected_value_after_useful_life=?1 WHERE name=?2",
        params![value.to_string(), schedule],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssetStatus, DocStatus};

    fn asset(method: DepreciationMethod) -> Asset {
        Asset {
            name: "AST-1".into(),
            asset_category: "Machinery".into(),
            company: "Acme".into(),
            gross_purchase_amount: Decimal::from(1000),
            purchase_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            calculate_depreciation: true,
            number_of_depreciations_booked: 0,
            status: AssetStatus::Submitted,
            docstatus: DocStatus::Submitted,
            finance_books: vec![FinanceBookRow {
                idx: 1,
                finance_book: None,
                depreciation_method: method,
                total_number_of_depreciations: 3,
                frequency_of_depreciation: 12,
                depreciation_start_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                expected_value_after_useful_life: Decimal::from(100),
                value_after_depreciation: Decimal::from(1000),
                rate_of_depreciation: Decimal::from(40),
            }],
        }
    }

    #[test]
    fn straight_line_spreads_depreciable_value() {
        let a = asset(DepreciationMethod::StraightLine);
        let rows = build_schedule_rows(&a, &a.finance_books[0], None).unwrap();
        let amounts: Vec<Decimal> = rows.iter().map(|r| r.depreciation_amount).collect();
        assert_eq!(amounts, vec![Decimal::from(300); 3]);
        assert_eq!(rows[2].accumulated_depreciation_amount, Decimal::from(900));
        assert_eq!(
            rows[2].schedule_date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn end_date_only_moves_final_row_later() {
        let a = asset(DepreciationMethod::StraightLine);
        let later = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let rows = build_schedule_rows(&a, &a.finance_books[0], Some(later)).unwrap();
        assert_eq!(rows[2].schedule_date, later);

        let earlier = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let rows = build_schedule_rows(&a, &a.finance_books[0], Some(earlier)).unwrap();
        assert_eq!(
            rows[2].schedule_date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn written_down_value_declines_geometrically() {
        let a = asset(DepreciationMethod::WrittenDownValue);
        let rows = build_schedule_rows(&a, &a.finance_books[0], None).unwrap();
        let amounts: Vec<Decimal> = rows.iter().map(|r| r.depreciation_amount).collect();
        // 40% of 1000, 600, 360
        assert_eq!(
            amounts,
            vec![Decimal::from(400), Decimal::from(240), Decimal::from(144)]
        );
    }

    #[test]
    fn booked_depreciations_shorten_schedule() {
        let mut a = asset(DepreciationMethod::StraightLine);
        a.number_of_depreciations_booked = 3;
        assert!(build_schedule_rows(&a, &a.finance_books[0], None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn double_declining_needs_a_positive_total() {
        let mut a = asset(DepreciationMethod::DoubleDecliningBalance);
        a.number_of_depreciations_booked = -1;
        a.finance_books[0].total_number_of_depreciations = 0;
        let err = build_schedule_rows(&a, &a.finance_books[0], None).unwrap_err();
        assert!(matches!(err, RepairError::Invalid(_)));
    }

    #[test]
    fn runaway_pending_count_is_rejected() {
        let mut a = asset(DepreciationMethod::StraightLine);
        a.finance_books[0].total_number_of_depreciations = i64::MAX;
        a.number_of_depreciations_booked = i64::MIN;
        assert!(build_schedule_rows(&a, &a.finance_books[0], None).is_err());

        a.finance_books[0].total_number_of_depreciations = MAX_SCHEDULE_ROWS + 1;
        a.number_of_depreciations_booked = 0;
        assert!(build_schedule_rows(&a, &a.finance_books[0], None).is_err());
    }
}
