// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Keeps the number of depreciations in step with a change in asset life.
//!
//! Whole periods of the life change move `total_number_of_depreciations`
//! directly. Left-over months shift the final schedule date, and may cost or
//! gain one more depreciation when the shifted date crosses the last date the
//! current count can reach.

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::debug;

use crate::error::{RepairError, Result};
use crate::models::{Asset, FinanceBookRow, ScheduleRow, ScheduleStatus};
use crate::schedule::{self, ScheduleEndDate};
use crate::utils::{add_months, round2};

fn overflow(row: &FinanceBookRow, what: &str) -> RepairError {
    RepairError::Invalid(format!(
        "{} overflows for finance book '{}'",
        what,
        row.finance_book_key()
    ))
}

/// `total ± months / freq`, checked.
fn shift_total(row: &mut FinanceBookRow, months: i64, sign: i64) -> Result<()> {
    let periods = months
        .checked_div(row.frequency_of_depreciation)
        .ok_or_else(|| overflow(row, "life change"))?;
    row.total_number_of_depreciations = periods
        .checked_mul(sign)
        .and_then(|p| row.total_number_of_depreciations.checked_add(p))
        .ok_or_else(|| overflow(row, "number of depreciations"))?;
    Ok(())
}

/// `start + periods * frequency`, checked.
fn reachable_date(row: &FinanceBookRow, periods: i64) -> Result<NaiveDate> {
    let months = periods
        .checked_mul(row.frequency_of_depreciation)
        .ok_or_else(|| overflow(row, "schedule span"))?;
    add_months(row.depreciation_start_date, months)
}

fn active_last_schedule_date(conn: &Connection, asset: &Asset, row: &FinanceBookRow) -> Result<NaiveDate> {
    let depr_schedule: Vec<ScheduleRow> = schedule::get_depr_schedule(
        conn,
        &asset.name,
        ScheduleStatus::Active,
        row.finance_book.as_deref(),
    )?;
    depr_schedule
        .last()
        .map(|r| r.schedule_date)
        .ok_or_else(|| RepairError::MissingSchedule {
            asset: asset.name.clone(),
            finance_book: row.finance_book_key().to_string(),
        })
}

/// Lengthen every finance book by `months`; returns the end dates the new
/// schedules must respect.
pub fn modify_depreciation_schedule(
    conn: &Connection,
    asset: &mut Asset,
    months: i64,
) -> Result<Vec<ScheduleEndDate>> {
    let mut end_dates = Vec::new();
    let booked = asset.number_of_depreciations_booked;
    let snapshot = asset.clone();
    for row in &mut asset.finance_books {
        let freq = row.frequency_of_depreciation;
        shift_total(row, months, 1)?;

        let extra_months = months % freq;
        if extra_months != 0 {
            let last = active_last_schedule_date(conn, &snapshot, row)?;
            let end_date = calculate_last_schedule_date(row, booked, last, extra_months)?;
            end_dates.push(ScheduleEndDate {
                finance_book: row.finance_book.clone(),
                end_date,
            });
        }
        debug!(
            asset = %snapshot.name,
            finance_book = row.finance_book_key(),
            total = row.total_number_of_depreciations,
            "depreciation count extended"
        );
    }
    Ok(end_dates)
}

/// Move the final date forward by `extra_months`; one more depreciation is
/// needed when that lands beyond `start + pending * frequency`.
pub fn calculate_last_schedule_date(
    row: &mut FinanceBookRow,
    number_of_depreciations_booked: i64,
    last_schedule_date: NaiveDate,
    extra_months: i64,
) -> Result<NaiveDate> {
    let pending = row
        .total_number_of_depreciations
        .checked_sub(number_of_depreciations_booked)
        .ok_or_else(|| overflow(row, "pending depreciations"))?;
    let to_date = add_months(last_schedule_date, extra_months)?;
    let schedule_date = reachable_date(row, pending)?;
    if to_date > schedule_date {
        row.total_number_of_depreciations = row
            .total_number_of_depreciations
            .checked_add(1)
            .ok_or_else(|| overflow(row, "number of depreciations"))?;
    }
    Ok(to_date)
}

/// Undo `modify_depreciation_schedule` for a cancelled repair.
pub fn revert_depreciation_schedule_on_cancellation(
    conn: &Connection,
    asset: &mut Asset,
    months: i64,
) -> Result<Vec<ScheduleEndDate>> {
    let mut end_dates = Vec::new();
    let booked = asset.number_of_depreciations_booked;
    let snapshot = asset.clone();
    for row in &mut asset.finance_books {
        let freq = row.frequency_of_depreciation;
        shift_total(row, months, -1)?;

        let extra_months = months % freq;
        if extra_months != 0 {
            let last = active_last_schedule_date(conn, &snapshot, row)?;
            let end_date =
                calculate_last_schedule_date_before_modification(row, booked, last, extra_months)?;
            end_dates.push(ScheduleEndDate {
                finance_book: row.finance_book.clone(),
                end_date,
            });
        }
    }
    Ok(end_dates)
}

/// Move the final date back by `extra_months`; one depreciation fewer when
/// that lands before `start + (pending - 1) * frequency`.
pub fn calculate_last_schedule_date_before_modification(
    row: &mut FinanceBookRow,
    number_of_depreciations_booked: i64,
    last_schedule_date: NaiveDate,
    extra_months: i64,
) -> Result<NaiveDate> {
    let pending = row
        .total_number_of_depreciations
        .checked_sub(number_of_depreciations_booked)
        .ok_or_else(|| overflow(row, "pending depreciations"))?;
    let to_date = add_months(last_schedule_date, -extra_months)?;
    let schedule_date = reachable_date(row, pending - 1)?;
    if to_date < schedule_date {
        row.total_number_of_depreciations -= 1;
    }
    Ok(to_date)
}

/// Declining-balance books take their residual value from the end of the
/// active schedule.
pub fn update_asset_expected_value_after_useful_life(conn: &Connection, asset: &mut Asset) -> Result<()> {
    for row in &mut asset.finance_books {
        if !row.depreciation_method.is_declining() {
            continue;
        }
        let doc = schedule::get_asset_depr_schedule_doc(
            conn,
            &asset.name,
            ScheduleStatus::Active,
            row.finance_book.as_deref(),
        )?
        .ok_or_else(|| RepairError::MissingSchedule {
            asset: asset.name.clone(),
            finance_book: row.finance_book_key().to_string(),
        })?;
        let accumulated_after_full_schedule = doc
            .rows
            .iter()
            .map(|r| r.accumulated_depreciation_amount)
            .max()
            .ok_or_else(|| RepairError::MissingSchedule {
                asset: asset.name.clone(),
                finance_book: row.finance_book_key().to_string(),
            })?;

        let value_after_full_schedule =
            round2(row.value_after_depreciation - accumulated_after_full_schedule);
        row.expected_value_after_useful_life = value_after_full_schedule;
        schedule::set_expected_value_after_useful_life(conn, &doc.name, value_after_full_schedule)?;
    }
    Ok(())
}
