// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Document lifecycle shared by every submittable record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum DocStatus {
    Draft,
    Submitted,
    Cancelled,
}

impl DocStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            DocStatus::Draft => 0,
            DocStatus::Submitted => 1,
            DocStatus::Cancelled => 2,
        }
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(DocStatus::Draft),
            1 => Some(DocStatus::Submitted),
            2 => Some(DocStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum RepairStatus {
    Pending,
    Completed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum AssetStatus {
    Draft,
    Submitted,
    #[strum(serialize = "Partially Depreciated")]
    PartiallyDepreciated,
    #[strum(serialize = "Fully Depreciated")]
    FullyDepreciated,
    #[strum(serialize = "Out of Order")]
    OutOfOrder,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum DepreciationMethod {
    #[strum(serialize = "Straight Line")]
    StraightLine,
    #[strum(serialize = "Written Down Value")]
    WrittenDownValue,
    #[strum(serialize = "Double Declining Balance")]
    DoubleDecliningBalance,
}

impl DepreciationMethod {
    /// Declining methods never land exactly on the salvage value, so the
    /// residual is read back from the generated schedule.
    pub fn is_declining(self) -> bool {
        matches!(
            self,
            DepreciationMethod::WrittenDownValue | DepreciationMethod::DoubleDecliningBalance
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceBookRow {
    pub idx: i64,
    pub finance_book: Option<String>,
    pub depreciation_method: DepreciationMethod,
    pub total_number_of_depreciations: i64,
    pub frequency_of_depreciation: i64, // months
    pub depreciation_start_date: NaiveDate,
    pub expected_value_after_useful_life: Decimal,
    pub value_after_depreciation: Decimal,
    pub rate_of_depreciation: Decimal, // percent per year
}

impl FinanceBookRow {
    pub fn finance_book_key(&self) -> &str {
        self.finance_book.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub asset_category: String,
    pub company: String,
    pub gross_purchase_amount: Decimal,
    pub purchase_date: NaiveDate,
    pub calculate_depreciation: bool,
    pub number_of_depreciations_booked: i64,
    pub status: AssetStatus,
    pub docstatus: DocStatus,
    pub finance_books: Vec<FinanceBookRow>,
}

impl Asset {
    /// Status derived from the document state and the first finance book.
    pub fn compute_status(&self) -> AssetStatus {
        match self.docstatus {
            DocStatus::Draft => AssetStatus::Draft,
            DocStatus::Cancelled => AssetStatus::Cancelled,
            DocStatus::Submitted => match self.finance_books.first() {
                Some(row) if self.calculate_depreciation => {
                    if row.value_after_depreciation <= row.expected_value_after_useful_life {
                        AssetStatus::FullyDepreciated
                    } else if row.value_after_depreciation < self.gross_purchase_amount {
                        AssetStatus::PartiallyDepreciated
                    } else {
                        AssetStatus::Submitted
                    }
                }
                _ => AssetStatus::Submitted,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLine {
    pub item_code: String,
    pub valuation_rate: Decimal,
    pub consumed_quantity: Decimal,
    pub serial_no: Option<String>,
    pub total_value: Decimal,
}

impl StockLine {
    pub fn new(item_code: &str, valuation_rate: Decimal, consumed_quantity: Decimal) -> Self {
        StockLine {
            item_code: item_code.to_string(),
            valuation_rate,
            consumed_quantity,
            serial_no: None,
            total_value: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairRecord {
    pub name: String,
    pub asset: String,
    pub company: String,
    pub repair_status: RepairStatus,
    pub failure_date: Option<NaiveDateTime>,
    pub completion_date: Option<NaiveDateTime>,
    pub downtime: Option<Decimal>, // hours
    pub repair_cost: Decimal,
    pub purchase_invoice: Option<String>,
    pub warehouse: Option<String>,
    pub cost_center: Option<String>,
    pub project: Option<String>,
    pub stock_consumption: bool,
    pub capitalize_repair_cost: bool,
    pub increase_in_asset_life: i64, // months
    pub stock_items: Vec<StockLine>,
    pub stock_entry: Option<String>,
    pub total_repair_cost: Decimal,
    pub description: Option<String>,
    pub docstatus: DocStatus,
}

impl RepairRecord {
    /// A fresh, unsaved repair in Pending state; `name` is assigned on save.
    pub fn new(asset: &str, company: &str) -> Self {
        RepairRecord {
            name: String::new(),
            asset: asset.to_string(),
            company: company.to_string(),
            repair_status: RepairStatus::Pending,
            failure_date: None,
            completion_date: None,
            downtime: None,
            repair_cost: Decimal::ZERO,
            purchase_invoice: None,
            warehouse: None,
            cost_center: None,
            project: None,
            stock_consumption: false,
            capitalize_repair_cost: false,
            increase_in_asset_life: 0,
            stock_items: Vec::new(),
            stock_entry: None,
            total_repair_cost: Decimal::ZERO,
            description: None,
            docstatus: DocStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlEntry {
    pub posting_date: NaiveDate,
    pub account: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub against: String,
    pub voucher_type: String,
    pub voucher_no: String,
    pub against_voucher_type: Option<String>,
    pub against_voucher: Option<String>,
    pub cost_center: Option<String>,
    pub company: String,
    pub is_cancelled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntryItem {
    pub s_warehouse: String,
    pub item_code: String,
    pub qty: Decimal,
    pub basic_rate: Decimal,
    pub amount: Decimal,
    pub serial_no: Option<String>,
    pub cost_center: Option<String>,
    pub project: Option<String>,
    pub expense_account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    pub name: String,
    pub stock_entry_type: String,
    pub company: String,
    pub posting_date: NaiveDate,
    pub docstatus: DocStatus,
    pub items: Vec<StockEntryItem>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ScheduleStatus {
    Draft,
    Active,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub idx: i64,
    pub schedule_date: NaiveDate,
    pub depreciation_amount: Decimal,
    pub accumulated_depreciation_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub name: String,
    pub asset: String,
    pub finance_book: Option<String>,
    pub status: ScheduleStatus,
    pub notes: Option<String>,
    pub expected_value_after_useful_life: Decimal,
    pub rows: Vec<ScheduleRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub default_expense_account: Option<String>,
    pub stock_adjustment_account: Option<String>,
    pub perpetual_inventory: bool,
    pub cost_center: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInvoiceItem {
    pub item_code: Option<String>,
    pub expense_account: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInvoice {
    pub name: String,
    pub company: String,
    pub items: Vec<PurchaseInvoiceItem>,
}
