// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("Please update Repair Status.")]
    RepairStatusPending,

    #[error("Missing Items: please enter Stock Items consumed during the Repair.")]
    MissingItems,

    #[error(
        "Missing Warehouse: please enter Warehouse from which Stock Items consumed during the Repair were taken."
    )]
    MissingWarehouse,

    #[error("Please set default Expense Account in Company {0}")]
    MissingDefaultExpenseAccount(String),

    #[error("Fixed Asset Account not set for category '{category}' in company '{company}'")]
    MissingFixedAssetAccount { category: String, company: String },

    #[error("No active depreciation schedule for asset '{asset}' (finance book '{finance_book}')")]
    MissingSchedule { asset: String, finance_book: String },

    #[error(
        "Insufficient stock for '{item_code}' in '{warehouse}': required {required}, available {available}"
    )]
    InsufficientStock {
        item_code: String,
        warehouse: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("GL entries for {voucher_no} do not balance: debit {debit}, credit {credit}")]
    UnbalancedEntries {
        voucher_no: String,
        debit: Decimal,
        credit: Decimal,
    },

    #[error("{doctype} '{name}' not found")]
    NotFound { doctype: &'static str, name: String },

    #[error("{doctype} '{name}' is {actual}; expected {expected}")]
    InvalidState {
        doctype: &'static str,
        name: String,
        actual: String,
        expected: &'static str,
    },

    #[error("Invalid value: {0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Decimal error: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Date error: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("Unknown enum value: {0}")]
    Enum(#[from] strum::ParseError),
}

impl RepairError {
    pub fn not_found(doctype: &'static str, name: impl Into<String>) -> Self {
        RepairError::NotFound {
            doctype,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepairError>;
