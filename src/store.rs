// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed load/save for the documents a repair touches.

use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{RepairError, Result};
use crate::models::{
    Asset, AssetStatus, Company, DocStatus, FinanceBookRow, PurchaseInvoice, PurchaseInvoiceItem,
};
use crate::utils::{date_col, decimal_col};

/// Next name in a series such as `ACC-ASR-00001`.
pub fn next_name(conn: &Connection, prefix: &str) -> Result<String> {
    conn.execute(
        "INSERT INTO naming_series(prefix, current) VALUES(?1, 1)
         ON CONFLICT(prefix) DO UPDATE SET current=current+1",
        params![prefix],
    )?;
    let n: i64 = conn.query_row(
        "SELECT current FROM naming_series WHERE prefix=?1",
        params![prefix],
        |r| r.get(0),
    )?;
    Ok(format!("{}{:05}", prefix, n))
}

fn docstatus_col(v: i64) -> Result<DocStatus> {
    DocStatus::from_i64(v).ok_or_else(|| RepairError::Invalid(format!("docstatus {}", v)))
}

pub fn get_company(conn: &Connection, name: &str) -> Result<Company> {
    conn.query_row(
        "SELECT name, default_expense_account, stock_adjustment_account, perpetual_inventory, cost_center
         FROM companies WHERE name=?1",
        params![name],
        |r| {
            Ok(Company {
                name: r.get(0)?,
                default_expense_account: r.get(1)?,
                stock_adjustment_account: r.get(2)?,
                perpetual_inventory: r.get(3)?,
                cost_center: r.get(4)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| RepairError::not_found("Company", name))
}

pub fn upsert_company(conn: &Connection, c: &Company) -> Result<()> {
    conn.execute(
        "INSERT INTO companies(name, default_expense_account, stock_adjustment_account, perpetual_inventory, cost_center)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(name) DO UPDATE SET
            default_expense_account=excluded.default_expense_account,
            stock_adjustment_account=excluded.stock_adjustment_account,
            perpetual_inventory=excluded.perpetual_inventory,
            cost_center=excluded.cost_center",
        params![
            c.name,
            c.default_expense_account,
            c.stock_adjustment_account,
            c.perpetual_inventory,
            c.cost_center
        ],
    )?;
    Ok(())
}

pub fn is_perpetual_inventory_enabled(conn: &Connection, company: &str) -> Result<bool> {
    Ok(get_company(conn, company)?.perpetual_inventory)
}

pub fn set_asset_category_account(
    conn: &Connection,
    category: &str,
    company: &str,
    fixed_asset_account: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO asset_category_accounts(asset_category, company, fixed_asset_account)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(asset_category, company) DO UPDATE SET fixed_asset_account=excluded.fixed_asset_account",
        params![category, company, fixed_asset_account],
    )?;
    Ok(())
}

/// Fixed asset account for the asset's category in the given company.
pub fn get_asset_account(conn: &Connection, asset: &str, company: &str) -> Result<String> {
    let category: String = conn
        .query_row(
            "SELECT asset_category FROM assets WHERE name=?1",
            params![asset],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| RepairError::not_found("Asset", asset))?;
    conn.query_row(
        "SELECT fixed_asset_account FROM asset_category_accounts WHERE asset_category=?1 AND company=?2",
        params![category, company],
        |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| RepairError::MissingFixedAssetAccount {
        category,
        company: company.to_string(),
    })
}

pub fn get_asset(conn: &Connection, name: &str) -> Result<Asset> {
    let head = conn
        .query_row(
            "SELECT name, asset_category, company, gross_purchase_amount, purchase_date,
                    calculate_depreciation, number_of_depreciations_booked, status, docstatus
             FROM assets WHERE name=?1",
            params![name],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, bool>(5)?,
                    r.get::<_, i64>(6)?,
                    r.get::<_, String>(7)?,
                    r.get::<_, i64>(8)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| RepairError::not_found("Asset", name))?;
    let (name, category, company, gross, purchase_date, calc, booked, status, docstatus) = head;

    Ok(Asset {
        finance_books: get_finance_books(conn, &name)?,
        name,
        asset_category: category,
        company,
        gross_purchase_amount: decimal_col(&gross)?,
        purchase_date: date_col(&purchase_date)?,
        calculate_depreciation: calc,
        number_of_depreciations_booked: booked,
        status: status.parse::<AssetStatus>()?,
        docstatus: docstatus_col(docstatus)?,
    })
}

fn get_finance_books(conn: &Connection, asset: &str) -> Result<Vec<FinanceBookRow>> {
    let mut stmt = conn.prepare(
        "SELECT idx, finance_book, depreciation_method, total_number_of_depreciations,
                frequency_of_depreciation, depreciation_start_date, expected_value_after_useful_life,
                value_after_depreciation, rate_of_depreciation
         FROM asset_finance_books WHERE asset=?1 ORDER BY idx",
    )?;
    let mut cur = stmt.query(params![asset])?;
    let mut out = Vec::new();
    while let Some(r) = cur.next()? {
        let fb: String = r.get(1)?;
        let method: String = r.get(2)?;
        let start: String = r.get(5)?;
        let expected: String = r.get(6)?;
        let value: String = r.get(7)?;
        let rate: String = r.get(8)?;
        out.push(FinanceBookRow {
            idx: r.get(0)?,
            finance_book: if fb.is_empty() { None } else { Some(fb) },
            depreciation_method: method.parse()?,
            total_number_of_depreciations: r.get(3)?,
            frequency_of_depreciation: r.get(4)?,
            depreciation_start_date: date_col(&start)?,
            expected_value_after_useful_life: decimal_col(&expected)?,
            value_after_depreciation: decimal_col(&value)?,
            rate_of_depreciation: decimal_col(&rate)?,
        });
    }
    Ok(out)
}

/// Insert or overwrite an asset together with its finance book rows.
pub fn save_asset(conn: &Connection, asset: &Asset) -> Result<()> {
    if asset.number_of_depreciations_booked < 0 {
        return Err(RepairError::Invalid(format!(
            "number_of_depreciations_booked cannot be negative (asset {})",
            asset.name
        )));
    }
    for row in &asset.finance_books {
        if row.frequency_of_depreciation <= 0 {
            return Err(RepairError::Invalid(format!(
                "frequency_of_depreciation must be positive (asset {}, row {})",
                asset.name, row.idx
            )));
        }
        if asset.calculate_depreciation && row.total_number_of_depreciations <= 0 {
            return Err(RepairError::Invalid(format!(
                "total_number_of_depreciations must be positive (asset {}, row {})",
                asset.name, row.idx
            )));
        }
    }
    conn.execute(
        "INSERT INTO assets(name, asset_category, company, gross_purchase_amount, purchase_date,
                            calculate_depreciation, number_of_depreciations_booked, status, docstatus)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(name) DO UPDATE SET
            asset_category=excluded.asset_category,
            company=excluded.company,
            gross_purchase_amount=excluded.gross_purchase_amount,
            purchase_date=excluded.purchase_date,
            calculate_depreciation=excluded.calculate_depreciation,
            number_of_depreciations_booked=excluded.number_of_depreciations_booked,
            status=excluded.status,
            docstatus=excluded.docstatus",
        params![
            asset.name,
            asset.asset_category,
            asset.company,
            asset.gross_purchase_amount.to_string(),
            asset.purchase_date.to_string(),
            asset.calculate_depreciation,
            asset.number_of_depreciations_booked,
            asset.status.as_ref(),
            asset.docstatus.as_i64(),
        ],
    )?;
    conn.execute(
        "DELETE FROM asset_finance_books WHERE asset=?1",
        params![asset.name],
    )?;
    for row in &asset.finance_books {
        conn.execute(
            "INSERT INTO asset_finance_books(asset, idx, finance_book, depreciation_method,
                total_number_of_depreciations, frequency_of_depreciation, depreciation_start_date,
                expected_value_after_useful_life, value_after_depreciation, rate_of_depreciation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                asset.name,
                row.idx,
                row.finance_book_key(),
                row.depreciation_method.as_ref(),
                row.total_number_of_depreciations,
                row.frequency_of_depreciation,
                row.depreciation_start_date.to_string(),
                row.expected_value_after_useful_life.to_string(),
                row.value_after_depreciation.to_string(),
                row.rate_of_depreciation.to_string(),
            ],
        )?;
    }
    Ok(())
}

pub fn set_asset_status(conn: &Connection, asset: &str, status: AssetStatus) -> Result<()> {
    let n = conn.execute(
        "UPDATE assets SET status=?1 WHERE name=?2",
        params![status.as_ref(), asset],
    )?;
    if n == 0 {
        return Err(RepairError::not_found("Asset", asset));
    }
    Ok(())
}

/// Recompute the asset's status from its own state and persist it.
pub fn refresh_asset_status(conn: &Connection, asset: &str) -> Result<AssetStatus> {
    let doc = get_asset(conn, asset)?;
    let status = doc.compute_status();
    set_asset_status(conn, asset, status)?;
    Ok(status)
}

pub fn insert_purchase_invoice(conn: &Connection, pi: &PurchaseInvoice) -> Result<()> {
    conn.execute(
        "INSERT INTO purchase_invoices(name, company) VALUES (?1, ?2)",
        params![pi.name, pi.company],
    )?;
    for (i, item) in pi.items.iter().enumerate() {
        conn.execute(
            "INSERT INTO purchase_invoice_items(purchase_invoice, idx, item_code, expense_account, amount)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                pi.name,
                i as i64 + 1,
                item.item_code,
                item.expense_account,
                item.amount.to_string()
            ],
        )?;
    }
    Ok(())
}

pub fn get_purchase_invoice(conn: &Connection, name: &str) -> Result<PurchaseInvoice> {
    let company: String = conn
        .query_row(
            "SELECT company FROM purchase_invoices WHERE name=?1",
            params![name],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| RepairError::not_found("Purchase Invoice", name))?;
    let mut stmt = conn.prepare(
        "SELECT item_code, expense_account, amount FROM purchase_invoice_items
         WHERE purchase_invoice=?1 ORDER BY idx",
    )?;
    let mut cur = stmt.query(params![name])?;
    let mut items = Vec::new();
    while let Some(r) = cur.next()? {
        let amount: String = r.get(2)?;
        items.push(PurchaseInvoiceItem {
            item_code: r.get(0)?,
            expense_account: r.get(1)?,
            amount: decimal_col(&amount)?,
        });
    }
    Ok(PurchaseInvoice {
        name: name.to_string(),
        company,
        items,
    })
}

pub fn upsert_item(
    conn: &Connection,
    item_code: &str,
    expense_account: Option<&str>,
    valuation_rate: Decimal,
) -> Result<()> {
    conn.execute(
        "INSERT INTO items(item_code, expense_account, valuation_rate) VALUES (?1, ?2, ?3)
         ON CONFLICT(item_code) DO UPDATE SET
            expense_account=excluded.expense_account,
            valuation_rate=excluded.valuation_rate",
        params![item_code, expense_account, valuation_rate.to_string()],
    )?;
    Ok(())
}

/// (expense_account, valuation_rate) for an item.
pub fn get_item(conn: &Connection, item_code: &str) -> Result<(Option<String>, Decimal)> {
    let (acct, rate): (Option<String>, String) = conn
        .query_row(
            "SELECT expense_account, valuation_rate FROM items WHERE item_code=?1",
            params![item_code],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?
        .ok_or_else(|| RepairError::not_found("Item", item_code))?;
    Ok((acct, decimal_col(&rate)?))
}
