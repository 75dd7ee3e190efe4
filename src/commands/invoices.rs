// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{PurchaseInvoice, PurchaseInvoiceItem};
use crate::store;
use crate::utils::{parse_decimal, resolve_company};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("add", sub)) = m.subcommand() {
        let invoice = PurchaseInvoice {
            name: sub.get_one::<String>("name").unwrap().trim().to_string(),
            company: resolve_company(conn, sub.get_one::<String>("company"))?,
            items: vec![PurchaseInvoiceItem {
                item_code: sub.get_one::<String>("item").map(|s| s.trim().to_string()),
                expense_account: sub
                    .get_one::<String>("expense-account")
                    .unwrap()
                    .trim()
                    .to_string(),
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
            }],
        };
        store::insert_purchase_invoice(conn, &invoice)?;
        println!(
            "Recorded purchase invoice {} ({} to {})",
            invoice.name, invoice.items[0].amount, invoice.items[0].expense_account
        );
    }
    Ok(())
}
