// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::stock;
use crate::store;
use crate::utils::parse_decimal;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim();
            let account = sub
                .get_one::<String>("expense-account")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty());
            let rate = match sub.get_one::<String>("rate") {
                Some(s) => parse_decimal(s)?,
                None => Decimal::ZERO,
            };
            store::upsert_item(conn, code, account, rate)?;
            println!("Saved item '{}' at {}", code, rate);
        }
        Some(("receive", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim();
            let warehouse = sub.get_one::<String>("warehouse").unwrap().trim();
            let qty = parse_decimal(sub.get_one::<String>("qty").unwrap())?;
            let balance = stock::receive(conn, code, warehouse, qty)?;
            println!("Received {} {} into {} (balance {})", qty, code, warehouse, balance);
        }
        Some(("stock", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim();
            let warehouse = sub.get_one::<String>("warehouse").unwrap().trim();
            println!("{}", stock::bin_qty(conn, code, warehouse)?);
        }
        _ => {}
    }
    Ok(())
}
