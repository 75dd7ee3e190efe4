// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::resolve_company;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("set-account", sub)) = m.subcommand() {
        let category = sub.get_one::<String>("category").unwrap().trim();
        let company = resolve_company(conn, sub.get_one::<String>("company"))?;
        let account = sub
            .get_one::<String>("fixed-asset-account")
            .unwrap()
            .trim();
        store::get_company(conn, &company)?;
        store::set_asset_category_account(conn, category, &company, account)?;
        println!(
            "Category '{}' in {} now capitalizes to '{}'",
            category, company, account
        );
    }
    Ok(())
}
