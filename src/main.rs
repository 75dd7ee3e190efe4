// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use repairbook::{cli, commands, db};

fn init_logging() {
    let filter = EnvFilter::try_from_env("REPAIRBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("company", sub)) => commands::companies::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("asset", sub)) => commands::assets::handle(&mut conn, sub)?,
        Some(("item", sub)) => commands::items::handle(&conn, sub)?,
        Some(("invoice", sub)) => commands::invoices::handle(&conn, sub)?,
        Some(("repair", sub)) => commands::repairs::handle(&mut conn, sub)?,
        Some(("gl", sub)) => commands::ledger::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("downtime", sub)) => commands::downtime::handle(sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
