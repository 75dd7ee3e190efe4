// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn req(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}

pub fn build_cli() -> Command {
    Command::new("repairbook")
        .version(crate_version!())
        .about("Fixed-asset repair accounting: capitalization, stock consumption, GL and depreciation")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("company")
                .about("Companies and their accounting defaults")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Company name"))
                        .arg(opt("default-expense-account", "Fallback expense account"))
                        .arg(opt("stock-adjustment-account", "Expense account for perpetual inventory"))
                        .arg(opt("cost-center", "Default cost center"))
                        .arg(flag("perpetual-inventory", "Enable perpetual inventory"))
                        .arg(flag("default", "Make this the default company")),
                )
                .subcommand(json_args(Command::new("list"))),
        )
        .subcommand(
            Command::new("category")
                .about("Asset category accounts")
                .subcommand(
                    Command::new("set-account")
                        .arg(req("category", "Asset category"))
                        .arg(opt("company", "Company (defaults to the default company)"))
                        .arg(req("fixed-asset-account", "Fixed asset account")),
                ),
        )
        .subcommand(
            Command::new("asset")
                .about("Fixed assets")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Asset name"))
                        .arg(req("category", "Asset category"))
                        .arg(opt("company", "Company"))
                        .arg(req("gross", "Gross purchase amount"))
                        .arg(req("purchase-date", "YYYY-MM-DD"))
                        .arg(flag("calculate-depreciation", "Depreciate this asset"))
                        .arg(
                            Arg::new("booked")
                                .long("booked")
                                .value_parser(clap::value_parser!(i64).range(0..))
                                .default_value("0")
                                .help("Depreciations already booked"),
                        ),
                )
                .subcommand(
                    Command::new("add-book")
                        .arg(req("asset", "Asset name"))
                        .arg(opt("finance-book", "Finance book name"))
                        .arg(
                            Arg::new("method")
                                .long("method")
                                .default_value("Straight Line")
                                .help("Straight Line | Written Down Value | Double Declining Balance"),
                        )
                        .arg(
                            Arg::new("total")
                                .long("total")
                                .required(true)
                                .value_parser(clap::value_parser!(i64).range(1..))
                                .help("Total number of depreciations"),
                        )
                        .arg(
                            Arg::new("frequency")
                                .long("frequency")
                                .default_value("12")
                                .value_parser(clap::value_parser!(i64).range(1..))
                                .help("Months between depreciations"),
                        )
                        .arg(req("start", "First pending depreciation date, YYYY-MM-DD"))
                        .arg(opt("salvage", "Expected value after useful life"))
                        .arg(opt("rate", "Rate of depreciation in percent per year (WDV)")),
                )
                .subcommand(Command::new("submit").arg(req("asset", "Asset name")))
                .subcommand(json_args(Command::new("show").arg(req("asset", "Asset name"))))
                .subcommand(json_args(
                    Command::new("schedule")
                        .arg(req("asset", "Asset name"))
                        .arg(opt("finance-book", "Finance book name")),
                )),
        )
        .subcommand(
            Command::new("item")
                .about("Stock items and warehouse balances")
                .subcommand(
                    Command::new("add")
                        .arg(req("code", "Item code"))
                        .arg(opt("expense-account", "Item expense account"))
                        .arg(opt("rate", "Valuation rate")),
                )
                .subcommand(
                    Command::new("receive")
                        .arg(req("code", "Item code"))
                        .arg(req("warehouse", "Warehouse"))
                        .arg(req("qty", "Quantity")),
                )
                .subcommand(
                    Command::new("stock")
                        .arg(req("code", "Item code"))
                        .arg(req("warehouse", "Warehouse")),
                ),
        )
        .subcommand(
            Command::new("invoice")
                .about("Purchase invoices")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Invoice number"))
                        .arg(opt("company", "Company"))
                        .arg(req("expense-account", "Expense account of the first line"))
                        .arg(req("amount", "Line amount"))
                        .arg(opt("item", "Item code")),
                ),
        )
        .subcommand(
            Command::new("repair")
                .about("Asset repairs")
                .subcommand(
                    Command::new("create")
                        .arg(req("asset", "Asset name"))
                        .arg(opt("company", "Company"))
                        .arg(opt("cost", "Repair cost"))
                        .arg(opt("invoice", "Purchase invoice for the repair cost"))
                        .arg(opt("warehouse", "Warehouse consumed stock is taken from"))
                        .arg(opt("cost-center", "Cost center"))
                        .arg(opt("project", "Project"))
                        .arg(opt("failure-date", "YYYY-MM-DD HH:MM:SS"))
                        .arg(opt("completion-date", "YYYY-MM-DD HH:MM:SS"))
                        .arg(opt("description", "What was repaired"))
                        .arg(flag("stock-consumption", "Stock items were consumed"))
                        .arg(flag("capitalize", "Capitalize the repair cost"))
                        .arg(
                            Arg::new("life-increase")
                                .long("life-increase")
                                .default_value("0")
                                .value_parser(clap::value_parser!(i64).range(0..=1200))
                                .help("Increase in asset life, in months (at most 1200)"),
                        ),
                )
                .subcommand(
                    Command::new("add-item")
                        .arg(req("repair", "Repair name"))
                        .arg(req("item", "Item code"))
                        .arg(req("qty", "Consumed quantity"))
                        .arg(opt("rate", "Valuation rate (defaults to the item's)"))
                        .arg(opt("serial", "Serial numbers")),
                )
                .subcommand(
                    Command::new("complete")
                        .arg(req("repair", "Repair name"))
                        .arg(opt("completion-date", "YYYY-MM-DD HH:MM:SS")),
                )
                .subcommand(
                    Command::new("submit")
                        .arg(req("repair", "Repair name"))
                        .arg(opt("date", "Posting date, YYYY-MM-DD (default today)")),
                )
                .subcommand(
                    Command::new("cancel")
                        .arg(req("repair", "Repair name"))
                        .arg(opt("date", "Posting date, YYYY-MM-DD (default today)")),
                )
                .subcommand(Command::new("delete").arg(req("repair", "Repair name")))
                .subcommand(json_args(Command::new("show").arg(req("repair", "Repair name"))))
                .subcommand(json_args(Command::new("list").arg(opt("asset", "Asset name")))),
        )
        .subcommand(
            Command::new("gl")
                .about("General ledger")
                .subcommand(json_args(Command::new("list").arg(opt("voucher", "Voucher number")))),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("gl")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(req("out", "Output file"))
                        .arg(opt("voucher", "Voucher number")),
                ),
        )
        .subcommand(
            Command::new("downtime")
                .about("Hours between failure and completion")
                .arg(req("failure", "YYYY-MM-DD HH:MM:SS"))
                .arg(req("completion", "YYYY-MM-DD HH:MM:SS")),
        )
        .subcommand(Command::new("doctor").about("Check ledger and stock consistency"))
}
