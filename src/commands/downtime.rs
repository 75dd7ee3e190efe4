// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::repair::get_downtime;
use crate::utils::parse_datetime;
use anyhow::Result;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let failure = parse_datetime(m.get_one::<String>("failure").unwrap())?;
    let completion = parse_datetime(m.get_one::<String>("completion").unwrap())?;
    println!("{:.2}", get_downtime(failure, completion));
    Ok(())
}
