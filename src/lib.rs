// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod gl;
pub mod models;
pub mod repair;
pub mod schedule;
pub mod stock;
pub mod store;
pub mod utils;

pub use error::{RepairError, Result};
pub use repair::get_downtime;
