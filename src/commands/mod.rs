// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod assets;
pub mod categories;
pub mod companies;
pub mod doctor;
pub mod downtime;
pub mod exporter;
pub mod invoices;
pub mod items;
pub mod ledger;
pub mod repairs;
