// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use crate::models::{Asset, RepairRecord};

pub fn set_stock_items_cost(repair: &mut RepairRecord) {
    for item in &mut repair.stock_items {
        item.total_value = item.valuation_rate * item.consumed_quantity;
    }
}

/// Value of consumed stock; zero unless stock consumption is enabled.
pub fn get_total_value_of_stock_consumed(repair: &RepairRecord) -> Decimal {
    if !repair.stock_consumption {
        return Decimal::ZERO;
    }
    repair.stock_items.iter().map(|i| i.total_value).sum()
}

pub fn calculate_total_repair_cost(repair: &mut RepairRecord) {
    repair.total_repair_cost = repair.repair_cost + get_total_value_of_stock_consumed(repair);
}

fn capitalized_amount(repair: &RepairRecord) -> Decimal {
    let mut amount = get_total_value_of_stock_consumed(repair);
    if repair.capitalize_repair_cost {
        amount += repair.repair_cost;
    }
    amount
}

pub fn increase_asset_value(repair: &RepairRecord, asset: &mut Asset) {
    if !asset.calculate_depreciation {
        return;
    }
    let amount = capitalized_amount(repair);
    for row in &mut asset.finance_books {
        row.value_after_depreciation += amount;
    }
}

pub fn decrease_asset_value(repair: &RepairRecord, asset: &mut Asset) {
    if !asset.calculate_depreciation {
        return;
    }
    let amount = capitalized_amount(repair);
    for row in &mut asset.finance_books {
        row.value_after_depreciation -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StockLine;
    use rust_decimal::Decimal;

    fn repair_with_lines() -> RepairRecord {
        let mut r = RepairRecord::new("AST-1", "Acme");
        r.repair_cost = Decimal::from(100);
        r.stock_items = vec![
            StockLine::new("BOLT", Decimal::new(250, 2), Decimal::from(4)),
            StockLine::new("BELT", Decimal::new(1999, 2), Decimal::new(15, 1)),
        ];
        set_stock_items_cost(&mut r);
        r
    }

    #[test]
    fn line_value_is_rate_times_quantity() {
        let r = repair_with_lines();
        assert_eq!(r.stock_items[0].total_value, Decimal::from(10));
        assert_eq!(r.stock_items[1].total_value, Decimal::new(29985, 3));
    }

    #[test]
    fn stock_total_ignored_without_consumption() {
        let mut r = repair_with_lines();
        calculate_total_repair_cost(&mut r);
        assert_eq!(r.total_repair_cost, Decimal::from(100));

        r.stock_consumption = true;
        calculate_total_repair_cost(&mut r);
        assert_eq!(r.total_repair_cost, Decimal::new(139985, 3));
    }
}
