//! Daily sales series built from a raw movement ledger.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use forgecast_inventory::Movement;

/// Units sold on one calendar day that had at least one sale.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    /// 1-based position among distinct sale dates, ascending.
    pub day_index: u32,
    pub units_sold: f64,
}

/// Sum SALE quantities per calendar date, oldest date first.
///
/// Purchases are ignored. Dates without sales are absent rather than zero, so
/// `day_index` counts selling days, not calendar days.
pub fn daily_sales_totals(movements: &[Movement]) -> Vec<(NaiveDate, f64)> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for m in movements.iter().filter(|m| m.is_sale()) {
        *by_date.entry(m.date()).or_insert(0.0) += f64::from(m.quantity);
    }
    by_date.into_iter().collect()
}

/// Collapse a ledger into one observation per selling day.
pub fn aggregate_daily_sales(movements: &[Movement]) -> Vec<DailyObservation> {
    daily_sales_totals(movements)
        .into_iter()
        .zip(1u32..)
        .map(|((_, units_sold), day_index)| DailyObservation {
            day_index,
            units_sold,
        })
        .collect()
}
