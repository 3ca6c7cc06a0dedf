//! Monthly returns and their year x month pivot.
//!
//! A month's return is its last valid close against the previous month's
//! last valid close. The first month is measured from its own first close.
//! Returns are in percent and go through [`percent_change`], so a zero
//! baseline leaves the cell empty instead of reporting 0%.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::price::PriceSeries;
use crate::domain::variation::percent_change;

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReturnRow {
    pub year: i32,
    pub months: [Option<f64>; 12],
    /// Compounded over the months that have a return.
    pub ytd: Option<f64>,
}

pub fn compute_monthly_returns(series: &PriceSeries) -> Vec<MonthlyReturn> {
    // (first close, last close) per month
    let mut monthly: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for bar in series.bars() {
        let Some(close) = bar.valid_close() else {
            continue;
        };
        let key = (bar.date.year(), bar.date.month());
        monthly
            .entry(key)
            .and_modify(|(_, last)| *last = close)
            .or_insert((close, close));
    }

    let mut returns = Vec::with_capacity(monthly.len());
    let mut prev_end: Option<f64> = None;

    for ((year, month), (first, last)) in monthly {
        let baseline = prev_end.unwrap_or(first);
        returns.push(MonthlyReturn {
            year,
            month,
            return_pct: percent_change(baseline, last).ok(),
        });
        prev_end = Some(last);
    }

    returns
}

pub fn pivot(returns: &[MonthlyReturn]) -> Vec<MonthlyReturnRow> {
    let (Some(min_year), Some(max_year)) = (
        returns.iter().map(|r| r.year).min(),
        returns.iter().map(|r| r.year).max(),
    ) else {
        return Vec::new();
    };

    let mut years: BTreeMap<i32, [Option<f64>; 12]> =
        (min_year..=max_year).map(|y| (y, [None; 12])).collect();
    for r in returns {
        if let (Some(cells), Some(idx)) = (years.get_mut(&r.year), (r.month as usize).checked_sub(1))
        {
            if let Some(cell) = cells.get_mut(idx) {
                *cell = r.return_pct;
            }
        }
    }

    years
        .into_iter()
        .map(|(year, months)| {
            let available: Vec<f64> = months.iter().flatten().copied().collect();
            let ytd = if available.is_empty() {
                None
            } else {
                let growth: f64 = available.iter().map(|r| 1.0 + r / 100.0).product();
                Some((growth - 1.0) * 100.0)
            };
            MonthlyReturnRow { year, months, ytd }
        })
        .collect()
}
