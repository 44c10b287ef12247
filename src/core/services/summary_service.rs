use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::domain::ExpenseRecord;

/// Pure aggregations over an in-memory slice of records.
pub struct SummaryService;

impl SummaryService {
    /// Sum of every amount; `0.0` for an empty slice.
    pub fn total_spent(records: &[ExpenseRecord]) -> f64 {
        records.iter().fold(0.0, |acc, record| acc + record.amount)
    }

    /// Total per category present in `records`. Absent categories get no entry.
    pub fn category_summary(records: &[ExpenseRecord]) -> BTreeMap<String, f64> {
        let mut summary = BTreeMap::new();
        for record in records {
            *summary.entry(record.category.clone()).or_insert(0.0) += record.amount;
        }
        summary
    }

    /// Total per calendar day present in `records`, keyed chronologically.
    pub fn daily_spending(records: &[ExpenseRecord]) -> BTreeMap<NaiveDate, f64> {
        let mut daily = BTreeMap::new();
        for record in records {
            *daily.entry(record.date).or_insert(0.0) += record.amount;
        }
        daily
    }

    /// Category with the largest total and that total.
    ///
    /// Ties resolve to the category that appears first in `records`.
    pub fn highest_category(records: &[ExpenseRecord]) -> Option<(String, f64)> {
        let mut first_seen: Vec<&str> = Vec::new();
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for record in records {
            let total = totals.entry(record.category.as_str()).or_insert_with(|| {
                first_seen.push(record.category.as_str());
                0.0
            });
            *total += record.amount;
        }

        let mut best: Option<(&str, f64)> = None;
        for category in first_seen {
            let total = totals.get(category).copied().unwrap_or(0.0);
            match best {
                Some((_, current)) if total <= current => {}
                _ => best = Some((category, total)),
            }
        }
        best.map(|(category, total)| (category.to_string(), total))
    }

    /// Budget left after `records`; `None` when no positive budget is set.
    ///
    /// Negative when spending exceeds the budget.
    pub fn remaining_budget(records: &[ExpenseRecord], budget: f64) -> Option<f64> {
        (budget > 0.0).then(|| budget - Self::total_spent(records))
    }
}
