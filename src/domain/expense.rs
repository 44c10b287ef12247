use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logged spending event.
///
/// Field order matches the persisted column order: `date, amount, category, note`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub note: String,
}

impl ExpenseRecord {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            category: category.into(),
            note: note.into(),
        }
    }
}
