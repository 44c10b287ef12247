use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    core::{
        services::{Insight, InsightOptions, InsightService, SummaryService},
        validation,
    },
    domain::ExpenseRecord,
    errors::{LedgerError, RecordError},
    storage::ExpenseStore,
};

/// Everything a front end needs to render the current state of the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub records: Vec<ExpenseRecord>,
    pub total_spent: f64,
    pub by_category: BTreeMap<String, f64>,
    pub by_day: BTreeMap<NaiveDate, f64>,
    pub remaining_budget: Option<f64>,
    pub insights: Vec<Insight>,
}

impl LedgerSnapshot {
    pub fn from_records(records: Vec<ExpenseRecord>, options: &InsightOptions) -> Self {
        let total_spent = SummaryService::total_spent(&records);
        let by_category = SummaryService::category_summary(&records);
        let by_day = SummaryService::daily_spending(&records);
        let remaining_budget = options
            .budget
            .and_then(|budget| SummaryService::remaining_budget(&records, budget));
        let insights = InsightService::budget_insights(&records, options);
        Self {
            records,
            total_spent,
            by_category,
            by_day,
            remaining_budget,
            insights,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Facade that pairs a store with caller-side validation and aggregation.
pub struct ExpenseLedger {
    store: Box<dyn ExpenseStore>,
}

impl ExpenseLedger {
    /// Wraps `store` and makes sure it is ready for appends.
    ///
    /// This creates the backing file when missing, even if the caller only reads.
    pub fn open(store: Box<dyn ExpenseStore>) -> Result<Self, LedgerError> {
        store.initialize()?;
        Ok(Self { store })
    }

    pub fn store(&self) -> &dyn ExpenseStore {
        self.store.as_ref()
    }

    /// Validates the submission and appends it under the canonical category label.
    pub fn record_expense(
        &self,
        amount: f64,
        category: &str,
        note: &str,
    ) -> Result<ExpenseRecord, RecordError> {
        let category = validation::validate_expense(amount, category)?;
        Ok(self.store.append(amount, category.as_str(), note.trim())?)
    }

    pub fn records(&self) -> Result<Vec<ExpenseRecord>, LedgerError> {
        self.store.read_all()
    }

    pub fn snapshot(&self, options: &InsightOptions) -> Result<LedgerSnapshot, LedgerError> {
        Ok(LedgerSnapshot::from_records(self.records()?, options))
    }
}
