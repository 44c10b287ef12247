use std::fmt;

use serde::Serialize;

use crate::domain::ExpenseRecord;

use super::SummaryService;

/// Share of total spending above which a category is flagged as dominant.
pub const DEFAULT_DOMINANT_SHARE: f64 = 0.4;

/// A derived observation about the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    HighestCategory { category: String, amount: f64 },
    TotalSpent { total: f64 },
    BudgetRemaining { budget: f64, remaining: f64 },
    BudgetExceeded { budget: f64, overspend: f64 },
    DominantCategory { category: String, share: f64 },
}

impl Insight {
    /// Renders the insight as a sentence, prefixing amounts with `currency`.
    pub fn render(&self, currency: &str) -> String {
        match self {
            Insight::HighestCategory { category, .. } => {
                format!("You spent most on {category}.")
            }
            Insight::TotalSpent { total } => {
                format!("Total expenses recorded: {currency}{total:.2}")
            }
            Insight::BudgetRemaining { remaining, .. } => {
                format!("You are within budget with {currency}{remaining:.2} remaining.")
            }
            Insight::BudgetExceeded { budget, overspend } => format!(
                "You have exceeded your budget of {currency}{budget:.2} by {currency}{overspend:.2}."
            ),
            Insight::DominantCategory { category, share } => format!(
                "{category} accounts for {:.1}% of your spending.",
                share * 100.0
            ),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Insight::BudgetExceeded { .. } | Insight::DominantCategory { .. }
        )
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

/// Knobs for the budget-aware insight pass. Budget is never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightOptions {
    pub budget: Option<f64>,
    pub dominant_share: f64,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            budget: None,
            dominant_share: DEFAULT_DOMINANT_SHARE,
        }
    }
}

impl InsightOptions {
    pub fn with_budget(budget: f64) -> Self {
        Self {
            budget: Some(budget),
            ..Self::default()
        }
    }
}

pub struct InsightService;

impl InsightService {
    /// Highest category followed by the total; empty when there are no records.
    pub fn insights(records: &[ExpenseRecord]) -> Vec<Insight> {
        let Some((category, amount)) = SummaryService::highest_category(records) else {
            return Vec::new();
        };
        vec![
            Insight::HighestCategory { category, amount },
            Insight::TotalSpent {
                total: SummaryService::total_spent(records),
            },
        ]
    }

    /// Base insights extended with budget and concentration checks.
    pub fn budget_insights(records: &[ExpenseRecord], options: &InsightOptions) -> Vec<Insight> {
        let mut insights = Self::insights(records);
        if insights.is_empty() {
            return insights;
        }

        let total = SummaryService::total_spent(records);
        if let Some(budget) = options.budget.filter(|budget| *budget > 0.0) {
            if total > budget {
                insights.push(Insight::BudgetExceeded {
                    budget,
                    overspend: total - budget,
                });
            } else {
                insights.push(Insight::BudgetRemaining {
                    budget,
                    remaining: budget - total,
                });
            }
        }

        if total > 0.0 {
            if let Some((category, amount)) = SummaryService::highest_category(records) {
                let share = amount / total;
                if share > options.dominant_share {
                    insights.push(Insight::DominantCategory { category, share });
                }
            }
        }

        insights
    }
}
