//! Plain-text export of a ledger snapshot.

use std::fmt::Write;

use crate::core::LedgerSnapshot;

use super::output::money;

/// Renders totals, the category breakdown, the daily trend, and insights.
///
/// Categories are listed by descending amount, then name; days chronologically.
pub fn render_report(snapshot: &LedgerSnapshot, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Expense Report");
    let _ = writeln!(out, "==============");

    if snapshot.is_empty() {
        let _ = writeln!(out, "No expenses recorded.");
        return out;
    }

    let _ = writeln!(out, "Records: {}", snapshot.records.len());
    let _ = writeln!(
        out,
        "Total spent: {}",
        money(currency, snapshot.total_spent)
    );
    if let Some(remaining) = snapshot.remaining_budget {
        let _ = writeln!(out, "Remaining budget: {}", money(currency, remaining));
    }

    let _ = writeln!(out, "\nBy category:");
    for (category, amount) in sorted_categories(snapshot) {
        let share = if snapshot.total_spent > 0.0 {
            amount / snapshot.total_spent * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "  {category:<16}{:>12} {share:>6.1}%",
            money(currency, amount)
        );
    }

    let _ = writeln!(out, "\nBy day:");
    for (date, amount) in &snapshot.by_day {
        let _ = writeln!(out, "  {date}  {:>12}", money(currency, *amount));
    }

    if !snapshot.insights.is_empty() {
        let _ = writeln!(out, "\nInsights:");
        for insight in &snapshot.insights {
            let _ = writeln!(out, "  - {}", insight.render(currency));
        }
    }
    out
}

/// Category totals ordered by amount (largest first), ties by name.
pub fn sorted_categories(snapshot: &LedgerSnapshot) -> Vec<(&str, f64)> {
    let mut entries: Vec<(&str, f64)> = snapshot
        .by_category
        .iter()
        .map(|(category, amount)| (category.as_str(), *amount))
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
}
