//! Text charts
//!
//! A share chart stands in for a pie chart: one bar per category, scaled to
//! the largest share. The trend chart draws one bar per month.

use crate::reports::{MonthlyTrend, SpendingReport};

use super::format::{format_bar, format_percentage, separator};

const LABEL_WIDTH: usize = 15;

/// Category shares of a spending report as horizontal bars
pub fn render_share_chart(report: &SpendingReport, width: usize) -> String {
    if report.categories.is_empty() {
        return "No expenses to display\n".to_string();
    }

    let mut output = format!("Expense Distribution ({})\n", report.currency);
    output.push_str(&separator(LABEL_WIDTH + width + 24));
    output.push('\n');

    // Categories are sorted by total, largest first
    let max = report
        .top_categories(1)
        .first()
        .map_or(0.0, |c| c.percentage);

    for line in &report.categories {
        output.push_str(&format!(
            "{:<label$} {} {:>6} {}\n",
            line.category.name(),
            format_bar(line.percentage, max, width),
            format_percentage(line.percentage),
            report.currency.format(line.total),
            label = LABEL_WIDTH
        ));
    }

    output
}

/// Monthly totals as horizontal bars, with the largest category per month
pub fn render_trend_chart(trend: &MonthlyTrend, width: usize) -> String {
    if trend.is_empty() {
        return "No expenses to display\n".to_string();
    }

    let mut output = format!("Monthly Spending Trend ({})\n", trend.currency);
    output.push_str(&separator(LABEL_WIDTH + width + 24));
    output.push('\n');

    let totals = trend.month_totals();
    let max = totals
        .iter()
        .map(|(_, total)| total.minor() as f64)
        .fold(0.0, f64::max);

    for ((month, categories), (_, total)) in trend.months.iter().zip(&totals) {
        let top = categories
            .iter()
            .max_by_key(|(_, amount)| **amount)
            .map(|(category, _)| format!(" (top: {})", category))
            .unwrap_or_default();
        output.push_str(&format!(
            "{:<label$} {} {}{}\n",
            month.label(),
            format_bar(total.minor() as f64, max, width),
            trend.currency.format(*total),
            top,
            label = LABEL_WIDTH
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Currency, Money};
    use crate::reports::{CategorySpending, ReportRange};
    use std::collections::BTreeMap;

    fn report() -> SpendingReport {
        SpendingReport {
            owner: "you".into(),
            currency: Currency::Inr,
            range: ReportRange::all_time(),
            categories: vec![
                CategorySpending {
                    category: Category::Housing,
                    total: Money::from_minor(750_000),
                    count: 1,
                    percentage: 75.0,
                },
                CategorySpending {
                    category: Category::Food,
                    total: Money::from_minor(250_000),
                    count: 4,
                    percentage: 25.0,
                },
            ],
            total: Money::from_minor(1_000_000),
            expense_count: 5,
            budgets: Vec::new(),
            recurring: Vec::new(),
        }
    }

    #[test]
    fn test_share_chart_scales_to_largest() {
        let chart = render_share_chart(&report(), 20);
        let lines: Vec<&str> = chart.lines().collect();
        assert!(lines[0].contains("Expense Distribution (INR)"));
        assert_eq!(lines[2].chars().filter(|c| *c == '█').count(), 20);
        assert_eq!(lines[3].chars().filter(|c| *c == '█').count(), 7);
        assert!(lines[3].contains("25%"));
        assert!(lines[3].contains("₹2,500.00"));
    }

    #[test]
    fn test_empty_charts() {
        let mut empty = report();
        empty.categories.clear();
        assert_eq!(render_share_chart(&empty, 20), "No expenses to display\n");

        let trend = MonthlyTrend {
            currency: Currency::Inr,
            months: Vec::new(),
        };
        assert_eq!(render_trend_chart(&trend, 20), "No expenses to display\n");
    }

    #[test]
    fn test_trend_chart() {
        let trend = MonthlyTrend {
            currency: Currency::Usd,
            months: vec![
                (
                    "2025-01".parse().unwrap(),
                    BTreeMap::from([
                        (Category::Food, Money::from_minor(4_000)),
                        (Category::Travel, Money::from_minor(6_000)),
                    ]),
                ),
                ("2025-02".parse().unwrap(), BTreeMap::new()),
            ],
        };
        let chart = render_trend_chart(&trend, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert!(lines[2].starts_with("Jan 2025"));
        assert!(lines[2].contains("██████████ $100.00 (top: Travel)"));
        assert!(lines[3].contains("░░░░░░░░░░ $0.00"));
    }
}
