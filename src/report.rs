//! Text report of the analysis results

use std::collections::BTreeMap;

use crate::age::{AgeDistribution, AgeGroup};
use crate::features::FeatureTable;
use crate::similarity::GroupRanking;
use crate::summary::GroupSummary;

pub const NO_CUSTOMERS: &str = "No customers in this age group.";

/// Join report lines, each terminated by a newline
fn render(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

pub fn format_age_distribution(distribution: &AgeDistribution) -> String {
    let mut lines = vec![
        "Age Group Percentages:".to_string(),
        format!("  {:<27} | {:>9} | {:>8}", "Age Group", "Customers", "Percent"),
        format!("  {:-<27}-|-{:->9}-|-{:->8}", "", "", ""),
    ];
    lines.extend(distribution.shares.iter().map(|share| {
        format!(
            "  {:<27} | {:>9} | {:>7.2}%",
            share.age_group.label(),
            share.count,
            share.percentage
        )
    }));
    lines.push(format!("  Total customers: {}", distribution.total));
    render(lines)
}

pub fn format_group_summary(age_group: AgeGroup, summary: Option<&GroupSummary>) -> String {
    let mut lines = vec![format!("Age Group: {}", age_group)];
    match summary {
        None => lines.push(NO_CUSTOMERS.to_string()),
        Some(summary) => {
            lines.push(format!(
                "Most Popular Favorite Category: {} ({} customers)",
                summary.favorite.category, summary.favorite.count
            ));
            lines.push(format!(
                "Most Popular Second-Favorite Category: {} ({} customers)",
                summary.second_favorite.category, summary.second_favorite.count
            ));
        }
    }
    render(lines)
}

pub fn format_feature_table(table: &FeatureTable) -> String {
    let mut lines = vec!["Category Features by Age Group:".to_string()];
    if table.is_empty() {
        lines.push("  (no customers with order value and purchase data)".to_string());
        return render(lines);
    }

    lines.push(format!(
        "  {:<27} | {:<24} | {:>17} | {:>14} | {:>9}",
        "Age Group", "Favorite Category", "AverageOrderValue", "TotalPurchases", "Customers"
    ));
    lines.extend(table.rows().iter().map(|row| {
        format!(
            "  {:<27} | {:<24} | {:>17.4} | {:>14.4} | {:>9}",
            row.age_group.label(),
            row.category,
            row.mean_average_order_value,
            row.mean_total_purchases,
            row.customers
        )
    }));
    render(lines)
}

pub fn format_ranking(ranking: &GroupRanking, top_n: usize) -> String {
    let mut lines = vec![format!(
        "Top {} similar categories to {} for {}:",
        top_n, ranking.target, ranking.age_group
    )];
    match &ranking.result {
        Err(not_found) => lines.push(not_found.to_string()),
        Ok(entries) if entries.is_empty() => {
            lines.push("No other categories in this age group.".to_string())
        }
        Ok(entries) => lines.extend(entries.iter().map(|entry| {
            format!(
                "Category: {}, Distance: {:.4}",
                entry.category, entry.distance
            )
        })),
    }
    render(lines)
}

/// Render the whole report, sections separated by blank lines
pub fn format_report(
    distribution: &AgeDistribution,
    summaries: &BTreeMap<AgeGroup, Option<GroupSummary>>,
    table: &FeatureTable,
    rankings: &[GroupRanking],
    top_n: usize,
) -> String {
    let mut sections = vec![format_age_distribution(distribution)];
    sections.extend(
        summaries
            .iter()
            .map(|(group, summary)| format_group_summary(*group, summary.as_ref())),
    );
    sections.push(format_feature_table(table));
    sections.extend(rankings.iter().map(|ranking| format_ranking(ranking, top_n)));
    sections.join("\n")
}

pub fn print_report(
    distribution: &AgeDistribution,
    summaries: &BTreeMap<AgeGroup, Option<GroupSummary>>,
    table: &FeatureTable,
    rankings: &[GroupRanking],
    top_n: usize,
) {
    print!(
        "{}",
        format_report(distribution, summaries, table, rankings, top_n)
    );
}
