use crate::aggregate::{category_breakdown, CategoryBreakdown};
use crate::api::Mode;
use crate::commands::{load_records, Out};
use crate::model::{Amount, Year, MONTH_LABELS};
use crate::{Config, Result};
use rust_decimal::Decimal;

/// Breaks `year`, or only `month_index` (0-based) of it, down by category.
pub async fn categories(
    config: &Config,
    mode: Mode,
    year: &Year,
    month_index: Option<usize>,
) -> Result<Out<CategoryBreakdown>> {
    let records = load_records(config, mode, year).await?;
    let breakdown = category_breakdown(&records, year.as_str(), month_index);
    let period = match month_index.and_then(|m| MONTH_LABELS.get(m)) {
        Some(label) => format!("{label} {year}"),
        None => year.to_string(),
    };
    let message = match &breakdown.top_category {
        Some(top) if !breakdown.is_empty() => format!(
            "Spent {} in {period} across {} categories. The top category was {} with {} ({}%).",
            Amount::new(breakdown.total_spend),
            breakdown.categories_with_spend,
            top.category,
            Amount::new(top.total),
            (top.share * Decimal::ONE_HUNDRED).round_dp(1),
        ),
        _ => format!("No expenses recorded for {period}"),
    };
    Ok(Out::new(message, breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_categories_year() {
        let env = TestEnv::new().await;
        let year = Year::from_str("2024").unwrap();
        let out = categories(&env.config(), Mode::Test, &year, None)
            .await
            .unwrap();
        let breakdown = out.structure().unwrap();
        let names: Vec<&str> = breakdown
            .category_data
            .iter()
            .map(|d| d.category.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Utility", "Dada's Toys", "Grocery", "Food", "Transport"]
        );
        assert_eq!(breakdown.total_transactions, 6);
        assert!(out
            .message()
            .starts_with("Spent $1,244.75 in 2024 across 5 categories. The top category was Utility"));
    }

    #[tokio::test]
    async fn test_categories_month() {
        let env = TestEnv::new().await;
        let year = Year::from_str("2025").unwrap();
        let out = categories(&env.config(), Mode::Test, &year, Some(0))
            .await
            .unwrap();
        let breakdown = out.structure().unwrap();
        assert_eq!(breakdown.categories_with_spend, 2);
        assert_eq!(breakdown.category_data[0].category, "Food");
        assert_eq!(breakdown.total_spend, Decimal::new(725, 2));
        assert_eq!(
            out.message(),
            "Spent $7.25 in Jan 2025 across 2 categories. The top category was Food with $4.50 (62.1%)."
        );

        let out = categories(&env.config(), Mode::Test, &year, Some(6))
            .await
            .unwrap();
        assert_eq!(out.message(), "No expenses recorded for Jul 2025");
    }
}
