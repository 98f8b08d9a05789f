use crate::aggregate::summary::{average_of, round_cents, share_of};
use crate::model::{year_day_key, year_month_key, ExpenseRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Totals for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDatum {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub share: Decimal,
}

/// Spend per category for a year, or for one month of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    /// Ordered by `total` descending. Equal totals keep first-seen order.
    pub category_data: Vec<CategoryDatum>,
    pub total_spend: Decimal,
    pub total_transactions: usize,
    pub categories_with_spend: usize,
    pub top_category: Option<CategoryDatum>,
    pub average_transaction: Decimal,
}

impl CategoryBreakdown {
    pub fn is_empty(&self) -> bool {
        self.total_spend <= Decimal::ZERO
    }

    pub fn get(&self, category: &str) -> Option<&CategoryDatum> {
        self.category_data.iter().find(|d| d.category == category)
    }
}

#[derive(Default)]
struct Running {
    total: Decimal,
    count: usize,
}

/// Groups the records of `year` by category. When `month_index` is given (0-based), only records
/// in that month are counted.
pub fn category_breakdown(
    records: &[ExpenseRecord],
    year: &str,
    month_index: Option<usize>,
) -> CategoryBreakdown {
    // Insertion-ordered grouping so that the stable sort below preserves first-seen order.
    let mut order: Vec<(&str, Running)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for record in records {
        match year_day_key(&record.date) {
            Some(key) if key.year == year => {}
            _ => continue,
        }
        if let Some(month) = month_index {
            let in_month = year_month_key(&record.date).is_some_and(|key| key.month_index == month);
            if !in_month {
                continue;
            }
        }
        let category = record.category.as_str();
        let ix = *positions.entry(category).or_insert_with(|| {
            order.push((category, Running::default()));
            order.len() - 1
        });
        let running = &mut order[ix].1;
        running.total += record.amount.value();
        running.count += 1;
    }

    let total_spend: Decimal = order.iter().map(|(_, r)| r.total).sum();
    let total_transactions: usize = order.iter().map(|(_, r)| r.count).sum();

    let mut category_data: Vec<CategoryDatum> = order
        .into_iter()
        .map(|(category, running)| CategoryDatum {
            category: category.to_string(),
            total: round_cents(running.total),
            count: running.count,
            average: round_cents(average_of(running.total, running.count)),
            share: share_of(running.total, total_spend),
        })
        .collect();
    // `sort_by` is stable.
    category_data.sort_by(|a, b| b.total.cmp(&a.total));

    CategoryBreakdown {
        categories_with_spend: category_data.len(),
        top_category: category_data.first().cloned(),
        category_data,
        total_spend,
        total_transactions,
        average_transaction: average_of(total_spend, total_transactions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::{dec, record, sample_records};

    #[test]
    fn test_category_breakdown_sample() {
        let breakdown = category_breakdown(&sample_records(), "2024", None);
        let names: Vec<&str> = breakdown
            .category_data
            .iter()
            .map(|d| d.category.as_str())
            .collect();
        assert_eq!(names, vec!["Food", "Transport"]);

        let food = breakdown.get("Food").unwrap();
        assert_eq!(food.total, dec("15.00"));
        assert_eq!(food.count, 2);
        assert_eq!(food.average, dec("7.50"));

        let transport = breakdown.get("Transport").unwrap();
        assert_eq!(transport.total, dec("7.00"));
        assert_eq!(transport.count, 1);

        assert_eq!(breakdown.total_spend, dec("22"));
        assert_eq!(breakdown.total_transactions, 3);
        assert_eq!(breakdown.categories_with_spend, 2);
        assert_eq!(breakdown.top_category.as_ref().unwrap().category, "Food");
    }

    #[test]
    fn test_category_breakdown_month_filter() {
        let breakdown = category_breakdown(&sample_records(), "2024", Some(0));
        assert_eq!(breakdown.category_data.len(), 1);
        let food = &breakdown.category_data[0];
        assert_eq!(food.category, "Food");
        assert_eq!(food.total, dec("15.00"));
        assert_eq!(food.share, Decimal::ONE);
        assert!(breakdown.get("Transport").is_none());
        assert_eq!(breakdown.total_spend, dec("15"));
    }

    #[test]
    fn test_category_breakdown_ties_keep_first_seen_order() {
        let records = vec![
            record("2024-04-01", "Utility", "20"),
            record("2024-04-02", "Housing", "50"),
            record("2024-04-03", "Grocery", "20"),
            record("2024-04-04", "Healthcare", "20"),
            record("2024-04-05", "Grocery", "0"),
        ];
        let breakdown = category_breakdown(&records, "2024", None);
        let names: Vec<&str> = breakdown
            .category_data
            .iter()
            .map(|d| d.category.as_str())
            .collect();
        assert_eq!(names, vec!["Housing", "Utility", "Grocery", "Healthcare"]);
    }

    #[test]
    fn test_category_breakdown_excludes_other_years_and_bad_dates() {
        let records = vec![
            record("2023-06-01", "Food", "10"),
            record("2024-06-32", "Food", "10"),
            record("June 1", "Food", "10"),
            record("2024-06-01", "Education", "3.333"),
        ];
        let breakdown = category_breakdown(&records, "2024", None);
        assert_eq!(breakdown.categories_with_spend, 1);
        assert_eq!(breakdown.category_data[0].category, "Education");
        assert_eq!(breakdown.category_data[0].total, dec("3.33"));
        assert_eq!(breakdown.total_spend, dec("3.333"));
    }

    #[test]
    fn test_category_breakdown_empty() {
        let breakdown = category_breakdown(&sample_records(), "2024", Some(11));
        assert!(breakdown.category_data.is_empty());
        assert!(breakdown.top_category.is_none());
        assert_eq!(breakdown.categories_with_spend, 0);
        assert_eq!(breakdown.average_transaction, Decimal::ZERO);
        assert!(breakdown.is_empty());
    }
}
