//! The aggregation pipeline.
//!
//! Each aggregator is a pure function of a record slice and a period. Nothing is cached; callers
//! re-run an aggregator whenever the records or the selected period change.
//!
//! Monetary figures inside a datum are rounded to cents when the datum is built. Scalar totals
//! such as `total_spend` are sums of the unrounded running totals, so they can differ by a cent or
//! two from the sum of the displayed per-bucket totals.

mod category;
mod daily;
mod monthly;
mod summary;

pub use category::{category_breakdown, CategoryBreakdown, CategoryDatum};
pub use daily::{daily_series, DailyDatum, DailySeries};
pub use monthly::{monthly_summary, records_in_month, MonthlyDatum, MonthlySummary};
pub use summary::{average_of, peak_index, round_cents, share_of};

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Amount, ExpenseRecord};
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    pub(crate) fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub(crate) fn record(date: &str, category: &str, amount: &str) -> ExpenseRecord {
        ExpenseRecord::new(
            date,
            format!("{category} on {date}"),
            category,
            "Card",
            Amount::from_str(amount).unwrap(),
            "",
        )
    }

    /// Two January food purchases and one February transport purchase.
    pub(crate) fn sample_records() -> Vec<ExpenseRecord> {
        vec![
            record("2024-01-05", "Food", "10"),
            record("2024-01-20", "Food", "5"),
            record("2024-02-01", "Transport", "7"),
        ]
    }

    /// A messier year: odd cents, several categories, another year mixed in and a bad date.
    fn mixed_records() -> Vec<ExpenseRecord> {
        let categories = ["Food", "Grocery", "Utility", "Transport", "Shopping"];
        let mut records = Vec::new();
        for ix in 0..200u32 {
            let month = ix % 12 + 1;
            let day = ix % 28 + 1;
            let cents = 101 + (ix * 7919) % 10_000;
            let amount = format!("{}.{:02}{}", cents / 100, cents % 100, ix % 10);
            records.push(record(
                &format!("2024-{month:02}-{day:02}"),
                categories[(ix % 5) as usize],
                &amount,
            ));
        }
        records.push(record("2023-05-05", "Food", "999"));
        records.push(record("not a date", "Food", "999"));
        records
    }

    fn truth_total(records: &[ExpenseRecord], year: &str) -> Decimal {
        records
            .iter()
            .filter(|r| crate::model::year_month_key(&r.date).is_some_and(|k| k.year == year))
            .map(|r| r.amount.value())
            .sum()
    }

    fn close(a: Decimal, b: Decimal, tolerance: &str) -> bool {
        (a - b).abs() <= dec(tolerance)
    }

    #[test]
    fn test_partition_completeness() {
        let records = mixed_records();
        let truth = truth_total(&records, "2024");

        let monthly = monthly_summary(&records, "2024");
        let monthly_sum: Decimal = monthly.monthly_data.iter().map(|m| m.total).sum();
        assert!(close(monthly_sum, round_cents(truth), "0.12"));
        assert_eq!(monthly.total_spend, truth);

        let categories = category_breakdown(&records, "2024", None);
        let category_sum: Decimal = categories.category_data.iter().map(|c| c.total).sum();
        assert!(close(category_sum, round_cents(truth), "0.05"));
        assert_eq!(categories.total_spend, truth);

        let daily = daily_series(&records, "2024");
        assert_eq!(daily.total_spend, truth);
        // Step rounding may drift by at most half a cent per day.
        let days = Decimal::from(daily.daily_data.len());
        assert!(close(daily.final_cumulative(), truth, &(days * dec("0.005")).to_string()));
    }

    #[test]
    fn test_share_normalization() {
        let records = mixed_records();
        let monthly = monthly_summary(&records, "2024");
        let monthly_shares: Decimal = monthly.monthly_data.iter().map(|m| m.share).sum();
        assert!((monthly_shares.to_f64().unwrap() - 1.0).abs() < 1e-9);

        let categories = category_breakdown(&records, "2024", None);
        let category_shares: Decimal = categories.category_data.iter().map(|c| c.share).sum();
        assert!((category_shares.to_f64().unwrap() - 1.0).abs() < 1e-9);

        for share in monthly.monthly_data.iter().map(|m| m.share) {
            assert!(share >= Decimal::ZERO && share <= Decimal::ONE);
        }

        let empty = monthly_summary(&records, "1999");
        assert!(empty.monthly_data.iter().all(|m| m.share.is_zero()));
        let empty = category_breakdown(&records, "1999", None);
        assert!(empty.category_data.iter().all(|c| c.share.is_zero()));
    }

    #[test]
    fn test_daily_ordering_strictly_increasing() {
        let daily = daily_series(&mixed_records(), "2024");
        for pair in daily.daily_data.windows(2) {
            assert!(pair[0].date < pair[1].date);
            assert!(pair[0].cumulative <= pair[1].cumulative);
        }
    }

    #[test]
    fn test_monthly_category_and_daily_agree_on_sample() {
        let records = sample_records();
        let monthly = monthly_summary(&records, "2024");
        let categories = category_breakdown(&records, "2024", None);
        let daily = daily_series(&records, "2024");
        assert_eq!(monthly.total_spend, categories.total_spend);
        assert_eq!(monthly.total_spend, daily.final_cumulative());
        assert_eq!(monthly.total_transactions, categories.total_transactions);
    }

    #[test]
    fn test_aggregators_are_order_independent_for_totals() {
        let records = mixed_records();
        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(
            monthly_summary(&records, "2024"),
            monthly_summary(&reversed, "2024")
        );
        assert_eq!(
            daily_series(&records, "2024").daily_data,
            daily_series(&reversed, "2024").daily_data
        );
    }
}
