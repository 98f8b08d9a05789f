use crate::aggregate::summary::round_cents;
use crate::model::{year_day_key, ExpenseRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Spend on a single date, with the running total for the year up to and including that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyDatum {
    pub date: String,
    pub daily: Decimal,
    pub cumulative: Decimal,
}

/// The daily spend series for a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySeries {
    /// One entry per date that has records, in ascending date order.
    pub daily_data: Vec<DailyDatum>,
    /// Sum of the unrounded day totals.
    pub total_spend: Decimal,
    /// The records behind each date, in input order, for looking up what was bought on a day.
    pub records_by_date: BTreeMap<String, Vec<ExpenseRecord>>,
}

impl DailySeries {
    pub fn is_empty(&self) -> bool {
        self.total_spend <= Decimal::ZERO
    }

    /// The records for `date`, empty if nothing was spent that day.
    pub fn records_on(&self, date: &str) -> &[ExpenseRecord] {
        self.records_by_date
            .get(date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The final cumulative value, zero for an empty series.
    pub fn final_cumulative(&self) -> Decimal {
        self.daily_data
            .last()
            .map(|d| d.cumulative)
            .unwrap_or_default()
    }
}

/// Groups the records of `year` by exact date and builds the running total.
///
/// `cumulative` is rounded at every step: each date adds its unrounded total to the previous
/// date's rounded cumulative value and rounds the result.
pub fn daily_series(records: &[ExpenseRecord], year: &str) -> DailySeries {
    // Zero-padded ISO dates sort lexicographically in calendar order.
    let mut days: BTreeMap<&str, (Decimal, Vec<ExpenseRecord>)> = BTreeMap::new();
    for record in records {
        match year_day_key(&record.date) {
            Some(key) if key.year == year => {
                let (total, day_records) = days.entry(key.date).or_default();
                *total += record.amount.value();
                day_records.push(record.clone());
            }
            _ => {}
        }
    }

    let mut daily_data = Vec::with_capacity(days.len());
    let mut records_by_date = BTreeMap::new();
    let mut total_spend = Decimal::ZERO;
    let mut cumulative = Decimal::ZERO;
    for (date, (day_total, day_records)) in days {
        total_spend += day_total;
        cumulative = round_cents(cumulative + day_total);
        daily_data.push(DailyDatum {
            date: date.to_string(),
            daily: round_cents(day_total),
            cumulative,
        });
        records_by_date.insert(date.to_string(), day_records);
    }

    DailySeries {
        daily_data,
        total_spend,
        records_by_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::{dec, record, sample_records};

    #[test]
    fn test_daily_series_sample() {
        let series = daily_series(&sample_records(), "2024");
        assert_eq!(
            series.daily_data,
            vec![
                DailyDatum {
                    date: "2024-01-05".to_string(),
                    daily: dec("10.00"),
                    cumulative: dec("10.00"),
                },
                DailyDatum {
                    date: "2024-01-20".to_string(),
                    daily: dec("5.00"),
                    cumulative: dec("15.00"),
                },
                DailyDatum {
                    date: "2024-02-01".to_string(),
                    daily: dec("7.00"),
                    cumulative: dec("22.00"),
                },
            ]
        );
        assert_eq!(series.total_spend, dec("22"));
        assert_eq!(series.final_cumulative(), dec("22"));
    }

    #[test]
    fn test_daily_series_sorts_dates_and_groups_records() {
        let records = vec![
            record("2024-03-02", "Food", "1.50"),
            record("2024-01-15", "Transport", "2"),
            record("2024-03-02", "Shopping", "3"),
            record("2023-03-02", "Food", "100"),
            record("2024-02-30", "Food", "4"),
            record("2024-02-00", "Food", "100"),
        ];
        let series = daily_series(&records, "2024");
        let dates: Vec<&str> = series.daily_data.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-15", "2024-02-30", "2024-03-02"]);
        assert_eq!(series.daily_data[2].daily, dec("4.50"));
        assert_eq!(series.daily_data[2].cumulative, dec("10.50"));

        let march = series.records_on("2024-03-02");
        assert_eq!(march.len(), 2);
        assert_eq!(march[0].category, "Food");
        assert_eq!(march[1].category, "Shopping");
        assert!(series.records_on("2024-03-03").is_empty());
        assert!(series.records_on("2023-03-02").is_empty());
    }

    #[test]
    fn test_daily_cumulative_rounds_each_step() {
        let records = vec![
            record("2024-01-01", "Food", "0.004"),
            record("2024-01-02", "Food", "0.004"),
            record("2024-01-03", "Food", "0.004"),
        ];
        let series = daily_series(&records, "2024");
        // Each step adds 0.004 to a value already rounded to 0.00, so the sum never grows.
        for datum in &series.daily_data {
            assert_eq!(datum.daily, dec("0.00"));
            assert_eq!(datum.cumulative, dec("0.00"));
        }
        assert_eq!(series.total_spend, dec("0.012"));
    }

    #[test]
    fn test_daily_cumulative_follows_recurrence() {
        let records = vec![
            record("2024-05-01", "Food", "0.335"),
            record("2024-05-02", "Food", "0.335"),
            record("2024-05-03", "Food", "10.105"),
        ];
        let series = daily_series(&records, "2024");
        let unrounded = [dec("0.335"), dec("0.335"), dec("10.105")];
        let mut previous = Decimal::ZERO;
        for (datum, day_total) in series.daily_data.iter().zip(unrounded) {
            assert_eq!(datum.cumulative, round_cents(previous + day_total));
            previous = datum.cumulative;
        }
        // 0.34, then 0.68, then 10.785 rounded half away from zero.
        assert_eq!(series.final_cumulative(), dec("10.79"));
    }

    #[test]
    fn test_daily_series_empty() {
        let series = daily_series(&[], "2024");
        assert!(series.daily_data.is_empty());
        assert!(series.records_by_date.is_empty());
        assert!(series.is_empty());
        assert_eq!(series.final_cumulative(), Decimal::ZERO);
    }
}
