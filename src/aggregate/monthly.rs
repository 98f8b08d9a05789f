use crate::aggregate::summary::{average_of, peak_index, round_cents, share_of};
use crate::model::{year_month_key, ExpenseRecord, MONTH_LABELS};
use rust_decimal::Decimal;
use serde::Serialize;

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyDatum {
    /// Short month label, e.g. `Jan`.
    pub month: &'static str,
    /// Sum of amounts, rounded to cents.
    pub total: Decimal,
    pub count: usize,
    /// `total / count` rounded to cents, zero when `count` is zero.
    pub average: Decimal,
    /// Fraction of the year's spend, zero when the year has no spend.
    pub share: Decimal,
}

/// A year partitioned into its twelve calendar months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    /// Always twelve entries, January first.
    pub monthly_data: Vec<MonthlyDatum>,
    /// Sum of the unrounded monthly totals.
    pub total_spend: Decimal,
    pub months_with_spend: usize,
    pub total_transactions: usize,
    /// Month with the largest total, lowest index on ties. `None` when there is no spend.
    pub peak_month_index: Option<usize>,
    pub average_monthly_spend: Decimal,
    pub average_transaction: Decimal,
}

impl MonthlySummary {
    /// True when the year has nothing to show.
    pub fn is_empty(&self) -> bool {
        self.total_spend <= Decimal::ZERO
    }

    pub fn peak_month(&self) -> Option<&MonthlyDatum> {
        self.peak_month_index.and_then(|ix| self.monthly_data.get(ix))
    }
}

/// Partitions the records of `year` into calendar months.
///
/// A record counts when its date has a month key whose year equals `year`. Records with dates
/// that do not parse are ignored.
pub fn monthly_summary(records: &[ExpenseRecord], year: &str) -> MonthlySummary {
    let mut totals = [Decimal::ZERO; 12];
    let mut counts = [0usize; 12];
    for record in records {
        match year_month_key(&record.date) {
            Some(key) if key.year == year => {
                totals[key.month_index] += record.amount.value();
                counts[key.month_index] += 1;
            }
            _ => {}
        }
    }

    let total_spend: Decimal = totals.iter().sum();
    let total_transactions: usize = counts.iter().sum();
    let months_with_spend = totals.iter().filter(|t| **t > Decimal::ZERO).count();
    let peak_month_index = peak_index(&totals, total_spend);

    let monthly_data = totals
        .iter()
        .zip(counts.iter())
        .zip(MONTH_LABELS)
        .map(|((&total, &count), month)| MonthlyDatum {
            month,
            total: round_cents(total),
            count,
            average: round_cents(average_of(total, count)),
            share: share_of(total, total_spend),
        })
        .collect();

    MonthlySummary {
        monthly_data,
        total_spend,
        months_with_spend,
        total_transactions,
        peak_month_index,
        average_monthly_spend: average_of(total_spend, months_with_spend),
        average_transaction: average_of(total_spend, total_transactions),
    }
}

/// The records of one month of `year`, in input order.
pub fn records_in_month<'a>(
    records: &'a [ExpenseRecord],
    year: &str,
    month_index: usize,
) -> Vec<&'a ExpenseRecord> {
    records
        .iter()
        .filter(|record| {
            year_month_key(&record.date)
                .is_some_and(|key| key.year == year && key.month_index == month_index)
        })
        .collect()
}
