use crate::aggregate::{monthly_summary, MonthlySummary};
use crate::api::Mode;
use crate::commands::{load_records, Out};
use crate::model::{Amount, Year};
use crate::{Config, Result};

/// Summarizes `year` month by month.
pub async fn monthly(config: &Config, mode: Mode, year: &Year) -> Result<Out<MonthlySummary>> {
    let records = load_records(config, mode, year).await?;
    let summary = monthly_summary(&records, year.as_str());
    let message = match summary.peak_month() {
        Some(peak) if !summary.is_empty() => format!(
            "Spent {} in {year} across {} transactions in {} months. The most was spent in {} ({}). \
            The average month with spending was {}.",
            Amount::new(summary.total_spend),
            summary.total_transactions,
            summary.months_with_spend,
            peak.month,
            Amount::new(peak.total),
            Amount::new(summary.average_monthly_spend),
        ),
        _ => format!("No expenses recorded for {year}"),
    };
    Ok(Out::new(message, summary))
}
