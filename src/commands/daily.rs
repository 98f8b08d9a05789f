use crate::aggregate::{daily_series, DailySeries};
use crate::api::Mode;
use crate::commands::{load_records, Out};
use crate::error::{Error, ErrorType};
use crate::model::{year_day_key, Amount, ExpenseRecord, Year};
use crate::{Config, Result};
use anyhow::anyhow;
use std::str::FromStr;

/// The daily spend series for `year`.
pub async fn daily(config: &Config, mode: Mode, year: &Year) -> Result<Out<DailySeries>> {
    let records = load_records(config, mode, year).await?;
    let series = daily_series(&records, year.as_str());
    let message = if series.is_empty() {
        format!("No expenses recorded for {year}")
    } else {
        format!(
            "Spent {} in {year} over {} days with expenses",
            Amount::new(series.total_spend),
            series.daily_data.len()
        )
    };
    Ok(Out::new(message, series))
}

/// The records behind one point of the daily series. The year tab is taken from `date`, which
/// must be `YYYY-MM-DD`.
pub async fn daily_records(
    config: &Config,
    mode: Mode,
    date: &str,
) -> Result<Out<Vec<ExpenseRecord>>> {
    let key = year_day_key(date).ok_or_else(|| {
        Error::new(
            ErrorType::Request,
            anyhow!("Invalid date '{date}', expected YYYY-MM-DD"),
        )
    })?;
    let year = Year::from_str(key.year).map_err(|e| Error::new(ErrorType::Request, e))?;
    let records = load_records(config, mode, &year).await?;
    let series = daily_series(&records, year.as_str());
    let on_day = series.records_on(key.date).to_vec();
    let message = match series.daily_data.iter().find(|d| d.date == key.date) {
        Some(day) => format!(
            "{} expenses totaling {} on {date}. {} spent in {year} through that day.",
            on_day.len(),
            Amount::new(day.daily),
            Amount::new(day.cumulative),
        ),
        None => format!("No expenses recorded on {date}"),
    };
    Ok(Out::new(message, on_day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSheetState;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_daily() {
        let env = TestEnv::new().await;
        let year = Year::from_str("2024").unwrap();
        let out = daily(&env.config(), Mode::Test, &year).await.unwrap();
        let series = out.structure().unwrap();
        let dates: Vec<&str> = series.daily_data.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2024-01-05",
                "2024-01-20",
                "2024-02-01",
                "2024-03-09",
                "2024-03-15",
                "2024-12-24"
            ]
        );
        assert_eq!(series.final_cumulative(), Decimal::new(124475, 2));
        assert_eq!(out.message(), "Spent $1,244.75 in 2024 over 6 days with expenses");
    }

    #[tokio::test]
    async fn test_daily_records() {
        let env = TestEnv::new().await;
        let out = daily_records(&env.config(), Mode::Test, "2025-01-03")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().len(), 2);
        assert_eq!(
            out.message(),
            "2 expenses totaling $7.25 on 2025-01-03. $7.25 spent in 2025 through that day."
        );

        let out = daily_records(&env.config(), Mode::Test, "2025-01-04")
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "No expenses recorded on 2025-01-04");
    }

    #[tokio::test]
    async fn test_daily_records_bad_date() {
        let env = TestEnv::new().await;
        for date in ["01/03/2025", "2025-13-01", "tomorrow"] {
            let err = daily_records(&env.config(), Mode::Test, date)
                .await
                .unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Request);
        }
    }

    fn tab(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_daily_message_uses_total_spend() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state.set_tab(
            "2026",
            tab(&[
                &["Date", "Name", "Category", "Type", "Amount", "Description"],
                &["2026-01-01", "Gum", "Food", "Cash", "0.004", ""],
                &["2026-01-02", "Gum", "Food", "Cash", "0.004", ""],
                &["2026-01-03", "Gum", "Food", "Cash", "0.004", ""],
            ]),
        );
        env.set_state(state);
        let year = Year::from_str("2026").unwrap();
        let out = daily(&env.config(), Mode::Test, &year).await.unwrap();
        let series = out.structure().unwrap();
        // Step rounding keeps the running total at zero while the unrounded sum is 0.012.
        assert_eq!(series.final_cumulative(), Decimal::new(0, 2));
        assert_eq!(series.total_spend, Decimal::new(12, 3));
        assert_eq!(out.message(), "Spent $0.01 in 2026 over 3 days with expenses");
    }

    #[tokio::test]
    async fn test_daily_empty_year() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state.set_tab(
            "2026",
            vec![vec![
                "Date".to_string(),
                "Name".to_string(),
                "Category".to_string(),
                "Type".to_string(),
                "Amount".to_string(),
                "Description".to_string(),
            ]],
        );
        env.set_state(state);
        let year = Year::from_str("2026").unwrap();
        let out = daily(&env.config(), Mode::Test, &year).await.unwrap();
        assert!(out.structure().unwrap().daily_data.is_empty());
        assert_eq!(out.message(), "No expenses recorded for 2026");
    }
}
