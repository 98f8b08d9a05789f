use crate::aggregate::records_in_month;
use crate::api::Mode;
use crate::commands::{load_records, Out};
use crate::model::{Amount, ExpenseRecord, Year, MONTH_LABELS};
use crate::{Config, Result};

/// Lists the validated records of `year`, or only those of `month_index` (0-based) when given.
pub async fn expenses(
    config: &Config,
    mode: Mode,
    year: &Year,
    month_index: Option<usize>,
) -> Result<Out<Vec<ExpenseRecord>>> {
    let records = load_records(config, mode, year).await?;
    let (records, period) = match month_index {
        Some(month) => {
            let in_month: Vec<ExpenseRecord> = records_in_month(&records, year.as_str(), month)
                .into_iter()
                .cloned()
                .collect();
            let label = MONTH_LABELS.get(month).copied().unwrap_or("?");
            (in_month, format!("{label} {year}"))
        }
        None => (records, year.to_string()),
    };
    let total = Amount::new(records.iter().map(|r| r.amount.value()).sum());
    let message = if records.is_empty() {
        format!("No expenses recorded for {period}")
    } else {
        format!("{} expenses totaling {total} in {period}", records.len())
    };
    Ok(Out::new(message, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_expenses_year() {
        let env = TestEnv::new().await;
        let year = Year::from_str("2024").unwrap();
        let out = expenses(&env.config(), Mode::Test, &year, None).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 6);
        assert_eq!(out.message(), "6 expenses totaling $1,244.75 in 2024");
    }

    #[tokio::test]
    async fn test_expenses_month() {
        let env = TestEnv::new().await;
        let year = Year::from_str("2024").unwrap();
        let out = expenses(&env.config(), Mode::Test, &year, Some(2))
            .await
            .unwrap();
        let names: Vec<&str> = out
            .structure()
            .unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["City Power", "Green Grocer"]);
        assert_eq!(out.message(), "2 expenses totaling $1,162.75 in Mar 2024");

        let out = expenses(&env.config(), Mode::Test, &year, Some(5))
            .await
            .unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "No expenses recorded for Jun 2024");
    }
}
