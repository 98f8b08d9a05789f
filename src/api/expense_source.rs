//! Turns the tabs of an expense sheet into validated `ExpenseRecord`s.

use crate::api::Sheet;
use crate::error::Res;
use crate::model::{parse_expense_rows, ExpenseRecord, Year};
use anyhow::bail;
use std::str::FromStr;
use tracing::debug;

/// Reads yearly expense tabs through a dynamically-dispatched `Sheet`. Each calendar year lives in
/// a tab titled with the four-digit year.
pub(crate) struct ExpenseSource {
    sheet: Box<dyn Sheet + Send>,
}

impl ExpenseSource {
    pub(crate) fn new(sheet: Box<dyn Sheet + Send>) -> Self {
        Self { sheet }
    }

    /// The years that have a tab, newest first. Titles are trimmed and anything that is not a
    /// four-digit year is ignored.
    pub(crate) async fn available_years(&mut self) -> Res<Vec<Year>> {
        let mut years: Vec<Year> = self
            .sheet
            .tab_titles()
            .await?
            .iter()
            .filter_map(|title| Year::from_str(title).ok())
            .collect();
        years.sort_by(|a, b| b.cmp(a));
        years.dedup();
        debug!("Found {} year tabs", years.len());
        Ok(years)
    }

    /// The records of `year`. An empty tab yields no records.
    ///
    /// # Errors
    /// - The sheet has no tab for `year`.
    /// - The tab's header row is not the expected one.
    pub(crate) async fn expense_rows(&mut self, year: &Year) -> Res<Vec<ExpenseRecord>> {
        let titles = self.sheet.tab_titles().await?;
        if !titles.iter().any(|title| title == year.as_str()) {
            bail!("Google Sheets tab \"{year}\" not found.");
        }
        let rows = self.sheet.get(&format!("{year}!A:F")).await?;
        let row_count = rows.len();
        let records = parse_expense_rows(rows)?;
        debug!(
            "Read {} records for {year} from {row_count} rows",
            records.len()
        );
        Ok(records)
    }
}
