//! Implements the `Sheet` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without using Google Sheets. State is kept per spreadsheet id for the life
//! of the process, so separately constructed `TestSheet`s for the same id see the same tabs.

use crate::api::Sheet;
use crate::error::Res;
use anyhow::{anyhow, Context};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Mutex, OnceLock};

/// The tabs of one in-memory spreadsheet, in sheet order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub(crate) struct TestSheetState {
    pub(crate) tabs: Vec<(String, Vec<Vec<String>>)>,
}

impl TestSheetState {
    /// Replaces the rows of `title`, adding the tab if it does not exist.
    pub(crate) fn set_tab(&mut self, title: impl Into<String>, rows: Vec<Vec<String>>) {
        let title = title.into();
        match self.tabs.iter_mut().find(|(t, _)| *t == title) {
            Some((_, existing)) => *existing = rows,
            None => self.tabs.push((title, rows)),
        }
    }

    fn tab(&self, title: &str) -> Option<&Vec<Vec<String>>> {
        self.tabs.iter().find(|(t, _)| t == title).map(|(_, rows)| rows)
    }
}

fn states() -> &'static Mutex<HashMap<String, TestSheetState>> {
    static STATES: OnceLock<Mutex<HashMap<String, TestSheetState>>> = OnceLock::new();
    STATES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// An implementation of the `Sheet` trait that does not use Google sheets. A spreadsheet id that
/// has not been seen before starts with the seed data from this module.
pub(crate) struct TestSheet {
    spreadsheet_id: String,
}

impl TestSheet {
    pub(crate) fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut TestSheetState) -> T) -> Res<T> {
        let mut states = states()
            .lock()
            .map_err(|_| anyhow!("The in-memory sheet state is poisoned"))?;
        let state = match states.entry(self.spreadsheet_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default_state()?),
        };
        Ok(f(state))
    }

    #[cfg(test)]
    pub(crate) fn get_state(&self) -> TestSheetState {
        self.with_state(|state| state.clone()).unwrap()
    }

    #[cfg(test)]
    pub(crate) fn set_state(&self, new_state: TestSheetState) {
        self.with_state(|state| *state = new_state).unwrap()
    }
}

#[async_trait::async_trait]
impl Sheet for TestSheet {
    async fn tab_titles(&mut self) -> Res<Vec<String>> {
        self.with_state(|state| state.tabs.iter().map(|(t, _)| t.clone()).collect())
    }

    async fn get(&mut self, range: &str) -> Res<Vec<Vec<String>>> {
        let (title, columns) = parse_range(range);
        let rows = self
            .with_state(|state| state.tab(title).cloned())?
            .with_context(|| format!("Unable to parse range {range}: tab '{title}' not found"))?;
        // Like the API, a bounded column range cuts every row to that many cells.
        Ok(match columns {
            Some(n) => rows
                .into_iter()
                .map(|row| row.into_iter().take(n).collect())
                .collect(),
            None => rows,
        })
    }
}

/// Splits `Tab!A:F` into the tab title and the number of columns in a range that starts at `A`.
fn parse_range(range: &str) -> (&str, Option<usize>) {
    let Some((title, cells)) = range.rsplit_once('!') else {
        return (range, None);
    };
    let columns = match cells.split_once(':') {
        Some(("A", end)) if end.len() == 1 && end.as_bytes()[0].is_ascii_uppercase() => {
            Some((end.as_bytes()[0] - b'A') as usize + 1)
        }
        _ => None,
    };
    (title, columns)
}

fn default_state() -> Res<TestSheetState> {
    let mut state = TestSheetState::default();
    state.set_tab("2024", load_csv(EXPENSES_2024)?);
    state.set_tab("Notes", load_csv(NOTES)?);
    state.set_tab("2025", load_csv(EXPENSES_2025)?);
    state.set_tab("2023", Vec::new());
    Ok(state)
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Res<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        let record = result.context("Unable to parse seed CSV")?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Seed expenses for 2024. Includes rows that must be skipped: an unknown category, a refund, an
/// empty row and an unparsable amount.
const EXPENSES_2024: &str = r##"Date,Name,Category,Type,Amount,Description,Notes
1/5/2024,Corner Bistro,Food,Credit Card,$10.00,Lunch,
1/20/2024,Corner Bistro,Food,Credit Card,$5.00,Coffee and a bagel,
2/1/2024,Metro Card,Transport,Debit Card,$7.00,,
2/14/2024,Flower Market,Gifts,Credit Card,$25.00,Not a known category,
"3/9/2024, 10:15:00",City Power,Utility,Bank Transfer,"$1,120.50",Quarterly electricity,
3/15/2024,Green Grocer,Grocery,Debit Card,$42.25,Weekly shop,
3/20/2024,Green Grocer,Shopping,Credit Card,-$12.00,Refund,
,,,,,,
4/1/2024,Bookshop,Education,Cash,twelve,Amount is not a number,
2024-12-24,Toy Barn,Dada's Toys,Credit Card,$60.00,Train set,
"##;

/// Seed expenses for 2025.
const EXPENSES_2025: &str = r##"Date,Name,Category,Type,Amount,Description
2025-01-03,Bakery,Food,Cash,$4.50,Croissants
2025-01-03,City Bus,Transport,Debit Card,$2.75,
2025-02-10,Pharmacy,Healthcare,Credit Card,$18.00,Prescription
"##;

/// A tab that is not a year.
const NOTES: &str = r##"Budget notes
Review subscriptions in March
"##;
