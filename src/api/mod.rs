//! The data-fetch collaborator: reads yearly expense tabs from a Google sheet.
//!
//! `Sheet` is the narrow seam between the program and Google. `GoogleSheet` talks to the real
//! API and `TestSheet` serves in-memory data, which lets the whole program run without network
//! access when `EXPENSES_IN_TEST_MODE` is set.

mod expense_source;
mod files;
mod oauth;
mod sheet;
mod sheet_test_client;

use crate::error::Res;
use crate::Config;
use tracing::debug;

pub(crate) use expense_source::ExpenseSource;
pub(crate) use oauth::TokenProvider;
pub(crate) use sheet::GoogleSheet;
pub(crate) use sheet_test_client::TestSheet;
#[cfg(test)]
pub(crate) use sheet_test_client::TestSheetState;

/// Read-only access to the sheet is all this program needs.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets.readonly"];

/// The environment variable that switches the program to in-memory sheet data.
const TEST_MODE_VAR: &str = "EXPENSES_IN_TEST_MODE";

/// Where sheet data comes from.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Use the Google Sheets API.
    #[default]
    Google,
    /// Use `TestSheet` seed data.
    Test,
}

impl Mode {
    /// Returns `Mode::Test` when `EXPENSES_IN_TEST_MODE` is set to a non-empty value, otherwise
    /// `Mode::Google`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Google,
        }
    }
}

/// The minimal surface we need from a spreadsheet.
#[async_trait::async_trait]
pub(crate) trait Sheet {
    /// The titles of all tabs, in sheet order.
    async fn tab_titles(&mut self) -> Res<Vec<String>>;

    /// The formatted cell values of an A1-notation `range`, e.g. `2024!A:F`, one `Vec` per row.
    async fn get(&mut self, range: &str) -> Res<Vec<Vec<String>>>;
}

/// Creates the `Sheet` implementation selected by `mode`.
pub(crate) async fn sheet(config: &Config, mode: Mode) -> Res<Box<dyn Sheet + Send>> {
    debug!("Using {mode:?} sheet for spreadsheet {}", config.spreadsheet_id());
    Ok(match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            Box::new(GoogleSheet::new(config.clone(), token_provider).await?)
        }
        Mode::Test => Box::new(TestSheet::new(config.spreadsheet_id())),
    })
}

/// Creates an `ExpenseSource` backed by the `Sheet` selected by `mode`.
pub(crate) async fn expense_source(config: &Config, mode: Mode) -> Res<ExpenseSource> {
    Ok(ExpenseSource::new(sheet(config, mode).await?))
}
