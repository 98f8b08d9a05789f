//! Command handlers for the expenses CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod categories;
mod daily;
mod expenses;
mod init;
mod monthly;
mod years;

use crate::api::{self, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::model::{ExpenseRecord, Year};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{auth, auth_verify};
pub use categories::categories;
pub use daily::{daily, daily_records};
pub use expenses::expenses;
pub use init::init;
pub use monthly::monthly;
pub use years::years;

/// The output type for a command: a message for the user and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as pretty JSON to
    /// stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            match serde_json::to_string_pretty(structure) {
                Ok(json) => println!("{json}"),
                Err(e) => debug!("Unable to serialize command output: {e}"),
            }
        }
    }
}

/// Reads and validates the records of `year`. Problems creating the sheet client are reported as
/// authentication errors, problems reading the tab as sheet errors.
async fn load_records(config: &Config, mode: Mode, year: &Year) -> Result<Vec<ExpenseRecord>> {
    let mut source = api::expense_source(config, mode)
        .await
        .context("Unable to connect to Google Sheets")
        .pub_result(ErrorType::Auth)?;
    source
        .expense_rows(year)
        .await
        .with_context(|| format!("Unable to read the expenses for {year}"))
        .pub_result(ErrorType::Sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use std::str::FromStr;

    #[test]
    fn test_out_from_message() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());

        let out = Out::new("with data", vec![1, 2]);
        assert_eq!(out.structure(), Some(&vec![1, 2]));
    }

    #[tokio::test]
    async fn test_load_records_missing_tab_is_sheet_error() {
        let env = TestEnv::new().await;
        let err = load_records(&env.config(), Mode::Test, &Year::from_str("1999").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Sheet);
        assert!(err.to_string().contains("Google Sheets tab \"1999\" not found."));
    }

    #[tokio::test]
    async fn test_load_records_without_token_is_auth_error() {
        let env = TestEnv::new().await;
        let err = load_records(&env.config(), Mode::Google, &Year::from_str("2024").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Auth);
    }
}
