use crate::api::{self, Mode};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Year;
use crate::{Config, Result};

/// Lists the years that have a tab in the sheet, newest first.
pub async fn years(config: &Config, mode: Mode) -> Result<Out<Vec<Year>>> {
    let mut source = api::expense_source(config, mode)
        .await
        .pub_result(ErrorType::Auth)?;
    let years = source.available_years().await.pub_result(ErrorType::Sheet)?;
    let message = match (years.first(), years.last()) {
        (Some(newest), Some(oldest)) if years.len() > 1 => {
            format!("Found {} years of expenses, {oldest} to {newest}", years.len())
        }
        (Some(only), _) => format!("Found expenses for {only}"),
        _ => "No year tabs were found in the sheet. Tabs must be named with a four-digit year."
            .to_string(),
    };
    Ok(Out::new(message, years))
}
