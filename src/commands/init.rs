use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and its `.secrets` subdirectory, copies `secret_file` into place
/// and writes an initial `config.json` pointing at `url`.
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g. `$HOME/expenses`
/// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed to start the Google
///   OAuth workflow. It is copied to its default location and name in the data directory.
/// - `url` - The URL of the Google Sheet where the yearly expense tabs are kept.
///
/// # Errors
/// - Returns an error if the URL is not a Google Sheets URL or any file operation fails.
pub async fn init(home: &Path, secret_file: &Path, url: &str) -> Result<Out<()>> {
    let config = Config::create(home, secret_file, url)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Created {}. Run 'expenses auth' next to authorize access to your sheet.",
        config.root().display()
    )
    .into())
}
