//! Implements the `Sheet` trait against the Google Sheets API.

use crate::api::{Sheet, TokenProvider};
use crate::error::Res;
use crate::Config;
use anyhow::{bail, Context};
use serde::Deserialize;
use sheets::types::{DateTimeRenderOption, Dimension, ValueRenderOption};
use sheets::ClientError;
use tracing::trace;
use url::Url;

const SPREADSHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Uses `sheets::Client` for cell values and a plain `reqwest` call for spreadsheet metadata. It
/// holds a `TokenProvider` which it refreshes before each request.
pub(crate) struct GoogleSheet {
    config: Config,
    token_provider: TokenProvider,
    client: sheets::Client,
    http: reqwest::Client,
}

impl GoogleSheet {
    pub(crate) async fn new(config: Config, mut token_provider: TokenProvider) -> Res<Self> {
        let client = create_sheets_client(&mut token_provider).await?;
        Ok(Self {
            config,
            token_provider,
            client,
            http: reqwest::Client::new(),
        })
    }

    /// Recreates the sheets client in case the access token was refreshed.
    async fn refresh_client(&mut self) -> Res<()> {
        self.client = create_sheets_client(&mut self.token_provider).await?;
        Ok(())
    }
}

/// The parts of the spreadsheet resource that we request with a `fields` mask.
#[derive(Debug, Default, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<TabMetadata>,
}

#[derive(Debug, Deserialize)]
struct TabMetadata {
    properties: TabProperties,
}

#[derive(Debug, Deserialize)]
struct TabProperties {
    title: String,
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn tab_titles(&mut self) -> Res<Vec<String>> {
        trace!("tab_titles for {}", self.config.spreadsheet_id());
        let access_token = self.token_provider.token_with_refresh().await?.to_string();
        let url = Url::parse_with_params(
            &format!("{SPREADSHEETS_ENDPOINT}/{}", self.config.spreadsheet_id()),
            &[("fields", "sheets(properties(title))")],
        )
        .context("Unable to build the spreadsheet metadata URL")?;

        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Failed to send the spreadsheet metadata request")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            bail!("Google Sheets metadata request failed with status {status}: {body}");
        }
        let metadata: SpreadsheetMetadata = response
            .json()
            .await
            .context("Failed to parse the spreadsheet metadata")?;
        Ok(metadata
            .sheets
            .into_iter()
            .map(|tab| tab.properties.title)
            .collect())
    }

    async fn get(&mut self, range: &str) -> Res<Vec<Vec<String>>> {
        trace!("get for {range}");
        self.refresh_client().await?;
        let response = self
            .client
            .spreadsheets()
            .values_get(
                self.config.spreadsheet_id(),
                range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {range}"))?;
        Ok(response.body.values)
    }
}

/// Creates a sheets client carrying a fresh access token.
async fn create_sheets_client(token_provider: &mut TokenProvider) -> Res<sheets::Client> {
    let access_token = token_provider.token_with_refresh().await?;

    // Only the access token is used for API calls, we handle refresh ourselves.
    Ok(sheets::Client::new(
        String::new(),
        String::new(),
        String::new(),
        access_token.to_string(),
        String::new(),
    ))
}

/// Names the `ClientError` variant so that the log says more than "error".
fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_deserialize() {
        let json = r#"{"sheets":[{"properties":{"title":"2025"}},{"properties":{"title":"Notes"}}]}"#;
        let metadata: SpreadsheetMetadata = serde_json::from_str(json).unwrap();
        let titles: Vec<String> = metadata
            .sheets
            .into_iter()
            .map(|t| t.properties.title)
            .collect();
        assert_eq!(titles, vec!["2025", "Notes"]);

        let empty: SpreadsheetMetadata = serde_json::from_str("{}").unwrap();
        assert!(empty.sheets.is_empty());
    }
}
