//! Authentication command handlers for the OAuth flow.
//!
//! - `expenses auth` - Initial OAuth consent flow
//! - `expenses auth --verify` - Verify and refresh authentication

use crate::api::TokenProvider;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;

/// Handles `expenses auth`: runs the OAuth consent flow and saves the tokens.
///
/// This is the ONLY command that asks the user to visit Google in a browser.
///
/// # Errors
/// Returns an error if `client_secret.json` is missing or invalid, or the flow fails or times out.
pub async fn auth(config: &Config) -> Result<Out<()>> {
    let token_provider =
        TokenProvider::initialize(config.client_secret_path(), config.token_path())
            .await
            .pub_result(ErrorType::Auth)?;
    Ok(format!(
        "Authorization succeeded, the access token is valid until {}",
        token_provider.expires_at()
    )
    .into())
}

/// Handles `expenses auth --verify`: refreshes the stored token to prove it still works.
///
/// This command NEVER opens a browser. If the token is missing, invalid, or has the wrong scopes,
/// it fails with an error telling the user to run `expenses auth`.
pub async fn auth_verify(config: &Config) -> Result<Out<()>> {
    let mut token_provider = TokenProvider::load(config.client_secret_path(), config.token_path())
        .await
        .context(
            "Unable to use the existing tokens found in the token JSON file. \n\n\
            You should run 'expenses auth' (without the --verify flag).",
        )
        .pub_result(ErrorType::Auth)?;
    token_provider
        .refresh()
        .await
        .context("Unable to refresh the token")
        .pub_result(ErrorType::Auth)?;
    Ok(format!(
        "Your OAuth token is valid until {}",
        token_provider.expires_at()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_auth_verify_without_token() {
        let env = TestEnv::new().await;
        let err = auth_verify(&env.config()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Auth);
        assert!(err.to_string().contains("expenses auth"));
    }
}
