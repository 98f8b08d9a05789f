//! OAuth 2.0 for the Google Sheets API.
//!
//! `TokenProvider::initialize` runs the installed-application consent flow: it prints the Google
//! consent URL, waits for the redirect on a local callback server and exchanges the authorization
//! code (with PKCE) for tokens, which are saved to `token.json`. Every other command uses
//! `TokenProvider::load` and refreshes the access token as it nears expiry, without a browser.

use crate::api::files::{File, SecretFile, TokenFile};
use crate::api::OAUTH_SCOPES;
use crate::error::Res;
use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::convert::Infallible;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

const OAUTH_CALLBACK_PORT: u16 = 3030;

/// How long `initialize` waits for the user to finish in the browser.
const CONSENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Used when Google omits `expires_in`, which it does not do in practice.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// The oauth2 client with the auth and token endpoints set.
type OAuthClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Holds the client credentials and the current tokens, and refreshes the access token when
/// needed.
pub(crate) struct TokenProvider {
    client: OAuthClient,
    http: oauth2::reqwest::Client,
    token: File<TokenFile>,
}

impl TokenProvider {
    /// Runs the interactive consent flow and saves the resulting tokens to `token_path`.
    pub(crate) async fn initialize(
        secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Res<Self> {
        let secret_path = secret_path.into();
        let token_path = token_path.into();
        info!("Loading OAuth credentials from {}", secret_path.display());
        let secret = SecretFile::load(&secret_path).await?;
        let client = oauth_client(&secret)?;
        let http = http_client()?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in OAUTH_SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        let (auth_url, csrf_state) = request
            // Both are needed for Google to return a refresh token.
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to authorize read access to your sheet:\n\n{auth_url}\n");
        info!("Waiting for the authorization redirect on http://localhost:{OAUTH_CALLBACK_PORT}");
        let code = tokio::time::timeout(
            CONSENT_TIMEOUT,
            receive_code(OAUTH_CALLBACK_PORT, csrf_state.secret()),
        )
        .await
        .context("Timed out waiting for the OAuth redirect")??;

        let response = client
            .exchange_code(code)
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http)
            .await
            .context("Unable to exchange the authorization code for tokens")?;

        let refresh_token = match response.refresh_token() {
            Some(refresh_token) => refresh_token.secret().clone(),
            None => bail!(
                "Google did not return a refresh token. Remove this app from your Google account's \
                third-party access list and run 'expenses auth' again."
            ),
        };
        let scopes = match response.scopes() {
            Some(scopes) => scopes.iter().map(|s| s.as_str().to_string()).collect(),
            None => OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
        };
        let token_file = TokenFile::new(
            scopes,
            response.access_token().secret().clone(),
            refresh_token,
            expires_at(&response),
        );
        let token = File::new(token_path, token_file);
        token.save().await?;
        info!("Authorization successful, tokens saved to {}", token.path().display());

        Ok(Self {
            client,
            http,
            token,
        })
    }

    /// Loads existing credentials and tokens. Never opens a browser.
    pub(crate) async fn load(
        secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Res<Self> {
        let secret_path = secret_path.into();
        let token_path = token_path.into();
        let secret = SecretFile::load(&secret_path).await?;
        let token = TokenFile::load(&token_path).await.context(
            "Unable to use the stored OAuth token. Run 'expenses auth' to authorize access.",
        )?;
        Ok(Self {
            client: oauth_client(&secret)?,
            http: http_client()?,
            token,
        })
    }

    /// Exchanges the refresh token for a new access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Res<()> {
        debug!("Refreshing the OAuth access token");
        let refresh_token = RefreshToken::new(self.token.data().refresh_token().to_string());
        let response = self
            .client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .context("Unable to refresh the OAuth access token")?;
        self.token.data_mut().update(
            response.access_token().secret().clone(),
            expires_at(&response),
            response.refresh_token().map(|t| t.secret().clone()),
        );
        self.token.save().await?;
        trace!("Access token valid until {}", self.token.data().expires_at());
        Ok(())
    }

    /// The current access token, which may be expired.
    pub(crate) fn token(&self) -> &str {
        self.token.data().access_token()
    }

    /// The access token, refreshed first if it is expired or about to expire.
    pub(crate) async fn token_with_refresh(&mut self) -> Res<&str> {
        if self.token.data().is_expired() {
            self.refresh().await?;
        }
        Ok(self.token())
    }

    pub(crate) fn expires_at(&self) -> DateTime<Utc> {
        self.token.data().expires_at()
    }
}

fn oauth_client(secret: &SecretFile) -> Res<OAuthClient> {
    let redirect = format!("http://localhost:{OAUTH_CALLBACK_PORT}");
    Ok(BasicClient::new(ClientId::new(secret.client_id().to_string()))
        .set_client_secret(ClientSecret::new(secret.client_secret().to_string()))
        .set_auth_uri(AuthUrl::new(secret.auth_uri().to_string()).context("Invalid auth_uri")?)
        .set_token_uri(TokenUrl::new(secret.token_uri().to_string()).context("Invalid token_uri")?)
        .set_redirect_uri(RedirectUrl::new(redirect).context("Invalid redirect URI")?))
}

fn http_client() -> Res<oauth2::reqwest::Client> {
    // The token endpoint must not redirect.
    oauth2::reqwest::ClientBuilder::new()
        .redirect(oauth2::reqwest::redirect::Policy::none())
        .build()
        .context("Unable to build the OAuth HTTP client")
}

fn expires_at(response: &BasicTokenResponse) -> DateTime<Utc> {
    let lifetime = response
        .expires_in()
        .and_then(|d| chrono::Duration::from_std(d).ok())
        .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));
    Utc::now() + lifetime
}

/// Serves `http://localhost:<port>` until a request carries the authorization code (or an error)
/// for `expected_state`. Other requests, like the browser asking for a favicon, are answered and
/// ignored.
async fn receive_code(port: u16, expected_state: &str) -> Res<AuthorizationCode> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Unable to listen on localhost:{port}"))?;
    let (tx, mut rx) = mpsc::channel::<Res<AuthorizationCode>>(1);

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .context("Unable to accept the OAuth callback connection")?;
        trace!("OAuth callback connection from {peer}");

        let tx = tx.clone();
        let expected_state = expected_state.to_string();
        let service = service_fn(move |req: Request<Incoming>| {
            let tx = tx.clone();
            let outcome = parse_callback(req.uri().query(), &expected_state);
            async move {
                let body = match &outcome {
                    Some(Ok(_)) => "Authorization complete. You can close this window.",
                    Some(Err(_)) => "Authorization failed. See the terminal for details.",
                    None => "Waiting for the Google authorization redirect.",
                };
                if let Some(outcome) = outcome {
                    let _ = tx.send(outcome).await;
                }
                Ok::<_, Infallible>(Response::new(body.to_string()))
            }
        });

        if let Err(e) = http1::Builder::new()
            .keep_alive(false)
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            debug!("OAuth callback connection error: {e}");
        }

        if let Ok(outcome) = rx.try_recv() {
            return outcome;
        }
    }
}

/// Interprets the query string of a callback request. `None` means the request is not the
/// redirect we are waiting for.
fn parse_callback(query: Option<&str>, expected_state: &str) -> Option<Res<AuthorizationCode>> {
    let mut code = None;
    let mut state = None;
    for (key, value) in url::form_urlencoded::parse(query?.as_bytes()) {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Some(Err(anyhow!("Google denied the authorization: {value}"))),
            _ => {}
        }
    }
    let code = code?;
    if state.as_deref() != Some(expected_state) {
        return Some(Err(anyhow!(
            "The OAuth state parameter did not match, the redirect was not for this request"
        )));
    }
    Some(Ok(AuthorizationCode::new(code)))
}
