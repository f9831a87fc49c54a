use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use tokio::sync::oneshot;

use crate::{
    Error, Res,
    config::Config,
    info,
    management::TokenManager,
    server::start_api_server,
    session::{AuthorizationOutcome, AuthorizationSession},
    spotify::client::SpotifyClient,
    success,
    types::{Token, TokenResponse},
    utils, warning,
};

/// Produces an authorized client, choosing the cheapest valid path.
///
/// With a credential file on disk the cached token is loaded, refreshed if
/// it has expired, and saved again only when the access token changed.
/// Without one the interactive browser flow runs and the callback handler
/// writes the file.
///
/// # Errors
///
/// - [`Error::CredentialFileUnreadable`] / [`Error::CredentialFileMalformed`]
///   for a broken cache; no API call is made in that case
/// - [`Error::TokenRefresh`] when an expired token cannot be refreshed
/// - any error delivered by the callback handler in the interactive flow
pub async fn authorize(config: Arc<Config>, open_browser: bool) -> Res<SpotifyClient> {
    if TokenManager::exists(&config.token_path).await {
        info!(
            "Using cached credential from {}",
            config.token_path.display()
        );
        authorize_cached(&config).await
    } else {
        authorize_interactive(config, open_browser).await
    }
}

pub async fn authorize_cached(config: &Config) -> Res<SpotifyClient> {
    let mut token_mgr = TokenManager::load(config.token_path.clone()).await?;

    if token_mgr.ensure_valid(config).await? {
        info!("Got refreshed token, saving it");
        token_mgr.persist().await?;
    }

    Ok(SpotifyClient::new(config, token_mgr.into_token()))
}

/// Runs the browser based authorization code flow.
///
/// Starts the callback server, prints the authorization URL and blocks until
/// the callback handler publishes its outcome. The wait is unbounded unless
/// `auth_timeout` is configured. The server is shut down on every exit path
/// after it started.
pub async fn authorize_interactive(config: Arc<Config>, open_browser: bool) -> Res<SpotifyClient> {
    let (session, rx) = AuthorizationSession::new(Arc::clone(&config));
    let auth_url = session.authorize_url()?;

    let server = start_api_server(Arc::new(session)).await?;

    info!(
        "Please log in to Spotify by visiting the following page in your browser:\n{}",
        auth_url
    );
    if open_browser && webbrowser::open(&auth_url).is_err() {
        warning!("Failed to open browser. Please navigate to the URL above manually.");
    }

    let pb = utils::spinner("Waiting for authorization...");
    let outcome = wait_for_client(rx, config.auth_timeout).await;
    pb.finish_and_clear();
    server.shutdown().await;

    let client = outcome?;
    success!("Authentication successful!");
    Ok(client)
}

/// Waits for the callback handler to publish its outcome.
///
/// # Errors
///
/// - [`Error::AuthorizationTimeout`] if `timeout` elapses first
/// - [`Error::AuthorizationAborted`] if the sender was dropped unused
/// - the handler's own error if the authorization failed
pub async fn wait_for_client(
    rx: oneshot::Receiver<AuthorizationOutcome>,
    timeout: Option<Duration>,
) -> Res<SpotifyClient> {
    let received = match timeout {
        Some(limit) => tokio::time::timeout(limit, rx)
            .await
            .map_err(|_| Error::AuthorizationTimeout(limit))?,
        None => rx.await,
    };

    received.map_err(|_| Error::AuthorizationAborted)?
}

/// Builds the URL the user opens to grant access.
///
/// `code_challenge` switches the request to PKCE (`S256`).
pub fn authorize_url(config: &Config, state: &str, code_challenge: Option<&str>) -> Res<String> {
    let mut params = vec![
        ("client_id", config.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", config.scope.as_str()),
        ("state", state),
    ];
    if let Some(challenge) = code_challenge {
        params.push(("code_challenge", challenge));
        params.push(("code_challenge_method", "S256"));
    }

    let url = Url::parse_with_params(&config.auth_url, &params).map_err(|e| {
        Error::ConfigLoad(format!(
            "Invalid SPOTIFY_API_AUTH_URL '{}': {}",
            config.auth_url, e
        ))
    })?;
    Ok(url.to_string())
}

/// Exchanges an authorization code for a token.
///
/// `code_verifier` must be the PKCE verifier when no client secret is
/// configured, and is ignored otherwise.
pub async fn exchange_code(config: &Config, code: &str, code_verifier: Option<&str>) -> Res<Token> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];
    if config.uses_pkce() {
        let verifier = code_verifier.ok_or_else(|| {
            Error::OAuthExchange("missing PKCE code verifier".to_string())
        })?;
        form.push(("code_verifier", verifier));
    }

    let response = request_token(config, form)
        .await
        .map_err(Error::OAuthExchange)?;
    if response.access_token.is_empty() {
        return Err(Error::OAuthExchange(
            "server response missing access_token".to_string(),
        ));
    }

    Ok(Token::from_response(response, Utc::now()))
}

/// Requests a new access token with a refresh token.
pub async fn refresh_token(config: &Config, refresh_token: &str) -> Res<TokenResponse> {
    let form = vec![
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    let response = request_token(config, form)
        .await
        .map_err(Error::TokenRefresh)?;
    if response.access_token.is_empty() {
        return Err(Error::TokenRefresh(
            "server response missing access_token".to_string(),
        ));
    }

    Ok(response)
}

// Client authentication: HTTP basic with the secret, or the bare client id
// for PKCE.
async fn request_token<'a>(
    config: &'a Config,
    mut form: Vec<(&'a str, &'a str)>,
) -> Result<TokenResponse, String> {
    let client = Client::new();
    let mut request = client.post(&config.token_url);
    match &config.client_secret {
        Some(secret) => request = request.basic_auth(&config.client_id, Some(secret)),
        None => form.push(("client_id", config.client_id.as_str())),
    }

    let res = request.form(&form).send().await.map_err(|e| e.to_string())?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(format!("token endpoint returned {}: {}", status, body));
    }

    res.json::<TokenResponse>().await.map_err(|e| e.to_string())
}
