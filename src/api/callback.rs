use std::sync::Arc;

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error, Res,
    management::TokenManager,
    session::AuthorizationSession,
    spotify::{self, client::SpotifyClient},
    types::CallbackParams,
    warning,
};

pub const LOGIN_COMPLETED: &str = "Login Completed!";
pub const TOKEN_FAILED: &str = "Couldn't get token";
pub const TOKEN_NOT_SAVED: &str = "Couldn't save token";

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(session): Extension<Arc<AuthorizationSession>>,
) -> Response {
    let Some(tx) = session.claim().await else {
        warning!("Ignoring callback, authorization already handled");
        return (StatusCode::FORBIDDEN, TOKEN_FAILED).into_response();
    };

    match complete_authorization(&session, params).await {
        Ok(client) => {
            let _ = tx.send(Ok(client));
            (StatusCode::OK, LOGIN_COMPLETED).into_response()
        }
        Err(e) => {
            warning!("Authorization failed: {}", e);
            let response = match e {
                Error::CredentialFileWrite { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, TOKEN_NOT_SAVED).into_response()
                }
                _ => (StatusCode::FORBIDDEN, TOKEN_FAILED).into_response(),
            };
            let _ = tx.send(Err(e));
            response
        }
    }
}

/// Validates the redirect, exchanges the code and saves the credential.
///
/// The credential file is written before the client is returned, so the
/// driver never sees a client whose token is not on disk.
pub async fn complete_authorization(
    session: &AuthorizationSession,
    params: CallbackParams,
) -> Res<SpotifyClient> {
    if let Some(error) = params.error {
        return Err(Error::OAuthExchange(format!("auth failed - {}", error)));
    }
    if params.state.as_deref() != Some(session.state()) {
        return Err(Error::OAuthExchange(
            "redirect state parameter doesn't match".to_string(),
        ));
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| Error::OAuthExchange("didn't get access code".to_string()))?;

    let config = session.config();
    let token = spotify::auth::exchange_code(config, &code, session.code_verifier()).await?;

    TokenManager::new(config.token_path.clone(), token.clone())
        .persist()
        .await?;

    Ok(SpotifyClient::new(config, token))
}
