use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};

use crate::{Res, config::Config, spotify::client::SpotifyClient, utils};

pub type AuthorizationOutcome = Res<SpotifyClient>;

/// State of one interactive authorization.
///
/// Created by the driver before the callback server starts and handed to the
/// router, so the handler sees the same nonce, verifier and channel as the
/// code that printed the authorization URL.
pub struct AuthorizationSession {
    config: Arc<Config>,
    state: String,
    code_verifier: Option<String>,
    sender: Mutex<Option<oneshot::Sender<AuthorizationOutcome>>>,
}

impl AuthorizationSession {
    pub fn new(config: Arc<Config>) -> (Self, oneshot::Receiver<AuthorizationOutcome>) {
        Self::with_state(config, utils::generate_state())
    }

    pub fn with_state(
        config: Arc<Config>,
        state: String,
    ) -> (Self, oneshot::Receiver<AuthorizationOutcome>) {
        let (tx, rx) = oneshot::channel();
        let code_verifier = config.uses_pkce().then(utils::generate_code_verifier);

        let session = Self {
            config,
            state,
            code_verifier,
            sender: Mutex::new(Some(tx)),
        };
        (session, rx)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn code_verifier(&self) -> Option<&str> {
        self.code_verifier.as_deref()
    }

    pub fn authorize_url(&self) -> Res<String> {
        let challenge = self
            .code_verifier
            .as_deref()
            .map(utils::generate_code_challenge);
        crate::spotify::auth::authorize_url(&self.config, &self.state, challenge.as_deref())
    }

    /// Takes the sending half of the channel.
    ///
    /// Only the first callback gets it; later ones find the session already
    /// claimed and must not exchange codes or write the credential file.
    pub async fn claim(&self) -> Option<oneshot::Sender<AuthorizationOutcome>> {
        self.sender.lock().await.take()
    }
}
