use std::{path::PathBuf, time::Duration};

use reqwest::StatusCode;
use thiserror::Error;

/// Every way a backup run can fail.
///
/// None of these are recovered from: each stage hands its error back to the
/// driver in `main`, which prints it and terminates the process.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot load environment: {0}")]
    ConfigLoad(String),

    #[error("Cannot read credential file {}: {source}", .path.display())]
    CredentialFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not unmarshal token from {}: {source}", .path.display())]
    CredentialFileMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write credential file {}: {source}", .path.display())]
    CredentialFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not retrieve token from client: {0}")]
    TokenRefresh(String),

    #[error("Couldn't get token: {0}")]
    OAuthExchange(String),

    #[error("Authorization was not completed within {}s", .0.as_secs())]
    AuthorizationTimeout(Duration),

    #[error("Callback server stopped before authorization completed")]
    AuthorizationAborted,

    #[error("Cannot start callback server on {addr}: {source}")]
    Server {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Http {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: {status}: {body}")]
    PlaylistApi {
        context: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("No playlist named '{0}' found")]
    PlaylistNotFound(String),
}

impl Error {
    /// Wraps a transport error with a short description of the failed call.
    pub fn http(context: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Error::Http { context, source }
    }
}
