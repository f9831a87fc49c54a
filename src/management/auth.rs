use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::{Error, Res, config::Config, spotify, types::Token};

/// Owns the credential and the file it is cached in.
pub struct TokenManager {
    path: PathBuf,
    token: Token,
}

impl TokenManager {
    pub fn new(path: impl Into<PathBuf>, token: Token) -> Self {
        TokenManager {
            path: path.into(),
            token,
        }
    }

    /// Whether a cached credential exists. Directories do not count.
    pub async fn exists(path: &Path) -> bool {
        async_fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    pub async fn load(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(source) => return Err(Error::CredentialFileUnreadable { path, source }),
        };
        let token: Token = match serde_json::from_str(&content) {
            Ok(token) => token,
            Err(source) => return Err(Error::CredentialFileMalformed { path, source }),
        };
        Ok(Self { path, token })
    }

    /// Overwrites the credential file with the current token.
    pub async fn persist(&self) -> Res<()> {
        let write_err = |source: std::io::Error| Error::CredentialFileWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(&self.token)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        async_fs::write(&self.path, json).await.map_err(write_err)
    }

    /// Makes sure the token is usable, refreshing it when it has expired.
    ///
    /// Returns `true` when the access token changed. The caller persists in
    /// that case; an unchanged token never touches the file.
    pub async fn ensure_valid(&mut self, config: &Config) -> Res<bool> {
        let now = Utc::now();
        if self.token.is_valid(now) {
            return Ok(false);
        }

        let refresh_token = self.token.refresh_token().ok_or_else(|| {
            Error::TokenRefresh("token expired and refresh token is not set".to_string())
        })?;
        let response = spotify::auth::refresh_token(config, refresh_token).await?;
        let refreshed = self.token.refreshed(response, Utc::now());

        let changed = refreshed.access_token != self.token.access_token;
        self.token = refreshed;
        Ok(changed)
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    pub fn into_token(self) -> Token {
        self.token
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
