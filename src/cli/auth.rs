use std::sync::Arc;

use crate::{Res, config::Config, spotify, success};

/// Runs only the authorization stage and leaves a valid credential on disk.
///
/// `force` skips the cached credential and always runs the browser flow,
/// which overwrites the credential file on success.
pub async fn auth(config: Arc<Config>, force: bool, open_browser: bool) -> Res<()> {
    let client = if force {
        spotify::auth::authorize_interactive(Arc::clone(&config), open_browser).await?
    } else {
        spotify::auth::authorize(Arc::clone(&config), open_browser).await?
    };

    match client.token().expiry() {
        Some(expiry) => success!(
            "Credential stored in {} (valid until {})",
            config.token_path.display(),
            expiry.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => success!("Credential stored in {}", config.token_path.display()),
    }

    Ok(())
}
