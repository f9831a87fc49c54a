//! Discover Weekly Backup Library
//!
//! This library backs up the weekly auto-generated Spotify recommendation
//! playlist into a dated private copy. It covers the OAuth 2.0 authorization
//! code flow (interactive or from a cached credential), the credential file
//! lifecycle and the handful of Web API calls needed to copy a playlist.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local callback server
//! - `cli` - Command implementations driven by `main`
//! - `config` - Environment loading and the resolved [`config::Config`]
//! - `error` - The crate-wide [`Error`] type
//! - `management` - Credential file management
//! - `server` - Local HTTP server for the OAuth redirect
//! - `session` - State shared between the interactive flow and the callback
//! - `spotify` - Spotify accounts and Web API client
//! - `types` - Data structures and wire types
//! - `utils` - Nonce, PKCE and week label helpers
//!
//! # Example
//!
//! ```
//! use dwbackup::{config, spotify};
//!
//! #[tokio::main]
//! async fn main() -> dwbackup::Res<()> {
//!     config::load_env(None)?;
//!     let config = std::sync::Arc::new(config::Config::from_env()?);
//!     let client = spotify::auth::authorize(config.clone(), false).await?;
//!     spotify::playlist::backup(&client, &config.source_playlist, chrono::Utc::now(), false).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::Error;

/// Result type used by every stage of a backup run.
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// info!("Searching for playlist {}", name);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// success!("Backup created with {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1 after printing. Only the driver in
/// `main` uses this; library code returns [`Error`] instead.
///
/// # Example
///
/// ```
/// error!("Backup failed: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for conditions the run survives, such as a browser that fails to open.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
