use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use dwbackup::{Res, cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Path to the .env file holding the Spotify credentials
    #[clap(long, global = true)]
    env_file: Option<PathBuf>,

    /// Where the credential is cached (overrides TOKEN_FILE)
    #[clap(long, global = true)]
    token_file: Option<PathBuf>,

    /// Give up waiting for the browser login after this many seconds
    #[clap(long, global = true)]
    timeout: Option<u64>,

    /// Open the authorization URL in the default browser
    #[clap(long, global = true)]
    open: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Copy the source playlist into a dated backup (default)
    Backup(BackupOptions),

    /// Authorize with Spotify and cache the credential
    Auth(AuthOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct BackupOptions {
    /// Name of the playlist to back up (overrides SOURCE_PLAYLIST)
    #[clap(long)]
    pub playlist: Option<String>,

    /// Do nothing if this week's backup playlist already exists
    #[clap(long)]
    pub skip_existing: bool,

    /// Print the copied tracks
    #[clap(long)]
    pub list: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Ignore the cached credential and log in again
    #[clap(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn load_config(cli: &Cli, playlist: Option<String>) -> Res<config::Config> {
    config::load_env(cli.env_file.as_deref())?;
    let mut config = config::Config::from_env()?;

    if let Some(path) = &cli.token_file {
        config.token_path = path.clone();
    }
    if let Some(secs) = cli.timeout {
        config.auth_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(name) = playlist {
        config.source_playlist = name;
    }

    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::Backup(BackupOptions::default()));

    let result = match command {
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        Command::Auth(opt) => match load_config(&cli, None) {
            Ok(config) => cli::auth(Arc::new(config), opt.force, cli.open).await,
            Err(e) => Err(e),
        },
        Command::Backup(opt) => match load_config(&cli, opt.playlist) {
            Ok(config) => {
                cli::backup(Arc::new(config), cli.open, opt.skip_existing, opt.list).await
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
