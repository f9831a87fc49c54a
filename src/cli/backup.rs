use std::sync::Arc;

use chrono::Utc;
use tabled::Table;

use crate::{
    Res,
    config::Config,
    info,
    spotify::{self, playlist::BackupOutcome},
    success, utils,
};

pub async fn backup(
    config: Arc<Config>,
    open_browser: bool,
    skip_existing: bool,
    list_tracks: bool,
) -> Res<()> {
    let client = spotify::auth::authorize(Arc::clone(&config), open_browser).await?;

    info!("Backing up playlist '{}'", config.source_playlist);

    match spotify::playlist::backup(&client, &config.source_playlist, Utc::now(), skip_existing)
        .await?
    {
        BackupOutcome::Created(backup) => {
            success!(
                "Copied {} tracks from '{}' into '{}'",
                backup.tracks.len(),
                backup.source.name,
                backup.playlist.name
            );
            if list_tracks && !backup.tracks.is_empty() {
                println!("{}", Table::new(utils::track_table_rows(&backup.tracks)));
            }
        }
        BackupOutcome::AlreadyExists { name } => {
            info!("Playlist '{}' already exists, nothing to do", name);
        }
    }

    Ok(())
}
