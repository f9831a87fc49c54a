use chrono::{DateTime, Utc};

use crate::{
    Error, Res, info,
    spotify::client::SpotifyClient,
    types::{Playlist, PlaylistTrack, SimplifiedPlaylist, User},
    utils::BackupLabel,
};

/// What a backup run did.
#[derive(Debug, Clone)]
pub enum BackupOutcome {
    Created(Backup),
    /// A playlist with the label's name already existed and `skip_existing`
    /// was requested.
    AlreadyExists { name: String },
}

#[derive(Debug, Clone)]
pub struct Backup {
    pub user: User,
    pub source: SimplifiedPlaylist,
    pub playlist: Playlist,
    pub tracks: Vec<PlaylistTrack>,
}

/// Copies the playlist named `source_name` into a new private playlist
/// labelled with the ISO week of `now`.
///
/// The first search result is taken as the source without looking at its
/// owner or exact name, even when several playlists share the name. Tracks
/// keep their order; entries without a track id are left out.
///
/// # Errors
///
/// Every API failure ends the backup immediately. A playlist created before
/// the failure is left as it is.
pub async fn backup(
    client: &SpotifyClient,
    source_name: &str,
    now: DateTime<Utc>,
    skip_existing: bool,
) -> Res<BackupOutcome> {
    let user = client.current_user().await?;

    let source = find_playlist(client, source_name).await?;
    info!("Found playlist '{}' ({})", source.name, source.id);

    let (_, items) = client.get_playlist(&source.id).await?;
    let tracks: Vec<PlaylistTrack> = items
        .into_iter()
        .filter(|t| t.track_id().is_some())
        .collect();

    let name = BackupLabel::from_date(now).playlist_name();

    if skip_existing && exists(client, &name).await? {
        return Ok(BackupOutcome::AlreadyExists { name });
    }

    let playlist = client
        .create_playlist_for_user(&user.id, &name, "", false)
        .await?;

    let uris: Vec<String> = tracks.iter().filter_map(PlaylistTrack::uri).collect();
    client.add_tracks_to_playlist(&playlist.id, &uris).await?;

    Ok(BackupOutcome::Created(Backup {
        user,
        source,
        playlist,
        tracks,
    }))
}

pub async fn find_playlist(client: &SpotifyClient, name: &str) -> Res<SimplifiedPlaylist> {
    client
        .search_playlists(name)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::PlaylistNotFound(name.to_string()))
}

pub async fn exists(client: &SpotifyClient, name: &str) -> Res<bool> {
    Ok(client
        .current_user_playlists()
        .await?
        .iter()
        .any(|p| p.name == name))
}
