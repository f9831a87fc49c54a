use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{
    Error, Res,
    config::Config,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        FullPlaylist, Page, Playlist, PlaylistItem, PlaylistTrack, SearchPlaylistsResponse,
        SimplifiedPlaylist, Token, User,
    },
};

/// Maximum number of tracks the Web API accepts in one add request.
pub const ADD_TRACKS_BATCH: usize = 100;

/// A Web API client bound to one authorized credential.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: Token,
}

impl SpotifyClient {
    pub fn new(config: &Config, token: Token) -> Self {
        Self {
            http: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &'static str,
    ) -> Res<T> {
        let response = request
            .bearer_auth(&self.token.access_token)
            .send()
            .await
            .map_err(Error::http(context))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::PlaylistApi {
                context,
                status,
                body,
            });
        }

        response.json::<T>().await.map_err(Error::http(context))
    }

    /// Follows `next` links until the last page and returns all items.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: Page<T>,
        context: &'static str,
    ) -> Res<Vec<T>> {
        let mut items = first.items;
        let mut next = first.next;

        while let Some(url) = next {
            let page: Page<T> = self.send(self.http.get(&url), context).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    pub async fn current_user(&self) -> Res<User> {
        self.send(self.http.get(self.url("/me")), "Could not get current user")
            .await
    }

    /// Searches playlists by name, in the order the service ranks them.
    ///
    /// The service sometimes returns `null` entries in the result list; those
    /// are dropped here.
    pub async fn search_playlists(&self, name: &str) -> Res<Vec<SimplifiedPlaylist>> {
        let request = self
            .http
            .get(self.url("/search"))
            .query(&[("q", name), ("type", "playlist")]);
        let response: SearchPlaylistsResponse =
            self.send(request, "Could not get playlists").await?;

        Ok(response
            .playlists
            .map(|page| page.items.into_iter().flatten().collect())
            .unwrap_or_default())
    }

    /// Fetches a playlist together with every one of its tracks.
    pub async fn get_playlist(&self, playlist_id: &str) -> Res<(FullPlaylist, Vec<PlaylistTrack>)> {
        let context = "Could not get playlist";
        let mut playlist: FullPlaylist = self
            .send(
                self.http.get(self.url(&format!("/playlists/{}", playlist_id))),
                context,
            )
            .await?;

        let first = Page {
            items: std::mem::take(&mut playlist.tracks.items),
            next: playlist.tracks.next.take(),
            total: playlist.tracks.total,
        };
        let items: Vec<PlaylistItem> = self.collect_pages(first, context).await?;
        let tracks = items.into_iter().filter_map(|item| item.track).collect();

        Ok((playlist, tracks))
    }

    pub async fn current_user_playlists(&self) -> Res<Vec<SimplifiedPlaylist>> {
        let context = "Could not list playlists";
        let request = self
            .http
            .get(self.url("/me/playlists"))
            .query(&[("limit", "50")]);
        let first: Page<Option<SimplifiedPlaylist>> = self.send(request, context).await?;
        let items = self.collect_pages(first, context).await?;

        Ok(items.into_iter().flatten().collect())
    }

    pub async fn create_playlist_for_user(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Res<Playlist> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public,
            collaborative: false,
        };
        let request = self
            .http
            .post(self.url(&format!("/users/{}/playlists", user_id)))
            .json(&body);

        self.send(request, "Could not create playlist").await
    }

    /// Appends tracks in order, in batches the API accepts.
    ///
    /// Returns the snapshot id of the last batch, or `None` if there was
    /// nothing to add.
    pub async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Res<Option<String>> {
        let mut snapshot_id = None;

        for chunk in uris.chunks(ADD_TRACKS_BATCH) {
            let body = AddTrackToPlaylistRequest {
                uris: chunk.to_vec(),
            };
            let request = self
                .http
                .post(self.url(&format!("/playlists/{}/tracks", playlist_id)))
                .json(&body);
            let response: AddTrackToPlaylistResponse = self
                .send(request, "Could not add tracks to playlist")
                .await?;
            snapshot_id = Some(response.snapshot_id);
        }

        Ok(snapshot_id)
    }
}
