use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Seconds before the recorded expiry at which a token is already treated as
/// expired, so it does not lapse in the middle of a request.
pub const EXPIRY_DELTA_SECS: i64 = 10;

/// The cached credential, stored as JSON in the credential file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            expiry: response
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| now + Duration::seconds(secs)),
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
        }
    }

    /// Applies a refresh response. The token endpoint may omit the refresh
    /// token, in which case the current one stays in use.
    pub fn refreshed(&self, response: TokenResponse, now: DateTime<Utc>) -> Self {
        let mut token = Token::from_response(response, now);
        if token.refresh_token.is_none() {
            token.refresh_token = self.refresh_token().map(str::to_string);
        }
        token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Expiry, ignoring the zero timestamp some writers use for "never".
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry.filter(|e| e.year() > 1)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry() {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_DELTA_SECS) <= now,
            None => false,
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && !self.is_expired(now)
    }
}

/// Body returned by the accounts service token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Query parameters of the OAuth redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
}

/// A paged result from the Web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlaylistsResponse {
    pub playlists: Option<Page<Option<SimplifiedPlaylist>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    pub name: String,
    pub owner: Option<PlaylistOwner>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl PlaylistTrack {
    /// The track id, if this entry can be added to another playlist.
    ///
    /// Local files and unavailable tracks carry no id; podcast episodes are
    /// not tracks.
    pub fn track_id(&self) -> Option<&str> {
        if self.kind.as_deref().is_some_and(|k| k != "track") {
            return None;
        }
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn uri(&self) -> Option<String> {
        self.track_id().map(|id| format!("spotify:track:{}", id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub public: Option<bool>,
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub name: String,
    pub artists: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullPlaylist {
    pub id: String,
    pub name: String,
    pub tracks: Page<PlaylistItem>,
}
