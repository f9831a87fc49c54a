//! # Spotify Integration Module
//!
//! Everything that talks to Spotify: the accounts service for OAuth 2.0 and
//! the Web API for playlists.
//!
//! ```text
//! cli (driver)
//!    ↓
//! auth      ── accounts service: authorize URL, code exchange, refresh
//! playlist  ── backup logic on top of the client
//!    ↓
//! client    ── Web API calls bound to one access token (reqwest, JSON)
//! ```
//!
//! ## Authentication
//!
//! [`auth::authorize`] returns a [`client::SpotifyClient`] either from the
//! cached credential file (refreshing it when expired) or by running the
//! browser flow against the local callback server. With a client secret the
//! code exchange authenticates with HTTP basic auth; without one it falls back
//! to PKCE.
//!
//! ## API Coverage
//!
//! - `GET /me` - current user
//! - `GET /search?type=playlist` - playlist lookup by name
//! - `GET /playlists/{id}` - playlist with its tracks, following `next` pages
//! - `GET /me/playlists` - the user's playlists, for duplicate checks
//! - `POST /users/{user_id}/playlists` - create the backup playlist
//! - `POST /playlists/{id}/tracks` - add tracks in batches of 100
//!
//! ## Error Types
//!
//! All functions return [`crate::Res`]. Non-2xx Web API responses become
//! [`crate::Error::PlaylistApi`] with the status and body; transport failures
//! become [`crate::Error::Http`]. Nothing is retried.

pub mod auth;
pub mod client;
pub mod playlist;
