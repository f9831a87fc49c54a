#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        Arc, Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use dwbackup::config::Config;
use serde_json::{Value, json};

pub const VALID_CODE: &str = "valid-code";
pub const GOOD_REFRESH: &str = "good-refresh";
pub const EXCHANGED_ACCESS: &str = "exchanged-access";
pub const EXCHANGED_REFRESH: &str = "exchanged-refresh";
pub const REFRESHED_ACCESS: &str = "refreshed-access";
pub const CACHED_ACCESS: &str = "cached-access";
pub const USER_ID: &str = "user-1";

const ACCEPTED_TOKENS: [&str; 3] = [CACHED_ACCESS, EXCHANGED_ACCESS, REFRESHED_ACCESS];

/// What the fake Web API serves.
#[derive(Clone)]
pub struct FakeOptions {
    pub search_results: Vec<Value>,
    pub first_page: Vec<Value>,
    pub second_page: Vec<Value>,
    pub user_playlists: Vec<String>,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            search_results: vec![
                Value::Null,
                playlist_json("dw-1", "Discover Weekly"),
                playlist_json("dw-2", "Discover Weekly"),
            ],
            first_page: vec![track_json("A", "Alpha"), track_json("B", "Beta")],
            second_page: vec![track_json("C", "Gamma"), local_file_json("Home demo")],
            user_playlists: vec!["Road trip".to_string()],
        }
    }
}

#[derive(Default)]
pub struct Recorded {
    pub token_requests: Mutex<Vec<(HashMap<String, String>, Option<String>)>>,
    pub api_requests: AtomicUsize,
    pub search_queries: Mutex<Vec<HashMap<String, String>>>,
    pub created: Mutex<Vec<(String, Value)>>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
}

struct FakeState {
    options: FakeOptions,
    recorded: Arc<Recorded>,
    base_url: OnceLock<String>,
}

pub struct FakeSpotify {
    pub addr: SocketAddr,
    pub recorded: Arc<Recorded>,
}

impl FakeSpotify {
    pub async fn start(options: FakeOptions) -> Self {
        let recorded = Arc::new(Recorded::default());
        let state = Arc::new(FakeState {
            options,
            recorded: Arc::clone(&recorded),
            base_url: OnceLock::new(),
        });

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(me))
            .route("/v1/me/playlists", get(my_playlists))
            .route("/v1/search", get(search))
            .route("/v1/playlists/{id}", get(playlist))
            .route("/v1/playlists/{id}/tracks", get(playlist_tracks).post(add_tracks))
            .route("/v1/users/{user_id}/playlists", post(create_playlist))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        state.base_url.set(format!("http://{}", addr)).unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration pointing every endpoint at this fake.
    pub fn config(&self, token_path: PathBuf) -> Config {
        Config {
            client_id: "client-id".to_string(),
            client_secret: Some("client-secret".to_string()),
            redirect_uri: "http://localhost:8080/callback".to_string(),
            scope: "user-read-private playlist-modify-private".to_string(),
            auth_url: format!("{}/authorize", self.base_url()),
            token_url: format!("{}/api/token", self.base_url()),
            api_url: format!("{}/v1", self.base_url()),
            server_addr: "127.0.0.1:0".to_string(),
            token_path,
            source_playlist: "Discover Weekly".to_string(),
            auth_timeout: Some(Duration::from_secs(5)),
        }
    }

    pub fn token_request_count(&self) -> usize {
        self.recorded.token_requests.lock().unwrap().len()
    }

    pub fn api_request_count(&self) -> usize {
        self.recorded.api_requests.load(Ordering::SeqCst)
    }

    pub fn added_uris(&self) -> Vec<String> {
        self.recorded
            .added
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, uris)| uris.clone())
            .collect()
    }
}

pub fn playlist_json(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "owner": { "id": "spotify", "display_name": "Spotify" } })
}

pub fn track_json(id: &str, name: &str) -> Value {
    json!({
        "track": {
            "id": id,
            "name": name,
            "type": "track",
            "artists": [{ "id": format!("{}-artist", id), "name": format!("{} Artist", name) }]
        }
    })
}

pub fn local_file_json(name: &str) -> Value {
    json!({ "track": { "id": null, "name": name, "type": "track", "artists": [] } })
}

pub fn token_file_json(access: &str, refresh: Option<&str>, expiry: &str) -> String {
    match refresh {
        Some(refresh) => format!(
            r#"{{"access_token":"{}","token_type":"Bearer","refresh_token":"{}","expiry":"{}"}}"#,
            access, refresh, expiry
        ),
        None => format!(
            r#"{{"access_token":"{}","token_type":"Bearer","expiry":"{}"}}"#,
            access, expiry
        ),
    }
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    state.recorded.api_requests.fetch_add(1, Ordering::SeqCst);
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|t| ACCEPTED_TOKENS.contains(&t))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "Invalid access token" } })),
    )
        .into_response()
}

async fn token(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .recorded
        .token_requests
        .lock()
        .unwrap()
        .push((form.clone(), auth));

    let bad_request = || {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid authorization code" })),
        )
            .into_response()
    };

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if form.get("code").map(String::as_str) == Some(VALID_CODE) => {
            Json(json!({
                "access_token": EXCHANGED_ACCESS,
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": EXCHANGED_REFRESH,
                "scope": "user-read-private playlist-modify-private"
            }))
            .into_response()
        }
        Some("refresh_token")
            if form.get("refresh_token").map(String::as_str) == Some(GOOD_REFRESH) =>
        {
            Json(json!({
                "access_token": REFRESHED_ACCESS,
                "token_type": "Bearer",
                "expires_in": 3600,
                "scope": "user-read-private playlist-modify-private"
            }))
            .into_response()
        }
        _ => bad_request(),
    }
}

async fn me(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!({ "id": USER_ID, "display_name": "Test User" })).into_response()
}

async fn search(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    state.recorded.search_queries.lock().unwrap().push(query);
    Json(json!({
        "playlists": {
            "items": state.options.search_results,
            "next": null,
            "total": state.options.search_results.len()
        }
    }))
    .into_response()
}

async fn playlist(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let base = state.base_url.get().cloned().unwrap_or_default();
    let next = if state.options.second_page.is_empty() {
        Value::Null
    } else {
        json!(format!("{}/v1/playlists/{}/tracks?offset=100&limit=100", base, id))
    };
    Json(json!({
        "id": id,
        "name": "Discover Weekly",
        "tracks": {
            "items": state.options.first_page,
            "next": next,
            "total": state.options.first_page.len() + state.options.second_page.len()
        }
    }))
    .into_response()
}

async fn playlist_tracks(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!({
        "items": state.options.second_page,
        "next": null,
        "total": state.options.first_page.len() + state.options.second_page.len()
    }))
    .into_response()
}

async fn my_playlists(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let items: Vec<Value> = state
        .options
        .user_playlists
        .iter()
        .enumerate()
        .map(|(i, name)| playlist_json(&format!("own-{}", i), name))
        .collect();
    Json(json!({ "items": items, "next": null, "total": items.len() })).into_response()
}

async fn create_playlist(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    state
        .recorded
        .created
        .lock()
        .unwrap()
        .push((user_id, body.clone()));
    (
        StatusCode::CREATED,
        Json(json!({ "id": "backup-1", "name": name, "public": false, "snapshot_id": "s0" })),
    )
        .into_response()
}

async fn add_tracks(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let uris: Vec<String> = body["uris"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let mut added = state.recorded.added.lock().unwrap();
    added.push((id, uris));
    (
        StatusCode::CREATED,
        Json(json!({ "snapshot_id": format!("s{}", added.len()) })),
    )
        .into_response()
}
