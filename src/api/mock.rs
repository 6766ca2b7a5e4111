use super::{ApiFailure, LastfmApi};
use crate::models::Credentials;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;
use tracing::info;

/// A deterministic in-memory API used in tests and when no real
/// credentials are present. It logs operations, serves canned bodies
/// and records every submitted scrobble parameter set.
pub struct MockApi {
    album_body: Option<Value>,
    scrobble_body: Option<Value>,
    pub scrobble_calls: Mutex<Vec<Vec<(String, String)>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            album_body: Some(json!({
                "album": {
                    "tracks": {
                        "track": [
                            { "name": "Mock Track 1", "duration": "200", "@attr": { "rank": "1" } },
                            { "name": "Mock Track 2", "duration": "240", "@attr": { "rank": "2" } }
                        ]
                    }
                }
            })),
            scrobble_body: Some(json!({
                "scrobbles": { "@attr": { "accepted": 2, "ignored": 0 } }
            })),
            scrobble_calls: Mutex::new(Vec::new()),
        }
    }

    /// Replace the canned album.getinfo body.
    pub fn with_album_body(mut self, body: Value) -> Self {
        self.album_body = Some(body);
        self
    }

    /// Make album.getinfo fail with a transport error.
    pub fn with_album_failure(mut self) -> Self {
        self.album_body = None;
        self
    }

    /// Replace the canned track.scrobble body.
    pub fn with_scrobble_body(mut self, body: Value) -> Self {
        self.scrobble_body = Some(body);
        self
    }

    /// Make track.scrobble fail with a transport error.
    pub fn with_scrobble_failure(mut self) -> Self {
        self.scrobble_body = None;
        self
    }

    /// Number of scrobble submissions received so far.
    pub fn scrobble_call_count(&self) -> usize {
        self.scrobble_calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LastfmApi for MockApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn album_info(
        &self,
        _creds: &Credentials,
        artist: &str,
        album: &str,
    ) -> Result<Value, ApiFailure> {
        info!("MockApi: album_info {} - {}", artist, album);
        self.album_body
            .clone()
            .ok_or_else(|| ApiFailure::Transport("mock: album_info unavailable".into()))
    }

    async fn scrobble(
        &self,
        _creds: &Credentials,
        params: Vec<(String, String)>,
    ) -> Result<Value, ApiFailure> {
        info!("MockApi: scrobble with {} params", params.len());
        if let Ok(mut calls) = self.scrobble_calls.lock() {
            calls.push(params);
        }
        self.scrobble_body
            .clone()
            .ok_or_else(|| ApiFailure::Transport("mock: scrobble unavailable".into()))
    }
}
