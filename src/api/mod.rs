pub mod lastfm;
pub mod mock;

use serde_json::{json, Value};
use thiserror::Error;

use crate::models::Credentials;

/// Why an API call produced no usable result. These are normal
/// operational outcomes, logged and inspected by the caller; they are
/// never escalated into panics or propagated transport faults.
#[derive(Debug, Error)]
pub enum ApiFailure {
    /// The network layer failed before a response body was available.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx HTTP status.
    #[error("http status {status}: {body}")]
    Http { status: u16, body: String },
    /// Well-formed body carrying a Last.fm service-level `error` field.
    #[error("last.fm error {code}: {message}")]
    Service { code: i64, message: String },
    /// Body was not parseable JSON.
    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl ApiFailure {
    /// Diagnostic payload for operator inspection, e.g. attached to a
    /// ScrobbleResult when a submission yields no acceptance summary.
    pub fn diagnostic(&self) -> Value {
        match self {
            ApiFailure::Transport(msg) => json!({ "transport": msg }),
            ApiFailure::Http { status, body } => serde_json::from_str(body)
                .unwrap_or_else(|_| json!({ "status": status, "body": body })),
            ApiFailure::Service { code, message } => {
                json!({ "error": code, "message": message })
            }
            ApiFailure::Malformed(msg) => json!({ "malformed": msg }),
        }
    }
}

/// The slice of the Last.fm API the scrobble orchestrator needs.
/// Implementations: lastfm::LastfmClient and mock::MockApi.
#[async_trait::async_trait]
pub trait LastfmApi: Send + Sync {
    /// Read-only album metadata lookup (api_key only, unsigned GET).
    async fn album_info(
        &self,
        creds: &Credentials,
        artist: &str,
        album: &str,
    ) -> Result<Value, ApiFailure>;

    /// Signed write call submitting a prepared track.scrobble parameter
    /// set (index-suffixed artist/album/track/timestamp fields).
    async fn scrobble(
        &self,
        creds: &Credentials,
        params: Vec<(String, String)>,
    ) -> Result<Value, ApiFailure>;

    /// Return the API's name (for logging, UI, etc)
    fn name(&self) -> &str;
}
