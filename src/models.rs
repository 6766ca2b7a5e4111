use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full Last.fm credential set for one scrobble operation.
/// `api_key` alone is enough for read-only metadata calls; writes
/// additionally need `api_secret` and `session_key`. `username`
/// personalizes `album.getinfo` results but requires no auth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub session_key: String,
    pub username: String,
}

/// One album track as parsed from an `album.getinfo` response.
/// Candidates missing a name or a duration field are discarded
/// before this struct is ever built; `duration_secs` is None only
/// when the field was present but not numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub duration_secs: Option<u32>,
    // 1-based position on the album, from @attr.rank
    pub rank: Option<u32>,
}

/// A track paired with the Unix second at which its playback is
/// asserted to have started. Derived per submission, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTrack {
    pub track: Track,
    pub timestamp: i64,
}

/// Outcome of one batch submission as reported by the service.
/// `accepted + ignored` may be less than the batch length; that is
/// reported as-is, not corrected.
#[derive(Debug, Clone, Default)]
pub struct ScrobbleResult {
    pub accepted: u32,
    pub ignored: u32,
    pub error: Option<String>,
    pub raw_response: Option<Value>,
}
