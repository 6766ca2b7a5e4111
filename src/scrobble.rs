use crate::api::{ApiFailure, LastfmApi};
use crate::models::{Credentials, ScheduledTrack, ScrobbleResult, Track};
use crate::schedule::{self, MAX_BATCH};
use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use thiserror::Error;

/// Terminal outcomes of one scrobble invocation that never reached the
/// submission call. None of these are retried internally; retry and
/// backoff policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ScrobbleError {
    /// The metadata call failed or the body lacks a track list structure.
    #[error("tracklist unavailable: {reason}")]
    TracklistUnavailable { reason: String },
    /// Every candidate track lacked a name or a duration. A normal
    /// "nothing to do" outcome, not a hard failure.
    #[error("no valid tracks (name and duration) in album response")]
    NoValidTracks,
    /// Every derived timestamp fell outside the acceptance window.
    #[error("no tracks left inside the scrobble acceptance window")]
    NoTracksInWindow,
}

/// Scrobble an entire album as one plausible listening session ending now.
pub async fn scrobble_album(
    api: &dyn LastfmApi,
    creds: &Credentials,
    artist: &str,
    album: &str,
) -> Result<ScrobbleResult, ScrobbleError> {
    scrobble_album_at(api, creds, artist, album, Utc::now().timestamp()).await
}

/// Same as `scrobble_album` with an injected wall clock, so schedules
/// and window filtering are deterministic under test.
///
/// Pipeline: fetch the tracklist, normalize and order it, derive start
/// timestamps backwards from `now`, drop out-of-window entries, cap the
/// batch at the service limit, submit once, and report the acceptance
/// summary. At most two sequential network calls per invocation.
pub async fn scrobble_album_at(
    api: &dyn LastfmApi,
    creds: &Credentials,
    artist: &str,
    album: &str,
    now: i64,
) -> Result<ScrobbleResult, ScrobbleError> {
    info!(
        "scrobbling album '{}' by '{}' for user {} via {}",
        album,
        artist,
        creds.username,
        api.name()
    );

    // Step 1: tracklist retrieval.
    let body = match api.album_info(creds, artist, album).await {
        Ok(body) => body,
        Err(failure) => {
            warn!("album.getinfo failed for '{}' by '{}': {}", album, artist, failure);
            return Err(ScrobbleError::TracklistUnavailable {
                reason: failure.to_string(),
            });
        }
    };
    let candidates = extract_track_nodes(&body).ok_or_else(|| {
        warn!(
            "album.getinfo response for '{}' by '{}' lacks album.tracks.track",
            album, artist
        );
        ScrobbleError::TracklistUnavailable {
            reason: "response lacks a track list structure".into(),
        }
    })?;

    // Step 2: discard candidates missing a name or a duration.
    let total = candidates.len();
    let mut tracks: Vec<Track> = candidates.iter().filter_map(parse_track).collect();
    if tracks.len() < total {
        warn!(
            "'{}' by '{}': {} of {} tracks missing name or duration, skipped",
            album,
            artist,
            total - tracks.len(),
            total
        );
    }
    if tracks.is_empty() {
        return Err(ScrobbleError::NoValidTracks);
    }

    // Step 3: order by declared rank when every rank is numeric.
    sort_by_rank(&mut tracks);

    // Steps 4-5: schedule backwards from now, then window-filter.
    let scheduled = schedule::schedule_backwards(tracks, now);
    let in_window = schedule::filter_window(scheduled, now);
    if in_window.is_empty() {
        return Err(ScrobbleError::NoTracksInWindow);
    }

    // Step 6: batch cap.
    let (batch, truncated) = schedule::cap_batch(in_window);
    if truncated {
        warn!(
            "'{}' by '{}' exceeds the {}-track batch limit, submitting the first {}",
            album,
            artist,
            MAX_BATCH,
            batch.len()
        );
    }

    // Step 7: one signed write call.
    info!(
        "submitting {} tracks for '{}' by '{}'",
        batch.len(),
        album,
        artist
    );
    let response = api.scrobble(creds, batch_params(artist, album, &batch)).await;

    // Step 8: interpret the acceptance summary.
    let result = interpret_response(response);
    match &result.error {
        None => info!(
            "scrobbled '{}' by '{}': accepted {}, ignored {}",
            album, artist, result.accepted, result.ignored
        ),
        Some(err) => warn!("scrobble of '{}' by '{}' failed: {}", album, artist, err),
    }
    Ok(result)
}

/// Pull the track nodes out of an album.getinfo body. The `track` field
/// is an object for single-track albums and an array otherwise;
/// normalize to a vector uniformly.
fn extract_track_nodes(body: &Value) -> Option<Vec<Value>> {
    let node = body.get("album")?.get("tracks")?.get("track")?;
    match node {
        Value::Array(items) => Some(items.clone()),
        Value::Object(_) => Some(vec![node.clone()]),
        _ => None,
    }
}

/// Parse one candidate node into a Track. Returns None when the name or
/// the duration field is absent; a present but non-numeric duration
/// yields `duration_secs: None` (defaulted later in scheduling).
fn parse_track(node: &Value) -> Option<Track> {
    let name = node.get("name")?.as_str()?;
    if name.is_empty() {
        return None;
    }
    let duration = node.get("duration")?;
    if duration.is_null() || duration.as_str().is_some_and(str::is_empty) {
        return None;
    }
    let rank = node
        .get("@attr")
        .and_then(|attr| attr.get("rank"))
        .and_then(parse_count);
    Some(Track {
        name: name.to_string(),
        duration_secs: parse_count(duration),
        rank,
    })
}

/// Sort ascending by 1-based rank; a no-op when any rank is missing or
/// non-numeric (the received order is used instead, never a failure).
fn sort_by_rank(tracks: &mut [Track]) {
    if tracks.iter().all(|t| t.rank.is_some()) {
        tracks.sort_by_key(|t| t.rank);
    } else {
        warn!("could not sort tracks by rank, using received order");
    }
}

/// Build the positional track.scrobble fields for every batch entry.
fn batch_params(artist: &str, album: &str, batch: &[ScheduledTrack]) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(batch.len() * 4);
    for (i, entry) in batch.iter().enumerate() {
        params.push((format!("artist[{}]", i), artist.to_string()));
        params.push((format!("album[{}]", i), album.to_string()));
        params.push((format!("track[{}]", i), entry.track.name.clone()));
        params.push((format!("timestamp[{}]", i), entry.timestamp.to_string()));
    }
    params
}

/// Turn the submission outcome into a ScrobbleResult. A body with a
/// scrobbles.@attr summary reports accepted/ignored counts (accepted=0
/// is valid, e.g. duplicate suppression); anything else becomes an
/// accepted=0 result with the error field set and the diagnostic
/// payload attached.
fn interpret_response(response: Result<Value, ApiFailure>) -> ScrobbleResult {
    match response {
        Ok(body) => {
            let summary = body
                .get("scrobbles")
                .and_then(|s| s.get("@attr"))
                .map(|attr| {
                    (
                        attr.get("accepted").and_then(parse_count).unwrap_or(0),
                        attr.get("ignored").and_then(parse_count).unwrap_or(0),
                    )
                });
            match summary {
                Some((accepted, ignored)) => ScrobbleResult {
                    accepted,
                    ignored,
                    error: None,
                    raw_response: Some(body),
                },
                None => ScrobbleResult {
                    accepted: 0,
                    ignored: 0,
                    error: Some("submission failed: response lacks a scrobbles summary".into()),
                    raw_response: Some(body),
                },
            }
        }
        Err(failure) => ScrobbleResult {
            accepted: 0,
            ignored: 0,
            error: Some(format!("submission failed: {}", failure)),
            raw_response: Some(failure.diagnostic()),
        },
    }
}

/// Numeric fields in Last.fm bodies arrive as numbers or as strings.
fn parse_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
