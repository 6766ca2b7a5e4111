use crate::models::{ScheduledTrack, Track};
use log::debug;

/// Fallback when a track's declared duration cannot be parsed.
pub const DEFAULT_TRACK_SECS: u32 = 180;
/// Last.fm rejects scrobbles older than two weeks.
pub const MAX_SCROBBLE_AGE_SECS: i64 = 14 * 24 * 60 * 60;
/// Tolerance for timestamps slightly in the future (clock skew).
pub const MAX_FUTURE_SKEW_SECS: i64 = 10 * 60;
/// Hard cap on tracks per track.scrobble call.
pub const MAX_BATCH: usize = 50;

/// Derive per-track start timestamps for a listening session that ends
/// at `now`: the last track has just finished playing, and each track
/// starts its own duration before the next one. Timestamps are
/// non-decreasing in track order and the final track's start plus its
/// duration lands exactly on `now`.
pub fn schedule_backwards(tracks: Vec<Track>, now: i64) -> Vec<ScheduledTrack> {
    let mut cursor = now;
    let mut scheduled: Vec<ScheduledTrack> = tracks
        .into_iter()
        .rev()
        .map(|track| {
            let duration = i64::from(track.duration_secs.unwrap_or(DEFAULT_TRACK_SECS));
            cursor -= duration;
            ScheduledTrack {
                timestamp: cursor,
                track,
            }
        })
        .collect();
    scheduled.reverse();
    scheduled
}

/// Drop entries whose timestamp falls outside the service's acceptance
/// window around `now`. Re-applying this to an already filtered batch
/// with the same `now` removes nothing.
pub fn filter_window(batch: Vec<ScheduledTrack>, now: i64) -> Vec<ScheduledTrack> {
    let oldest = now - MAX_SCROBBLE_AGE_SECS;
    let newest = now + MAX_FUTURE_SKEW_SECS;
    batch
        .into_iter()
        .filter(|entry| {
            if entry.timestamp < oldest {
                debug!(
                    "dropping '{}': timestamp {} older than 14 days",
                    entry.track.name, entry.timestamp
                );
                return false;
            }
            if entry.timestamp > newest {
                debug!(
                    "dropping '{}': timestamp {} in the future",
                    entry.track.name, entry.timestamp
                );
                return false;
            }
            true
        })
        .collect()
}

/// Truncate to the service's batch limit, keeping the first MAX_BATCH
/// entries in schedule order. Returns whether truncation occurred.
pub fn cap_batch(mut batch: Vec<ScheduledTrack>) -> (Vec<ScheduledTrack>, bool) {
    if batch.len() > MAX_BATCH {
        batch.truncate(MAX_BATCH);
        (batch, true)
    } else {
        (batch, false)
    }
}
