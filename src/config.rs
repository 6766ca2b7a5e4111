use crate::models::Credentials;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Album identity a scanned tag maps to.
#[derive(Debug, Deserialize, Clone)]
pub struct AlbumRef {
    pub artist: String,
    pub album: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Last.fm credentials; all four fields are required.
    pub lastfm: Credentials,

    /// Tag id -> album mapping table. Stands in for the document-store
    /// lookup keyed by a scanned RFID tag.
    #[serde(default)]
    pub albums: HashMap<String, AlbumRef>,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_log_dir() -> PathBuf { "/var/log/rfid-scrobbler".into() }

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }

    /// Resolve a scanned tag id to the album it maps to. Tag readers pad
    /// ids with whitespace/newlines, so the key is trimmed first.
    pub fn album_for_tag(&self, tag: &str) -> Option<&AlbumRef> {
        self.albums.get(tag.trim())
    }
}
