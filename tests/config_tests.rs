use rfid_lastfm_scrobbler::config::Config;
use std::fs;
use tempfile::tempdir;

const FULL_CONFIG: &str = r#"
log_dir = "/tmp/rfid-scrobbler-logs"

[lastfm]
api_key = "key"
api_secret = "secret"
session_key = "sess"
username = "listener"

[albums]
"1234567890" = { artist = "Example Artist", album = "Example Album" }
"another_tag" = { artist = "Another Artist", album = "Another Album Vol. 1" }
"#;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let td = tempdir().unwrap();
    let path = td.path().join("config.toml");
    fs::write(&path, contents).unwrap();
    (td, path)
}

#[test]
fn full_config_parses_and_resolves_tags() {
    let (_td, path) = write_config(FULL_CONFIG);
    let cfg = Config::from_path(&path).unwrap();
    assert_eq!(cfg.lastfm.username, "listener");
    assert_eq!(cfg.log_dir, std::path::PathBuf::from("/tmp/rfid-scrobbler-logs"));

    let entry = cfg.album_for_tag("1234567890").unwrap();
    assert_eq!(entry.artist, "Example Artist");
    assert_eq!(entry.album, "Example Album");

    // Tag readers pad ids with whitespace/newlines.
    assert!(cfg.album_for_tag(" 1234567890\r\n").is_some());
    assert!(cfg.album_for_tag("unmapped").is_none());
}

#[test]
fn albums_table_and_log_dir_are_optional() {
    let (_td, path) = write_config(
        r#"
[lastfm]
api_key = "key"
api_secret = "secret"
session_key = "sess"
username = "listener"
"#,
    );
    let cfg = Config::from_path(&path).unwrap();
    assert!(cfg.albums.is_empty());
    assert_eq!(
        cfg.log_dir,
        std::path::PathBuf::from("/var/log/rfid-scrobbler")
    );
}

#[test]
fn missing_credential_field_is_rejected() {
    let (_td, path) = write_config(
        r#"
[lastfm]
api_key = "key"
api_secret = "secret"
username = "listener"
"#,
    );
    assert!(Config::from_path(&path).is_err());
}
