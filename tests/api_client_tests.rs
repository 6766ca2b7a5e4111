use mockito::{Matcher, Server};
use rfid_lastfm_scrobbler::api::lastfm::LastfmClient;
use rfid_lastfm_scrobbler::api::{ApiFailure, LastfmApi};
use rfid_lastfm_scrobbler::models::Credentials;
use serde_json::json;

fn creds() -> Credentials {
    Credentials {
        api_key: "key".into(),
        api_secret: "secret".into(),
        session_key: "sess".into(),
        username: "listener".into(),
    }
}

#[test]
fn album_info_sends_unsigned_get_and_parses_body() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".into(), "album.getinfo".into()),
            Matcher::UrlEncoded("artist".into(), "Radiohead".into()),
            Matcher::UrlEncoded("album".into(), "OK Computer".into()),
            Matcher::UrlEncoded("username".into(), "listener".into()),
            Matcher::UrlEncoded("api_key".into(), "key".into()),
            Matcher::UrlEncoded("format".into(), "json".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "album": { "tracks": { "track": [ { "name": "Airbag", "duration": "284" } ] } }
            })
            .to_string(),
        )
        .create();

    let client = LastfmClient::with_base(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let body = rt
        .block_on(async { client.album_info(&creds(), "Radiohead", "OK Computer").await })
        .unwrap();
    assert!(body.get("album").is_some());
}

#[test]
fn service_error_body_is_a_service_failure() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":6,"message":"Album not found"}"#)
        .create();

    let client = LastfmClient::with_base(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt
        .block_on(async { client.album_info(&creds(), "Nobody", "Nothing").await })
        .unwrap_err();
    match err {
        ApiFailure::Service { code, message } => {
            assert_eq!(code, 6);
            assert_eq!(message, "Album not found");
        }
        other => panic!("expected Service failure, got {:?}", other),
    }
}

#[test]
fn http_error_status_is_an_http_failure() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("overloaded")
        .create();

    let client = LastfmClient::with_base(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt
        .block_on(async { client.album_info(&creds(), "A", "B").await })
        .unwrap_err();
    match err {
        ApiFailure::Http { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected Http failure, got {:?}", other),
    }
}

#[test]
fn non_json_body_is_a_malformed_failure() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>maintenance</html>")
        .create();

    let client = LastfmClient::with_base(server.url());
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt
        .block_on(async { client.album_info(&creds(), "A", "B").await })
        .unwrap_err();
    assert!(matches!(err, ApiFailure::Malformed(_)));
}

#[test]
fn scrobble_posts_signed_form_with_format_added_after_signing() {
    let mut server = Server::new();
    let _m = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".into(), "track.scrobble".into()),
            Matcher::UrlEncoded("api_key".into(), "key".into()),
            Matcher::UrlEncoded("sk".into(), "sess".into()),
            Matcher::UrlEncoded("format".into(), "json".into()),
            Matcher::UrlEncoded("artist[0]".into(), "Radiohead".into()),
            Matcher::UrlEncoded("track[0]".into(), "Airbag".into()),
            Matcher::UrlEncoded("timestamp[0]".into(), "1700000000".into()),
            // 128-bit MD5 digest in lowercase hex.
            Matcher::Regex("api_sig=[0-9a-f]{32}".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"scrobbles":{"@attr":{"accepted":1,"ignored":0}}}"#)
        .create();

    let client = LastfmClient::with_base(server.url());
    let params = vec![
        ("artist[0]".to_string(), "Radiohead".to_string()),
        ("album[0]".to_string(), "OK Computer".to_string()),
        ("track[0]".to_string(), "Airbag".to_string()),
        ("timestamp[0]".to_string(), "1700000000".to_string()),
    ];
    let rt = tokio::runtime::Runtime::new().unwrap();
    let body = rt
        .block_on(async { client.scrobble(&creds(), params).await })
        .unwrap();
    assert_eq!(body["scrobbles"]["@attr"]["accepted"], 1);
}

#[test]
fn unreachable_endpoint_is_a_transport_failure() {
    // Nothing listens on port 9; the connect error must surface as a
    // value, not a panic or propagated fault.
    let client = LastfmClient::with_base("http://127.0.0.1:9");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let err = rt
        .block_on(async { client.album_info(&creds(), "A", "B").await })
        .unwrap_err();
    assert!(matches!(err, ApiFailure::Transport(_)));
}
