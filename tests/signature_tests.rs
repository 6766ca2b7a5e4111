use rfid_lastfm_scrobbler::api::lastfm::generate_api_signature;
use std::collections::BTreeMap;

fn params(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn signature_matches_known_vector() {
    let p = params(&[
        ("method", "album.getinfo"),
        ("artist", "Radiohead"),
        ("album", "OK Computer"),
        ("api_key", "abc123"),
        ("sk", "sess456"),
    ]);
    assert_eq!(
        generate_api_signature(&p, "topsecret"),
        "754ce53a0435b52d9cc0360e8eab576a"
    );
}

#[test]
fn signature_is_deterministic_and_insertion_order_independent() {
    let a = params(&[
        ("api_key", "key"),
        ("method", "auth.getSession"),
        ("token", "tok"),
    ]);
    let b = params(&[
        ("token", "tok"),
        ("method", "auth.getSession"),
        ("api_key", "key"),
    ]);
    let sig = generate_api_signature(&a, "secret");
    assert_eq!(sig, generate_api_signature(&a, "secret"));
    assert_eq!(sig, generate_api_signature(&b, "secret"));
    assert_eq!(sig, "04e870be4bb79756721b7bc1937fe83d");
}

#[test]
fn format_and_callback_markers_are_excluded() {
    let mut p = params(&[
        ("method", "album.getinfo"),
        ("artist", "Radiohead"),
        ("album", "OK Computer"),
        ("api_key", "abc123"),
        ("sk", "sess456"),
    ]);
    let without_markers = generate_api_signature(&p, "topsecret");
    p.insert("format".to_string(), "json".to_string());
    p.insert("callback".to_string(), "cb".to_string());
    assert_eq!(generate_api_signature(&p, "topsecret"), without_markers);
}
