use super::{ApiFailure, LastfmApi};
use crate::models::Credentials;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;

pub const DEFAULT_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// How a request authenticates against the API.
pub enum RequestAuth<'a> {
    /// Unsigned GET; metadata lookups need only the api key.
    ReadOnly { api_key: &'a str },
    /// Signed POST; write calls need the shared secret and a session key.
    Signed {
        api_key: &'a str,
        api_secret: &'a str,
        session_key: &'a str,
    },
}

/// Generate a Last.fm API signature: sort parameters by name in byte
/// order, concatenate each as `namevalue` with no separator, append the
/// shared secret, MD5 the UTF-8 bytes, encode as lowercase hex.
///
/// The `format` and `callback` output markers never participate in the
/// signature; the caller adds `format=json` only after signing.
pub fn generate_api_signature(params: &BTreeMap<String, String>, secret: &str) -> String {
    let mut material = String::new();
    for (name, value) in params {
        if name == "format" || name == "callback" {
            continue;
        }
        material.push_str(name);
        material.push_str(value);
    }
    material.push_str(secret);
    format!("{:x}", md5::compute(material.as_bytes()))
}

/// Last.fm client backed by the Last.fm web service API.
/// The endpoint may be overridden by the LASTFM_API_BASE env var or the
/// `with_base` constructor (useful for tests).
pub struct LastfmClient {
    client: Client,
    base: String,
}

impl Default for LastfmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LastfmClient {
    pub fn new() -> Self {
        Self::with_base(Self::api_base())
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base: base.into(),
        }
    }

    fn api_base() -> String {
        env::var("LASTFM_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into())
    }

    fn name(&self) -> &str {
        "lastfm"
    }

    /// Issue one call to the API. `params` must contain a `method` entry;
    /// api_key, sk, api_sig and format are filled in here. A read-only
    /// auth produces a GET with query parameters, a signed auth a POST
    /// with form parameters.
    ///
    /// Any HTTP error status, service-level error body, malformed body or
    /// transport fault is returned as an ApiFailure value, never raised.
    pub async fn request(
        &self,
        mut params: BTreeMap<String, String>,
        auth: RequestAuth<'_>,
    ) -> Result<Value, ApiFailure> {
        let signed = match auth {
            RequestAuth::ReadOnly { api_key } => {
                params.insert("api_key".into(), api_key.into());
                false
            }
            RequestAuth::Signed {
                api_key,
                api_secret,
                session_key,
            } => {
                params.insert("api_key".into(), api_key.into());
                params.insert("sk".into(), session_key.into());
                let api_sig = generate_api_signature(&params, api_secret);
                params.insert("api_sig".into(), api_sig);
                true
            }
        };
        // Added after signing; the format marker must not be signed.
        params.insert("format".into(), "json".into());

        let method = params.get("method").cloned().unwrap_or_default();
        debug!(
            "Last.fm request: method={} signed={} params={}",
            method,
            signed,
            params.len()
        );

        let builder = if signed {
            self.client.post(&self.base).form(&params)
        } else {
            self.client.get(&self.base).query(&params)
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiFailure::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            ApiFailure::Malformed(format!("{} (body: {:.200})", e, text))
        })?;

        if let Some(code) = body.get("error") {
            let code = code.as_i64().unwrap_or(-1);
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return Err(ApiFailure::Service { code, message });
        }

        Ok(body)
    }
}

#[async_trait]
impl LastfmApi for LastfmClient {
    fn name(&self) -> &str {
        LastfmClient::name(self)
    }

    async fn album_info(
        &self,
        creds: &Credentials,
        artist: &str,
        album: &str,
    ) -> Result<Value, ApiFailure> {
        let mut params = BTreeMap::new();
        params.insert("method".to_string(), "album.getinfo".to_string());
        params.insert("artist".to_string(), artist.to_string());
        params.insert("album".to_string(), album.to_string());
        // Service convention: personalizes the result, needs no auth.
        params.insert("username".to_string(), creds.username.clone());
        self.request(
            params,
            RequestAuth::ReadOnly {
                api_key: &creds.api_key,
            },
        )
        .await
    }

    async fn scrobble(
        &self,
        creds: &Credentials,
        params: Vec<(String, String)>,
    ) -> Result<Value, ApiFailure> {
        let mut map: BTreeMap<String, String> = params.into_iter().collect();
        map.insert("method".to_string(), "track.scrobble".to_string());
        self.request(
            map,
            RequestAuth::Signed {
                api_key: &creds.api_key,
                api_secret: &creds.api_secret,
                session_key: &creds.session_key,
            },
        )
        .await
    }
}
