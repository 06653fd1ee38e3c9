//!
//! src/fetch.rs  Andrew Belles  Oct 16th, 2026
//!
//! Defines the clients for track search (Spotify) and key/bpm lookup
//! (Tunebat), retries with backoff, and the traits the session and the
//! picker are written against
//!

use std::time::Duration;

use async_trait::async_trait;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use reqwest::{Client, header, redirect, RequestBuilder};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{HttpConfig, RetryConfig, SpotifyConfig, TunebatConfig};
use crate::errors::MixError;
use crate::types::{SearchPage, TrackId, TrackRecord, TrackStub};

/// Paged free-text track search
#[async_trait]
pub trait TrackSearch {
    async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchPage, MixError>;
}

/// Key/bpm for a track plus its related tracks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDetails {
    pub seed: TrackRecord,
    pub related: Option<Vec<TrackRecord>>
}

/// Metadata lookup. None means the source is unavailable for this id after
/// its own retries; callers do not retry.
#[async_trait]
pub trait MetadataSource {
    async fn track_details(&self, id: &TrackId) -> Option<TrackDetails>;
}

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

fn client_with_headers(http: &HttpConfig, headers: header::HeaderMap) ->
    Result<Client, MixError> {
    client_helper(http)
        .default_headers(headers)
        .build()
        .map_err(|e| MixError::Http(format!("build client: {e}")))
}

fn header_value(raw: &str) -> Result<header::HeaderValue, MixError> {
    header::HeaderValue::from_str(raw)
        .map_err(|e| MixError::Config(format!("invalid header value {raw:?}: {e}")))
}

/// Exponential backoff, doubled per attempt, optional 50-200ms jitter
fn generate_backoff(base: Duration, attempt: u8, jitter: bool, rng: &mut SmallRng) -> Duration {
    let exp = base.saturating_mul(1_u32 << attempt.min(6));
    if jitter {
        exp + Duration::from_millis(rng.gen_range(50..=200))
    } else {
        exp
    }
}

/// Sends `request`, retrying network errors and retryable statuses until
/// `max_attempts` sends have been made
async fn http_with_retry(
    request: RequestBuilder,
    retry: &RetryConfig
) -> Result<serde_json::Value, MixError> {
    let mut rng = SmallRng::from_entropy();
    let mut attempt: u8 = 0;
    loop {
        attempt += 1;
        let response = request.try_clone()
            .ok_or_else(|| MixError::Http("non-cloneable request".to_string()))?
            .send()
            .await;
        match response {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return Ok(resp.json::<serde_json::Value>().await?);
                }
                let retryable = retry.retryable_statuses.contains(&status.as_u16());
                if !retryable || attempt >= retry.max_attempts {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(MixError::Http(format!("status {status}: {body}")));
                }
                let backoff = generate_backoff(retry.base_backoff, attempt - 1, retry.jitter, &mut rng);
                warn!(status = %status, attempt, backoff_ms = backoff.as_millis() as u64, "http.retry");
                sleep(backoff).await;
            },
            Err(e) => {
                if attempt >= retry.max_attempts {
                    return Err(e.into());
                }
                let backoff = generate_backoff(retry.base_backoff, attempt - 1, retry.jitter, &mut rng);
                warn!(error = %e, attempt, backoff_ms = backoff.as_millis() as u64, "http.retry.error");
                sleep(backoff).await;
            }
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>
}

#[derive(Deserialize, Default)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<TrackStub>,
    #[serde(default)]
    total: u32
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: SearchTracks
}

/// Parses the body of GET /v1/search?type=track
pub fn parse_search_response(value: serde_json::Value) -> Result<SearchPage, MixError> {
    let parsed: SearchResponse = serde_json::from_value(value)?;
    Ok( SearchPage { items: parsed.tracks.items, total: parsed.tracks.total } )
}

#[derive(Clone, Debug)]
pub struct SpotifyClient {
    pub http: Client,
    pub cfg: SpotifyConfig,
    pub retry: RetryConfig
}

impl SpotifyClient {
    pub fn new(http_config: &HttpConfig, cfg: &SpotifyConfig) -> Result<Self, MixError> {
        let mut h = header::HeaderMap::new();
        h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let http = client_with_headers(http_config, h)?;
        Ok( Self {
            http,
            cfg: cfg.clone(),
            retry: http_config.retry.clone()
        })
    }

    pub fn token_request(&self) -> RequestBuilder {
        self.http
            .post(self.cfg.token_url.clone())
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .form(&[("grant_type", "client_credentials")])
    }

    /// GET /v1/search?type=track&q=...&limit=&offset=
    pub fn search(&self, query: &str, limit: u32, offset: u32, bearer: &str) ->
        Result<RequestBuilder, MixError> {
        let url = self.cfg.api_base.join("search")
            .map_err(|e| MixError::Config(format!("search url: {e}")))?;
        Ok( self.http.get(url).bearer_auth(bearer).query(&[
            ("type", "track"),
            ("q", query),
            ("limit", &limit.to_string()),
            ("offset", &offset.to_string())
        ]) )
    }

    /// Client credentials flow, returns a search handle owning the bearer
    pub async fn authorize(self) -> Result<SpotifySearch, MixError> {
        let value = http_with_retry(self.token_request(), &self.retry).await?;
        let token: TokenResponse = serde_json::from_value(value)?;
        let bearer = token.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| MixError::NotFound("access_token in token response".to_string()))?;
        info!("spotify.token.ok");
        Ok( SpotifySearch { client: self, bearer } )
    }
}

/// Authorized Spotify search, owned by the caller for the whole session
#[derive(Clone, Debug)]
pub struct SpotifySearch {
    client: SpotifyClient,
    bearer: String
}

#[async_trait]
impl TrackSearch for SpotifySearch {
    async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchPage, MixError> {
        let request = self.client.search(query, limit, offset, &self.bearer)?;
        let value = http_with_retry(request, &self.client.retry).await?;
        let page = parse_search_response(value)?;
        debug!(query, offset, items = page.items.len(), total = page.total, "spotify.search");
        Ok(page)
    }
}

#[derive(Deserialize)]
struct TunebatResponse {
    data: Option<TrackRecord>
}

/// Parses the body of GET /api/tracks?trackId=..., None when `data` is absent
pub fn parse_tunebat_response(value: serde_json::Value) -> Result<Option<TrackDetails>, MixError> {
    let parsed: TunebatResponse = serde_json::from_value(value)?;
    Ok( parsed.data.map(|mut seed| {
        let related = seed.related.take();
        TrackDetails { seed, related }
    }) )
}

#[derive(Clone, Debug)]
pub struct TunebatClient {
    pub http: Client,
    pub cfg: TunebatConfig,
    pub retry: RetryConfig
}

impl TunebatClient {
    pub fn new(http_config: &HttpConfig, cfg: &TunebatConfig) -> Result<Self, MixError> {
        let mut h = header::HeaderMap::new();
        h.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/plain, */*")
        );
        h.insert(header::REFERER, header_value(&cfg.origin)?);
        h.insert(header::ORIGIN, header_value(&cfg.origin)?);

        let http = client_helper(http_config)
            .default_headers(h)
            .user_agent(cfg.user_agent.as_str())
            .build()
            .map_err(|e| MixError::Http(format!("build client: {e}")))?;

        Ok( Self { http, cfg: cfg.clone(), retry: http_config.retry.clone() } )
    }

    /// GET /api/tracks?trackId={id}
    pub fn track(&self, track_id: &str) -> Result<RequestBuilder, MixError> {
        let url = self.cfg.api_base.join("tracks")
            .map_err(|e| MixError::Config(format!("tunebat url: {e}")))?;
        Ok( self.http.get(url).query(&[("trackId", track_id)]) )
    }

    async fn fetch(&self, id: &TrackId) -> Result<Option<TrackDetails>, MixError> {
        let request = self.track(id.as_str())?;
        let value = http_with_retry(request, &self.retry).await?;
        parse_tunebat_response(value)
    }
}

#[async_trait]
impl MetadataSource for TunebatClient {
    async fn track_details(&self, id: &TrackId) -> Option<TrackDetails> {
        match self.fetch(id).await {
            Ok(Some(details)) => {
                debug!(
                    track = %id,
                    related = details.related.as_ref().map_or(0, Vec::len),
                    "tunebat.track"
                );
                Some(details)
            },
            Ok(None) => {
                warn!(track = %id, "tunebat.track.empty");
                None
            },
            Err(e) => {
                warn!(track = %id, error = %e, "tunebat.track.unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    fn live() -> bool {
        std::env::var("LIVE_HTTP").ok().as_deref() == Some("1")
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let mut rng = SmallRng::seed_from_u64(7);
        let base = Duration::from_millis(250);
        assert_eq!(generate_backoff(base, 0, false, &mut rng), Duration::from_millis(250));
        assert_eq!(generate_backoff(base, 1, false, &mut rng), Duration::from_millis(500));
        assert_eq!(generate_backoff(base, 3, false, &mut rng), Duration::from_millis(2000));
        // capped at 2^6
        assert_eq!(generate_backoff(base, 12, false, &mut rng), Duration::from_millis(16000));

        let jittered = generate_backoff(base, 1, true, &mut rng);
        assert!(jittered >= Duration::from_millis(550) && jittered <= Duration::from_millis(700));
    }

    #[test]
    fn parses_search_page() {
        let body = serde_json::json!({
            "tracks": {
                "items": [
                    { "id": "a", "name": "One", "artists": [{ "name": "X" }] },
                    { "id": "b", "name": "Two", "artists": [] }
                ],
                "total": 42
            }
        });
        let page = parse_search_response(body).unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].artist_names(), "X");
    }

    #[test]
    fn missing_tracks_object_is_an_empty_page() {
        let page = parse_search_response(serde_json::json!({})).unwrap();
        assert_eq!(page, SearchPage::default());
    }

    #[test]
    fn parses_tunebat_track_and_splits_related() {
        let body = serde_json::json!({
            "data": {
                "id": "seed", "n": "Seed", "as": ["S"], "c": "8A", "k": "A Minor", "b": 124,
                "r": [
                    { "id": "r1", "n": "R1", "as": ["X"], "c": "9A", "b": 125 },
                    { "id": "r2", "n": "R2", "as": ["Y"], "c": null, "b": 90 }
                ]
            }
        });
        let details = parse_tunebat_response(body).unwrap().unwrap();
        assert_eq!(details.seed.camelot.as_deref(), Some("8A"));
        assert!(details.seed.related.is_none());
        let related = details.related.unwrap();
        assert_eq!(related.len(), 2);
        assert_eq!(related[1].camelot, None);
    }

    #[test]
    fn tunebat_without_data_is_none() {
        assert_eq!(parse_tunebat_response(serde_json::json!({ "data": null })).unwrap(), None);
    }

    const TRACK_BODY: &str = r#"{"data":{"id":"seed","c":"8A","b":124,"r":[]}}"#;

    /// Answers request n with `statuses[n]` (the last one repeats) on
    /// 127.0.0.1, one connection per request. Returns the api base and a
    /// count of requests answered.
    async fn scripted_tunebat(statuses: Vec<u16>) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let status = statuses[n.min(statuses.len() - 1)];

                // GET has no body, stop at the end of the headers
                let mut buf = vec![0_u8; 8192];
                let mut read = 0;
                while read < buf.len() {
                    match stream.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(k) => read += k
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let body = if status == 200 { TRACK_BODY } else { "{}" };
                let reply = format!(
                    "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (Url::parse(&format!("http://{addr}/api/")).unwrap(), hits)
    }

    fn local_tunebat(api_base: Url) -> TunebatClient {
        let retry = RetryConfig {
            max_attempts: 4,
            base_backoff: Duration::from_millis(1),
            jitter: false,
            ..RetryConfig::default()
        };
        let cfg = TunebatConfig {
            api_base,
            origin: "https://tunebat.com".to_string(),
            user_agent: "mixrr-test".to_string()
        };
        let http = Client::builder().no_proxy().build().unwrap();
        TunebatClient { http, cfg, retry }
    }

    #[tokio::test]
    async fn tunebat_recovers_after_retryable_statuses() {
        let (base, hits) = scripted_tunebat(vec![503, 503, 200]).await;
        let details = local_tunebat(base).track_details(&TrackId("seed".into())).await;

        assert_eq!(details.unwrap().seed.camelot.as_deref(), Some("8A"));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn tunebat_is_unavailable_after_max_attempts() {
        let (base, hits) = scripted_tunebat(vec![503]).await;
        let details = local_tunebat(base).track_details(&TrackId("seed".into())).await;

        assert!(details.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn tunebat_does_not_retry_client_errors() {
        let (base, hits) = scripted_tunebat(vec![404, 200]).await;
        let details = local_tunebat(base).track_details(&TrackId("seed".into())).await;

        assert!(details.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn spotify_search_testbench() -> Result<(), MixError> {
        dotenvy::dotenv().ok();
        if !live() {
            eprintln!("Set LIVE_HTTP=1 to run");
            return Ok(())
        }

        let cfgs = config::load_config()?;
        let search = SpotifyClient::new(&cfgs.http, &cfgs.spotify)?.authorize().await?;
        let page = search.search("Breathe Deeper Tame Impala", 5, 0).await?;
        assert!(!page.items.is_empty());
        println!("page: {page:#?}");
        Ok(())
    }

    #[tokio::test]
    async fn tunebat_track_testbench() -> Result<(), MixError> {
        dotenvy::dotenv().ok();
        if !live() {
            eprintln!("Set LIVE_HTTP=1 to run");
            return Ok(())
        }

        let cfgs = config::load_config()?;
        let tunebat = TunebatClient::new(&cfgs.http, &cfgs.tunebat)?;

        // Breathe Deeper -  Tame Impala, Lil Yatchy
        let details = tunebat.track_details(&TrackId("6GtOsEzNUhJghrIf6UTbRV".into())).await;
        println!("details: {details:#?}");
        Ok(())
    }
}
