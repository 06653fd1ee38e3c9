//!
//! src/config.rs  Andrew Belles  Oct 16th, 2026
//!
//! Collects environment (and .env) settings into the configuration
//! structs consumed by the clients, the sequencer and the logger
//!
//!

use std::{path::PathBuf, str::FromStr, time};
use url::Url;
use crate::errors::MixError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 20000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 5000;
pub const HTTP_POOL_MAX_IDLE: usize = 4;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

pub const RETRY_MAX_ATTEMPTS: u8 = 4;
pub const RETRY_BASE_BACKOFF: u64 = 250;
pub const RETRY_JITTER: bool = true;
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Constants for the sequencer
pub const BPM_TOLERANCE: f64 = 0.06;
pub const MIN_TREND_LEN: usize = 3;
pub const VIBE_DANCEABILITY_TOL: f64 = 0.2;
pub const VIBE_ENERGY_TOL: f64 = 0.2;
pub const SEARCH_PAGE_SIZE: u32 = 5;
pub const MIX_TITLE_WORDS: usize = 2;

pub const TUNEBAT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:131.0) Gecko/20100101 Firefox/131.0";

/// Source of raw settings, std::env in production, a map in tests
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Returns the value of the first key that is set and not blank
fn first_set(lookup: Lookup, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| lookup(*k))
        .find(|v| !v.trim().is_empty())
}

/// Wrapper over lookup to return an invalid enviroment var error
fn env_check(lookup: Lookup, keys: &[&str]) -> Result<String, MixError> {
    first_set(lookup, keys)
        .ok_or_else(|| MixError::Config(format!("{} was not set", keys[0])))
}

/// Parsed override or default when unset/unparsable
fn env_or<T: FromStr>(lookup: Lookup, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

fn ensure_trailing_slash(url: &mut Url) {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_string();
        path.push('/');
        url.set_path(&path);
    }
}

fn parse_url(raw: &str, key: &str, expected_host: &str) -> Result<Url, MixError> {
    let url = Url::parse(raw)
        .map_err(|e| MixError::Config(format!("{key} invalid {e}")))?;
    ensure_https(&url).map_err(MixError::Config)?;
    ensure_host(&url, expected_host).map_err(MixError::Config)?;
    Ok(url)
}

/// Configuration that Spotify expects when hitting endpoints
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: Url,
    pub api_base: Url,
}

fn build_spotify(lookup: Lookup) -> Result<SpotifyConfig, MixError> {
    let client_id     = env_check(lookup, &["SPOTIFY_CLIENT_ID", "SPOTIPY_CLIENT_ID"])?;
    let client_secret = env_check(
        lookup, &["SPOTIFY_CLIENT_SECRET", "SPOTIPY_CLIENT_SECRET"]
    )?;

    let token_url = lookup("SPOTIFY_TOKEN_URL")
        .unwrap_or_else(|| "https://accounts.spotify.com/api/token".to_string());
    let api_base  = lookup("SPOTIFY_API_BASE")
        .unwrap_or_else(|| "https://api.spotify.com/v1/".to_string());

    let token_url = parse_url(&token_url, "SPOTIFY_TOKEN_URL", "accounts.spotify.com")?;
    let mut api_base = parse_url(&api_base, "SPOTIFY_API_BASE", "api.spotify.com")?;
    ensure_trailing_slash(&mut api_base);

    Ok( SpotifyConfig { client_id, client_secret, token_url, api_base } )
}

///
/// Configuration for the tunebat key/bpm endpoint
///
#[derive(Debug, Clone)]
pub struct TunebatConfig {
    pub api_base: Url,    // https://api.tunebat.com/api/
    pub origin: String,   // sent as Referer and Origin
    pub user_agent: String,
}

fn build_tunebat(lookup: Lookup) -> Result<TunebatConfig, MixError> {
    let api_base = lookup("TUNEBAT_API_BASE")
        .unwrap_or_else(|| "https://api.tunebat.com/api/".to_string());
    let mut api_base = parse_url(&api_base, "TUNEBAT_API_BASE", "api.tunebat.com")?;
    ensure_trailing_slash(&mut api_base);

    let user_agent = first_set(lookup, &["TUNEBAT_USER_AGENT"])
        .unwrap_or_else(|| TUNEBAT_USER_AGENT.to_string());

    Ok( TunebatConfig {
        api_base,
        origin: "https://tunebat.com".to_string(),
        user_agent
    })
}

///
/// Configuration for Http timeouts, retries, etc.
///
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u8,
    pub base_backoff: time::Duration,
    pub jitter: bool,
    pub retryable_statuses: Vec<u16>
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_MAX_ATTEMPTS,
            base_backoff: time::Duration::from_millis(RETRY_BASE_BACKOFF),
            jitter: RETRY_JITTER,
            retryable_statuses: RETRYABLE_STATUSES.to_vec()
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
    pub retry: RetryConfig
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
            retry: RetryConfig::default()
        }
    }
}

fn build_http(lookup: Lookup) -> HttpConfig {
    let defaults = HttpConfig::default();
    let retry = RetryConfig {
        max_attempts: env_or(lookup, "HTTP_RETRY_MAX_ATTEMPTS", RETRY_MAX_ATTEMPTS).max(1),
        base_backoff: time::Duration::from_millis(
            env_or(lookup, "HTTP_RETRY_BACKOFF_MS", RETRY_BASE_BACKOFF)
        ),
        ..defaults.retry
    };
    HttpConfig {
        timeout: time::Duration::from_millis(env_or(lookup, "HTTP_TIMEOUT_MS", HTTP_TIMEOUT)),
        retry,
        ..defaults
    }
}

///
/// Configuration for how a mix is sequenced, filtered and exported
///
#[derive(Debug, Clone)]
pub struct MixConfig {
    pub bpm_tolerance: f64,          // relative, 0.06 = 6%
    pub min_trend_len: usize,        // shorter trends are discarded
    pub vibe_filter: bool,           // pre-filter on danceability/energy
    pub danceability_tolerance: f64,
    pub energy_tolerance: f64,
    pub page_size: u32,              // search results per page
    pub title_words: usize,
    pub output_dir: PathBuf
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            bpm_tolerance: BPM_TOLERANCE,
            min_trend_len: MIN_TREND_LEN,
            vibe_filter: true,
            danceability_tolerance: VIBE_DANCEABILITY_TOL,
            energy_tolerance: VIBE_ENERGY_TOL,
            page_size: SEARCH_PAGE_SIZE,
            title_words: MIX_TITLE_WORDS,
            output_dir: PathBuf::from(".")
        }
    }
}

fn build_mix(lookup: Lookup) -> Result<MixConfig, MixError> {
    let defaults = MixConfig::default();

    let bpm_tolerance = env_or(lookup, "MIX_BPM_TOLERANCE", defaults.bpm_tolerance);
    if !(bpm_tolerance > 0.0 && bpm_tolerance < 1.0) {
        return Err(MixError::Config(
            format!("MIX_BPM_TOLERANCE must be in (0, 1), got {bpm_tolerance}")
        ));
    }

    let vibe_filter = match lookup("MIX_VIBE_FILTER").as_deref().map(str::trim) {
        Some("0") | Some("false") | Some("off") => false,
        _ => defaults.vibe_filter
    };

    let output_dir = first_set(lookup, &["MIX_OUTPUT_DIR"])
        .map(PathBuf::from)
        .unwrap_or(defaults.output_dir);

    Ok( MixConfig {
        bpm_tolerance,
        min_trend_len: env_or(lookup, "MIX_MIN_TREND_LEN", defaults.min_trend_len).max(1),
        vibe_filter,
        danceability_tolerance: env_or(
            lookup, "MIX_DANCEABILITY_TOL", defaults.danceability_tolerance
        ),
        energy_tolerance: env_or(lookup, "MIX_ENERGY_TOL", defaults.energy_tolerance),
        page_size: env_or(lookup, "MIX_PAGE_SIZE", defaults.page_size).clamp(1, 50),
        title_words: env_or(lookup, "MIX_TITLE_WORDS", defaults.title_words).clamp(1, 4),
        output_dir
    })
}

///
/// Configuration for Logger
///

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub include_file_line: bool,
    pub include_target: bool
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "warn,mixrr=info".to_string(),
            format: LogFormat::Pretty,
            with_ansi: true,
            include_file_line: false,
            include_target: true
        }
    }
}

fn build_logging(lookup: Lookup) -> LoggingConfig {
    let defaults = LoggingConfig::default();
    let format = match lookup("MIXRR_LOG_FORMAT").as_deref().map(str::trim) {
        Some("json") => LogFormat::Json,
        _ => defaults.format
    };
    LoggingConfig {
        format,
        include_file_line: format == LogFormat::Json,
        ..defaults
    }
}

///
/// AppConfig which holds everything the clients and the session need
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub tunebat: TunebatConfig,
    pub http: HttpConfig,
    pub mix: MixConfig,
    pub logging: LoggingConfig
}

pub fn build_config(lookup: Lookup) -> Result<AppConfig, MixError> {
    let spotify = build_spotify(lookup)?;
    let tunebat = build_tunebat(lookup)?;
    let http    = build_http(lookup);
    let mix     = build_mix(lookup)?;
    let logging = build_logging(lookup);

    Ok( AppConfig { spotify, tunebat, http, mix, logging } )
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, MixError> {
    dotenvy::dotenv().ok();
    build_config(&process_env)
}
