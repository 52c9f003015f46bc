//! Configuration management for toptracks.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Everything the application needs to talk to Spotify
//! (client id, redirect URI, scopes, endpoints) and to decide what to show (top
//! tracks or an album) is read here and collected into [`Settings`].
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use crate::error::{Error, Result};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SCOPE: &str = "user-top-read";
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 50;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 120;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `toptracks` directory under the platform-specific local data
/// directory if it doesn't exist and loads `toptracks/.env` from it:
/// - Linux: `~/.local/share/toptracks/.env`
/// - macOS: `~/Library/Application Support/toptracks/.env`
/// - Windows: `%LOCALAPPDATA%/toptracks/.env`
///
/// A missing `.env` file is fine; the process environment is used as is.
///
/// # Errors
///
/// Returns [`Error::Config`] if the directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<()> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| Error::Config(e.to_string()))?;
        log::debug!("Loaded environment from {}", path.display());
    }

    Ok(())
}

/// Location of the `.env` file read by [`load_env`].
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("toptracks/.env");
    path
}

/// Which track list the session fetches once authenticated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TrackSource {
    /// The current user's top tracks.
    TopTracks { time_range: TimeRange, limit: u32 },
    /// The track list of a single album.
    Album { album_id: String },
}

impl Default for TrackSource {
    fn default() -> Self {
        TrackSource::TopTracks {
            time_range: TimeRange::default(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Affinity window for the top tracks endpoint.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimeRange {
    /// Roughly the last four weeks.
    ShortTerm,
    /// Roughly the last six months.
    #[default]
    MediumTerm,
    /// Several years of data.
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "short_term" | "short" => Ok(TimeRange::ShortTerm),
            "medium_term" | "medium" => Ok(TimeRange::MediumTerm),
            "long_term" | "long" => Ok(TimeRange::LongTerm),
            other => Err(Error::Config(format!(
                "unknown time range '{other}', expected short_term, medium_term or long_term"
            ))),
        }
    }
}

/// Validates a page size for the top tracks endpoint.
pub fn parse_limit(value: &str) -> Result<u32> {
    let limit = value
        .trim()
        .parse::<u32>()
        .map_err(|e| Error::Config(format!("invalid limit '{value}': {e}")))?;
    if limit == 0 || limit > MAX_LIMIT {
        return Err(Error::Config(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        )));
    }
    Ok(limit)
}

/// Typed view of every setting the application reads.
#[derive(Clone, Debug)]
pub struct Settings {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub api_url: String,
    pub server_addr: String,
    pub source: TrackSource,
    pub http_timeout: Duration,
    pub auth_timeout: Duration,
}

impl Settings {
    /// Collects the settings from the current process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the client id is missing, the album source
    /// is selected without an album id, or a numeric value doesn't parse.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&SourceOverrides::default())
    }

    /// Like [`Settings::from_env`], with the track source resolved through
    /// `overrides` first, so an id given on the command line doesn't need a
    /// matching `TOPTRACKS_ALBUM_ID`.
    pub fn from_env_with(overrides: &SourceOverrides) -> Result<Self> {
        Ok(Self {
            client_id: spotify_client_id()?,
            redirect_uri: spotify_redirect_uri(),
            scope: spotify_scope(),
            auth_url: spotify_apiauth_url(),
            api_url: spotify_apiurl(),
            server_addr: server_addr(),
            source: overrides.resolve(env_lookup)?,
            http_timeout: Duration::from_secs(seconds_var(
                "TOPTRACKS_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            auth_timeout: Duration::from_secs(seconds_var(
                "TOPTRACKS_AUTH_TIMEOUT_SECS",
                DEFAULT_AUTH_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Command line choices layered over the configured track source.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SourceOverrides {
    pub album: Option<String>,
    pub time_range: Option<TimeRange>,
    pub limit: Option<u32>,
}

impl SourceOverrides {
    /// Resolves the track source, reading configuration through `lookup`.
    ///
    /// An album id wins outright. A time range or limit selects top tracks
    /// even when the configuration names an album.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty album id, an unknown
    /// `TOPTRACKS_SOURCE`, or a configured value that doesn't parse.
    pub fn resolve<F>(&self, lookup: F) -> Result<TrackSource>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(album_id) = &self.album {
            let album_id = album_id.trim();
            if album_id.is_empty() {
                return Err(Error::Config("album id must not be empty".into()));
            }
            return Ok(TrackSource::Album {
                album_id: album_id.to_string(),
            });
        }

        let wants_top = self.time_range.is_some() || self.limit.is_some();
        let source = match source_kind(&lookup)? {
            SourceKind::Album if !wants_top => album_source(&lookup)?,
            _ => top_tracks_source(&lookup)?,
        };

        Ok(match source {
            TrackSource::TopTracks { time_range, limit } => TrackSource::TopTracks {
                time_range: self.time_range.unwrap_or(time_range),
                limit: self.limit.unwrap_or(limit),
            },
            album => album,
        })
    }
}

/// Returns the Spotify API client ID for authentication.
///
/// Reads `SPOTIFY_API_AUTH_CLIENT_ID`, the id obtained when registering the
/// application on Spotify's developer dashboard.
pub fn spotify_client_id() -> Result<String> {
    non_empty_var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok_or_else(|| Error::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".into()))
}

/// Returns the OAuth redirect URI (`SPOTIFY_API_REDIRECT_URI`).
///
/// It must match the redirect URI registered for the application and point
/// at the local callback server, e.g. `http://127.0.0.1:8888/callback`.
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Returns the space separated scope list (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

/// Returns the authorization endpoint (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Web API base URL (`SPOTIFY_API_URL`) without a trailing slash.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Returns the bind address of the local callback server (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Resolves `TOPTRACKS_SOURCE` and its companion variables into a [`TrackSource`].
pub fn track_source() -> Result<TrackSource> {
    track_source_with(env_lookup)
}

/// [`track_source`] reading variables through `lookup` instead of the process
/// environment.
pub fn track_source_with<F>(lookup: F) -> Result<TrackSource>
where
    F: Fn(&str) -> Option<String>,
{
    match source_kind(&lookup)? {
        SourceKind::Top => top_tracks_source(&lookup),
        SourceKind::Album => album_source(&lookup),
    }
}

enum SourceKind {
    Top,
    Album,
}

fn source_kind<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<SourceKind> {
    let value = non_empty(lookup, "TOPTRACKS_SOURCE").unwrap_or_else(|| "top".to_string());
    match value.to_lowercase().as_str() {
        "top" => Ok(SourceKind::Top),
        "album" => Ok(SourceKind::Album),
        other => Err(Error::Config(format!(
            "unknown TOPTRACKS_SOURCE '{other}', expected 'top' or 'album'"
        ))),
    }
}

fn top_tracks_source<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<TrackSource> {
    let time_range = match non_empty(lookup, "TOPTRACKS_TIME_RANGE") {
        Some(value) => value.parse()?,
        None => TimeRange::default(),
    };
    let limit = match non_empty(lookup, "TOPTRACKS_LIMIT") {
        Some(value) => parse_limit(&value)?,
        None => DEFAULT_LIMIT,
    };
    Ok(TrackSource::TopTracks { time_range, limit })
}

fn album_source<F: Fn(&str) -> Option<String>>(lookup: &F) -> Result<TrackSource> {
    let album_id = non_empty(lookup, "TOPTRACKS_ALBUM_ID").ok_or_else(|| {
        Error::Config("TOPTRACKS_ALBUM_ID must be set when TOPTRACKS_SOURCE=album".into())
    })?;
    Ok(TrackSource::Album { album_id })
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn non_empty<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty_var(key: &str) -> Option<String> {
    non_empty(&env_lookup, key)
}

fn var_or(key: &str, default: &str) -> String {
    non_empty_var(key).unwrap_or_else(|| default.to_string())
}

fn seconds_var(key: &str, default: u64) -> Result<u64> {
    match non_empty_var(key) {
        Some(value) => {
            let secs = value
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("invalid {key} '{value}': {e}")))?;
            if secs == 0 {
                return Err(Error::Config(format!("{key} must be greater than zero")));
            }
            Ok(secs)
        }
        None => Ok(default),
    }
}
