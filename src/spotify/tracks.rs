use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    config::{Settings, TimeRange},
    error::{Error, Result},
    types::{AlbumResponse, TopTracksResponse, TrackRecord},
};

/// Read access to the two track lists the application can show.
///
/// Implementations issue exactly one request per call. There is no retry and
/// no backoff: failures go straight back to the caller, which decides whether
/// to retry, reconnect or show the error.
#[async_trait]
pub trait TrackApi: Send + Sync {
    /// Returns the current user's top tracks, in the order Spotify ranks them.
    async fn fetch_top_tracks(
        &self,
        token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<TrackRecord>>;

    /// Returns the tracks of `album_id` in disc/track order, each carrying
    /// the album it belongs to.
    async fn fetch_album_tracks(&self, album_id: &str, token: &str) -> Result<Vec<TrackRecord>>;
}

/// [`TrackApi`] backed by the Spotify Web API.
#[derive(Clone, Debug)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
}

impl SpotifyClient {
    /// Builds a client using the configured base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] if the underlying HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self::with_client(http, settings.api_url.clone()))
    }

    pub fn with_client(http: Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<T> {
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        let body = check_status(response)?.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!("Could not decode response from {url}: {e}");
            Error::Decode(e.to_string())
        })
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!("{} answered with {}", response.url(), status);
        Err(Error::Http {
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl TrackApi for SpotifyClient {
    async fn fetch_top_tracks(
        &self,
        token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<TrackRecord>> {
        let url = format!("{uri}/me/top/tracks", uri = self.api_url);
        let query = [
            ("time_range", time_range.to_string()),
            ("limit", limit.to_string()),
        ];

        let page: TopTracksResponse = self.get_json(&url, &query, token).await?;
        debug!("Fetched {} top tracks", page.items.len());
        Ok(page.items)
    }

    async fn fetch_album_tracks(&self, album_id: &str, token: &str) -> Result<Vec<TrackRecord>> {
        let album_id = album_id.trim();
        if album_id.is_empty() {
            return Err(Error::InvalidArgument("album id must not be empty".into()));
        }
        if !album_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidArgument(format!(
                "'{album_id}' is not a Spotify album id"
            )));
        }

        // The album object embeds the first page of its tracks together with
        // the name and images the simplified tracks lack.
        let url = format!("{uri}/albums/{id}", uri = self.api_url, id = album_id);
        let album: AlbumResponse = self.get_json(&url, &[], token).await?;

        let album_ref = album.album_ref();
        let tracks: Vec<TrackRecord> = album
            .tracks
            .items
            .into_iter()
            .map(|t| t.into_record(&album_ref))
            .collect();

        debug!("Fetched {} tracks of album '{}'", tracks.len(), album_ref.name);
        Ok(tracks)
    }
}
