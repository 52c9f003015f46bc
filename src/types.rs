use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tokio::sync::{Mutex, oneshot};

use crate::error::Result;

/// Bearer token handed out by the implicit grant.
///
/// Lives in memory only. `obtained_at` and `expires_in` are seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// Wraps a freshly issued access token, stamping it with the current time.
    pub fn issued_now(access_token: impl Into<String>, expires_in: u64) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            expires_in,
            obtained_at: Utc::now().timestamp().max(0) as u64,
        }
    }
}

/// An authorization request waiting for its redirect.
///
/// The sender is taken by the first redirect that reaches the callback server,
/// so later hits cannot overwrite the outcome.
#[derive(Debug)]
pub struct PendingGrant {
    pub state: String,
    pub sender: Option<oneshot::Sender<Result<Token>>>,
}

pub type SharedGrant = Arc<Mutex<PendingGrant>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

/// Album as embedded in a track. Images are ordered widest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A track as returned by the top tracks endpoint, and the shape album
/// tracks are normalized into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: Option<String>,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
    pub duration_ms: i64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub preview_url: Option<String>,
}

/// A track inside an album response; it carries no album of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedTrack {
    pub id: Option<String>,
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub duration_ms: i64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub preview_url: Option<String>,
}

impl SimplifiedTrack {
    pub fn into_record(self, album: &AlbumRef) -> TrackRecord {
        TrackRecord {
            id: self.id,
            name: self.name,
            artists: self.artists,
            album: album.clone(),
            duration_ms: self.duration_ms,
            external_urls: self.external_urls,
            preview_url: self.preview_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub next: Option<String>,
}

pub type TopTracksResponse = Paging<TrackRecord>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumResponse {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    pub tracks: Paging<SimplifiedTrack>,
}

impl AlbumResponse {
    pub fn album_ref(&self) -> AlbumRef {
        AlbumRef {
            id: self.id.clone(),
            name: self.name.clone(),
            images: self.images.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub number: usize,
    #[tabled(rename = "Title")]
    pub name: String,
    #[tabled(rename = "Artists")]
    pub artists: String,
    #[tabled(rename = "Album")]
    pub album: String,
    #[tabled(rename = "Time")]
    pub duration: String,
    #[tabled(rename = "Preview")]
    pub preview: String,
}
