//! Display projection of the session.
//!
//! Nothing here renders anything: [`render`] turns the current
//! [`SessionState`] into a [`Screen`] and the front end draws it. Track rows are
//! rebuilt from the track list on every call.

use log::warn;

use crate::{
    config::TrackSource,
    error::{Error, ErrorKind, ErrorNotice, Result},
    management::SessionState,
    types::TrackRecord,
    utils,
};

/// Number of album images a track must carry; Spotify sends 640, 300 and 64px.
pub const MIN_ALBUM_IMAGES: usize = 3;
/// Index of the 64px thumbnail shown next to each track.
pub const THUMBNAIL_INDEX: usize = 2;

pub const TOP_TRACKS_TITLE: &str = "My Top Tracks";

/// Display-ready fields of one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackViewModel {
    /// 1-based position in the fetched list.
    pub number: usize,
    pub image_url: String,
    pub name: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
    pub url: String,
    pub preview_url: Option<String>,
}

/// Which page of a track to navigate to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
    /// The track's public Spotify page.
    Page,
    /// The 30 second preview clip.
    Preview,
}

/// A navigation request for the front end's "open this URL" screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SongDetail { url: String },
}

impl TrackViewModel {
    /// Route for `target`, or `None` when the track has no preview.
    pub fn route(&self, target: Target) -> Option<Route> {
        let url = match target {
            Target::Page => Some(self.url.clone()),
            Target::Preview => self.preview_url.clone(),
        }?;
        Some(Route::SongDetail { url })
    }
}

/// Projects a track into its display fields.
///
/// `index` is the 0-based position in the list.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the album has fewer than [`MIN_ALBUM_IMAGES`]
/// images or the track has no Spotify URL, and [`Error::InvalidArgument`] for
/// a negative duration.
pub fn map_track(index: usize, track: &TrackRecord) -> Result<TrackViewModel> {
    let images = &track.album.images;
    if images.len() < MIN_ALBUM_IMAGES {
        return Err(Error::Decode(format!(
            "track '{}' has {} album images, expected at least {MIN_ALBUM_IMAGES}",
            track.name,
            images.len()
        )));
    }

    let url = track.external_urls.spotify.clone().ok_or_else(|| {
        Error::Decode(format!("track '{}' has no Spotify URL", track.name))
    })?;

    Ok(TrackViewModel {
        number: index + 1,
        image_url: images[THUMBNAIL_INDEX].url.clone(),
        name: track.name.clone(),
        artists: utils::join_artist_names(&track.artists),
        album: track.album.name.clone(),
        duration: utils::format_duration(track.duration_ms)?,
        url,
        preview_url: track.preview_url.clone(),
    })
}

/// Maps every track, keeping the rows that succeed in their original order.
/// Returns the rows and the number of tracks that couldn't be mapped.
pub fn map_tracks(tracks: &[TrackRecord]) -> (Vec<TrackViewModel>, usize) {
    let mut rows = Vec::with_capacity(tracks.len());
    let mut skipped = 0;

    for (index, track) in tracks.iter().enumerate() {
        match map_track(index, track) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("Skipping track #{}: {e}", index + 1);
                skipped += 1;
            }
        }
    }

    (rows, skipped)
}

/// What the front end should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// The "connect with Spotify" prompt, with the reason we're back here.
    Connect { notice: Option<String> },
    /// Signed in, tracks on their way.
    Loading,
    /// The track list. `notice` explains an empty list or skipped rows.
    TrackList {
        title: String,
        rows: Vec<TrackViewModel>,
        notice: Option<String>,
    },
}

pub fn title_for(source: &TrackSource, tracks: &[TrackRecord]) -> String {
    match source {
        TrackSource::TopTracks { .. } => TOP_TRACKS_TITLE.to_string(),
        TrackSource::Album { .. } => tracks
            .first()
            .map(|t| t.album.name.clone())
            .unwrap_or_else(|| "Album Tracks".to_string()),
    }
}

/// Projects the session into a [`Screen`].
pub fn render(state: &SessionState, source: &TrackSource) -> Screen {
    match state {
        SessionState::Unauthenticated { notice } => Screen::Connect {
            notice: notice.as_ref().map(ErrorNotice::to_string),
        },
        SessionState::Authenticated { notice: None, .. } => Screen::Loading,
        SessionState::Authenticated {
            notice: Some(notice),
            ..
        } => Screen::TrackList {
            title: title_for(source, &[]),
            rows: Vec::new(),
            notice: Some(describe(notice, "Could not load tracks")),
        },
        SessionState::Ready { tracks, notice, .. } => {
            let (rows, skipped) = map_tracks(tracks);

            let mut messages = Vec::new();
            if let Some(notice) = notice {
                messages.push(describe(notice, "Could not refresh tracks"));
            }
            if skipped > 0 {
                messages.push(format!("{skipped} track(s) could not be displayed."));
            }
            if tracks.is_empty() && notice.is_none() {
                messages.push("No tracks to show.".to_string());
            }

            Screen::TrackList {
                title: title_for(source, tracks),
                rows,
                notice: (!messages.is_empty()).then(|| messages.join(" ")),
            }
        }
    }
}

/// Prefixes a notice shown next to the track list. Sign in failures are
/// reported as such, anything else as a failed fetch.
fn describe(notice: &ErrorNotice, fetch_failure: &str) -> String {
    match notice.kind {
        ErrorKind::Auth => format!("Could not reconnect: {notice}"),
        _ => format!("{fetch_failure}: {notice}"),
    }
}
