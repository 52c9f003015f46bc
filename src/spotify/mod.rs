//! # Spotify Integration Module
//!
//! The two collaborators the application needs from Spotify, each behind a
//! trait so the session logic can be exercised without a network:
//!
//! ```text
//! Session (management)
//!     ├── Authenticator  ── auth::ImplicitGrant  ── accounts.spotify.com
//!     └── TrackApi       ── tracks::SpotifyClient ── api.spotify.com/v1
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the OAuth 2.0 implicit grant. The user authorizes the
//! application in the browser, Spotify redirects to the local callback server
//! with the token in the URL fragment, and the token is handed back to the
//! caller. Tokens are never persisted or refreshed; an expired token means
//! signing in again.
//!
//! ## Track Retrieval
//!
//! [`tracks`] covers two read endpoints:
//! - `GET /me/top/tracks` - the user's top tracks
//! - `GET /albums/{id}` - an album together with its track list
//!
//! Album tracks come without an album object, so they are normalized into the
//! same [`TrackRecord`](crate::types::TrackRecord) shape as top tracks.
//!
//! ## Error Types
//!
//! Every call returns [`crate::error::Result`]. Non-2xx answers become
//! [`Error::Http`](crate::error::Error::Http), unparsable bodies
//! [`Error::Decode`](crate::error::Error::Decode), expired deadlines
//! [`Error::Timeout`](crate::error::Error::Timeout). Nothing is retried.

pub mod auth;
pub mod tracks;

pub use auth::{Authenticator, ImplicitGrant};
pub use tracks::{SpotifyClient, TrackApi};
