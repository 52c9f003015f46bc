//! # CLI Module
//!
//! The terminal front end. It draws the [`Screen`](crate::view::Screen)
//! projection of the session and turns typed commands into navigation:
//!
//! ```text
//! CLI Layer (prompt, tables, browser)
//!     ↓
//! View (Screen, TrackViewModel, Route)
//!     ↓
//! Management (SessionManager)
//!     ↓
//! Spotify Integration (ImplicitGrant, SpotifyClient)
//! ```
//!
//! ## Commands
//!
//! - [`tracks`] - Connects, loads the configured track list and prompts for
//!   track numbers to open in the browser.
//!
//! ## Usage
//!
//! ```bash
//! toptracks tracks                         # your top tracks
//! toptracks tracks --time-range short_term # the last four weeks
//! toptracks tracks --album 4aawyAB9vmqN3uQ7FjRGTy
//! ```

mod auth;
mod open;
mod tracks;

pub use auth::{connect, refresh};
pub use open::{open_route, open_track};
pub use tracks::{Input, parse_input, print_screen, tracks};
