//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that receives the
//! Spotify authorization redirect.
//!
//! ## Endpoints
//!
//! - [`callback`] - The redirect target. Serves a small page that forwards the
//!   URL fragment (where the implicit grant puts the token) to [`token`].
//! - [`token`] - Validates the `state` nonce, extracts the access token or the
//!   error and completes the pending grant.
//! - [`health`] - Reports status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use toptracks::api::{callback, health, token};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/token", get(token))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;
mod token;

pub use callback::callback;
pub use health::health;
pub use token::{DEFAULT_EXPIRES_IN, MAX_EXPIRES_IN, token, token_from_params};
