use rand::{Rng, distr::Alphanumeric};

use crate::{
    error::{Error, Result},
    types::ArtistRef,
};

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;

/// Length of the OAuth `state` nonce.
pub const STATE_LENGTH: usize = 32;

/// Formats a track duration as `M:SS`.
///
/// Minutes are whole minutes without padding; seconds are truncated, never
/// rounded, so the seconds part stays within `00..=59`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for negative input.
///
/// # Example
///
/// ```
/// assert_eq!(format_duration(61_000)?, "1:01");
/// ```
pub fn format_duration(millis: i64) -> Result<String> {
    if millis < 0 {
        return Err(Error::InvalidArgument(format!(
            "duration must not be negative, got {millis} ms"
        )));
    }

    let minutes = millis / MILLIS_PER_MINUTE;
    let seconds = (millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
    Ok(format!("{minutes}:{seconds:02}"))
}

/// Random alphanumeric nonce tying an authorization request to its redirect.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

pub fn join_artist_names(artists: &[ArtistRef]) -> String {
    artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
