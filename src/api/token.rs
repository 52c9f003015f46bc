use std::collections::HashMap;

use axum::{Extension, extract::Query, response::Html};
use log::{debug, warn};

use crate::{
    error::{Error, Result},
    types::{SharedGrant, Token},
};

/// Spotify's lifetime for implicit grant tokens when `expires_in` is missing.
pub const DEFAULT_EXPIRES_IN: u64 = 3600;
/// Longest lifetime accepted from a redirect; anything above falls back to the default.
pub const MAX_EXPIRES_IN: u64 = 24 * 60 * 60;

/// Receives the parameters relayed by the callback page and completes the
/// pending grant with either a token or an authentication error.
pub async fn token(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<SharedGrant>,
) -> Html<&'static str> {
    let mut pending = shared_state.lock().await;
    let Some(sender) = pending.sender.take() else {
        return Html("<h4>No sign in is pending.</h4>");
    };

    let outcome = token_from_params(&params, &pending.state);
    let page = match &outcome {
        Ok(_) => Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
        Err(e) => {
            warn!("Authorization redirect rejected: {e}");
            Html("<h4>Login failed.</h4><p>Return to the terminal for details.</p>")
        }
    };

    if sender.send(outcome).is_err() {
        debug!("Nobody is waiting for the grant anymore");
    }
    page
}

/// Interprets the fragment parameters of an implicit grant redirect.
///
/// # Errors
///
/// Returns [`Error::Auth`] when Spotify reported an error, the `state` doesn't
/// match the one sent, or no access token is present.
pub fn token_from_params(params: &HashMap<String, String>, expected_state: &str) -> Result<Token> {
    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Err(Error::Auth("state mismatch in authorization redirect".into()));
    }

    if let Some(error) = params.get("error") {
        return Err(Error::Auth(
            params
                .get("error_description")
                .cloned()
                .unwrap_or_else(|| error.clone()),
        ));
    }

    let access_token = params
        .get("access_token")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Auth("no access token in authorization redirect".into()))?;

    let expires_in = params
        .get("expires_in")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| (1..=MAX_EXPIRES_IN).contains(secs))
        .unwrap_or(DEFAULT_EXPIRES_IN);

    let mut token = Token::issued_now(access_token.clone(), expires_in);
    if let Some(token_type) = params.get("token_type") {
        token.token_type = token_type.clone();
    }
    Ok(token)
}
