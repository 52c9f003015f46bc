use std::mem;

use log::{debug, warn};

use crate::{
    config::TrackSource,
    error::{Error, ErrorKind, ErrorNotice, Result},
    management::TokenManager,
    spotify::{Authenticator, TrackApi},
    types::{Token, TrackRecord},
};

/// Where the session currently stands.
///
/// Every transition consumes the old state and returns the new one, so a
/// superseded token or track list can't be read after it's been replaced.
/// `notice` carries the last failure the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No token yet, or the previous one expired.
    Unauthenticated { notice: Option<ErrorNotice> },
    /// A token is held but no track list has been loaded with it.
    Authenticated {
        token: TokenManager,
        notice: Option<ErrorNotice>,
    },
    /// A token and the most recently fetched track list.
    Ready {
        token: TokenManager,
        tracks: Vec<TrackRecord>,
        notice: Option<ErrorNotice>,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Unauthenticated { notice: None }
    }
}

impl SessionState {
    /// A new token arrived. A loaded list stays on screen until the next
    /// fetch replaces it.
    pub fn authenticate(self, token: Token) -> Self {
        let token = TokenManager::new(token);
        match self {
            SessionState::Ready { tracks, .. } => SessionState::Ready {
                token,
                tracks,
                notice: None,
            },
            _ => SessionState::Authenticated {
                token,
                notice: None,
            },
        }
    }

    /// Sign in failed. An existing session keeps its token.
    pub fn auth_failed(self, err: &Error) -> Self {
        self.with_notice(Some(err.into()))
    }

    /// Replaces the track list wholesale. Ignored without a token.
    pub fn tracks_loaded(self, tracks: Vec<TrackRecord>) -> Self {
        match self {
            SessionState::Authenticated { token, .. } | SessionState::Ready { token, .. } => {
                SessionState::Ready {
                    token,
                    tracks,
                    notice: None,
                }
            }
            unauthenticated => unauthenticated,
        }
    }

    /// A fetch failed. The previous list, if any, is kept.
    pub fn fetch_failed(self, err: &Error) -> Self {
        self.with_notice(Some(err.into()))
    }

    /// Drops the token because it can no longer be used.
    pub fn expire(self) -> Self {
        SessionState::Unauthenticated {
            notice: Some(ErrorNotice::new(
                ErrorKind::Auth,
                "Your Spotify session expired. Connect again.",
            )),
        }
    }

    pub fn with_notice(self, notice: Option<ErrorNotice>) -> Self {
        match self {
            SessionState::Unauthenticated { .. } => SessionState::Unauthenticated { notice },
            SessionState::Authenticated { token, .. } => {
                SessionState::Authenticated { token, notice }
            }
            SessionState::Ready { token, tracks, .. } => SessionState::Ready {
                token,
                tracks,
                notice,
            },
        }
    }

    pub fn token(&self) -> Option<&TokenManager> {
        match self {
            SessionState::Unauthenticated { .. } => None,
            SessionState::Authenticated { token, .. } | SessionState::Ready { token, .. } => {
                Some(token)
            }
        }
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        match self {
            SessionState::Ready { tracks, .. } => tracks,
            _ => &[],
        }
    }

    pub fn notice(&self) -> Option<&ErrorNotice> {
        match self {
            SessionState::Unauthenticated { notice }
            | SessionState::Authenticated { notice, .. }
            | SessionState::Ready { notice, .. } => notice.as_ref(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready { .. })
    }

    fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated { .. } => "unauthenticated",
            SessionState::Authenticated { .. } => "authenticated",
            SessionState::Ready { .. } => "ready",
        }
    }
}

/// Drives [`SessionState`] through sign in and track fetching.
///
/// All transitions take `&mut self`, so a fetch always completes (or fails)
/// before another token can be applied; requests never overlap.
pub struct SessionManager<A> {
    api: A,
    source: TrackSource,
    state: SessionState,
}

impl<A: TrackApi> SessionManager<A> {
    pub fn new(api: A, source: TrackSource) -> Self {
        Self {
            api,
            source,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn source(&self) -> &TrackSource {
        &self.source
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Runs the authenticator and applies its outcome.
    pub async fn connect(&mut self, authenticator: &dyn Authenticator) -> &SessionState {
        let outcome = authenticator.authenticate().await;
        self.complete_authentication(outcome).await
    }

    /// Applies the outcome of an authentication attempt. A token triggers the
    /// track fetch right away.
    pub async fn complete_authentication(&mut self, outcome: Result<Token>) -> &SessionState {
        match outcome {
            Ok(token) => {
                self.transition(|s| s.authenticate(token));
                self.fetch().await;
            }
            Err(e) => {
                warn!("Authentication failed: {e}");
                self.transition(|s| s.auth_failed(&e));
            }
        }
        &self.state
    }

    /// Fetches the track list again with the current token.
    pub async fn refresh(&mut self) -> &SessionState {
        if self.state.is_authenticated() {
            self.fetch().await;
        } else {
            self.transition(|s| {
                s.with_notice(Some(ErrorNotice::new(
                    ErrorKind::Auth,
                    "Connect with Spotify before refreshing.",
                )))
            });
        }
        &self.state
    }

    async fn fetch(&mut self) {
        let Some(token) = self.state.token() else {
            return;
        };

        if token.is_expired() {
            debug!("Token expired, asking for a new sign in");
            self.transition(SessionState::expire);
            return;
        }

        let access_token = token.access_token().to_string();
        let result = match &self.source {
            TrackSource::TopTracks { time_range, limit } => {
                self.api
                    .fetch_top_tracks(&access_token, *time_range, *limit)
                    .await
            }
            TrackSource::Album { album_id } => {
                self.api.fetch_album_tracks(album_id, &access_token).await
            }
        };

        match result {
            Ok(tracks) => self.transition(|s| s.tracks_loaded(tracks)),
            Err(e) => {
                warn!("Fetching tracks failed: {e}");
                self.transition(|s| s.fetch_failed(&e));
            }
        }
    }

    fn transition(&mut self, f: impl FnOnce(SessionState) -> SessionState) {
        let from = self.state.name();
        self.state = f(mem::take(&mut self.state));
        debug!("Session {from} -> {}", self.state.name());
    }
}
