use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use toptracks::config::{TimeRange, TrackSource};
use toptracks::api::token_from_params;
use toptracks::error::{Error, ErrorKind, Result};
use toptracks::management::{SessionManager, SessionState, TokenManager};
use toptracks::spotify::{Authenticator, TrackApi};
use toptracks::types::{AlbumRef, ArtistRef, ExternalUrls, Image, Token, TrackRecord};
use toptracks::view::{self, Screen};

/// Records every call and answers with queued results.
#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Result<Vec<TrackRecord>>>>,
}

impl FakeApi {
    fn answering(responses: Vec<Result<Vec<TrackRecord>>>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self) -> Result<Vec<TrackRecord>> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[async_trait]
impl TrackApi for FakeApi {
    async fn fetch_top_tracks(
        &self,
        token: &str,
        time_range: TimeRange,
        limit: u32,
    ) -> Result<Vec<TrackRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("top:{token}:{time_range}:{limit}"));
        self.next()
    }

    async fn fetch_album_tracks(&self, album_id: &str, token: &str) -> Result<Vec<TrackRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("album:{album_id}:{token}"));
        self.next()
    }
}

struct FakeAuth {
    outcome: Mutex<Option<Result<Token>>>,
}

impl FakeAuth {
    fn new(outcome: Result<Token>) -> Self {
        Self {
            outcome: Mutex::new(Some(outcome)),
        }
    }
}

#[async_trait]
impl Authenticator for FakeAuth {
    async fn authenticate(&self) -> Result<Token> {
        self.outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(Error::Auth("already used".into())))
    }
}

// Helper function to create a test track
fn create_test_track(name: &str) -> TrackRecord {
    TrackRecord {
        id: Some(format!("{}_id", name)),
        name: name.to_string(),
        artists: vec![ArtistRef {
            id: None,
            name: "Artist".to_string(),
        }],
        album: AlbumRef {
            id: None,
            name: "Album".to_string(),
            images: (0..3)
                .map(|i| Image {
                    url: format!("https://img/{}", i),
                    height: None,
                    width: None,
                })
                .collect(),
        },
        duration_ms: 200_000,
        external_urls: ExternalUrls {
            spotify: Some(format!("https://open.spotify.com/track/{}", name)),
        },
        preview_url: None,
    }
}

fn top_tracks() -> TrackSource {
    TrackSource::TopTracks {
        time_range: TimeRange::ShortTerm,
        limit: 10,
    }
}

fn names(state: &SessionState) -> Vec<String> {
    state.tracks().iter().map(|t| t.name.clone()).collect()
}

#[tokio::test]
async fn test_connect_fetches_once_and_renders_in_order() {
    let api = FakeApi::answering(vec![Ok(vec![
        create_test_track("one"),
        create_test_track("two"),
    ])]);
    let mut session = SessionManager::new(api, top_tracks());

    // token absent: connect prompt
    assert_eq!(
        view::render(session.state(), session.source()),
        Screen::Connect { notice: None }
    );

    let auth = FakeAuth::new(Ok(Token::issued_now("tok123", 3600)));
    let state = session.connect(&auth).await;
    assert!(state.is_ready());
    assert_eq!(state.token().unwrap().access_token(), "tok123");

    assert_eq!(session.api().calls(), vec!["top:tok123:short_term:10"]);

    match view::render(session.state(), session.source()) {
        Screen::TrackList { rows, notice, .. } => {
            assert_eq!(notice, None);
            let rows: Vec<_> = rows.iter().map(|r| (r.number, r.name.clone())).collect();
            assert_eq!(rows, vec![(1, "one".to_string()), (2, "two".to_string())]);
        }
        other => panic!("unexpected screen {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized_fetch_stays_authenticated_and_surfaces_error() {
    let api = FakeApi::answering(vec![Err(Error::Http { status: 401 })]);
    let mut session = SessionManager::new(api, top_tracks());

    let state = session
        .complete_authentication(Ok(Token::issued_now("tok123", 3600)))
        .await;

    assert!(matches!(state, SessionState::Authenticated { .. }));
    assert!(state.tracks().is_empty());
    assert_eq!(state.notice().unwrap().kind, ErrorKind::Http(401));
}

#[tokio::test]
async fn test_refresh_replaces_tracks_wholesale() {
    let api = FakeApi::answering(vec![
        Ok(vec![create_test_track("a"), create_test_track("b")]),
        Ok(vec![create_test_track("c")]),
    ]);
    let mut session = SessionManager::new(api, top_tracks());

    session
        .complete_authentication(Ok(Token::issued_now("tok", 3600)))
        .await;
    assert_eq!(names(session.state()), vec!["a", "b"]);

    let state = session.refresh().await;
    assert_eq!(names(state), vec!["c"]);
    assert_eq!(session.api().calls().len(), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_prior_list() {
    let api = FakeApi::answering(vec![
        Ok(vec![create_test_track("kept")]),
        Err(Error::Timeout),
    ]);
    let mut session = SessionManager::new(api, top_tracks());

    session
        .complete_authentication(Ok(Token::issued_now("tok", 3600)))
        .await;
    let state = session.refresh().await;

    assert!(state.is_ready());
    assert_eq!(names(state), vec!["kept"]);
    assert_eq!(state.notice().unwrap().kind, ErrorKind::Timeout);
}

#[tokio::test]
async fn test_failed_authentication_stays_on_connect_prompt() {
    let mut session = SessionManager::new(FakeApi::default(), top_tracks());
    let auth = FakeAuth::new(Err(Error::Auth("access_denied".into())));

    let state = session.connect(&auth).await;

    assert!(!state.is_authenticated());
    assert_eq!(state.notice().unwrap().kind, ErrorKind::Auth);
    assert!(session.api().calls().is_empty());
    assert!(matches!(
        view::render(session.state(), session.source()),
        Screen::Connect { notice: Some(_) }
    ));
}

#[tokio::test]
async fn test_expired_token_asks_for_new_sign_in_without_fetching() {
    let mut session = SessionManager::new(FakeApi::default(), top_tracks());
    let expired = Token {
        access_token: "old".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: 3600,
        obtained_at: 0,
    };

    let state = session.complete_authentication(Ok(expired)).await;

    assert!(matches!(state, SessionState::Unauthenticated { .. }));
    assert_eq!(state.notice().unwrap().kind, ErrorKind::Auth);
    assert!(session.api().calls().is_empty());
}

#[tokio::test]
async fn test_refresh_without_token_does_not_fetch() {
    let mut session = SessionManager::new(FakeApi::default(), top_tracks());

    let state = session.refresh().await;

    assert!(!state.is_authenticated());
    assert!(state.notice().is_some());
    assert!(session.api().calls().is_empty());
}

#[tokio::test]
async fn test_album_source_uses_album_endpoint() {
    let api = FakeApi::answering(vec![Ok(vec![create_test_track("x")])]);
    let source = TrackSource::Album {
        album_id: "4aawyAB9vmqN3uQ7FjRGTy".to_string(),
    };
    let mut session = SessionManager::new(api, source);

    session
        .complete_authentication(Ok(Token::issued_now("tok", 3600)))
        .await;

    assert_eq!(
        session.api().calls(),
        vec!["album:4aawyAB9vmqN3uQ7FjRGTy:tok"]
    );
}

#[tokio::test]
async fn test_reconnect_uses_new_token() {
    let api = FakeApi::answering(vec![
        Ok(vec![create_test_track("first")]),
        Ok(vec![create_test_track("second")]),
    ]);
    let mut session = SessionManager::new(api, top_tracks());

    session
        .complete_authentication(Ok(Token::issued_now("tok1", 3600)))
        .await;
    session
        .complete_authentication(Ok(Token::issued_now("tok2", 3600)))
        .await;

    assert_eq!(
        session.api().calls(),
        vec!["top:tok1:short_term:10", "top:tok2:short_term:10"]
    );
    assert_eq!(names(session.state()), vec!["second"]);
}

#[test]
fn test_tracks_loaded_is_ignored_without_token() {
    let state = SessionState::default().tracks_loaded(vec![create_test_track("late")]);
    assert!(!state.is_ready());
    assert!(state.tracks().is_empty());
}

#[tokio::test]
async fn test_huge_expiry_from_redirect_still_loads_tracks() {
    let api = FakeApi::answering(vec![Ok(vec![create_test_track("one")])]);
    let mut session = SessionManager::new(api, top_tracks());
    let params: HashMap<String, String> = [
        ("access_token", "tok123"),
        ("expires_in", "18446744073709551615"),
        ("state", "s1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let token = token_from_params(&params, "s1").unwrap();

    let state = session.complete_authentication(Ok(token)).await;

    assert!(state.is_ready());
    assert_eq!(names(state), vec!["one"]);
    assert_eq!(session.api().calls(), vec!["top:tok123:short_term:10"]);
}

#[test]
fn test_expiry_check_does_not_overflow() {
    let token = TokenManager::new(Token {
        access_token: "tok".to_string(),
        token_type: "Bearer".to_string(),
        expires_in: u64::MAX,
        obtained_at: 1_700_000_000,
    });

    assert!(!token.is_expired_at(1_700_000_000));
    assert!(!token.is_expired());
}
