use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use reqwest::Url;
use tokio::sync::{Mutex, oneshot};

use crate::{
    config::Settings,
    error::{Error, Result},
    server,
    types::{PendingGrant, Token},
    info, utils, warning,
};

/// Something that can obtain an access token for the current user.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<Token>;
}

type Opener = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// How long open connections may keep the callback server alive after sign in.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// OAuth 2.0 implicit grant against the Spotify accounts service.
///
/// No PKCE and no client secret: the token comes back in the redirect's URL
/// fragment, which the local callback server relays to itself.
///
/// 1. Generate a random `state` nonce
/// 2. Start the callback server on the configured address
/// 3. Open the authorization URL in the user's browser
/// 4. Wait for the redirect, bounded by the configured timeout
/// 5. Shut the server down
pub struct ImplicitGrant {
    client_id: String,
    redirect_uri: String,
    scope: String,
    auth_url: String,
    server_addr: String,
    timeout: Duration,
    opener: Opener,
}

impl ImplicitGrant {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client_id: settings.client_id.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            scope: settings.scope.clone(),
            auth_url: settings.auth_url.clone(),
            server_addr: settings.server_addr.clone(),
            timeout: settings.auth_timeout,
            opener: Arc::new(|url: &str| webbrowser::open(url).is_ok()),
        }
    }

    /// Replaces the browser launcher, e.g. to drive the redirect from tests.
    /// The opener returns whether it managed to open the URL.
    pub fn with_opener<F>(mut self, opener: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.opener = Arc::new(opener);
        self
    }

    /// Builds the authorization URL for a given `state` nonce.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configured authorization URL is invalid.
    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "token"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorization URL: {e}")))?;

        Ok(url.into())
    }

    /// Path component of the redirect URI, served by the callback server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the redirect URI doesn't parse or collides
    /// with one of the server's own routes.
    pub fn callback_path(&self) -> Result<String> {
        let url = Url::parse(&self.redirect_uri)
            .map_err(|e| Error::Config(format!("invalid redirect URI: {e}")))?;

        match url.path() {
            "" | "/" => Ok("/callback".to_string()),
            "/token" | "/health" => Err(Error::Config(format!(
                "redirect URI path '{}' is reserved",
                url.path()
            ))),
            path => Ok(path.to_string()),
        }
    }
}

#[async_trait]
impl Authenticator for ImplicitGrant {
    async fn authenticate(&self) -> Result<Token> {
        let state = utils::generate_state();
        let auth_url = self.authorize_url(&state)?;
        let callback_path = self.callback_path()?;

        let (tx, rx) = oneshot::channel();
        let shared_state = Arc::new(Mutex::new(PendingGrant {
            state,
            sender: Some(tx),
        }));

        let listener = server::bind(&self.server_addr).await?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_state = Arc::clone(&shared_state);
        let mut server_handle = tokio::spawn(async move {
            server::start_api_server(listener, server_state, &callback_path, async move {
                let _ = shutdown_rx.await;
            })
            .await
        });
        debug!("Callback server listening on {}", self.server_addr);

        if !(self.opener)(&auth_url) {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            );
        }
        info!(
            "Waiting up to {}s for the authorization redirect...",
            self.timeout.as_secs()
        );

        let outcome = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::Auth("authorization was abandoned".into())),
            Err(_) => Err(Error::Timeout),
        };

        let _ = shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut server_handle).await {
            Ok(Ok(Err(e))) => debug!("Callback server stopped with an error: {e}"),
            Ok(Err(e)) => debug!("Callback server task failed: {e}"),
            Ok(Ok(Ok(()))) => {}
            Err(_) => {
                // A browser holding its connection open.
                server_handle.abort();
            }
        }

        outcome
    }
}
