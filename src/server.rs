use std::{future::Future, net::SocketAddr, str::FromStr};

use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{
    api,
    error::{Error, Result},
    types::SharedGrant,
};

/// Binds the callback server address.
///
/// # Errors
///
/// Returns [`Error::Config`] for an unparsable address and [`Error::Auth`]
/// when the port is taken, since sign in cannot proceed without it.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("failed to parse server address '{addr}': {e}")))?;

    TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Auth(format!("cannot listen on {addr} for the redirect: {e}")))
}

pub fn router(state: SharedGrant, callback_path: &str) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(callback_path, get(api::callback))
        .route("/token", get(api::token).layer(Extension(state)))
}

/// Serves the redirect endpoints until `shutdown` resolves.
pub async fn start_api_server<F>(
    listener: TcpListener,
    state: SharedGrant,
    callback_path: &str,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state, callback_path))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Network(e.to_string()))
}
