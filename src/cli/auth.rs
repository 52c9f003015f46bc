use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    info,
    management::{SessionManager, SessionState},
    spotify::{Authenticator, TrackApi},
    success, warning,
};

/// Signs in and loads the first track list, reporting progress on the console.
pub async fn connect<A: TrackApi>(
    session: &mut SessionManager<A>,
    authenticator: &dyn Authenticator,
) {
    info!("Connecting with Spotify, confirm access in your browser.");
    let state = match authenticator.authenticate().await {
        Ok(token) => {
            success!("Authentication successful!");
            let pb = spinner("Fetching tracks...");
            let state = session.complete_authentication(Ok(token)).await;
            pb.finish_and_clear();
            state
        }
        Err(e) => {
            warning!("Authentication failed: {}", e);
            session.complete_authentication(Err(e)).await
        }
    };
    report(state);
}

/// Fetches the track list again with the current token.
pub async fn refresh<A: TrackApi>(session: &mut SessionManager<A>) {
    let pb = spinner("Refreshing tracks...");
    let state = session.refresh().await;
    pb.finish_and_clear();
    report(state);
}

fn report(state: &SessionState) {
    if state.is_ready() && state.notice().is_none() {
        success!("Loaded {} tracks", state.tracks().len());
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
