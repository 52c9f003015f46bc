use crate::{
    info,
    view::{Route, Target, TrackViewModel},
    warning,
};

/// Opens the page or preview of a track, the terminal's "song detail" screen.
pub fn open_track(row: &TrackViewModel, target: Target) {
    match row.route(target) {
        Some(route) => open_route(&route),
        None => warning!("'{}' has no preview available.", row.name),
    }
}

pub fn open_route(route: &Route) {
    let Route::SongDetail { url } = route;
    info!("Opening {}", url);
    if webbrowser::open(url).is_err() {
        warning!("Failed to open browser. Open the URL manually:\n{}", url);
    }
}
