use colored::Colorize;
use tabled::Table;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cli::{auth, open},
    config::Settings,
    error::Result,
    info,
    management::SessionManager,
    spotify::{ImplicitGrant, SpotifyClient, TrackApi},
    types::TrackTableRow,
    view::{self, Screen, Target, TrackViewModel},
    warning,
};

const HELP: &str = "Enter a track number to open it, 'p <n>' for its preview, \
'r' to refresh, 'c' to reconnect, 'q' to quit.";

/// A line typed at the track list prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Open(usize),
    Preview(usize),
    Refresh,
    Reconnect,
    Help,
    Quit,
}

/// Parses a prompt line. Track numbers are 1-based.
pub fn parse_input(line: &str) -> std::result::Result<Input, String> {
    let line = line.trim().to_lowercase();
    let mut parts = line.split_whitespace();

    let input = match (parts.next(), parts.next()) {
        (Some("q" | "quit" | "exit"), None) => Input::Quit,
        (Some("r" | "refresh"), None) => Input::Refresh,
        (Some("c" | "connect"), None) => Input::Reconnect,
        (Some("h" | "help" | "?"), None) | (None, _) => Input::Help,
        (Some("p" | "preview"), Some(n)) => Input::Preview(parse_number(n)?),
        (Some(n), None) => Input::Open(parse_number(n)?),
        _ => return Err(format!("Unknown command '{line}'")),
    };

    if parts.next().is_some() {
        return Err(format!("Unknown command '{line}'"));
    }
    Ok(input)
}

fn parse_number(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("'{value}' is not a track number")),
        Ok(n) => Ok(n),
    }
}

/// Signs in, shows the track list and, unless `once`, keeps prompting for
/// navigation until the user quits.
pub async fn tracks(settings: Settings, once: bool) -> Result<()> {
    let client = SpotifyClient::new(&settings)?;
    let authenticator = ImplicitGrant::new(&settings);
    let mut session = SessionManager::new(client, settings.source.clone());

    print_screen(&view::render(session.state(), session.source()));
    auth::connect(&mut session, &authenticator).await;
    let mut screen = current_screen(&session);
    print_screen(&screen);

    if once {
        return Ok(());
    }

    info!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_input(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => info!("{}", HELP),
            Ok(Input::Refresh) => {
                auth::refresh(&mut session).await;
                screen = current_screen(&session);
                print_screen(&screen);
            }
            Ok(Input::Reconnect) => {
                auth::connect(&mut session, &authenticator).await;
                screen = current_screen(&session);
                print_screen(&screen);
            }
            Ok(Input::Open(n)) => with_row(&screen, n, |row| open::open_track(row, Target::Page)),
            Ok(Input::Preview(n)) => {
                with_row(&screen, n, |row| open::open_track(row, Target::Preview))
            }
            Err(e) => warning!("{}", e),
        }
    }

    Ok(())
}

fn current_screen<A: TrackApi>(session: &SessionManager<A>) -> Screen {
    view::render(session.state(), session.source())
}

fn with_row(screen: &Screen, number: usize, f: impl FnOnce(&TrackViewModel)) {
    let Screen::TrackList { rows, .. } = screen else {
        warning!("No track list loaded. Press 'c' to connect with Spotify.");
        return;
    };

    match rows.iter().find(|r| r.number == number) {
        Some(row) => f(row),
        None => warning!("There is no track #{}.", number),
    }
}

/// Draws a [`Screen`] on stdout.
pub fn print_screen(screen: &Screen) {
    match screen {
        Screen::Connect { notice } => {
            if let Some(notice) = notice {
                warning!("{}", notice);
            }
            println!("{}", "CONNECT WITH SPOTIFY".green().bold());
        }
        Screen::Loading => info!("Loading tracks..."),
        Screen::TrackList {
            title,
            rows,
            notice,
        } => {
            println!("{}", title.as_str().bold());
            if !rows.is_empty() {
                let table_rows: Vec<TrackTableRow> = rows.iter().map(table_row).collect();
                println!("{}", Table::new(table_rows));
            }
            if let Some(notice) = notice {
                warning!("{}", notice);
            }
        }
    }
}

fn table_row(row: &TrackViewModel) -> TrackTableRow {
    TrackTableRow {
        number: row.number,
        name: row.name.clone(),
        artists: row.artists.clone(),
        album: row.album.clone(),
        duration: row.duration.clone(),
        preview: if row.preview_url.is_some() { "yes" } else { "-" }.to_string(),
    }
}
