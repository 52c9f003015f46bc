//! Spotify Top Tracks Client Library
//!
//! Signs a user in to Spotify with the OAuth implicit grant, fetches their top
//! tracks (or an album's track list) and projects them into display rows for a
//! front end to draw.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local authorization redirect server
//! - `cli` - Terminal front end: screens, prompt and browser navigation
//! - `config` - Configuration management and environment variables
//! - `error` - Error kinds shared by every module
//! - `management` - Session state and token lifetime
//! - `server` - Local HTTP server for the OAuth redirect
//! - `spotify` - Authentication and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Duration formatting and other helpers
//! - `view` - Track view models and the screen projection
//!
//! # Example
//!
//! ```
//! use toptracks::{config, management::SessionManager, spotify::{ImplicitGrant, SpotifyClient}};
//!
//! #[tokio::main]
//! async fn main() -> toptracks::error::Result<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env()?;
//!     let mut session = SessionManager::new(SpotifyClient::new(&settings)?, settings.source.clone());
//!     session.connect(&ImplicitGrant::new(&settings)).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod view;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Connecting with Spotify...");
/// info!("Opening {}", url);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication successful!");
/// success!("Loaded {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Cannot load configuration. Err: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser. Open the URL manually:\n{}", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
