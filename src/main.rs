use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use log::LevelFilter;

use toptracks::{
    cli,
    config::{self, Settings, SourceOverrides, TimeRange},
    error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default())
        .placeholder(AnsiColor::BrightBlue.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Suppress all output except warnings and errors
    #[clap(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable verbose logging (-vv for trace)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Connect with Spotify and list tracks
    Tracks(TracksOptions),

    /// Generate shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// List the tracks of this album instead of your top tracks
    #[clap(long)]
    album: Option<String>,

    /// Top tracks window: short_term, medium_term or long_term
    #[clap(long, value_parser = parse_time_range)]
    time_range: Option<TimeRange>,

    /// Number of top tracks to fetch (1-50)
    #[clap(long, value_parser = parse_limit)]
    limit: Option<u32>,

    /// Print the list and exit instead of prompting
    #[clap(long)]
    once: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_time_range(value: &str) -> Result<TimeRange, String> {
    value.parse().map_err(|e: toptracks::error::Error| e.to_string())
}

fn parse_limit(value: &str) -> Result<u32, String> {
    config::parse_limit(value).map_err(|e| e.to_string())
}

/// Initializes the logger facade.
///
/// `-q`/`-v` win over `RUST_LOG`, which wins over the default of `warn`.
fn init_logger(cli: &Cli) {
    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );

    if cli.quiet || cli.verbose > 0 {
        let level = match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module("toptracks", level);
    }

    logger.init();
}

impl TracksOptions {
    fn overrides(&self) -> SourceOverrides {
        SourceOverrides {
            album: self.album.clone(),
            time_range: self.time_range,
            limit: self.limit,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(&cli);

    match cli.command {
        Command::Tracks(opts) => {
            if let Err(e) = config::load_env().await {
                error!("Cannot load environment. Err: {}", e);
            }

            let settings = match Settings::from_env_with(&opts.overrides()) {
                Ok(settings) => settings,
                Err(e) => error!(
                    "Cannot load configuration. Err: {}\nEdit {} to fix it.",
                    e,
                    config::env_path().display()
                ),
            };

            if let Err(e) = cli::tracks(settings, opts.once).await {
                error!("{}", e);
            }
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
