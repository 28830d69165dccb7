//! # FreshMart Scanner
//!
//! Console application around the freshmart-core session loop.
//!
//! ## Module Organization
//! ```text
//! freshmart_scanner/
//! ├── lib.rs          ◄─── You are here (CLI, startup, logging)
//! ├── config.rs       ◄─── scanner.toml + FRESHMART_* + flags
//! ├── feed.rs         ◄─── LineFeed frame source, TextDecoder
//! ├── console.rs      ◄─── ConsolePresenter, quit key
//! ├── render.rs       ◄─── Screen text
//! └── error.rs        ◄─── ConfigError, AppError
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging (stderr, RUST_LOG, default warn)                 │
//! │  2. Load Configuration (defaults → file → env → flags), validate        │
//! │  3. Load Catalog (JSON file or embedded table)                          │
//! │  4. Open the feed (failure ends here, before any question)              │
//! │  5. Ask allergies and item limit (unless given as flags)                │
//! │  6. Run the session: scan loop, final bill                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod feed;
pub mod render;

use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use freshmart_core::setup::{ask_allergy_profile, ask_cart_capacity};
use freshmart_core::validation::parse_cart_capacity;
use freshmart_core::{
    open_source, parse_allergy_profile, Catalog, FrameSource, Presenter, SessionController,
    SessionSetup, SessionSummary, StartupPrompt,
};

use crate::config::{FeedSettings, ScannerConfig};
use crate::console::{ConsolePresenter, KeyboardQuit};
use crate::error::AppResult;
use crate::feed::{LineFeed, TextDecoder};
use crate::render::RenderStyle;

pub use crate::error::{AppError, ConfigError};

// =============================================================================
// Command Line
// =============================================================================

#[derive(Parser, Debug, Default)]
#[command(
    name = "freshmart-scanner",
    version,
    about = "FreshMart smart shopping assistant"
)]
pub struct Cli {
    /// Config file (default: platform config dir, scanner.toml)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Read decoded barcodes from this file or named pipe, one frame per line
    #[arg(long = "feed")]
    pub feed: Option<PathBuf>,

    /// Read decoded barcodes from this command's output, e.g. "zbarcam --raw".
    /// Split on whitespace; use `args` in the config file for quoted arguments
    #[arg(long = "feed-cmd")]
    pub feed_cmd: Option<String>,

    /// JSON catalog file (default: built-in FreshMart table)
    #[arg(long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Allergies, comma separated (skips the question)
    #[arg(short = 'a', long = "allergies")]
    pub allergies: Option<String>,

    /// Maximum number of items in the cart (skips the question)
    #[arg(short = 'l', long = "limit", value_parser = parse_limit)]
    pub limit: Option<usize>,

    /// Seconds before the same barcode counts as a new scan
    #[arg(long = "cooldown")]
    pub cooldown: Option<u64>,

    /// Don't clear the terminal between screens
    #[arg(long = "no-clear")]
    pub no_clear: bool,
}

fn parse_limit(text: &str) -> Result<usize, String> {
    parse_cart_capacity(text).map_err(|err| err.to_string())
}

impl Cli {
    /// Applies flags on top of file and environment settings.
    pub fn apply_to(&self, config: &mut ScannerConfig) {
        if self.feed.is_some() || self.feed_cmd.is_some() {
            config.feed = FeedSettings {
                path: self.feed.clone(),
                command: self.feed_cmd.clone(),
                args: Vec::new(),
            };
        }
        if let Some(path) = &self.catalog {
            config.catalog.path = Some(path.clone());
        }
        if let Some(secs) = self.cooldown {
            config.scanner.cooldown_secs = secs;
        }
        if self.no_clear {
            config.scanner.clear_screen = false;
        }
    }

    pub fn answers(&self) -> StartupAnswers {
        StartupAnswers {
            allergies: self.allergies.clone(),
            limit: self.limit,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Startup answers given up front; missing ones are asked interactively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupAnswers {
    pub allergies: Option<String>,
    pub limit: Option<usize>,
}

impl StartupAnswers {
    pub fn is_complete(&self) -> bool {
        self.allergies.is_some() && self.limit.is_some()
    }
}

fn resolve_setup<P>(answers: &StartupAnswers, prompt: &mut P) -> Option<SessionSetup>
where
    P: StartupPrompt + ?Sized,
{
    let profile = match &answers.allergies {
        Some(text) => parse_allergy_profile(text),
        None => ask_allergy_profile(prompt)?,
    };
    let capacity = match answers.limit {
        Some(limit) => limit,
        None => ask_cart_capacity(prompt)?,
    };
    Some(SessionSetup { profile, capacity })
}

/// Opens the feed, collects the startup answers and runs one session.
///
/// The feed is opened first, so an unavailable scanner is reported before
/// the shopper is asked anything. Returns `Ok(None)` when input ends before
/// setup is complete.
pub fn run_session<C, S, P>(
    catalog: &C,
    cooldown: Duration,
    answers: &StartupAnswers,
    source: &mut S,
    console: &mut P,
) -> AppResult<Option<SessionSummary>>
where
    C: Catalog + ?Sized,
    S: FrameSource<Frame = String>,
    P: Presenter<String> + StartupPrompt,
{
    open_source(source)?;

    if !answers.is_complete() {
        console.greet();
    }
    let Some(setup) = resolve_setup(answers, console) else {
        info!("Input closed before setup finished");
        source.close();
        return Ok(None);
    };

    let controller = SessionController::new(catalog, setup, cooldown)?;
    let summary = controller.drive(source, &TextDecoder, console)?;
    Ok(Some(summary))
}

/// Runs the scanner with real stdin, stdout and keyboard.
pub fn run(cli: Cli) -> AppResult<Option<SessionSummary>> {
    let mut config = ScannerConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let catalog = freshmart_catalog::load(config.catalog.path.as_deref())?;
    info!(products = catalog.len(), "Catalog ready");

    let mut feed = LineFeed::new(config.feed_spec()?);
    let mut console = ConsolePresenter::new(
        io::stdin().lock(),
        io::stdout(),
        KeyboardQuit::new(config.quit_key()),
        RenderStyle::from_config(&config),
    )
    .with_clear_screen(config.scanner.clear_screen);

    run_session(&catalog, config.cooldown(), &cli.answers(), &mut feed, &mut console)
}

// =============================================================================
// Logging
// =============================================================================

/// Initializes structured logging on stderr.
///
/// ## Log Levels
/// - Default: `warn`, so the shopper's screen stays clean
/// - `RUST_LOG=freshmart_core=debug` - session state transitions
/// - `RUST_LOG=info` - accepted, declined and unknown scans
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// =============================================================================
// Unit Tests
// =============================================================================
