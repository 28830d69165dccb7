//! # Scanner Error Types
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Scanner                            │
//! │                                                                         │
//! │  ConfigError ──────┐                                                    │
//! │  CatalogError ─────┼──► AppError ──► main() ──► message on stderr,     │
//! │  CoreError ────────┘                            exit code 1             │
//! │  (StartupUnavailable)                                                   │
//! │                                                                         │
//! │  Recoverable conditions never get here: bad item limits are re-asked,  │
//! │  unknown barcodes are shown to the shopper, a dead feed ends the       │
//! │  session normally.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use thiserror::Error;

use freshmart_catalog::CatalogError;
use freshmart_core::CoreError;

/// Configuration errors, reported before any session starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named config file could not be read.
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A setting has an unusable value.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Both a feed file and a feed command are configured.
    #[error("Configure either a feed path or a feed command, not both")]
    ConflictingFeeds,

    /// Neither a feed file nor a feed command is configured.
    #[error("No scanner feed configured (use --feed <path> or --feed-cmd <command>)")]
    MissingFeed,
}

/// Top-level error for the scanner application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type AppResult<T> = Result<T, AppError>;
