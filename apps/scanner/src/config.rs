//! # Scanner Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --feed /tmp/freshmart.scan --cooldown 4                            │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     FRESHMART_FEED_CMD="zbarcam --raw /dev/video0"                     │
//! │     FRESHMART_CURRENCY=Rs.                                             │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/freshmart/scanner.toml (Linux)                           │
//! │     ~/Library/Application Support/com.freshmart.freshmart/...          │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     FreshMart, ₹, 4 s cooldown, quit key 'q', embedded catalog         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "FreshMart"
//! currency_symbol = "₹"
//!
//! [scanner]
//! cooldown_secs = 4
//! quit_key = "q"
//! clear_screen = true
//!
//! [catalog]
//! path = "/etc/freshmart/catalog.json"   # embedded table when absent
//!
//! [feed]
//! path = "/tmp/freshmart.scan"           # or:
//! # command = "zbarcam --raw /dev/video0"
//! ```
//!
//! `command` is split on whitespace, with no shell quoting. For arguments
//! that contain spaces, give the program alone in `command` and list the
//! arguments in `args`:
//!
//! ```toml
//! [feed]
//! command = "/opt/zbar tools/zbarcam"
//! args = ["--raw", "/dev/v4l/by-id/usb-Cam 2-video-index0"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use freshmart_core::DEFAULT_SCAN_COOLDOWN_SECS;

use crate::error::ConfigError;

// =============================================================================
// Sections
// =============================================================================

/// Store identity shown on every screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "FreshMart".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// Scan loop behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// Seconds the same barcode is ignored after being accepted as new.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Key that ends the session, polled once per frame.
    #[serde(default = "default_quit_key")]
    pub quit_key: String,

    /// Clear the terminal before each cart and product screen.
    #[serde(default = "default_true")]
    pub clear_screen: bool,
}

fn default_cooldown_secs() -> u64 {
    DEFAULT_SCAN_COOLDOWN_SECS
}

fn default_quit_key() -> String {
    "q".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            cooldown_secs: default_cooldown_secs(),
            quit_key: default_quit_key(),
            clear_screen: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// JSON catalog file. The embedded table is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Where decoded barcodes come from. Exactly one must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSettings {
    /// File or named pipe with one decoded frame per line.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Command whose stdout is the feed, e.g. `zbarcam --raw /dev/video0`.
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed verbatim; when set, `command` is the program only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// A validated feed choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSpec {
    File(PathBuf),
    Command { program: String, args: Vec<String> },
}

impl FeedSpec {
    /// Splits `line` on whitespace into program and arguments.
    pub fn command_line(line: &str) -> Self {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        FeedSpec::Command {
            program,
            args: parts.collect(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub feed: FeedSettings,
}

impl ScannerConfig {
    /// Loads defaults, then the config file, then `FRESHMART_*` variables.
    ///
    /// An explicit `config_path` must exist; the platform default is
    /// skipped silently when absent. Call [`validate`](Self::validate)
    /// after applying command-line flags.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses one TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading scanner config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `FRESHMART_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("FRESHMART_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(symbol) = lookup("FRESHMART_CURRENCY") {
            self.store.currency_symbol = symbol;
        }

        if let Some(secs) = lookup("FRESHMART_COOLDOWN_SECS") {
            self.scanner.cooldown_secs = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "FRESHMART_COOLDOWN_SECS".to_string(),
                reason: format!("'{}' is not a whole number of seconds", secs),
            })?;
        }

        if let Some(path) = lookup("FRESHMART_CATALOG") {
            debug!(%path, "Overriding catalog path from environment");
            self.catalog.path = Some(PathBuf::from(path));
        }

        // A feed from the environment replaces the file's feed entirely
        let feed_path = lookup("FRESHMART_FEED");
        let feed_command = lookup("FRESHMART_FEED_CMD");
        if feed_path.is_some() || feed_command.is_some() {
            debug!(?feed_path, ?feed_command, "Overriding feed from environment");
            self.feed = FeedSettings {
                path: feed_path.map(PathBuf::from),
                command: feed_command,
                args: Vec::new(),
            };
        }

        Ok(())
    }

    /// Checks every setting the session depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.cooldown_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanner.cooldown_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.scanner.quit_key.chars().count() != 1 {
            return Err(ConfigError::InvalidValue {
                field: "scanner.quit_key".to_string(),
                reason: "must be a single character".to_string(),
            });
        }

        if self.store.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        self.feed_spec().map(|_| ())
    }

    /// The configured feed, if exactly one is set.
    pub fn feed_spec(&self) -> Result<FeedSpec, ConfigError> {
        match (&self.feed.path, &self.feed.command) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingFeeds),
            (Some(path), None) => Ok(FeedSpec::File(path.clone())),
            (None, Some(command)) if command.trim().is_empty() => Err(ConfigError::MissingFeed),
            (None, Some(command)) if self.feed.args.is_empty() => {
                Ok(FeedSpec::command_line(command))
            }
            (None, Some(program)) => Ok(FeedSpec::Command {
                program: program.clone(),
                args: self.feed.args.clone(),
            }),
            (None, None) => Err(ConfigError::MissingFeed),
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.scanner.cooldown_secs)
    }

    /// The quit key, lowercased. Falls back to `q` before validation.
    pub fn quit_key(&self) -> char {
        self.scanner
            .quit_key
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('q')
    }

    /// Platform config file: `<config dir>/scanner.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "freshmart", "freshmart")
            .map(|dirs| dirs.config_dir().join("scanner.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn with_feed() -> ScannerConfig {
        let mut config = ScannerConfig::default();
        config.feed.path = Some(PathBuf::from("/tmp/scan"));
        config
    }

    #[test]
    fn test_defaults() {
        let config = ScannerConfig::default();
        assert_eq!(config.store.name, "FreshMart");
        assert_eq!(config.store.currency_symbol, "₹");
        assert_eq!(config.cooldown(), Duration::from_secs(4));
        assert_eq!(config.quit_key(), 'q');
        assert!(config.scanner.clear_screen);
        assert!(config.catalog.path.is_none());
    }

    fn zbarcam_raw() -> FeedSpec {
        FeedSpec::Command {
            program: "zbarcam".into(),
            args: vec!["--raw".into()],
        }
    }

    #[test]
    fn test_command_with_separate_args() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[feed]\ncommand = \"/opt/zbar tools/zbarcam\"\nargs = [\"--raw\", \"/dev/Cam 2\"]"
        )
        .unwrap();

        let config = ScannerConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.feed_spec().unwrap(),
            FeedSpec::Command {
                program: "/opt/zbar tools/zbarcam".into(),
                args: vec!["--raw".into(), "/dev/Cam 2".into()],
            }
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[scanner]\ncooldown_secs = 2\n\n[feed]\ncommand = \"zbarcam --raw\""
        )
        .unwrap();

        let config = ScannerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scanner.cooldown_secs, 2);
        assert_eq!(config.scanner.quit_key, "q");
        assert_eq!(config.store.name, "FreshMart");
        assert_eq!(
            config.feed_spec().unwrap(),
            zbarcam_raw()
        );
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ScannerConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scanner]\ncooldown_secs = \"soon\"").unwrap();
        assert!(matches!(
            ScannerConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = with_feed();
        config
            .apply_env_overrides(env(&[
                ("FRESHMART_STORE_NAME", "FreshMart Andheri"),
                ("FRESHMART_CURRENCY", "Rs."),
                ("FRESHMART_COOLDOWN_SECS", " 6 "),
                ("FRESHMART_CATALOG", "/srv/catalog.json"),
            ]))
            .unwrap();

        assert_eq!(config.store.name, "FreshMart Andheri");
        assert_eq!(config.store.currency_symbol, "Rs.");
        assert_eq!(config.cooldown(), Duration::from_secs(6));
        assert_eq!(config.catalog.path, Some(PathBuf::from("/srv/catalog.json")));
        assert_eq!(config.feed_spec().unwrap(), FeedSpec::File("/tmp/scan".into()));
    }

    #[test]
    fn test_env_feed_command_replaces_file_feed() {
        let mut config = with_feed();
        config
            .apply_env_overrides(env(&[("FRESHMART_FEED_CMD", "zbarcam --raw")]))
            .unwrap();
        assert_eq!(
            config.feed_spec().unwrap(),
            zbarcam_raw()
        );
    }

    #[test]
    fn test_env_both_feeds_conflict() {
        let mut config = ScannerConfig::default();
        config
            .apply_env_overrides(env(&[
                ("FRESHMART_FEED", "/tmp/a"),
                ("FRESHMART_FEED_CMD", "zbarcam"),
            ]))
            .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ConflictingFeeds)));
    }

    #[test]
    fn test_env_bad_cooldown() {
        let mut config = ScannerConfig::default();
        let result = config.apply_env_overrides(env(&[("FRESHMART_COOLDOWN_SECS", "four")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validation() {
        assert!(with_feed().validate().is_ok());

        assert!(matches!(
            ScannerConfig::default().validate(),
            Err(ConfigError::MissingFeed)
        ));

        let mut config = with_feed();
        config.scanner.cooldown_secs = 0;
        assert!(config.validate().is_err());

        let mut config = with_feed();
        config.scanner.quit_key = "quit".into();
        assert!(config.validate().is_err());

        let mut config = with_feed();
        config.scanner.quit_key = String::new();
        assert!(config.validate().is_err());

        let mut config = with_feed();
        config.feed.command = Some("zbarcam".into());
        assert!(matches!(config.validate(), Err(ConfigError::ConflictingFeeds)));

        let mut config = ScannerConfig::default();
        config.feed.command = Some("   ".into());
        assert!(matches!(config.validate(), Err(ConfigError::MissingFeed)));
    }

    #[test]
    fn test_quit_key_is_lowercased() {
        let mut config = with_feed();
        config.scanner.quit_key = "X".into();
        assert_eq!(config.quit_key(), 'x');
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = with_feed();
        config.store.name = "FreshMart Pune".into();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ScannerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
