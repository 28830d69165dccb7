//! # Scanner Feed
//!
//! Frames arrive as lines of decoded scanner output. One line is one frame.
//!
//! ## Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  FeedSpec::File(path)        file, named pipe, or a keyboard-wedge log │
//! │       │                                                                 │
//! │       ├──► open(): File::open ─────────────┐                            │
//! │                                            ▼                            │
//! │  FeedSpec::Command{..}             BufRead, one line per frame ──► ... │
//! │       │                                    ▲                            │
//! │       └──► open(): spawn, pipe stdout ─────┘                            │
//! │                                                                         │
//! │  open() failure   → StartupUnavailable (fatal)                          │
//! │  EOF / read error → end of stream (session ends normally)               │
//! │  non-UTF-8 line   → empty frame (skipped)                               │
//! │  close()          → kill and reap the child                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`TextDecoder`] then splits each line into barcodes.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

use freshmart_core::{BarcodeDecoder, CoreError, CoreResult, FrameSource};

use crate::config::FeedSpec;

// =============================================================================
// Line Feed
// =============================================================================

/// [`FrameSource`] over decoded scanner lines.
pub struct LineFeed {
    spec: Option<FeedSpec>,
    reader: Option<Box<dyn BufRead>>,
    child: Option<Child>,
}

impl LineFeed {
    /// A feed opened from `spec` when the session starts.
    pub fn new(spec: FeedSpec) -> Self {
        LineFeed {
            spec: Some(spec),
            reader: None,
            child: None,
        }
    }

    /// A feed over an already-open reader.
    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        LineFeed {
            spec: None,
            reader: Some(Box::new(reader)),
            child: None,
        }
    }

    fn open_file(path: &std::path::Path) -> CoreResult<Box<dyn BufRead>> {
        let file = File::open(path).map_err(|err| {
            CoreError::StartupUnavailable(format!("cannot open feed {}: {}", path.display(), err))
        })?;
        info!(path = %path.display(), "Reading scans from file");
        Ok(Box::new(BufReader::new(file)))
    }

    fn spawn(program: &str, args: &[String]) -> CoreResult<(Child, Box<dyn BufRead>)> {
        if program.trim().is_empty() {
            return Err(CoreError::StartupUnavailable("empty feed command".to_string()));
        }

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| {
                CoreError::StartupUnavailable(format!("cannot start '{}': {}", program, err))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CoreError::StartupUnavailable(format!("'{}' has no stdout", program))
        })?;
        info!(%program, ?args, pid = child.id(), "Reading scans from command");
        Ok((child, Box::new(BufReader::new(stdout))))
    }
}

impl FrameSource for LineFeed {
    type Frame = String;

    fn open(&mut self) -> CoreResult<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        match &self.spec {
            Some(FeedSpec::File(path)) => {
                self.reader = Some(Self::open_file(path)?);
            }
            Some(FeedSpec::Command { program, args }) => {
                let (child, reader) = Self::spawn(program, args)?;
                self.child = Some(child);
                self.reader = Some(reader);
            }
            None => {
                return Err(CoreError::StartupUnavailable(
                    "feed already closed".to_string(),
                ))
            }
        }
        Ok(())
    }

    fn read_frame(&mut self) -> Option<String> {
        let reader = self.reader.as_mut()?;
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                debug!("Scanner feed reached end of stream");
                None
            }
            Ok(_) => match String::from_utf8(line) {
                Ok(text) => Some(text.trim_end_matches(['\r', '\n']).to_string()),
                // A garbled scan is an empty frame, not the end of the feed
                Err(err) => {
                    warn!(bytes = err.as_bytes().len(), "Skipping scan that is not UTF-8");
                    Some(String::new())
                }
            },
            Err(err) => {
                warn!(%err, "Scanner feed read failed");
                None
            }
        }
    }

    fn close(&mut self) {
        self.reader = None;
        self.spec = None;
        if let Some(mut child) = self.child.take() {
            // Already exited is fine
            let _ = child.kill();
            match child.wait() {
                Ok(status) => debug!(%status, "Feed command stopped"),
                Err(err) => warn!(%err, "Could not reap feed command"),
            }
        }
    }
}

impl Drop for LineFeed {
    fn drop(&mut self) {
        self.close();
    }
}

// =============================================================================
// Text Decoder
// =============================================================================

/// Symbology prefixes printed by zbar tools without `--raw`.
const SYMBOLOGY_PREFIXES: &[&str] = &[
    "EAN-2",
    "EAN-5",
    "EAN-8",
    "EAN-13",
    "UPC-A",
    "UPC-E",
    "ISBN-10",
    "ISBN-13",
    "I2/5",
    "DATABAR",
    "DATABAR-EXP",
    "CODABAR",
    "CODE-39",
    "CODE-93",
    "CODE-128",
    "PDF417",
    "QR-CODE",
    "SQ-CODE",
];

/// Splits a feed line into barcodes.
///
/// Tokens are separated by whitespace or commas. A known symbology prefix
/// (`EAN-13:8903363011411`) is dropped; everything else is passed through
/// untouched, with no checksum or digit checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl TextDecoder {
    fn strip_symbology(token: &str) -> &str {
        match token.split_once(':') {
            Some((prefix, rest))
                if !rest.is_empty()
                    && SYMBOLOGY_PREFIXES
                        .iter()
                        .any(|known| known.eq_ignore_ascii_case(prefix)) =>
            {
                rest
            }
            _ => token,
        }
    }
}

impl BarcodeDecoder<String> for TextDecoder {
    fn decode(&self, frame: &String) -> Vec<String> {
        frame
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| Self::strip_symbology(token).to_string())
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn decode(line: &str) -> Vec<String> {
        TextDecoder.decode(&line.to_string())
    }

    #[test]
    fn test_decode_plain_and_prefixed() {
        assert_eq!(decode("8903363011411"), vec!["8903363011411"]);
        assert_eq!(decode("EAN-13:8903363011411"), vec!["8903363011411"]);
        assert_eq!(decode("qr-code:ab:cd"), vec!["ab:cd"]);
        assert_eq!(
            decode(" 1001972587, EAN-13:8906008815191\t"),
            vec!["1001972587", "8906008815191"]
        );
    }

    #[test]
    fn test_decode_keeps_unknown_prefixes_and_case() {
        assert_eq!(decode("http://x.test/a"), vec!["http://x.test/a"]);
        assert_eq!(decode("AbC123"), vec!["AbC123"]);
        assert_eq!(decode("EAN-13:"), vec!["EAN-13:"]);
    }

    #[test]
    fn test_decode_empty_frame() {
        assert!(decode("").is_empty());
        assert!(decode(" , \t").is_empty());
    }

    #[test]
    fn test_reader_feed_yields_lines_then_ends() {
        let mut feed = LineFeed::from_reader(Cursor::new(b"111\r\n\n222".to_vec()));
        feed.open().unwrap();
        assert_eq!(feed.read_frame().as_deref(), Some("111"));
        assert_eq!(feed.read_frame().as_deref(), Some(""));
        assert_eq!(feed.read_frame().as_deref(), Some("222"));
        assert_eq!(feed.read_frame(), None);
        feed.close();
        assert_eq!(feed.read_frame(), None);
    }

    #[test]
    fn test_file_feed() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "EAN-13:8903363011411").unwrap();

        let mut feed = LineFeed::new(FeedSpec::File(file.path().to_path_buf()));
        assert_eq!(feed.read_frame(), None, "nothing before open");
        feed.open().unwrap();
        assert_eq!(feed.read_frame().as_deref(), Some("EAN-13:8903363011411"));
        assert_eq!(feed.read_frame(), None);
    }

    #[test]
    fn test_missing_file_is_startup_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut feed = LineFeed::new(FeedSpec::File(dir.path().join("no-such-pipe")));
        assert!(matches!(
            feed.open(),
            Err(CoreError::StartupUnavailable(_))
        ));
    }

    #[test]
    fn test_bad_command_is_startup_unavailable() {
        let mut feed = LineFeed::new(FeedSpec::command_line(
            "freshmart-no-such-decoder-binary --raw",
        ));
        assert!(matches!(
            feed.open(),
            Err(CoreError::StartupUnavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_feed() {
        let mut feed = LineFeed::new(FeedSpec::command_line("echo 8906008815191"));
        feed.open().unwrap();
        assert_eq!(feed.read_frame().as_deref(), Some("8906008815191"));
        assert_eq!(feed.read_frame(), None);
        feed.close();
    }

    #[cfg(unix)]
    #[test]
    fn test_command_args_keep_spaces() {
        let mut feed = LineFeed::new(FeedSpec::Command {
            program: "echo".into(),
            args: vec!["8906008815191 1001972587".into()],
        });
        feed.open().unwrap();
        assert_eq!(
            feed.read_frame().as_deref(),
            Some("8906008815191 1001972587")
        );
    }

    #[test]
    fn test_garbled_line_is_skipped() {
        let mut feed =
            LineFeed::from_reader(Cursor::new(b"\xff\xfe89\n8906008815191\n".to_vec()));
        feed.open().unwrap();
        assert_eq!(feed.read_frame().as_deref(), Some(""));
        assert_eq!(feed.read_frame().as_deref(), Some("8906008815191"));
        assert_eq!(feed.read_frame(), None);
    }
}
