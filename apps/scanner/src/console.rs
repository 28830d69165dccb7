//! # Console Presenter
//!
//! The terminal side of a session: writes screens built by [`crate::render`],
//! reads answers line by line, and polls the keyboard for the quit key once
//! per frame.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionController                ConsolePresenter<R, W, Q>             │
//! │  ─────────────────                ─────────────────────────             │
//! │  show_frame ─────────────────────► Q::quit_requested()  (crossterm)    │
//! │  show_cart / show_not_found ─────► W  (stdout)                          │
//! │  confirm_product ────────────────► W  then  R::read_line  (stdin)      │
//! │  StartupPrompt::read_line ───────► W  then  R::read_line                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reader, writer and quit signal are type parameters, so tests run the
//! presenter against in-memory buffers.
//!
//! When screen clearing is on, the last not-found / added / refused message
//! is repeated under the next cart screen; otherwise the clear would wipe it
//! the moment it was printed.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, queue, terminal};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;
use tracing::{debug, trace, warn};

use freshmart_core::{
    CartEntry, CartSnapshot, CoreError, Decision, FrameAck, Presenter, ProductRecord,
    SessionSummary, StartupPrompt, Verdict,
};

use crate::render::{self, RenderStyle};

// =============================================================================
// Quit Signal
// =============================================================================

/// Cooperative cancellation, checked once per frame.
pub trait QuitSignal {
    fn quit_requested(&mut self) -> bool;
}

impl<F: FnMut() -> bool> QuitSignal for F {
    fn quit_requested(&mut self) -> bool {
        self()
    }
}

/// Never asks to quit; the session ends on capacity or end of feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverQuit;

impl QuitSignal for NeverQuit {
    fn quit_requested(&mut self) -> bool {
        false
    }
}

/// Polls the terminal for a quit key without blocking.
///
/// Raw mode is switched on only for the duration of the poll, so line input
/// for prompts keeps working normally. Ctrl-C also counts as quit, since
/// raw mode turns it into an ordinary key event.
#[derive(Debug, Clone)]
pub struct KeyboardQuit {
    key: char,
    enabled: bool,
}

impl KeyboardQuit {
    /// Watches for `key`. Polling is disabled when stdin is not a terminal.
    pub fn new(key: char) -> Self {
        let enabled = io::stdin().is_terminal();
        if !enabled {
            debug!("stdin is not a terminal, quit key disabled");
        }
        KeyboardQuit {
            key: key.to_ascii_lowercase(),
            enabled,
        }
    }

    fn poll(&self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        let pressed = self.drain_events();
        terminal::disable_raw_mode()?;
        pressed
    }

    fn drain_events(&self) -> io::Result<bool> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                let ctrl_c = modifiers.contains(KeyModifiers::CONTROL) && c == 'c';
                if ctrl_c || c.to_ascii_lowercase() == self.key {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

impl QuitSignal for KeyboardQuit {
    fn quit_requested(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        match self.poll() {
            Ok(pressed) => pressed,
            Err(err) => {
                warn!(%err, "Keyboard poll failed, quit key disabled");
                self.enabled = false;
                false
            }
        }
    }
}

// =============================================================================
// Console Presenter
// =============================================================================

pub struct ConsolePresenter<R, W, Q> {
    input: R,
    output: W,
    quit: Q,
    style: RenderStyle,
    clear_screen: bool,
    notice: Option<String>,
}

impl<R: BufRead, W: Write, Q: QuitSignal> ConsolePresenter<R, W, Q> {
    pub fn new(input: R, output: W, quit: Q, style: RenderStyle) -> Self {
        ConsolePresenter {
            input,
            output,
            quit,
            style,
            clear_screen: false,
            notice: None,
        }
    }

    /// Clear the terminal before cart and product screens.
    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Prints a message that must survive the next screen clear.
    fn announce(&mut self, text: String) {
        self.emit(&text);
        if self.clear_screen {
            self.notice = Some(text);
        }
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .output
            .write_all(text.as_bytes())
            .and_then(|_| self.output.flush());
        if let Err(err) = result {
            warn!(%err, "Console write failed");
        }
    }

    fn clear(&mut self) {
        if !self.clear_screen {
            return;
        }
        let result = queue!(
            self.output,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        );
        if let Err(err) = result {
            debug!(%err, "Could not clear the screen");
        }
    }

    /// Writes `prompt` and reads one line. `None` on end of input.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        self.emit(prompt);
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(err) => {
                warn!(%err, "Console read failed");
                None
            }
        }
    }
}

impl<R: BufRead, W: Write, Q: QuitSignal> Presenter<String> for ConsolePresenter<R, W, Q> {
    fn show_frame(&mut self, frame: &String) -> FrameAck {
        trace!(%frame, "Frame");
        if self.quit.quit_requested() {
            debug!("Quit key pressed");
            FrameAck::Cancel
        } else {
            FrameAck::Continue
        }
    }

    fn show_cart(&mut self, cart: &CartSnapshot<'_>) {
        self.clear();
        let mut text = render::cart_summary(cart, &self.style);
        if let Some(notice) = self.notice.take() {
            text.push_str(&notice);
        }
        text.push_str(&render::scan_hint(&self.style));
        self.emit(&text);
    }

    fn show_not_found(&mut self, barcode: &str) {
        self.announce(render::not_found(barcode));
    }

    fn confirm_product(&mut self, product: &ProductRecord, verdict: &Verdict) -> Decision {
        self.notice = None;
        self.clear();
        let text = render::product_detail(product, verdict, &self.style);
        self.emit(&text);
        match self.ask(render::CONFIRM_PROMPT) {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => Decision::Accept,
            _ => Decision::Decline,
        }
    }

    fn show_added(&mut self, entry: &CartEntry) {
        self.announce(render::added(entry));
    }

    fn show_refused(&mut self, entry: &CartEntry, reason: &CoreError) {
        self.announce(render::refused(entry, reason));
    }

    fn show_final_bill(&mut self, summary: &SessionSummary) {
        self.notice = None;
        self.emit(&render::final_bill(summary, &self.style));
    }
}

impl<R: BufRead, W: Write, Q: QuitSignal> StartupPrompt for ConsolePresenter<R, W, Q> {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.ask(prompt)
    }

    fn notify(&mut self, message: &str) {
        self.emit(&format!("{}\n", message));
    }

    fn greet(&mut self) {
        let text = format!(
            "Welcome to {}! Let's get your preferences first.\n",
            self.style.store_name
        );
        self.emit(&text);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
