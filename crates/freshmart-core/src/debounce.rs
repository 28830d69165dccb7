//! # Scan Debouncer
//!
//! A camera pointed at a label decodes the same barcode on many frames in a
//! row. The debouncer turns that burst into a single event.
//!
//! ## Decision Table
//! ```text
//! ┌──────────────────────────────┬──────────────────────┬────────────┐
//! │ previous accepted scan       │ incoming scan        │ result     │
//! ├──────────────────────────────┼──────────────────────┼────────────┤
//! │ none (fresh or after reset)  │ any                  │ NewEvent   │
//! │ barcode A at t0              │ barcode B            │ NewEvent   │
//! │ barcode A at t0              │ A, now - t0 >  cool  │ NewEvent   │
//! │ barcode A at t0              │ A, now - t0 <= cool  │ Suppressed │
//! └──────────────────────────────┴──────────────────────┴────────────┘
//! ```
//!
//! Time is [`Instant`], so the window is immune to wall-clock changes.

use std::time::{Duration, Instant};

use crate::DEFAULT_SCAN_COOLDOWN_SECS;

/// One barcode read, stamped with the monotonic time it was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    pub barcode: String,
    pub at: Instant,
}

impl ScanEvent {
    pub fn new(barcode: impl Into<String>, at: Instant) -> Self {
        ScanEvent {
            barcode: barcode.into(),
            at,
        }
    }
}

/// Outcome of [`Debouncer::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDecision {
    /// Worth processing.
    NewEvent,
    /// Repeat of the last accepted scan inside the cooldown; ignore it.
    Suppressed,
}

/// Last scan accepted as a new event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebounceState {
    last: Option<ScanEvent>,
}

impl DebounceState {
    pub fn last(&self) -> Option<&ScanEvent> {
        self.last.as_ref()
    }
}

/// Repeated-scan filter owned by the session controller.
#[derive(Debug, Clone)]
pub struct Debouncer {
    cooldown: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Debouncer {
            cooldown,
            state: DebounceState::default(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Classifies a scan and, on [`ScanDecision::NewEvent`], remembers it.
    pub fn observe(&mut self, event: ScanEvent) -> ScanDecision {
        let is_new = match &self.state.last {
            None => true,
            Some(last) if last.barcode != event.barcode => true,
            // An `at` earlier than the last scan counts as zero elapsed
            Some(last) => event.at.saturating_duration_since(last.at) > self.cooldown,
        };

        if is_new {
            self.state.last = Some(event);
            ScanDecision::NewEvent
        } else {
            ScanDecision::Suppressed
        }
    }

    /// Forgets the last scan so the next one of any barcode is new.
    pub fn reset(&mut self) {
        self.state.last = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(Duration::from_secs(DEFAULT_SCAN_COOLDOWN_SECS))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COOLDOWN: Duration = Duration::from_secs(4);

    fn scan(barcode: &str, base: Instant, offset_ms: u64) -> ScanEvent {
        ScanEvent::new(barcode, base + Duration::from_millis(offset_ms))
    }

    #[test]
    fn test_first_scan_is_new() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(COOLDOWN);
        assert_eq!(debouncer.observe(scan("A", base, 0)), ScanDecision::NewEvent);
        assert_eq!(debouncer.state().last().map(|e| e.barcode.as_str()), Some("A"));
    }

    #[test]
    fn test_same_barcode_inside_cooldown_suppressed() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(COOLDOWN);
        debouncer.observe(scan("A", base, 0));
        assert_eq!(debouncer.observe(scan("A", base, 100)), ScanDecision::Suppressed);
        // Exactly the cooldown is still inside the window
        assert_eq!(debouncer.observe(scan("A", base, 4000)), ScanDecision::Suppressed);
        assert_eq!(debouncer.observe(scan("A", base, 4001)), ScanDecision::NewEvent);
    }

    #[test]
    fn test_suppressed_scan_does_not_extend_window() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(COOLDOWN);
        debouncer.observe(scan("A", base, 0));
        debouncer.observe(scan("A", base, 3000));
        // Window is measured from the accepted scan at 0, not from 3000
        assert_eq!(debouncer.observe(scan("A", base, 4500)), ScanDecision::NewEvent);
    }

    #[test]
    fn test_different_barcode_is_new() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(COOLDOWN);
        debouncer.observe(scan("A", base, 0));
        assert_eq!(debouncer.observe(scan("B", base, 10)), ScanDecision::NewEvent);
        // B replaced A, so A is new again
        assert_eq!(debouncer.observe(scan("A", base, 20)), ScanDecision::NewEvent);
    }

    #[test]
    fn test_reset_makes_next_scan_new() {
        let base = Instant::now();
        let mut debouncer = Debouncer::new(COOLDOWN);
        debouncer.observe(scan("A", base, 0));
        debouncer.reset();
        assert!(debouncer.state().last().is_none());
        assert_eq!(debouncer.observe(scan("A", base, 1)), ScanDecision::NewEvent);
    }

    #[test]
    fn test_default_cooldown() {
        assert_eq!(Debouncer::default().cooldown(), Duration::from_secs(4));
    }

    proptest! {
        #[test]
        fn prop_repeat_within_cooldown_is_suppressed(
            barcode in "[0-9]{8,13}",
            gap_ms in 0u64..=4000,
        ) {
            let base = Instant::now();
            let mut debouncer = Debouncer::new(COOLDOWN);
            prop_assert_eq!(debouncer.observe(scan(&barcode, base, 0)), ScanDecision::NewEvent);
            prop_assert_eq!(debouncer.observe(scan(&barcode, base, gap_ms)), ScanDecision::Suppressed);
        }

        #[test]
        fn prop_repeat_after_cooldown_is_new(
            barcode in "[0-9]{8,13}",
            gap_ms in 4001u64..60_000,
        ) {
            let base = Instant::now();
            let mut debouncer = Debouncer::new(COOLDOWN);
            prop_assert_eq!(debouncer.observe(scan(&barcode, base, 0)), ScanDecision::NewEvent);
            prop_assert_eq!(debouncer.observe(scan(&barcode, base, gap_ms)), ScanDecision::NewEvent);
        }

        #[test]
        fn prop_reset_always_forces_new_event(
            first in "[0-9A-Z]{1,13}",
            second in "[0-9A-Z]{1,13}",
            gap_ms in 0u64..60_000,
        ) {
            let base = Instant::now();
            let mut debouncer = Debouncer::new(COOLDOWN);
            debouncer.observe(scan(&first, base, 0));
            debouncer.reset();
            prop_assert_eq!(debouncer.observe(scan(&second, base, gap_ms)), ScanDecision::NewEvent);
        }
    }
}
