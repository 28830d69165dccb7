//! # Session Controller
//!
//! The scan-to-decision control loop: one frame in, at most one cart
//! decision out, until the cart is full or the shopper quits.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────────┐  no frame / cancel   ┌──────────────────────┐       │
//! │   │AwaitingFrame │ ───────────────────► │ SessionEnded(reason) │       │
//! │   └──────┬───────┘                      └──────────────────────┘       │
//! │          │ frame                                   ▲                    │
//! │          ▼                                         │ cart full          │
//! │   ┌──────────────┐  no barcode / debounced         │                    │
//! │   │DecodingFrame │ ──────────────► AwaitingFrame   │                    │
//! │   └──────┬───────┘                                 │                    │
//! │          │ new barcode (first in frame only)       │                    │
//! │          ▼                                         │                    │
//! │   ┌──────────────┐  not in catalog                 │                    │
//! │   │  Resolving   │ ──────────────► AwaitingFrame   │                    │
//! │   └──────┬───────┘                                 │                    │
//! │          │ product found                           │                    │
//! │          ▼                                         │                    │
//! │   ┌──────────────┐  declined                       │                    │
//! │   │  Presenting  │ ──────────────► AwaitingFrame   │                    │
//! │   └──────┬───────┘                                 │                    │
//! │          │ accepted                                │                    │
//! │          ▼                                         │                    │
//! │   ┌──────────────┐ ────────────────────────────────┘                    │
//! │   │  Committing  │ ──────────────► AwaitingFrame                        │
//! │   └──────────────┘                                                      │
//! │                                                                         │
//! │  After every decision (accepted, declined, not found) the debouncer    │
//! │  is reset, so the next read of any barcode is evaluated fresh.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Collaborators
//! Everything outside the loop is a trait: [`FrameSource`],
//! [`BarcodeDecoder`], [`Presenter`] and [`Clock`]. The loop is synchronous
//! and single-threaded; the only blocking points are `read_frame` and
//! `confirm_product`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::allergy::{evaluate, AllergyProfile, Verdict};
use crate::cart::{CartLedger, CartSnapshot};
use crate::catalog::Catalog;
use crate::debounce::{Debouncer, ScanDecision, ScanEvent};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::setup::SessionSetup;
use crate::types::{CartEntry, ProductRecord};

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Where frames come from (a camera, a decoder pipe, a test script).
pub trait FrameSource {
    type Frame;

    /// Prepares the source. Failure here is fatal for the session.
    fn open(&mut self) -> CoreResult<()>;

    /// Blocks for the next frame. `None` means the stream is over.
    fn read_frame(&mut self) -> Option<Self::Frame>;

    /// Releases the source. Called once, after the loop ends.
    fn close(&mut self);
}

/// Extracts barcode strings from a frame, in reading order.
pub trait BarcodeDecoder<F> {
    fn decode(&self, frame: &F) -> Vec<String>;
}

/// Shopper's response to a shown frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAck {
    Continue,
    /// The shopper asked to quit.
    Cancel,
}

/// Shopper's answer to "add this item?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
}

/// Everything the shopper sees and answers.
pub trait Presenter<F> {
    /// Shows the live frame and reports whether the shopper wants to quit.
    fn show_frame(&mut self, frame: &F) -> FrameAck;

    /// Shows the current cart.
    fn show_cart(&mut self, cart: &CartSnapshot<'_>);

    /// Tells the shopper a barcode is unknown.
    fn show_not_found(&mut self, barcode: &str);

    /// Shows product detail with its allergy verdict and blocks for an answer.
    fn confirm_product(&mut self, product: &ProductRecord, verdict: &Verdict) -> Decision;

    /// Confirms an item went into the cart.
    fn show_added(&mut self, entry: &CartEntry);

    /// Tells the shopper an accepted item could not be added.
    fn show_refused(&mut self, _entry: &CartEntry, _reason: &CoreError) {}

    /// Shows the final bill. Called exactly once per session.
    fn show_final_bill(&mut self, summary: &SessionSummary);
}

/// Monotonic time source for the debouncer.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The system's monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// =============================================================================
// States and Outcomes
// =============================================================================

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The cart holds as many items as the shopper allowed.
    CapacityReached,
    /// The shopper quit.
    Cancelled,
    /// The frame source stopped delivering frames.
    StreamEnded,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::CapacityReached => write!(f, "item limit reached"),
            EndReason::Cancelled => write!(f, "cancelled by shopper"),
            EndReason::StreamEnded => write!(f, "scanner feed ended"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFrame,
    DecodingFrame,
    Resolving,
    Presenting,
    Committing,
    SessionEnded(EndReason),
}

impl SessionState {
    pub fn is_ended(&self) -> bool {
        matches!(self, SessionState::SessionEnded(_))
    }
}

/// The final bill: what was bought in one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub entries: Vec<CartEntry>,
    pub total: Money,
    pub capacity: usize,
    pub end_reason: EndReason,
}

impl SessionSummary {
    pub fn snapshot(&self) -> CartSnapshot<'_> {
        CartSnapshot {
            entries: &self.entries,
            total: self.total,
            capacity: self.capacity,
        }
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Owns the per-session state (debouncer, ledger) and drives the loop.
///
/// ## Usage
/// ```rust,ignore
/// let controller = SessionController::new(&catalog, setup, Duration::from_secs(4))?;
/// let summary = controller.run(&mut feed, &decoder, &mut console)?;
/// println!("paid {}", summary.total);
/// ```
pub struct SessionController<'c, C: Catalog + ?Sized, K: Clock = MonotonicClock> {
    catalog: &'c C,
    profile: AllergyProfile,
    debouncer: Debouncer,
    ledger: CartLedger,
    clock: K,
    state: SessionState,
    session_id: Uuid,
    started_at: DateTime<Utc>,
    frames_seen: u64,
}

impl<'c, C: Catalog + ?Sized> SessionController<'c, C, MonotonicClock> {
    /// Creates a controller for one shopper.
    ///
    /// ## Errors
    /// `InvalidConfiguration` when `setup.capacity` is zero.
    pub fn new(catalog: &'c C, setup: SessionSetup, cooldown: Duration) -> CoreResult<Self> {
        Ok(SessionController {
            catalog,
            profile: setup.profile,
            debouncer: Debouncer::new(cooldown),
            ledger: CartLedger::new(setup.capacity)?,
            clock: MonotonicClock,
            state: SessionState::AwaitingFrame,
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            frames_seen: 0,
        })
    }
}

impl<'c, C: Catalog + ?Sized, K: Clock> SessionController<'c, C, K> {
    /// Swaps the time source (tests drive time by hand).
    pub fn with_clock<K2: Clock>(self, clock: K2) -> SessionController<'c, C, K2> {
        SessionController {
            catalog: self.catalog,
            profile: self.profile,
            debouncer: self.debouncer,
            ledger: self.ledger,
            clock,
            state: self.state,
            session_id: self.session_id,
            started_at: self.started_at,
            frames_seen: self.frames_seen,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn cart(&self) -> CartSnapshot<'_> {
        self.ledger.snapshot()
    }

    /// Runs the whole session and returns the final bill.
    ///
    /// ## Sequence
    /// 1. Open the source (failure → `StartupUnavailable`, nothing rendered)
    /// 2. Show the empty cart
    /// 3. [`step`](Self::step) until `SessionEnded`
    /// 4. Close the source, show the final bill once
    pub fn run<S, D, P>(
        self,
        source: &mut S,
        decoder: &D,
        presenter: &mut P,
    ) -> CoreResult<SessionSummary>
    where
        S: FrameSource,
        D: BarcodeDecoder<S::Frame> + ?Sized,
        P: Presenter<S::Frame> + ?Sized,
    {
        open_source(source)?;
        self.drive(source, decoder, presenter)
    }

    /// Like [`run`](Self::run) for a source that [`open_source`] already
    /// opened, so startup questions can wait until the feed is known to work.
    pub fn drive<S, D, P>(
        mut self,
        source: &mut S,
        decoder: &D,
        presenter: &mut P,
    ) -> CoreResult<SessionSummary>
    where
        S: FrameSource,
        D: BarcodeDecoder<S::Frame> + ?Sized,
        P: Presenter<S::Frame> + ?Sized,
    {
        info!(
            session_id = %self.session_id,
            capacity = self.ledger.capacity(),
            allergy_terms = self.profile.terms().len(),
            "Session started"
        );
        presenter.show_cart(&self.ledger.snapshot());

        let reason = loop {
            if let SessionState::SessionEnded(reason) = self.step(source, decoder, presenter) {
                break reason;
            }
        };

        source.close();

        let summary = self.finish(reason);
        info!(
            session_id = %summary.session_id,
            items = summary.entries.len(),
            total = %summary.total,
            reason = ?summary.end_reason,
            "Session ended"
        );
        presenter.show_final_bill(&summary);
        Ok(summary)
    }

    /// Processes one frame and returns the state the loop is left in.
    ///
    /// Once the session has ended this is a no-op: no further frames are read.
    pub fn step<S, D, P>(&mut self, source: &mut S, decoder: &D, presenter: &mut P) -> SessionState
    where
        S: FrameSource,
        D: BarcodeDecoder<S::Frame> + ?Sized,
        P: Presenter<S::Frame> + ?Sized,
    {
        if self.state.is_ended() {
            return self.state;
        }
        if self.ledger.is_full() {
            return self.end(EndReason::CapacityReached);
        }

        // AwaitingFrame
        let frame = match source.read_frame() {
            Some(frame) => frame,
            None => return self.end(EndReason::StreamEnded),
        };
        self.frames_seen += 1;

        if presenter.show_frame(&frame) == FrameAck::Cancel {
            return self.end(EndReason::Cancelled);
        }

        self.transition(SessionState::DecodingFrame);
        let barcodes = decoder.decode(&frame);
        let Some(barcode) = barcodes.first().cloned() else {
            trace!(frame = self.frames_seen, "No barcode in frame");
            return self.transition(SessionState::AwaitingFrame);
        };
        if barcodes.len() > 1 {
            debug!(
                used = %barcode,
                ignored = barcodes.len() - 1,
                "Several barcodes in one frame, using the first"
            );
        }

        let event = ScanEvent::new(barcode.clone(), self.clock.now());
        if self.debouncer.observe(event) == ScanDecision::Suppressed {
            trace!(%barcode, "Repeat scan suppressed");
            return self.transition(SessionState::AwaitingFrame);
        }

        self.transition(SessionState::Resolving);
        let catalog = self.catalog;
        let Some(product) = catalog.lookup(&barcode) else {
            info!(%barcode, "Barcode not in catalog");
            presenter.show_not_found(&barcode);
            self.debouncer.reset();
            presenter.show_cart(&self.ledger.snapshot());
            return self.transition(SessionState::AwaitingFrame);
        };

        self.transition(SessionState::Presenting);
        let verdict = evaluate(Some(product), &self.profile);
        let decision = presenter.confirm_product(product, &verdict);

        if decision == Decision::Decline {
            info!(%barcode, name = %product.name, "Shopper declined item");
            self.debouncer.reset();
            presenter.show_cart(&self.ledger.snapshot());
            return self.transition(SessionState::AwaitingFrame);
        }

        self.transition(SessionState::Committing);
        let entry = CartEntry::from_product(product);
        match self.ledger.try_append(entry.clone()) {
            Ok(()) => {}
            Err(err @ CoreError::CapacityExceeded { .. }) => {
                warn!(%err, %barcode, "Cart refused an accepted item");
                self.debouncer.reset();
                return self.end(EndReason::CapacityReached);
            }
            Err(err) => {
                warn!(%err, %barcode, "Cart refused an accepted item");
                presenter.show_refused(&entry, &err);
                self.debouncer.reset();
                presenter.show_cart(&self.ledger.snapshot());
                return self.transition(SessionState::AwaitingFrame);
            }
        }

        info!(
            %barcode,
            name = %entry.product.name,
            price = %entry.discounted_price,
            items = self.ledger.len(),
            total = %self.ledger.total(),
            "Item added to cart"
        );
        presenter.show_added(&entry);
        self.debouncer.reset();

        if self.ledger.is_full() {
            return self.end(EndReason::CapacityReached);
        }
        presenter.show_cart(&self.ledger.snapshot());
        self.transition(SessionState::AwaitingFrame)
    }

    fn transition(&mut self, next: SessionState) -> SessionState {
        debug!(from = ?self.state, to = ?next, "Session transition");
        self.state = next;
        next
    }

    fn end(&mut self, reason: EndReason) -> SessionState {
        self.transition(SessionState::SessionEnded(reason))
    }

    fn finish(self, end_reason: EndReason) -> SessionSummary {
        let total = self.ledger.total();
        let capacity = self.ledger.capacity();
        SessionSummary {
            session_id: self.session_id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            entries: self.ledger.into_entries(),
            total,
            capacity,
            end_reason,
        }
    }
}

/// Opens `source`; any failure becomes [`CoreError::StartupUnavailable`].
pub fn open_source<S: FrameSource + ?Sized>(source: &mut S) -> CoreResult<()> {
    source.open().map_err(|err| {
        warn!(%err, "Could not open frame source");
        match err {
            CoreError::StartupUnavailable(_) => err,
            other => CoreError::StartupUnavailable(other.to_string()),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allergy::AllergyWarning;
    use crate::catalog::InMemoryCatalog;
    use crate::types::{DiscountPercent, NutritionFacts};
    use std::cell::Cell;
    use std::collections::VecDeque;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    /// Each frame is the list of barcodes a decoder would find in it.
    #[derive(Default)]
    struct ScriptedSource {
        frames: VecDeque<Vec<String>>,
        fail_open: bool,
        opened: bool,
        closed: bool,
    }

    impl ScriptedSource {
        fn new(frames: &[&[&str]]) -> Self {
            ScriptedSource {
                frames: frames
                    .iter()
                    .map(|f| f.iter().map(|b| b.to_string()).collect())
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl FrameSource for ScriptedSource {
        type Frame = Vec<String>;

        fn open(&mut self) -> CoreResult<()> {
            if self.fail_open {
                return Err(CoreError::StartupUnavailable("no camera".into()));
            }
            self.opened = true;
            Ok(())
        }

        fn read_frame(&mut self) -> Option<Vec<String>> {
            self.frames.pop_front()
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    struct PassThrough;

    impl BarcodeDecoder<Vec<String>> for PassThrough {
        fn decode(&self, frame: &Vec<String>) -> Vec<String> {
            frame.clone()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Shown {
        Cart { items: usize, total: i64 },
        NotFound(String),
        Confirm(String, Verdict),
        Added(String, i64),
        Refused(String),
        Bill { items: usize, total: i64, reason: EndReason },
    }

    #[derive(Default)]
    struct ScriptedPresenter {
        decisions: VecDeque<Decision>,
        cancel_on_frame: Option<usize>,
        frames: usize,
        shown: Vec<Shown>,
    }

    impl ScriptedPresenter {
        fn deciding(decisions: &[Decision]) -> Self {
            ScriptedPresenter {
                decisions: decisions.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn confirms(&self) -> Vec<&str> {
            self.shown
                .iter()
                .filter_map(|s| match s {
                    Shown::Confirm(name, _) => Some(name.as_str()),
                    _ => None,
                })
                .collect()
        }

        fn bills(&self) -> usize {
            self.shown
                .iter()
                .filter(|s| matches!(s, Shown::Bill { .. }))
                .count()
        }
    }

    impl Presenter<Vec<String>> for ScriptedPresenter {
        fn show_frame(&mut self, _frame: &Vec<String>) -> FrameAck {
            self.frames += 1;
            if self.cancel_on_frame == Some(self.frames) {
                FrameAck::Cancel
            } else {
                FrameAck::Continue
            }
        }

        fn show_cart(&mut self, cart: &CartSnapshot<'_>) {
            self.shown.push(Shown::Cart {
                items: cart.len(),
                total: cart.total.cents(),
            });
        }

        fn show_not_found(&mut self, barcode: &str) {
            self.shown.push(Shown::NotFound(barcode.to_string()));
        }

        fn confirm_product(&mut self, product: &ProductRecord, verdict: &Verdict) -> Decision {
            self.shown
                .push(Shown::Confirm(product.name.clone(), verdict.clone()));
            self.decisions.pop_front().unwrap_or(Decision::Decline)
        }

        fn show_added(&mut self, entry: &CartEntry) {
            self.shown.push(Shown::Added(
                entry.name().to_string(),
                entry.discounted_price.cents(),
            ));
        }

        fn show_refused(&mut self, entry: &CartEntry, _reason: &CoreError) {
            self.shown.push(Shown::Refused(entry.name().to_string()));
        }

        fn show_final_bill(&mut self, summary: &SessionSummary) {
            self.shown.push(Shown::Bill {
                items: summary.entries.len(),
                total: summary.total.cents(),
                reason: summary.end_reason,
            });
        }
    }

    /// Advances by `step` on every reading.
    struct SteppingClock {
        base: Instant,
        step: Duration,
        calls: Cell<u32>,
    }

    impl SteppingClock {
        fn new(step: Duration) -> Self {
            SteppingClock {
                base: Instant::now(),
                step,
                calls: Cell::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> Instant {
            let n = self.calls.get();
            self.calls.set(n + 1);
            self.base + self.step * n
        }
    }

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    const TRAIL_MIX: &str = "8903363011411";
    const KALA_CHANA: &str = "8906008815191";

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_products([
            ProductRecord::new(TRAIL_MIX, "FreshMart Premia Trail Mix", Money::from_cents(15000))
                .with_discount(DiscountPercent::new(10).unwrap())
                .with_detail("Net Quantity", "100 g")
                .with_ingredients(["Cranberry", "Almonds", "Cashew Nuts"])
                .with_nutrition(NutritionFacts::new().with("calories", 450.0))
                .with_allergens(["Tree Nuts"]),
            ProductRecord::new(KALA_CHANA, "Fortune Sushan Kala Chana", Money::from_cents(8500))
                .with_ingredients(["Kala Chana"]),
        ])
        .unwrap()
    }

    fn setup(allergies: &str, capacity: usize) -> SessionSetup {
        SessionSetup {
            profile: AllergyProfile::parse(allergies),
            capacity,
        }
    }

    fn controller<'a>(
        catalog: &'a InMemoryCatalog,
        allergies: &str,
        capacity: usize,
    ) -> SessionController<'a, InMemoryCatalog, SteppingClock> {
        SessionController::new(catalog, setup(allergies, capacity), Duration::from_secs(4))
            .unwrap()
            .with_clock(SteppingClock::new(Duration::from_millis(100)))
    }

    // -------------------------------------------------------------------------
    // Scenarios
    // -------------------------------------------------------------------------

    #[test]
    fn test_two_item_session_ends_at_capacity() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[TRAIL_MIX], &[KALA_CHANA], &[TRAIL_MIX]]);
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Accept, Decision::Accept]);

        let summary = controller(&catalog, "", 2)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.total, Money::from_cents(22000));
        assert_eq!(summary.end_reason, EndReason::CapacityReached);
        assert!(source.opened && source.closed);
        // Third frame never read
        assert_eq!(source.frames.len(), 1);

        assert_eq!(
            presenter.shown,
            vec![
                Shown::Cart { items: 0, total: 0 },
                Shown::Confirm("FreshMart Premia Trail Mix".into(), Verdict::NotApplicable),
                Shown::Added("FreshMart Premia Trail Mix".into(), 13500),
                Shown::Cart { items: 1, total: 13500 },
                Shown::Confirm("Fortune Sushan Kala Chana".into(), Verdict::NotApplicable),
                Shown::Added("Fortune Sushan Kala Chana".into(), 8500),
                Shown::Bill {
                    items: 2,
                    total: 22000,
                    reason: EndReason::CapacityReached
                },
            ]
        );
    }

    #[test]
    fn test_verdict_reaches_presenter() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[TRAIL_MIX]]);
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Decline]);

        controller(&catalog, "nuts", 3)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert!(presenter.shown.contains(&Shown::Confirm(
            "FreshMart Premia Trail Mix".into(),
            Verdict::Warning(vec![AllergyWarning::IngredientMatch("nuts".into())]),
        )));
    }

    #[test]
    fn test_same_barcode_reevaluated_after_decision() {
        let catalog = catalog();
        // Camera keeps seeing the same label on consecutive frames
        let mut source = ScriptedSource::new(&[&[KALA_CHANA], &[KALA_CHANA], &[KALA_CHANA]]);
        let mut presenter = ScriptedPresenter::deciding(&[
            Decision::Decline,
            Decision::Decline,
            Decision::Accept,
        ]);

        let summary = controller(&catalog, "", 5)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert_eq!(presenter.confirms().len(), 3);
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.end_reason, EndReason::StreamEnded);
    }

    #[test]
    fn test_not_found_is_reported_and_retried() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&["0000000000000"], &["0000000000000"]]);
        let mut presenter = ScriptedPresenter::default();

        let summary = controller(&catalog, "", 2)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        let misses = presenter
            .shown
            .iter()
            .filter(|s| **s == Shown::NotFound("0000000000000".into()))
            .count();
        assert_eq!(misses, 2);
        assert!(summary.entries.is_empty());
        assert_eq!(summary.end_reason, EndReason::StreamEnded);
        assert_eq!(presenter.bills(), 1);
    }

    #[test]
    fn test_declined_item_not_added() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[TRAIL_MIX]]);
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Decline]);

        let summary = controller(&catalog, "", 2)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert!(summary.entries.is_empty());
        assert!(summary.total.is_zero());
    }

    #[test]
    fn test_cancel_stops_before_decoding() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[KALA_CHANA], &[TRAIL_MIX], &[KALA_CHANA]]);
        let mut presenter = ScriptedPresenter {
            decisions: VecDeque::from([Decision::Accept, Decision::Accept]),
            cancel_on_frame: Some(2),
            ..Default::default()
        };

        let summary = controller(&catalog, "", 5)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert_eq!(summary.end_reason, EndReason::Cancelled);
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(presenter.confirms(), vec!["Fortune Sushan Kala Chana"]);
        assert_eq!(source.frames.len(), 1);
        assert!(source.closed);
    }

    #[test]
    fn test_unavailable_source_is_fatal_and_renders_nothing() {
        let catalog = catalog();
        let mut source = ScriptedSource {
            fail_open: true,
            ..ScriptedSource::new(&[&[KALA_CHANA]])
        };
        let mut presenter = ScriptedPresenter::default();

        let result = controller(&catalog, "", 2).run(&mut source, &PassThrough, &mut presenter);

        assert!(matches!(result, Err(CoreError::StartupUnavailable(_))));
        assert!(presenter.shown.is_empty());
        assert!(!source.closed);
    }

    #[test]
    fn test_drive_uses_already_open_source() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[KALA_CHANA]]);
        open_source(&mut source).unwrap();
        assert!(source.opened);

        // A second open would fail; drive must not attempt one
        source.fail_open = true;
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Accept]);
        let summary = controller(&catalog, "", 2)
            .drive(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert_eq!(summary.end_reason, EndReason::StreamEnded);
        assert_eq!(summary.total, Money::from_cents(8500));
        assert!(source.closed);
    }

    /// Serves one record without validation, so its price can be absurd.
    struct UncheckedCatalog(ProductRecord);

    impl Catalog for UncheckedCatalog {
        fn lookup(&self, barcode: &str) -> Option<&ProductRecord> {
            (self.0.barcode == barcode).then_some(&self.0)
        }

        fn len(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_overflowing_item_is_refused_and_session_continues() {
        let catalog = UncheckedCatalog(ProductRecord::new(
            "999",
            "Gold Bar",
            Money::from_cents(i64::MAX),
        ));
        let mut source = ScriptedSource::new(&[&["999"], &["999"]]);
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Accept, Decision::Accept]);

        let summary = SessionController::new(&catalog, setup("", 3), Duration::from_secs(4))
            .unwrap()
            .with_clock(SteppingClock::new(Duration::from_millis(100)))
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert_eq!(summary.end_reason, EndReason::StreamEnded);
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.total, Money::from_cents(i64::MAX));
        assert!(presenter.shown.contains(&Shown::Refused("Gold Bar".into())));
    }

    #[test]
    fn test_only_first_barcode_in_frame_is_used() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[KALA_CHANA, TRAIL_MIX]]);
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Accept, Decision::Accept]);

        let summary = controller(&catalog, "", 5)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert_eq!(presenter.confirms(), vec!["Fortune Sushan Kala Chana"]);
        assert_eq!(summary.total, Money::from_cents(8500));
    }

    #[test]
    fn test_empty_frames_are_skipped() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[], &[], &[KALA_CHANA]]);
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Accept]);

        let summary = controller(&catalog, "", 1)
            .run(&mut source, &PassThrough, &mut presenter)
            .unwrap();

        assert_eq!(presenter.frames, 3);
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.end_reason, EndReason::CapacityReached);
    }

    #[test]
    fn test_step_walks_states_and_stops_after_end() {
        let catalog = catalog();
        let mut source = ScriptedSource::new(&[&[], &[KALA_CHANA]]);
        let mut presenter = ScriptedPresenter::deciding(&[Decision::Accept]);
        let mut session = controller(&catalog, "", 1);

        assert_eq!(session.state(), SessionState::AwaitingFrame);
        assert_eq!(
            session.step(&mut source, &PassThrough, &mut presenter),
            SessionState::AwaitingFrame
        );
        assert_eq!(
            session.step(&mut source, &PassThrough, &mut presenter),
            SessionState::SessionEnded(EndReason::CapacityReached)
        );
        assert_eq!(session.cart().len(), 1);

        // Ended sessions read no more frames
        source.frames.push_back(vec![TRAIL_MIX.to_string()]);
        assert!(session.step(&mut source, &PassThrough, &mut presenter).is_ended());
        assert_eq!(source.frames.len(), 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let catalog = catalog();
        let result = SessionController::new(&catalog, setup("", 0), Duration::from_secs(4));
        assert!(matches!(result, Err(CoreError::InvalidConfiguration(_))));
    }
}
