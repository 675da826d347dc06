//! # Session Module - One Timed Run
//!
//! This module provides the high-level interface for a single typing run. A [RunSession]
//! owns everything a run needs (the reference text, the input buffer, the edit policy, the
//! countdown and its ticker) and is replaced as a whole when the run restarts.
//!
//! ## Control Flow
//!
//! 1. A key goes through the [EditPolicy], which may rewrite the buffer or refuse the key.
//! 2. If the buffer changed, it is reconciled against the reference from scratch and the
//!    derived counts are copied into the [RunState].
//! 3. The [ScoringEngine] turns the counts and the elapsed time into live metrics whenever a
//!    [Snapshot] is taken.
//!
//! ## Usage Examples
//!
//! ```rust
//! use quill::policy::Key;
//! use quill::scoring::Phase;
//! use quill::session::RunSession;
//! use web_time::Instant;
//!
//! let mut session = RunSession::new("ab\ncd").unwrap();
//! let now = Instant::now();
//!
//! for key in [Key::Char('a'), Key::Char('b'), Key::Enter, Key::Char('c'), Key::Char('d')] {
//!     session.handle_key(key, now);
//! }
//!
//! assert_eq!(session.buffer().to_string(), "ab\ncd");
//! assert_eq!(session.phase(), Phase::Running);
//!
//! let snapshot = session.snapshot();
//! assert_eq!(snapshot.accuracy_percent, 100);
//! assert_eq!(snapshot.remaining_seconds, 60);
//! ```

use std::ops::ControlFlow;

use tracing::debug;
use web_time::{Duration, Instant};

use crate::buffer::InputBuffer;
use crate::config::Configuration;
use crate::policy::{Edit, EditPolicy, Key};
use crate::reconcile::Reconciliation;
use crate::reference::ReferenceText;
use crate::render::{LineContext, Snapshot};
use crate::scoring::{Metrics, Phase, ScoringEngine};
use crate::timer::Ticker;

/// Mutable state of a run
///
/// The counts are always copied from the latest reconciliation of `buffer`; they are never
/// adjusted independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    buffer: InputBuffer,
    flat_cursor: usize,
    typed_count: usize,
    correct_count: usize,
}

impl RunState {
    /// The raw input produced so far
    pub const fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    /// Offset into the flattened reference, equal to the input length
    pub const fn flat_cursor(&self) -> usize {
        self.flat_cursor
    }

    pub const fn typed_count(&self) -> usize {
        self.typed_count
    }

    pub const fn correct_count(&self) -> usize {
        self.correct_count
    }
}

/// A single typing run over one reference text
///
/// # Thread Safety
///
/// A session is driven by one event loop; every operation runs to completion before the
/// next event is handled. It is `Send`, so it can be moved to the thread that owns the loop.
#[derive(Debug, Clone)]
pub struct RunSession {
    reference: ReferenceText,
    state: RunState,
    reconciliation: Reconciliation,
    policy: EditPolicy,
    scoring: ScoringEngine,
    ticker: Ticker,
    config: Configuration,
}

impl RunSession {
    /// Create a new run for the given snippet with the default configuration
    ///
    /// # Returns
    ///
    /// `None` if the snippet is empty.
    ///
    /// ```rust
    /// use quill::session::RunSession;
    ///
    /// let session = RunSession::new("print('hi')").unwrap();
    /// assert_eq!(session.reference().flat_len(), 11);
    ///
    /// assert!(RunSession::new("").is_none());
    /// ```
    pub fn new(snippet: &str) -> Option<Self> {
        ReferenceText::new(snippet).map(Self::from_reference)
    }

    /// Create a new run for an already built reference text
    pub fn from_reference(reference: ReferenceText) -> Self {
        Self::fresh(reference, Configuration::default())
    }

    /// Configure the run (builder pattern)
    ///
    /// Resets the run, so it should be called before the first key.
    ///
    /// ```rust
    /// use quill::config::Configuration;
    /// use quill::session::RunSession;
    ///
    /// let config = Configuration {
    ///     time_budget_seconds: 30,
    ///     ..Configuration::default()
    /// };
    ///
    /// let session = RunSession::new("x").unwrap().with_configuration(config);
    /// assert_eq!(session.remaining_seconds(), 30);
    /// ```
    pub fn with_configuration(self, config: Configuration) -> Self {
        Self::fresh(self.reference, config)
    }

    fn fresh(reference: ReferenceText, config: Configuration) -> Self {
        let reconciliation = Reconciliation::compute(&[], &reference);

        Self {
            reference,
            state: RunState::default(),
            reconciliation,
            policy: EditPolicy::new(&config),
            scoring: ScoringEngine::new(config.time_budget_seconds),
            ticker: Ticker::every_second(),
            config,
        }
    }

    /// Replace the run with a fresh one over `reference`
    ///
    /// The ticker is cancelled and every piece of state is replaced at once; the configuration
    /// is kept.
    pub fn restart(&mut self, reference: ReferenceText) {
        self.ticker.cancel();
        *self = Self::fresh(reference, self.config.clone());
        debug!(
            target: "quill::session",
            lines = self.reference.line_count(),
            length = self.reference.flat_len(),
            "run restarted"
        );
    }

    /// Process a key event
    ///
    /// `now` is used to start the countdown when this key is the first accepted one. Keys are
    /// ignored once the run is finished.
    ///
    /// # Returns
    ///
    /// What the key did to the buffer.
    pub fn handle_key(&mut self, key: Key, now: Instant) -> Edit {
        if self.scoring.phase() == Phase::Finished {
            return Edit::Unchanged;
        }

        let edit = self
            .policy
            .apply(key, &mut self.state.buffer, &self.reference);

        if edit.is_changed() {
            self.reconcile();

            if !self.state.buffer.is_empty() && self.scoring.start() {
                self.ticker.start(now);
            }

            if self.config.finish_on_completion && self.reconciliation.is_exact_match() {
                self.finish();
            }
        }

        edit
    }

    /// Re-run reconciliation over the whole buffer and copy the counts into the run state
    fn reconcile(&mut self) {
        let buffer = &self.state.buffer;
        let mut reconciliation = Reconciliation::compute(buffer.chars(), &self.reference);
        reconciliation.apply_forced_incorrect(buffer.forced_incorrect());

        self.state.flat_cursor = reconciliation.flat_cursor();
        self.state.typed_count = reconciliation.typed_count();
        self.state.correct_count = reconciliation.correct_count();
        self.reconciliation = reconciliation;
    }

    fn finish(&mut self) {
        self.ticker.cancel();
        self.scoring
            .finish(self.state.typed_count, self.state.correct_count);
    }

    /// Count down one second without consulting the ticker
    ///
    /// For hosts that own their own timer. Returns `true` if this tick finished the run.
    pub fn tick(&mut self) -> bool {
        let finished = self
            .scoring
            .tick(self.state.typed_count, self.state.correct_count);
        if finished {
            self.ticker.cancel();
        }
        finished
    }

    /// Apply every countdown tick due at `now`
    ///
    /// Returns the amount of ticks applied.
    pub fn poll_timer(&mut self, now: Instant) -> u32 {
        let scoring = &mut self.scoring;
        let (typed, correct) = (self.state.typed_count, self.state.correct_count);

        self.ticker.poll_until(now, || {
            if scoring.tick(typed, correct) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Time until the next countdown tick, if the countdown is running
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.ticker.time_until_next(now)
    }

    /// Read-only view of the run for presentation layers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            &self.reference,
            &self.reconciliation,
            self.metrics(),
            self.scoring.remaining_seconds(),
            self.scoring.phase(),
        )
    }

    /// Render the reference line by line
    ///
    /// `line_renderer` receives every line with its classified characters and may skip a
    /// line by returning `None`.
    ///
    /// ```rust
    /// use quill::session::RunSession;
    ///
    /// let session = RunSession::new("ab\ncd").unwrap();
    /// let lines: Vec<String> = session.render_lines(|line| {
    ///     Some(line.contents.iter().map(|ctx| ctx.character).filter(|c| *c != '\n').collect())
    /// });
    ///
    /// assert_eq!(lines, vec!["ab", "cd"]);
    /// ```
    pub fn render_lines<Line, F: FnMut(LineContext) -> Option<Line>>(
        &self,
        line_renderer: F,
    ) -> Vec<Line> {
        self.snapshot()
            .lines(&self.reference)
            .into_iter()
            .filter_map(line_renderer)
            .collect()
    }

    pub const fn reference(&self) -> &ReferenceText {
        &self.reference
    }

    pub const fn state(&self) -> &RunState {
        &self.state
    }

    pub const fn buffer(&self) -> &InputBuffer {
        &self.state.buffer
    }

    pub const fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    pub const fn config(&self) -> &Configuration {
        &self.config
    }

    pub const fn phase(&self) -> Phase {
        self.scoring.phase()
    }

    pub const fn remaining_seconds(&self) -> u32 {
        self.scoring.remaining_seconds()
    }

    pub const fn elapsed_seconds(&self) -> u32 {
        self.scoring.elapsed_seconds()
    }

    pub const fn typed_count(&self) -> usize {
        self.state.typed_count
    }

    pub const fn correct_count(&self) -> usize {
        self.state.correct_count
    }

    pub const fn flat_cursor(&self) -> usize {
        self.state.flat_cursor
    }

    /// Live metrics, frozen once the run is finished
    pub fn metrics(&self) -> Metrics {
        self.scoring
            .metrics(self.state.typed_count, self.state.correct_count)
    }

    /// Is the countdown ticker running
    pub const fn is_timer_active(&self) -> bool {
        self.ticker.is_active()
    }
}
