//! # Scoring Module - Run Lifecycle and Live Metrics
//!
//! Owns the countdown of a run and derives characters-per-minute and accuracy from the
//! typed/correct counts.
//!
//! ## Lifecycle
//!
#![doc = simple_mermaid::mermaid!("../diagrams/run_lifecycle.mmd")]
//!
//! ## Formulas
//!
//! - `elapsed = budget - remaining`
//! - `cpm = round(typed / (elapsed / 60))`, or `0` while no time has elapsed
//! - `accuracy = round(100 * correct / typed)`, or `0` while nothing is typed
//!
//! ```rust
//! use quill::scoring::{Accuracy, Cpm};
//!
//! assert_eq!(Cpm::calculate(100, 30), 200);
//! assert_eq!(Accuracy::calculate(45, 50), 90);
//! ```

use tracing::debug;

/// Phase of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the first accepted keystroke
    #[default]
    Idle,
    /// The countdown is ticking
    Running,
    /// Time is up (or the text is complete); metrics are frozen
    Finished,
}

/// Characters Per Minute
pub struct Cpm;

impl Cpm {
    /// Calculate characters per minute
    ///
    /// * `typed` - How many characters are typed
    /// * `elapsed_seconds` - How many whole seconds have gone by
    ///
    pub fn calculate(typed: usize, elapsed_seconds: u32) -> u32 {
        if elapsed_seconds == 0 {
            return 0;
        }

        let minutes = f64::from(elapsed_seconds) / 60.0;
        (typed as f64 / minutes).round() as u32
    }
}

/// Typing accuracy as a whole percentage
pub struct Accuracy;

impl Accuracy {
    /// Calculate typing accuracy
    ///
    /// * `correct` - How many typed characters are correct
    /// * `typed` - How many characters are typed
    ///
    pub fn calculate(correct: usize, typed: usize) -> u32 {
        if typed == 0 {
            return 0;
        }

        (100.0 * correct as f64 / typed as f64).round() as u32
    }
}

/// Live performance metrics of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub chars_per_minute: u32,
    pub accuracy_percent: u32,
}

impl Metrics {
    pub fn calculate(typed: usize, correct: usize, elapsed_seconds: u32) -> Self {
        Self {
            chars_per_minute: Cpm::calculate(typed, elapsed_seconds),
            accuracy_percent: Accuracy::calculate(correct, typed),
        }
    }
}

/// Countdown state machine of a run
///
/// `Idle → Running` on the first accepted keystroke, `Running → Finished` when the remaining
/// time reaches zero. Metrics are computed live while running and frozen once finished.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    budget: u32,
    remaining: u32,
    phase: Phase,
    frozen: Option<Metrics>,
}

impl ScoringEngine {
    pub const fn new(budget_seconds: u32) -> Self {
        Self {
            budget: budget_seconds,
            remaining: budget_seconds,
            phase: Phase::Idle,
            frozen: None,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn budget_seconds(&self) -> u32 {
        self.budget
    }

    pub const fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    pub const fn elapsed_seconds(&self) -> u32 {
        self.budget - self.remaining
    }

    /// Move from `Idle` to `Running`
    ///
    /// Returns `false` if the run was not idle.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }

        self.phase = Phase::Running;
        debug!(target: "quill::scoring", budget = self.budget, "run started");
        true
    }

    /// Count down one second
    ///
    /// `typed` and `correct` are the counts at the time of the tick; they are frozen into the
    /// final metrics if this tick ends the run. Ticks outside `Running` are ignored.
    ///
    /// Returns `true` if this tick finished the run.
    pub fn tick(&mut self, typed: usize, correct: usize) -> bool {
        if self.phase != Phase::Running {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.finish(typed, correct);
            return true;
        }

        false
    }

    /// End the run now and freeze the metrics for the given counts
    pub fn finish(&mut self, typed: usize, correct: usize) {
        if self.phase == Phase::Finished {
            return;
        }

        let metrics = Metrics::calculate(typed, correct, self.elapsed_seconds());
        self.phase = Phase::Finished;
        self.frozen = Some(metrics);
        debug!(
            target: "quill::scoring",
            cpm = metrics.chars_per_minute,
            accuracy = metrics.accuracy_percent,
            remaining = self.remaining,
            "run finished"
        );
    }

    /// Metrics for the given counts, or the frozen metrics once finished
    pub fn metrics(&self, typed: usize, correct: usize) -> Metrics {
        match (self.phase, self.frozen) {
            (Phase::Idle, _) => Metrics::default(),
            (Phase::Finished, Some(frozen)) => frozen,
            _ => Metrics::calculate(typed, correct, self.elapsed_seconds()),
        }
    }
}
