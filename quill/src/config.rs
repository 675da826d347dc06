//! # Configuration Module - Run Behavior Settings
//!
//! This module provides the options that shape a single typing run: how long the
//! countdown lasts, what the Tab key inserts and which of the exercise's editing
//! constraints are active.
//!
//! ## Usage
//!
//! ```rust
//! use quill::config::Configuration;
//!
//! // Use default configuration
//! let config = Configuration::default();
//! assert_eq!(config.time_budget_seconds, 60);
//!
//! // Free-form variant: allow typing past the end of a reference line
//! let config = Configuration {
//!     block_past_line_end: false,
//!     ..Configuration::default()
//! };
//! ```

/// Runtime configuration for a typing run
///
/// All settings have defaults matching the classic one-minute code typing test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Length of the countdown in whole seconds
    ///
    /// **Default**: 60 seconds
    pub time_budget_seconds: u32,

    /// Amount of spaces the Tab key inserts
    ///
    /// **Default**: 4
    pub tab_width: usize,

    /// Reject printable keys while the caret sits exactly at the end of a reference line
    ///
    /// Forces the user to press Enter to advance to the next line instead of overtyping
    /// past the line boundary. Enter, Backspace, Tab and pastes are never rejected.
    ///
    /// **Default**: true
    pub block_past_line_end: bool,

    /// Let a single Backspace undo an auto-indented line break
    ///
    /// When enabled, Backspace directly after an Enter that inserted a newline plus the next
    /// line's indentation removes both in one action. When disabled, Backspace always deletes
    /// a single character.
    ///
    /// **Default**: true
    pub collapse_auto_indent: bool,

    /// Finish the run as soon as the input matches the reference exactly
    ///
    /// When disabled the run only ends when the countdown reaches zero.
    ///
    /// **Default**: false
    pub finish_on_completion: bool,
}

impl Default for Configuration {
    /// Create configuration with the classic defaults
    ///
    /// # Default Values
    ///
    /// - `time_budget_seconds`: 60
    /// - `tab_width`: 4
    /// - `block_past_line_end`: true
    /// - `collapse_auto_indent`: true
    /// - `finish_on_completion`: false
    fn default() -> Self {
        Self {
            time_budget_seconds: 60,
            tab_width: 4,
            block_past_line_end: true,
            collapse_auto_indent: true,
            finish_on_completion: false,
        }
    }
}
