//! # Quill - Code Typing-Trainer Engine
//!
//! Quill implements the core of a timed code typing test: a multi-line reference snippet is
//! shown, the user reproduces it in a free-form input buffer, and every keystroke is
//! reconciled against the reference to drive live characters-per-minute and accuracy.
//!
//! The engine is presentation agnostic. A front-end feeds it [policy::Key]s and a clock, and
//! reads back a [render::Snapshot] after every change.
//!
//! ## Modules
//!
//! - [reference] - The immutable snippet and its line geometry
//! - [cursor] - Conversion between flat offsets and `(line, column)` positions
//! - [reconcile] - Classification of the input against the reference
//! - [buffer] - The editable input with caret, selection and penalty marks
//! - [policy] - Editing constraints for Tab, Enter, Backspace and line ends
//! - [scoring] - The countdown state machine and metric formulas
//! - [timer] - A cancellable one-second tick source
//! - [session] - A whole run, tying the above together
//! - [render] - Read-only views for presentation layers
//! - [config] - Run settings
//!
//! ## Quick Start
//!
//! ```rust
//! use quill::{Key, RunSession};
//! use web_time::Instant;
//!
//! let mut session = RunSession::new("if x:\n    y").unwrap();
//! let now = Instant::now();
//!
//! for character in "if x:".chars() {
//!     session.handle_key(Key::Char(character), now);
//! }
//! // Enter at the end of a line carries the next line's indentation
//! session.handle_key(Key::Enter, now);
//! session.handle_key(Key::Char('y'), now);
//!
//! assert!(session.reconciliation().is_exact_match());
//! assert_eq!(session.metrics().accuracy_percent, 100);
//! ```

pub mod buffer;
pub mod config;
pub mod cursor;
pub mod policy;
pub mod reconcile;
pub mod reference;
pub mod render;
pub mod scoring;
pub mod session;
pub mod timer;

pub use config::Configuration;
pub use policy::{Edit, Key};
pub use reconcile::Classification;
pub use reference::ReferenceText;
pub use render::Snapshot;
pub use scoring::{Metrics, Phase};
pub use session::RunSession;
