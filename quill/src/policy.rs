//! # Policy Module - Key Handling Before Reconciliation
//!
//! Intercepts key events and turns them into buffer edits. Plain characters are inserted
//! as-is; Tab, Enter and Backspace get special treatment, and the exercise's line-end rule
//! rejects characters that would overtype past the end of a reference line.
//!
//! ## Decision Table
//!
#![doc = simple_mermaid::mermaid!("../diagrams/edit_policy.mmd")]
//!
//! | Key         | Caret position                         | Effect                                   |
//! |-------------|----------------------------------------|------------------------------------------|
//! | Tab         | anywhere                               | replace selection with `tab_width` spaces |
//! | Enter       | end of the reference line              | newline + next line's indentation         |
//! | Enter       | elsewhere                              | one space appended, counted as a mistake  |
//! | Backspace   | right after an auto-indent             | remove newline and indentation at once    |
//! | Backspace   | elsewhere                              | delete selection or one character         |
//! | Char        | end of a reference line (rule enabled) | rejected                                  |
//! | Char        | elsewhere                              | replace selection with the character      |
//!
//! The line-end rule is a property of the exercise, not of text editing in general, which
//! is why it lives here and can be switched off through
//! [Configuration::block_past_line_end].

use std::ops::Range;

use tracing::{debug, trace};

use crate::buffer::InputBuffer;
use crate::config::Configuration;
use crate::cursor::{CursorMapper, LinePosition};
use crate::reference::{ReferenceText, normalize_line_endings};

/// A key event as seen by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable character. `'\n'` acts as [Key::Enter] and `'\t'` as [Key::Tab].
    Char(char),
    Tab,
    Enter,
    Backspace,
    Left,
    Right,
    SelectLeft,
    SelectRight,
    Home,
    End,
    /// Text pasted in one go
    Paste(String),
}

/// What a key did to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// The key was refused by the line-end rule
    Rejected,
    /// The key had nothing to act on
    Unchanged,
    /// Only the caret or selection changed
    CaretMoved,
    /// The buffer contents changed and must be reconciled
    Changed,
}

impl Edit {
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Key-event state machine applied before reconciliation
#[derive(Debug, Clone)]
pub struct EditPolicy {
    tab_width: usize,
    block_past_line_end: bool,
    collapse_auto_indent: bool,
    /// Range of the newline and indentation inserted by the last key, if it was an auto-indent
    last_auto_indent: Option<Range<usize>>,
}

impl EditPolicy {
    pub fn new(config: &Configuration) -> Self {
        Self {
            tab_width: config.tab_width,
            block_past_line_end: config.block_past_line_end,
            collapse_auto_indent: config.collapse_auto_indent,
            last_auto_indent: None,
        }
    }

    /// Apply `key` to `buffer`
    ///
    /// Never fails: every key is either absorbed into the buffer, ignored, or rejected by the
    /// line-end rule. Callers must reconcile the buffer again whenever the returned edit
    /// [is changed](Edit::is_changed).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quill::{buffer::InputBuffer, config::Configuration, reference::ReferenceText};
    /// use quill::policy::{Edit, EditPolicy, Key};
    ///
    /// let reference = ReferenceText::new("if x:\n    pass").unwrap();
    /// let mut policy = EditPolicy::new(&Configuration::default());
    /// let mut buffer = InputBuffer::from("if x:");
    ///
    /// // Typing past the end of the line is refused
    /// assert_eq!(policy.apply(Key::Char('y'), &mut buffer, &reference), Edit::Rejected);
    ///
    /// // Enter at the end of the line brings the next line's indentation along
    /// assert_eq!(policy.apply(Key::Enter, &mut buffer, &reference), Edit::Changed);
    /// assert_eq!(buffer.to_string(), "if x:\n    ");
    /// ```
    pub fn apply(&mut self, key: Key, buffer: &mut InputBuffer, reference: &ReferenceText) -> Edit {
        let pending_indent = self.last_auto_indent.take();

        let edit = match key {
            Key::Enter | Key::Char('\n') => self.enter(buffer, reference),
            Key::Tab | Key::Char('\t') => self.tab(buffer),
            Key::Backspace => self.backspace(buffer, pending_indent.clone()),
            Key::Char(character) => self.character(character, buffer, reference),
            Key::Paste(text) => Self::paste(&text, buffer),
            Key::Left => Self::motion(buffer.move_left(false)),
            Key::Right => Self::motion(buffer.move_right(false)),
            Key::SelectLeft => Self::motion(buffer.move_left(true)),
            Key::SelectRight => Self::motion(buffer.move_right(true)),
            Key::Home => Self::motion(buffer.move_home(false)),
            Key::End => Self::motion(buffer.move_end(false)),
        };

        // A refused or empty key leaves the buffer as it was, so an auto-indent can still be
        // collapsed afterwards.
        if matches!(edit, Edit::Rejected | Edit::Unchanged) {
            self.last_auto_indent = pending_indent;
        }

        edit
    }

    fn tab(&self, buffer: &mut InputBuffer) -> Edit {
        let inserted = buffer.insert(&" ".repeat(self.tab_width));
        if inserted.is_empty() {
            Edit::Unchanged
        } else {
            Edit::Changed
        }
    }

    fn enter(&mut self, buffer: &mut InputBuffer, reference: &ReferenceText) -> Edit {
        buffer.collapse_to_selection_start();

        let position = LinePosition::in_chars(buffer.chars(), buffer.caret());
        let reference_line_len = if position.line < reference.line_count() {
            reference.line_len(position.line)
        } else {
            0
        };

        if position.column == reference_line_len {
            let indent = CursorMapper::new(reference).next_line_indent(position.line);
            let inserted = buffer.insert(&format!("\n{indent}"));
            trace!(
                target: "quill::policy",
                line = position.line,
                indent = indent.len(),
                "auto-indent"
            );
            self.last_auto_indent = Some(inserted);
        } else {
            buffer.push_penalty(' ');
            debug!(
                target: "quill::policy",
                line = position.line,
                column = position.column,
                expected_column = reference_line_len,
                "mid-line enter penalized"
            );
        }

        Edit::Changed
    }

    fn backspace(&self, buffer: &mut InputBuffer, pending_indent: Option<Range<usize>>) -> Edit {
        if let Some(range) = pending_indent
            && self.collapse_auto_indent
            && !buffer.has_selection()
            && range.end == buffer.caret()
            && buffer.chars().get(range.start) == Some(&'\n')
        {
            buffer.delete_range(range);
            return Edit::Changed;
        }

        if buffer.delete_backward() {
            Edit::Changed
        } else {
            Edit::Unchanged
        }
    }

    fn character(
        &self,
        character: char,
        buffer: &mut InputBuffer,
        reference: &ReferenceText,
    ) -> Edit {
        if self.block_past_line_end
            && !buffer.has_selection()
            && CursorMapper::new(reference).is_at_line_end(buffer.caret())
        {
            trace!(target: "quill::policy", caret = buffer.caret(), %character, "rejected at line end");
            return Edit::Rejected;
        }

        let mut encoded = [0; 4];
        buffer.insert(character.encode_utf8(&mut encoded));
        Edit::Changed
    }

    fn paste(text: &str, buffer: &mut InputBuffer) -> Edit {
        let text = normalize_line_endings(text);
        if text.is_empty() {
            return Edit::Unchanged;
        }

        buffer.insert(&text);
        Edit::Changed
    }

    const fn motion(moved: bool) -> Edit {
        if moved {
            Edit::CaretMoved
        } else {
            Edit::Unchanged
        }
    }
}
