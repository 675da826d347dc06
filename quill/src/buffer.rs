//! # Buffer Module - The User's Raw Input
//!
//! Stores what the user has produced so far, together with a caret and an optional
//! selection. The buffer knows nothing about the reference text; it is edited by the
//! [EditPolicy](crate::policy::EditPolicy) and then handed to the reconciler.
//!
//! Every character carries a "forced incorrect" mark. Marks are inserted and removed together
//! with their characters, so a penalty stays attached to the character it was given for no
//! matter what is edited around it.

use std::ops::Range;

/// Editable input buffer with caret and selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    characters: Vec<char>,
    forced_incorrect: Vec<bool>,
    /// Insertion point, `0..=characters.len()`
    caret: usize,
    /// Other end of the selection, if any
    anchor: Option<usize>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer contents
    pub fn chars(&self) -> &[char] {
        &self.characters
    }

    /// Penalty marks, aligned with [Self::chars]
    pub fn forced_incorrect(&self) -> &[bool] {
        &self.forced_incorrect
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Current caret offset
    pub const fn caret(&self) -> usize {
        self.caret
    }

    /// The selected range, empty when nothing is selected
    pub fn selection(&self) -> Range<usize> {
        match self.anchor {
            Some(anchor) => anchor.min(self.caret)..anchor.max(self.caret),
            None => self.caret..self.caret,
        }
    }

    pub fn has_selection(&self) -> bool {
        !self.selection().is_empty()
    }

    /// Insert `text` in place of the selection and move the caret after it
    ///
    /// Returns the range the inserted text now occupies.
    pub fn insert(&mut self, text: &str) -> Range<usize> {
        self.insert_marked(text, false)
    }

    /// Append a character that must always count as a mistake
    ///
    /// The character goes to the end of the input, whatever the caret position, so nothing
    /// already typed shifts onto a different reference index. The selection is dropped and the
    /// caret follows the appended character.
    pub fn push_penalty(&mut self, character: char) -> Range<usize> {
        self.clear_selection();

        let start = self.characters.len();
        self.characters.push(character);
        self.forced_incorrect.push(true);
        self.caret = start + 1;

        start..self.caret
    }

    fn insert_marked(&mut self, text: &str, forced: bool) -> Range<usize> {
        self.delete_selection();

        let start = self.caret;
        let inserted: Vec<char> = text.chars().collect();
        let count = inserted.len();

        self.characters.splice(start..start, inserted);
        self.forced_incorrect
            .splice(start..start, std::iter::repeat_n(forced, count));
        self.caret = start + count;

        start..self.caret
    }

    /// Delete the selection, or the character before the caret
    ///
    /// Returns `false` if there was nothing to delete.
    pub fn delete_backward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }

        if self.caret == 0 {
            return false;
        }

        self.delete_range(self.caret - 1..self.caret)
    }

    /// Delete an explicit range, clamped to the buffer
    ///
    /// The caret is moved to the start of the range if it was inside or after it.
    /// Returns `false` if the clamped range is empty.
    pub fn delete_range(&mut self, range: Range<usize>) -> bool {
        let end = range.end.min(self.characters.len());
        let start = range.start.min(end);
        if start == end {
            return false;
        }

        self.characters.drain(start..end);
        self.forced_incorrect.drain(start..end);
        self.anchor = None;

        if self.caret >= end {
            self.caret -= end - start;
        } else if self.caret > start {
            self.caret = start;
        }

        true
    }

    fn delete_selection(&mut self) -> bool {
        let selection = self.selection();
        self.anchor = None;
        if selection.is_empty() {
            return false;
        }
        self.delete_range(selection)
    }

    /// Drop the selection, keeping the caret where it is
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Drop the selection and put the caret at its start
    pub fn collapse_to_selection_start(&mut self) {
        self.caret = self.selection().start;
        self.anchor = None;
    }

    /// Move the caret one character left
    ///
    /// With `extend`, the selection grows or shrinks instead of being dropped.
    /// Returns `false` if nothing changed.
    pub fn move_left(&mut self, extend: bool) -> bool {
        let target = self.caret.saturating_sub(1);
        self.move_to(target, extend)
    }

    /// Move the caret one character right
    pub fn move_right(&mut self, extend: bool) -> bool {
        let target = (self.caret + 1).min(self.characters.len());
        self.move_to(target, extend)
    }

    /// Move the caret to the start of the buffer
    pub fn move_home(&mut self, extend: bool) -> bool {
        self.move_to(0, extend)
    }

    /// Move the caret to the end of the buffer
    pub fn move_end(&mut self, extend: bool) -> bool {
        self.move_to(self.characters.len(), extend)
    }

    fn move_to(&mut self, target: usize, extend: bool) -> bool {
        let had_selection = self.has_selection();

        if extend {
            self.anchor.get_or_insert(self.caret);
        } else {
            self.anchor = None;
        }

        let moved = target != self.caret;
        self.caret = target;

        if self.anchor == Some(self.caret) {
            self.anchor = None;
        }

        moved || had_selection != self.has_selection()
    }
}

impl From<&str> for InputBuffer {
    /// Buffer holding `text` with the caret at the end
    fn from(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.insert(text);
        buffer
    }
}

impl std::fmt::Display for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.characters.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = InputBuffer::new();

        assert_eq!(buffer.insert("abc"), 0..3);
        assert_eq!(buffer.caret(), 3);

        assert!(buffer.delete_backward());
        assert_eq!(buffer.to_string(), "ab");
        assert_eq!(buffer.caret(), 2);

        assert!(buffer.delete_backward());
        assert!(buffer.delete_backward());
        assert!(!buffer.delete_backward());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut buffer = InputBuffer::from("ad");
        buffer.move_left(false);

        assert_eq!(buffer.insert("bc"), 1..3);
        assert_eq!(buffer.to_string(), "abcd");
        assert_eq!(buffer.caret(), 3);
    }

    #[test]
    fn test_selection_is_replaced() {
        let mut buffer = InputBuffer::from("hello");
        buffer.move_left(true);
        buffer.move_left(true);
        assert_eq!(buffer.selection(), 3..5);

        buffer.insert("p!");
        assert_eq!(buffer.to_string(), "help!");
        assert!(!buffer.has_selection());
        assert_eq!(buffer.caret(), 5);
    }

    #[test]
    fn test_backspace_deletes_selection() {
        let mut buffer = InputBuffer::from("hello");
        buffer.move_home(false);
        buffer.move_right(true);
        buffer.move_right(true);

        assert!(buffer.delete_backward());
        assert_eq!(buffer.to_string(), "llo");
        assert_eq!(buffer.caret(), 0);
    }

    #[test]
    fn test_penalty_marks_follow_characters() {
        let mut buffer = InputBuffer::from("ab");
        buffer.push_penalty(' ');
        buffer.insert("c");
        assert_eq!(buffer.forced_incorrect(), &[false, false, true, false]);

        // Insert before the penalty, mark shifts with its character
        buffer.move_home(false);
        buffer.insert("x");
        assert_eq!(buffer.forced_incorrect(), &[false, false, false, true, false]);

        // Delete the penalty itself
        assert!(buffer.delete_range(3..4));
        assert_eq!(buffer.forced_incorrect(), &[false, false, false, false]);
        assert_eq!(buffer.to_string(), "xabc");
    }

    #[test]
    fn test_penalty_appends_after_moved_caret() {
        let mut buffer = InputBuffer::from("ac");
        buffer.move_home(false);
        buffer.move_right(true);

        assert_eq!(buffer.push_penalty(' '), 2..3);
        assert_eq!(buffer.to_string(), "ac ");
        assert_eq!(buffer.caret(), 3);
        assert!(!buffer.has_selection());
        assert_eq!(buffer.forced_incorrect(), &[false, false, true]);
    }

    #[test]
    fn test_clear_selection_keeps_caret() {
        let mut buffer = InputBuffer::from("abc");
        buffer.move_left(true);
        buffer.move_left(true);
        assert_eq!(buffer.selection(), 1..3);

        buffer.clear_selection();
        assert!(!buffer.has_selection());
        assert_eq!(buffer.caret(), 1);
    }

    #[test]
    fn test_delete_range_moves_caret() {
        let mut buffer = InputBuffer::from("abcdef");
        assert!(buffer.delete_range(1..3));
        assert_eq!(buffer.caret(), 4);

        buffer.move_home(false);
        buffer.move_right(false);
        assert!(buffer.delete_range(0..3));
        assert_eq!(buffer.caret(), 0);
        assert_eq!(buffer.to_string(), "f");

        assert!(!buffer.delete_range(5..9));
    }

    #[test]
    fn test_caret_motion_at_boundaries() {
        let mut buffer = InputBuffer::from("ab");

        assert!(!buffer.move_right(false));
        assert!(!buffer.move_end(false));
        assert!(buffer.move_home(false));
        assert!(!buffer.move_left(false));
    }

    #[test]
    fn test_selection_collapses_when_caret_returns_to_anchor() {
        let mut buffer = InputBuffer::from("ab");
        assert!(buffer.move_left(true));
        assert!(buffer.has_selection());
        assert!(buffer.move_right(true));
        assert!(!buffer.has_selection());
    }

    #[test]
    fn test_unicode() {
        let mut buffer = InputBuffer::from("café");
        assert_eq!(buffer.len(), 4);
        buffer.delete_backward();
        assert_eq!(buffer.to_string(), "caf");
    }
}
