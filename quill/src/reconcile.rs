//! # Reconcile Module - Input Against Reference
//!
//! Compares the raw input buffer with the reference text and classifies every reference
//! character. The comparison is a full, stateless recompute: the same buffer always yields
//! the same result, and nothing is cached between keystrokes.
//!
//! ## Classification Law
//!
//! For every flat index `i` of the reference:
//!
//! - `Pending` if `i >= input.len()`
//! - `Correct` if `input[i] == reference[i]`
//! - `Incorrect` otherwise
//!
//! ```rust
//! use quill::{reconcile::{Classification, Reconciliation}, reference::ReferenceText};
//!
//! let reference = ReferenceText::new("let").unwrap();
//! let input: Vec<char> = "lx".chars().collect();
//!
//! let result = Reconciliation::compute(&input, &reference);
//! assert_eq!(
//!     result.classifications(),
//!     &[Classification::Correct, Classification::Incorrect, Classification::Pending]
//! );
//! assert_eq!(result.typed_count(), 2);
//! assert_eq!(result.correct_count(), 1);
//! ```

use crate::reference::ReferenceText;

/// Correctness of a single reference character
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Not typed yet
    #[default]
    Pending,
    /// Typed and matching the reference
    Correct,
    /// Typed and not matching the reference
    Incorrect,
    /// The next character to be typed
    ///
    /// Never produced by [Reconciliation::compute]; only render snapshots mark the
    /// cursor position with it.
    Current,
}

/// Derived view of an input buffer against a reference text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// One entry per flat reference index
    classifications: Vec<Classification>,
    typed: usize,
    correct: usize,
}

impl Reconciliation {
    /// Classify every reference character against `input`
    ///
    /// `input` may be shorter than, equal to, or longer than the reference. Input past the
    /// end of the reference counts as typed but has no reference index to classify.
    pub fn compute(input: &[char], reference: &ReferenceText) -> Self {
        let classifications: Vec<Classification> = reference
            .chars()
            .iter()
            .enumerate()
            .map(|(index, expected)| match input.get(index) {
                None => Classification::Pending,
                Some(typed) if typed == expected => Classification::Correct,
                Some(_) => Classification::Incorrect,
            })
            .collect();

        let correct = classifications
            .iter()
            .filter(|&&class| class == Classification::Correct)
            .count();

        Self {
            classifications,
            typed: input.len(),
            correct,
        }
    }

    /// Downgrade marked positions from `Correct` to `Incorrect`
    ///
    /// `forced` is aligned with the input buffer: `forced[i]` marks input character `i` as a
    /// penalty that must never count as correct, whatever the reference holds there.
    pub fn apply_forced_incorrect(&mut self, forced: &[bool]) {
        for (class, _) in self
            .classifications
            .iter_mut()
            .zip(forced)
            .filter(|(_, forced)| **forced)
        {
            if *class == Classification::Correct {
                *class = Classification::Incorrect;
                self.correct -= 1;
            }
        }
    }

    /// Classification of every flat reference index
    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    /// Classification at a flat reference index
    pub fn classification_at(&self, index: usize) -> Option<Classification> {
        self.classifications.get(index).copied()
    }

    /// Amount of characters typed, which is the input length
    pub const fn typed_count(&self) -> usize {
        self.typed
    }

    /// Amount of reference characters classified as correct
    pub const fn correct_count(&self) -> usize {
        self.correct
    }

    /// Amount of reference characters classified as incorrect
    pub fn incorrect_count(&self) -> usize {
        self.classifications
            .iter()
            .filter(|&&class| class == Classification::Incorrect)
            .count()
    }

    /// Flat cursor offset, which always equals the input length
    pub const fn flat_cursor(&self) -> usize {
        self.typed
    }

    /// True if every reference character is typed correctly and nothing more was typed
    pub fn is_exact_match(&self) -> bool {
        self.typed == self.classifications.len() && self.correct == self.typed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_classification_law() {
        let reference = ReferenceText::new("ab\ncd").unwrap();
        let buffers = ["", "a", "x", "ab", "ab\n", "ab c", "ab\ncd", "ab\ncde", "zzzzzzzz"];

        for buffer in buffers {
            let input = chars(buffer);
            let result = Reconciliation::compute(&input, &reference);

            assert_eq!(result.classifications().len(), reference.flat_len());
            for (index, class) in result.classifications().iter().enumerate() {
                let expected = match input.get(index) {
                    None => Classification::Pending,
                    Some(&c) if Some(c) == reference.char_at(index) => Classification::Correct,
                    Some(_) => Classification::Incorrect,
                };
                assert_eq!(*class, expected, "buffer {buffer:?} index {index}");
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let reference = ReferenceText::new("while x:\n    x -= 1").unwrap();
        let input = chars("whilr x:\n    x");

        let first = Reconciliation::compute(&input, &reference);
        let second = Reconciliation::compute(&input, &reference);

        assert_eq!(first, second);
    }

    #[test]
    fn test_counts() {
        let reference = ReferenceText::new("hello").unwrap();
        let result = Reconciliation::compute(&chars("hxllo"), &reference);

        assert_eq!(result.typed_count(), 5);
        assert_eq!(result.correct_count(), 4);
        assert_eq!(result.incorrect_count(), 1);
        assert_eq!(result.flat_cursor(), 5);
        assert!(!result.is_exact_match());
    }

    #[test]
    fn test_input_longer_than_reference() {
        let reference = ReferenceText::new("ab").unwrap();
        let result = Reconciliation::compute(&chars("abcdef"), &reference);

        assert_eq!(result.classifications().len(), 2);
        assert_eq!(result.typed_count(), 6);
        assert_eq!(result.correct_count(), 2);
        assert_eq!(result.flat_cursor(), 6);
        assert!(!result.is_exact_match());
    }

    #[test]
    fn test_exact_match() {
        let reference = ReferenceText::new("ab\ncd").unwrap();
        let result = Reconciliation::compute(&chars("ab\ncd"), &reference);

        assert!(result.is_exact_match());
        assert_eq!(result.incorrect_count(), 0);
    }

    #[test]
    fn test_forced_incorrect_overrides_matching_space() {
        let reference = ReferenceText::new("a b").unwrap();
        let mut result = Reconciliation::compute(&chars("a "), &reference);
        assert_eq!(result.correct_count(), 2);

        result.apply_forced_incorrect(&[false, true]);

        assert_eq!(result.correct_count(), 1);
        assert_eq!(result.typed_count(), 2);
        assert_eq!(
            result.classification_at(1),
            Some(Classification::Incorrect)
        );
    }

    #[test]
    fn test_forced_incorrect_on_wrong_character_is_noop() {
        let reference = ReferenceText::new("abc").unwrap();
        let mut result = Reconciliation::compute(&chars("a "), &reference);

        result.apply_forced_incorrect(&[false, true]);

        assert_eq!(result.correct_count(), 1);
        assert_eq!(result.incorrect_count(), 1);
    }
}
