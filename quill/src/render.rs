//! # Render Module - Read-only Views for Presentation Layers
//!
//! Everything a front-end needs to draw a run, derived from the session after every state
//! change. Presentation code only ever reads these values; no engine decision depends on
//! what was drawn.

use crate::cursor::CursorMapper;
use crate::reconcile::{Classification, Reconciliation};
use crate::reference::ReferenceText;
use crate::scoring::{Metrics, Phase};

/// Snapshot of a run, handed to the render sink after every state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// One classification per flat reference index, with the cursor marked `Current`
    pub classifications: Vec<Classification>,
    /// Flat cursor offset (the input length)
    pub flat_cursor: usize,
    /// Topmost reference line to show in a scrolling viewport
    pub scroll_top_line: usize,
    /// Reference line holding the cursor, clamped to the last line
    pub cursor_line: usize,
    pub chars_per_minute: u32,
    pub accuracy_percent: u32,
    pub remaining_seconds: u32,
    pub phase: Phase,
}

impl Snapshot {
    pub(crate) fn new(
        reference: &ReferenceText,
        reconciliation: &Reconciliation,
        metrics: Metrics,
        remaining_seconds: u32,
        phase: Phase,
    ) -> Self {
        let flat_cursor = reconciliation.flat_cursor();
        let cursor_line = CursorMapper::new(reference).clamped_line_index_for(flat_cursor);

        Self {
            classifications: classify_with_cursor(reconciliation, flat_cursor),
            flat_cursor,
            scroll_top_line: scroll_window_top(cursor_line),
            cursor_line,
            chars_per_minute: metrics.chars_per_minute,
            accuracy_percent: metrics.accuracy_percent,
            remaining_seconds,
            phase,
        }
    }

    /// Group the classified characters into the reference's lines
    ///
    /// Each line but the last ends with its line break, so a typed or pending line break
    /// can be shown.
    pub fn lines(&self, reference: &ReferenceText) -> Vec<LineContext> {
        let mut iter = RenderingIterator::new(reference, &self.classifications, self.flat_cursor);

        (0..reference.line_count())
            .map(|line_index| {
                let mut length = reference.line_len(line_index);
                if line_index < reference.last_line_index() {
                    length += 1;
                }

                LineContext {
                    line_index,
                    active_line_offset: line_index as isize - self.cursor_line as isize,
                    contents: iter.by_ref().take(length).collect(),
                }
            })
            .collect()
    }
}

/// Topmost line of the scroll window for a cursor on `cursor_line`
///
/// Keeps one line of context above the cursor's line.
pub const fn scroll_window_top(cursor_line: usize) -> usize {
    cursor_line.saturating_sub(1)
}

/// Copy the classifications and mark the reference index at `flat_cursor` as `Current`
///
/// A cursor at or past the end of the reference marks nothing.
pub fn classify_with_cursor(
    reconciliation: &Reconciliation,
    flat_cursor: usize,
) -> Vec<Classification> {
    let mut classifications = reconciliation.classifications().to_vec();
    if let Some(current) = classifications.get_mut(flat_cursor) {
        *current = Classification::Current;
    }
    classifications
}

/// A single reference character ready to be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderingContext {
    pub character: char,
    pub classification: Classification,
    pub has_cursor: bool,
    /// Flat reference index
    pub index: usize,
}

/// One reference line ready to be drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineContext {
    pub line_index: usize,
    /// Distance from the cursor's line, negative above it
    pub active_line_offset: isize,
    pub contents: Vec<RenderingContext>,
}

/// Iterator for rendering contexts
pub struct RenderingIterator<'a> {
    characters: &'a [char],
    classifications: &'a [Classification],
    cursor_position: usize,
    index: usize,
}

impl<'a> RenderingIterator<'a> {
    pub fn new(
        reference: &'a ReferenceText,
        classifications: &'a [Classification],
        cursor_position: usize,
    ) -> Self {
        Self {
            characters: reference.chars(),
            classifications,
            cursor_position,
            index: 0,
        }
    }
}

impl ExactSizeIterator for RenderingIterator<'_> {}

impl std::iter::FusedIterator for RenderingIterator<'_> {}

impl Iterator for RenderingIterator<'_> {
    type Item = RenderingContext;

    fn next(&mut self) -> Option<Self::Item> {
        let character = *self.characters.get(self.index)?;
        let classification = self
            .classifications
            .get(self.index)
            .copied()
            .unwrap_or_default();

        let context = RenderingContext {
            character,
            classification,
            has_cursor: self.index == self.cursor_position,
            index: self.index,
        };

        self.index += 1;
        Some(context)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.characters.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(reference: &ReferenceText, input: &str) -> Snapshot {
        let input: Vec<char> = input.chars().collect();
        let reconciliation = Reconciliation::compute(&input, reference);
        Snapshot::new(reference, &reconciliation, Metrics::default(), 60, Phase::Running)
    }

    #[test]
    fn test_current_marks_cursor() {
        let reference = ReferenceText::new("abc").unwrap();
        let snapshot = snapshot(&reference, "ax");

        assert_eq!(
            snapshot.classifications,
            vec![
                Classification::Correct,
                Classification::Incorrect,
                Classification::Current,
            ]
        );
        assert_eq!(snapshot.flat_cursor, 2);
    }

    #[test]
    fn test_cursor_past_end_marks_nothing() {
        let reference = ReferenceText::new("ab").unwrap();
        let snapshot = snapshot(&reference, "abcd");

        assert!(
            !snapshot
                .classifications
                .contains(&Classification::Current)
        );
        assert_eq!(snapshot.flat_cursor, 4);
        assert_eq!(snapshot.cursor_line, 0);
    }

    #[test]
    fn test_scroll_window() {
        let reference = ReferenceText::new("a\nb\nc\nd").unwrap();

        assert_eq!(snapshot(&reference, "").scroll_top_line, 0);
        assert_eq!(snapshot(&reference, "a\n").scroll_top_line, 0);
        assert_eq!(snapshot(&reference, "a\nb\n").scroll_top_line, 1);
        assert_eq!(snapshot(&reference, "a\nb\nc\nd").scroll_top_line, 2);
        // Input longer than the reference clamps to the last line
        assert_eq!(snapshot(&reference, "a\nb\nc\nd\n\n\n").scroll_top_line, 2);
    }

    #[test]
    fn test_lines() {
        let reference = ReferenceText::new("ab\ncd").unwrap();
        let snapshot = snapshot(&reference, "ab\n");
        let lines = snapshot.lines(&reference);

        assert_eq!(lines.len(), 2);

        let first: String = lines[0].contents.iter().map(|ctx| ctx.character).collect();
        assert_eq!(first, "ab\n");
        assert_eq!(lines[0].active_line_offset, -1);

        let second = &lines[1];
        assert_eq!(second.active_line_offset, 0);
        assert_eq!(second.contents.len(), 2);
        assert!(second.contents[0].has_cursor);
        assert_eq!(second.contents[0].index, 3);
        assert_eq!(second.contents[0].classification, Classification::Current);
        assert_eq!(second.contents[1].classification, Classification::Pending);
    }

    #[test]
    fn test_rendering_iterator_size() {
        let reference = ReferenceText::new("hello").unwrap();
        let classifications = vec![Classification::Pending; 5];
        let mut iter = RenderingIterator::new(&reference, &classifications, 0);

        assert_eq!(iter.len(), 5);
        iter.next();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.count(), 4);
    }
}
