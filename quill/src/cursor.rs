//! # Cursor Module - Flat Offsets and Line Positions
//!
//! Converts between flat offsets into a [ReferenceText] and `(line, column)` positions, and
//! answers the line-boundary questions the edit policy and the renderer ask.
//!
//! Offsets up to and including the flat length are valid; `flat_len` itself is the end of the
//! text and belongs to the last line. Asking for anything past that is a programming error
//! and panics, except in the `clamped_*` helpers meant for rendering paths, where the input
//! buffer may legitimately be longer than the reference.

use crate::reference::ReferenceText;

/// A position in a line-structured text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LinePosition {
    pub line: usize,
    pub column: usize,
}

impl LinePosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of `offset` inside arbitrary text, counting line feeds before it
    ///
    /// Used on the user's own input, which has no line table. Offsets past the end of
    /// `chars` are treated as the end of the text.
    pub fn in_chars(chars: &[char], offset: usize) -> Self {
        let before = &chars[..offset.min(chars.len())];
        let line = before.iter().filter(|&&c| c == '\n').count();
        let column = before
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(before.len(), |newline| before.len() - newline - 1);

        Self { line, column }
    }
}

/// Pure offset/line queries over a [ReferenceText]
#[derive(Debug, Clone, Copy)]
pub struct CursorMapper<'a> {
    reference: &'a ReferenceText,
}

impl<'a> CursorMapper<'a> {
    pub const fn new(reference: &'a ReferenceText) -> Self {
        Self { reference }
    }

    /// Index of the line containing `offset`
    ///
    /// Defined as the number of line breaks strictly before `offset`, so a line break belongs
    /// to the line it terminates and `flat_len` belongs to the last line.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is greater than the flat length of the reference.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quill::{cursor::CursorMapper, reference::ReferenceText};
    ///
    /// let reference = ReferenceText::new("ab\ncd").unwrap();
    /// let mapper = CursorMapper::new(&reference);
    ///
    /// assert_eq!(mapper.line_index_for(2), 0); // the line break ending "ab"
    /// assert_eq!(mapper.line_index_for(3), 1);
    /// assert_eq!(mapper.line_index_for(5), 1); // end of text
    /// ```
    #[track_caller]
    pub fn line_index_for(&self, offset: usize) -> usize {
        self.assert_offset(offset);
        self.line_index_unchecked(offset)
    }

    /// Like [Self::line_index_for], but offsets past the end map to the last line
    pub fn clamped_line_index_for(&self, offset: usize) -> usize {
        self.line_index_unchecked(offset.min(self.reference.flat_len()))
    }

    /// Line and column of `offset`
    ///
    /// # Panics
    ///
    /// Panics if `offset` is greater than the flat length of the reference.
    #[track_caller]
    pub fn position_of(&self, offset: usize) -> LinePosition {
        let line = self.line_index_for(offset);
        LinePosition {
            line,
            column: offset - self.reference.flat_offset_of_line_start(line),
        }
    }

    /// Flat offset of a line position
    ///
    /// The column may equal the line length (the position of the line break).
    ///
    /// # Panics
    ///
    /// Panics if the line does not exist or the column is past the end of the line.
    #[track_caller]
    pub fn offset_of(&self, position: LinePosition) -> usize {
        let length = self.reference.line_len(position.line);
        assert!(
            position.column <= length,
            "column {} out of range for line {} of length {length}",
            position.column,
            position.line
        );
        self.reference.flat_offset_of_line_start(position.line) + position.column
    }

    /// True if `offset` is exactly the end of the line containing it
    ///
    /// Offsets past the end of the reference are on no line, and never at a line end.
    pub fn is_at_line_end(&self, offset: usize) -> bool {
        if offset > self.reference.flat_len() {
            return false;
        }

        let line = self.line_index_unchecked(offset);
        offset
            == self.reference.flat_offset_of_line_start(line) + self.reference.line_len(line)
    }

    /// True if `offset` is exactly the start of the line containing it
    pub fn is_at_line_start(&self, offset: usize) -> bool {
        if offset > self.reference.flat_len() {
            return false;
        }

        let line = self.line_index_unchecked(offset);
        offset == self.reference.flat_offset_of_line_start(line)
    }

    /// Leading whitespace of the line after `line_index`
    ///
    /// Returns an empty string if `line_index` is the last line (or past it).
    ///
    /// ```rust
    /// use quill::{cursor::CursorMapper, reference::ReferenceText};
    ///
    /// let reference = ReferenceText::new("if x:\n    y()").unwrap();
    /// let mapper = CursorMapper::new(&reference);
    ///
    /// assert_eq!(mapper.next_line_indent(0), "    ");
    /// assert_eq!(mapper.next_line_indent(1), "");
    /// ```
    pub fn next_line_indent(&self, line_index: usize) -> &'a str {
        line_index
            .checked_add(1)
            .and_then(|next| self.reference.get_line(next))
            .map_or("", leading_whitespace)
    }

    fn line_index_unchecked(&self, offset: usize) -> usize {
        // Every line start at or before the offset means one line break before it,
        // except for the first line which starts at 0.
        self.reference
            .line_starts()
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }

    #[track_caller]
    fn assert_offset(&self, offset: usize) {
        assert!(
            offset <= self.reference.flat_len(),
            "offset {offset} out of range for reference text of length {}",
            self.reference.flat_len()
        );
    }
}

/// The leading whitespace run of a line
pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceText {
        // Lines: "fn main() {" (11), "    run();" (10), "}" (1)
        ReferenceText::new("fn main() {\n    run();\n}").unwrap()
    }

    #[test]
    fn test_line_index_for() {
        let reference = reference();
        let mapper = CursorMapper::new(&reference);

        assert_eq!(mapper.line_index_for(0), 0);
        assert_eq!(mapper.line_index_for(11), 0);
        assert_eq!(mapper.line_index_for(12), 1);
        assert_eq!(mapper.line_index_for(22), 1);
        assert_eq!(mapper.line_index_for(23), 2);
        // End of text
        assert_eq!(mapper.line_index_for(24), 2);
    }

    #[test]
    fn test_line_index_counts_separators_before_offset() {
        let reference = reference();
        let mapper = CursorMapper::new(&reference);
        let chars = reference.chars();

        for offset in 0..=reference.flat_len() {
            let separators = chars[..offset].iter().filter(|&&c| c == '\n').count();
            assert_eq!(mapper.line_index_for(offset), separators, "offset {offset}");
        }
    }

    #[test]
    fn test_position_round_trip() {
        let reference = reference();
        let mapper = CursorMapper::new(&reference);

        let position = mapper.position_of(16);
        assert_eq!(position, LinePosition::new(1, 4));
        assert_eq!(mapper.offset_of(position), 16);
        assert_eq!(mapper.offset_of(LinePosition::new(2, 1)), 24);
    }

    #[test]
    fn test_line_boundaries() {
        let reference = reference();
        let mapper = CursorMapper::new(&reference);

        assert!(mapper.is_at_line_start(0));
        assert!(!mapper.is_at_line_end(0));
        assert!(mapper.is_at_line_end(11));
        assert!(mapper.is_at_line_start(12));
        assert!(mapper.is_at_line_end(22));
        assert!(!mapper.is_at_line_end(21));
        assert!(mapper.is_at_line_end(24));

        // Past the end is on no line
        assert!(!mapper.is_at_line_end(25));
        assert!(!mapper.is_at_line_start(25));
    }

    #[test]
    fn test_empty_lines_are_both_start_and_end() {
        let reference = ReferenceText::new("a\n\nb").unwrap();
        let mapper = CursorMapper::new(&reference);

        assert!(mapper.is_at_line_start(2));
        assert!(mapper.is_at_line_end(2));
        assert_eq!(mapper.line_index_for(2), 1);
    }

    #[test]
    fn test_next_line_indent() {
        let reference = ReferenceText::new("a:\n\tb\n        c\nd").unwrap();
        let mapper = CursorMapper::new(&reference);

        assert_eq!(mapper.next_line_indent(0), "\t");
        assert_eq!(mapper.next_line_indent(1), "        ");
        assert_eq!(mapper.next_line_indent(2), "");
        assert_eq!(mapper.next_line_indent(3), "");
        assert_eq!(mapper.next_line_indent(usize::MAX), "");
    }

    #[test]
    fn test_clamped_line_index() {
        let reference = reference();
        let mapper = CursorMapper::new(&reference);

        assert_eq!(mapper.clamped_line_index_for(1000), 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_line_index_out_of_range_panics() {
        let reference = reference();
        CursorMapper::new(&reference).line_index_for(25);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_offset_of_column_out_of_range_panics() {
        let reference = reference();
        CursorMapper::new(&reference).offset_of(LinePosition::new(2, 2));
    }

    #[test]
    fn test_position_in_chars() {
        let chars: Vec<char> = "ab\n  cd".chars().collect();

        assert_eq!(LinePosition::in_chars(&chars, 0), LinePosition::new(0, 0));
        assert_eq!(LinePosition::in_chars(&chars, 2), LinePosition::new(0, 2));
        assert_eq!(LinePosition::in_chars(&chars, 3), LinePosition::new(1, 0));
        assert_eq!(LinePosition::in_chars(&chars, 7), LinePosition::new(1, 4));
        assert_eq!(LinePosition::in_chars(&chars, 100), LinePosition::new(1, 4));
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("    x"), "    ");
        assert_eq!(leading_whitespace("x  "), "");
        assert_eq!(leading_whitespace("   "), "   ");
    }
}
