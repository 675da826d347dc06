//! # Reference Module - The Text Being Transcribed
//!
//! Holds an immutable, line-split view of the snippet chosen for a run.
//!
//! Data layout example: `"ab\ncd"`
//! ```text
//! Flat:        [a][b][\n][c][d]
//! Offsets:      0  1  2   3  4
//! Lines:       [--0--]    [--1--]
//! Line starts:  0          3
//! ```
//!
//! All offsets are counted in `char`s, with every line break counted as exactly one
//! character. A reference text is never mutated; a new run builds a new one.

use std::borrow::Cow;

/// Line-split reference text of a run
///
/// # Performance Characteristics
///
/// - Character access: O(1)
/// - Line access: O(1)
/// - Line lookup by offset: O(log n) where n is the amount of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceText {
    /// The whole text flattened, line breaks included
    characters: Vec<char>,
    /// Each line without its line break
    lines: Vec<String>,
    /// Length of each line in characters
    line_lengths: Vec<usize>,
    /// Flat offset of the first character of each line
    line_starts: Vec<usize>,
}

impl ReferenceText {
    /// Create a reference text from a snippet
    ///
    /// Carriage-return/line-feed pairs are normalized to a single line feed before the
    /// snippet is split.
    ///
    /// # Returns
    ///
    /// `None` if the snippet is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quill::reference::ReferenceText;
    ///
    /// let reference = ReferenceText::new("ab\ncd").unwrap();
    /// assert_eq!(reference.line_count(), 2);
    /// assert_eq!(reference.flat_len(), 5);
    /// assert_eq!(reference.flat_offset_of_line_start(1), 3);
    ///
    /// assert!(ReferenceText::new("").is_none());
    /// ```
    pub fn new(snippet: &str) -> Option<Self> {
        if snippet.is_empty() {
            return None;
        }

        let snippet = normalize_line_endings(snippet);
        let lines: Vec<String> = snippet.split('\n').map(str::to_string).collect();

        let mut line_lengths = Vec::with_capacity(lines.len());
        let mut line_starts = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for line in &lines {
            let length = line.chars().count();
            line_starts.push(offset);
            line_lengths.push(length);
            // One separator after every line but the last
            offset += length + 1;
        }

        Some(Self {
            characters: snippet.chars().collect(),
            lines,
            line_lengths,
            line_starts,
        })
    }

    /// Amount of lines in the text
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the last line
    pub fn last_line_index(&self) -> usize {
        // Safety: a reference text always has at least one line
        self.lines.len() - 1
    }

    /// The line at `index`, without its line break
    ///
    /// # Panics
    ///
    /// Panics if `index` is not an existing line.
    #[track_caller]
    pub fn line_at(&self, index: usize) -> &str {
        self.assert_line(index);
        &self.lines[index]
    }

    /// The line at `index`, or `None` if there is no such line
    pub fn get_line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Length in characters of the line at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is not an existing line.
    #[track_caller]
    pub fn line_len(&self, index: usize) -> usize {
        self.assert_line(index);
        self.line_lengths[index]
    }

    /// Flat offset of the first character of the line at `index`
    ///
    /// Equals the sum of all prior line lengths plus one separator per prior line.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not an existing line.
    #[track_caller]
    pub fn flat_offset_of_line_start(&self, index: usize) -> usize {
        self.assert_line(index);
        self.line_starts[index]
    }

    /// Total length of the flattened text, separators included
    pub fn flat_len(&self) -> usize {
        self.characters.len()
    }

    /// The character at a flat offset
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.characters.get(offset).copied()
    }

    /// The flattened text as characters
    pub fn chars(&self) -> &[char] {
        &self.characters
    }

    /// Flat line start offsets, one per line
    pub(crate) fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    #[track_caller]
    fn assert_line(&self, index: usize) {
        assert!(
            index < self.lines.len(),
            "line index {index} out of range for reference text with {} lines",
            self.lines.len()
        );
    }
}

impl std::fmt::Display for ReferenceText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// Replace every `\r\n` with `\n`
///
/// Borrows the input when there is nothing to replace.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}
