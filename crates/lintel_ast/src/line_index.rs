//! Offset ⇄ line/column range map.

use crate::{Location, Position, Span};

/// Maps byte offsets of one source text to line/column positions and back.
///
/// Lines are split on `\n`; a `\r` before it belongs to the line content.
/// Columns count Unicode scalar values from the start of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset where each line starts. Always contains at least `0`.
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Builds the index for `source`.
    pub fn new(source: &str) -> Self {
        let mut line_starts = Vec::with_capacity(source.len() / 40 + 1);
        line_starts.push(0);
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        Self {
            line_starts,
            len: source.len() as u32,
        }
    }

    /// Returns the number of lines (an empty text has one empty line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the byte span of a 1-indexed line, excluding its newline.
    pub fn line_span(&self, line: u32) -> Option<Span> {
        let idx = line.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = match self.line_starts.get(idx + 1) {
            Some(next) => next - 1,
            None => self.len,
        };
        Some(Span::new(start, end))
    }

    /// Converts a byte offset to a position.
    ///
    /// Offsets past the end clamp to the end of the text. `source` must be the
    /// text this index was built from.
    pub fn position(&self, source: &str, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx] as usize;
        let mut end = offset as usize;
        while end > line_start && !source.is_char_boundary(end) {
            end -= 1;
        }
        let column = source
            .get(line_start..end)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        Position::new(line_idx as u32 + 1, column as u32)
    }

    /// Converts a position back to a byte offset.
    ///
    /// Returns `None` if the line does not exist or the column is past the end
    /// of the line.
    pub fn offset(&self, source: &str, position: Position) -> Option<u32> {
        let line = self.line_span(position.line)?;
        let text = source.get(line.to_range())?;
        let column = position.column as usize;
        if column == text.chars().count() {
            return Some(line.end);
        }
        text.char_indices()
            .nth(column)
            .map(|(byte, _)| line.start + byte as u32)
    }

    /// Converts a span to a location.
    pub fn location(&self, source: &str, span: Span) -> Location {
        Location::new(
            self.position(source, span.start),
            self.position(source, span.end),
        )
    }
}
