//! Position and line-map utilities.
//!
//! The AST stores byte offsets; the host wants line/column positions.
//! Columns are counted in UTF-16 code units, matching editor conventions.

use serde::Serialize;

/// A position in a source file (0-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (UTF-16 code units)
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// Line map for offset -> position conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];

        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push((i + 1) as u32);
            } else if ch == '\r' {
                // \r\n produces one line break at the \n
                let next_idx = i + 1;
                if source.as_bytes().get(next_idx) != Some(&b'\n') {
                    line_starts.push(next_idx as u32);
                }
            }
        }

        LineMap { line_starts }
    }

    /// Convert a byte offset to a Position (line, character).
    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };

        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let clamped_end = (offset as usize).min(source.len());
        let start = (line_start as usize).min(clamped_end);
        let slice = source.get(start..clamped_end).unwrap_or("");
        let character = slice.chars().map(|ch| ch.len_utf16() as u32).sum();

        Position {
            line: line as u32,
            character,
        }
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position_basic() {
        let source = "export function f() {}\nfunction g() {}";
        let map = LineMap::build(source);

        assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
        assert_eq!(map.offset_to_position(16, source), Position::new(0, 16));
        assert_eq!(map.offset_to_position(32, source), Position::new(1, 9));
    }

    #[test]
    fn test_crlf_counts_as_single_break() {
        let source = "a\r\nb\rc";
        let map = LineMap::build(source);

        assert_eq!(map.line_count(), 3);
        assert_eq!(map.offset_to_position(3, source), Position::new(1, 0));
        assert_eq!(map.offset_to_position(5, source), Position::new(2, 0));
    }

    #[test]
    fn test_columns_count_utf16_units() {
        let source = "const s = \"😀\"; x";
        let map = LineMap::build(source);
        let x_offset = source.find('x').unwrap() as u32;

        // The emoji is 4 bytes but 2 UTF-16 units
        assert_eq!(map.offset_to_position(x_offset, source).character, 16);
    }
}
