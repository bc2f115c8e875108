//! Helpers for moving between [`Position`]/[`Range`] coordinates and byte
//! offsets in a text snapshot.
//!
//! Columns are byte columns. Every slice is clamped to the text and floored to
//! a char boundary, so out-of-range coordinates never panic.

use crate::types::{Position, Range};

/// Text covered by `range`, or an empty string for inverted ranges.
#[must_use]
pub fn range_in_string(content: &str, range: &Range) -> String {
    if range.start > range.end {
        return String::new();
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let line = |idx: usize| lines.get(idx).copied().unwrap_or("");

    if range.start.line == range.end.line {
        return slice_columns(line(range.start.line), range.start.character, range.end.character)
            .to_string();
    }

    let first = line(range.start.line);
    let mut parts = Vec::with_capacity(range.end.line - range.start.line + 1);
    parts.push(slice_columns(first, range.start.character, first.len()));
    for idx in (range.start.line + 1)..range.end.line {
        if let Some(middle) = lines.get(idx) {
            parts.push(middle);
        }
    }
    parts.push(slice_columns(line(range.end.line), 0, range.end.character));
    parts.join("\n")
}

/// Byte offset of `position` in `content`.
///
/// Lines past the end map to `content.len()`; columns past the end of their
/// line map to the end of that line.
#[must_use]
pub fn position_to_index(content: &str, position: Position) -> usize {
    let mut line_start = 0usize;
    for _ in 0..position.line {
        match content[line_start..].find('\n') {
            Some(newline) => line_start += newline + 1,
            None => return content.len(),
        }
    }

    let line_end = content[line_start..]
        .find('\n')
        .map_or(content.len(), |newline| line_start + newline);
    floor_char_boundary(content, (line_start + position.character).min(line_end))
}

fn slice_columns(line: &str, start: usize, end: usize) -> &str {
    let end = floor_char_boundary(line, end.min(line.len()));
    let start = floor_char_boundary(line, start.min(end));
    &line[start..end]
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(sl: usize, sc: usize, el: usize, ec: usize) -> Range {
        Range::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn test_range_in_string_single_line() {
        assert_eq!(range_in_string("let value = 42;", &range(0, 4, 0, 9)), "value");
    }

    #[test]
    fn test_range_in_string_multi_line() {
        let content = "fn a() {\n    body();\n}\n";
        assert_eq!(
            range_in_string(content, &range(0, 3, 2, 1)),
            "a() {\n    body();\n}"
        );
    }

    #[test]
    fn test_range_in_string_inverted_is_empty() {
        assert_eq!(range_in_string("abc\ndef", &range(1, 0, 0, 2)), "");
        assert_eq!(range_in_string("abc", &range(0, 2, 0, 1)), "");
    }

    #[test]
    fn test_range_in_string_clamps_out_of_bounds() {
        assert_eq!(range_in_string("abc", &range(0, 1, 7, 3)), "bc\n");
        assert_eq!(range_in_string("héllo", &range(0, 0, 0, 2)), "h");
    }

    #[test]
    fn test_position_to_index() {
        let content = "ab\ncd\nef";
        assert_eq!(position_to_index(content, Position::new(0, 0)), 0);
        assert_eq!(position_to_index(content, Position::new(1, 1)), 4);
        assert_eq!(position_to_index(content, Position::new(0, 10)), 2);
        assert_eq!(position_to_index(content, Position::new(9, 0)), content.len());
    }
}
