use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Zero-based text coordinate.
///
/// `character` is a UTF-8 byte column, the unit tree-sitter uses for
/// [`tree_sitter::Point::column`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.character.cmp(&other.character))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<tree_sitter::Point> for Position {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            line: point.row,
            character: point.column,
        }
    }
}

impl fmt::Display for Position {
    /// One-based `line:character`, the way editors print locations
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Half-open range between two positions.
///
/// A range whose start lies after its end is treated as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range covering the span of a syntax node
    #[must_use]
    pub fn of_node(node: &tree_sitter::Node<'_>) -> Self {
        Self {
            start: node.start_position().into(),
            end: node.end_position().into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check whether `position` lies inside the range (end inclusive)
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// A location in a file, without its content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeInFile {
    pub filepath: String,
    pub range: Range,
}

impl RangeInFile {
    pub fn new(filepath: impl Into<String>, range: Range) -> Self {
        Self {
            filepath: filepath.into(),
            range,
        }
    }
}

impl fmt::Display for RangeInFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.filepath, self.range)
    }
}

/// A location plus a snapshot of the file contents taken at lookup time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeInFileWithContents {
    pub filepath: String,
    pub range: Range,
    pub contents: String,
}

impl RangeInFileWithContents {
    pub fn new(filepath: impl Into<String>, range: Range, contents: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            range,
            contents: contents.into(),
        }
    }
}
