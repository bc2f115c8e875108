//! # Context Syntax
//!
//! Syntax-tree plumbing for completion context retrieval.
//!
//! ## Architecture
//!
//! ```text
//! File path + text
//!     │
//!     ├──> Language Detection (from extension)
//!     │      └─> LanguageProfile (outline kinds, placeholders, keywords, ignored paths)
//!     │
//!     ├──> Tree-sitter Parsing → SyntaxTree (tree + the text it was parsed from)
//!     │
//!     └──> Tree Path Resolution
//!          ├─> path_to_cursor     (root → innermost node at an offset)
//!          ├─> node_around_range  (smallest node enclosing a range)
//!          ├─> node_before        (node preceding an offset)
//!          └─> scope_around_range (enclosing scope of a file snapshot)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_syntax::{parse, path_to_cursor};
//!
//! let code = "fn main() {\n    let answer = 42;\n}\n";
//! let tree = parse("main.rs", code).unwrap();
//! let path = path_to_cursor(&tree, code.find("answer").unwrap());
//! assert_eq!(path[0].kind(), "source_file");
//! assert_eq!(path.last().map(|n| n.kind()), Some("identifier"));
//! ```

mod ast;
mod error;
mod language;
mod parse;
mod ranges;
mod types;

pub use ast::{node_around_range, node_before, path_to_cursor, scope_around_range, AstPath};
pub use error::{Result, SyntaxError};
pub use language::{Language, LanguageProfile};
pub use parse::{parse, parse_with_language, tree_to_string, SyntaxTree};
pub use ranges::{position_to_index, range_in_string};
pub use types::{Position, Range, RangeInFile, RangeInFileWithContents};

/// Re-exported so callers can name nodes and run queries without a direct dependency
pub use tree_sitter;
