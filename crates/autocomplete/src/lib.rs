//! Context retrieval for inline code completion.
//!
//! Given a cursor position, gathers snippets from other parts of the codebase
//! that help a model complete the code at the cursor, and trims them to the
//! prompt's token budget.
//!
//! ```text
//! CompletionInput --> CompletionContext (prefix/suffix, syntax tree)
//!                            |
//!         +------------------+-------------------+
//!         v                  v                   v
//!   RootPathCollector  SymbolCollector   ImportCollector
//!   (ancestor queries) (words near cursor) (import table)
//!         |                  |                   |
//!         +--> Ide::goto_definition --> OutlineSynthesizer
//!                            |
//!                   filtering::select_snippets
//!                            |
//!                            v
//!                       Vec<Snippet>
//! ```
//!
//! Lookups go through [`context_cache::AsyncDedupCache`], so concurrent
//! requests for the same ancestor or symbol share one editor round trip.

pub mod context;
pub mod error;
pub mod filtering;
pub mod ide;
pub mod imports;
pub mod log_writer;
pub mod options;
pub mod outline;
pub mod queries;
pub mod retrieval;
pub mod root_path;
pub mod snippet;
pub mod symbols;
pub mod tokens;

#[cfg(test)]
mod test_support;

pub use context::CompletionContext;
pub use error::{ContextError, Result};
pub use filtering::{select_snippets, CollectedSnippets, TOKEN_BUFFER};
pub use ide::{FileImports, Ide, ImportIndex, StaticImportIndex};
pub use imports::ImportCollector;
pub use log_writer::LogWriter;
pub use options::{CompletionOptions, LanguageOptions};
pub use outline::OutlineSynthesizer;
pub use retrieval::ContextRetrievalService;
pub use root_path::RootPathCollector;
pub use snippet::{CompletionInput, RecentlyEditedRange, SelectedCompletionInfo, Snippet, SnippetKind};
pub use symbols::SymbolCollector;
pub use tokens::{ApproxTokenCounter, TokenCounter};

pub use context_syntax::{Language, Position, Range, RangeInFile, RangeInFileWithContents};
